use serde::{Deserialize, Serialize};

use crate::d8::{self, D8_NODATA};
use crate::error::{Error, Result};

/// What to do with a cell whose direction points outside the grid (or, under
/// [`BoundaryPolicy::Pit`], into a NODATA cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// The cell is an outlet: rank 0 and listed in `idxs_pit`.
    #[default]
    Pit,
    /// The cell has no defined successor and is invalid (rank -1).
    Invalid,
}

/// Options for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub boundary: BoundaryPolicy,
    /// NODATA code, or `None` if the grid has no NODATA cells.
    pub nodata: Option<u8>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::Pit,
            nodata: Some(D8_NODATA),
        }
    }
}

impl AnalysisOptions {
    /// Reject a NODATA code that is also a direction or the pit code.
    pub fn validate(&self) -> Result<()> {
        match self.nodata {
            Some(code) if d8::is_flow_code(code) => Err(Error::InvalidParameter {
                name: "nodata",
                value: code.to_string(),
                reason: "collides with a D8 direction or pit code".into(),
            }),
            _ => Ok(()),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }
}
