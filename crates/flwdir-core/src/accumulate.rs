//! Upstream accumulation over the ranked flow forest.
//!
//! Both passes walk the ranking sequence backwards (highest rank first), so
//! every predecessor of a cell is final before the cell pushes its total
//! downstream.

use crate::error::{Error, Result};
use crate::rank::Ranking;
use crate::successors::SuccessorTable;

/// Number of other cells whose flow path passes through each cell.
///
/// `n_upstream[c] = Σ (1 + n_upstream[u])` over direct predecessors `u`.
/// Headwaters and invalid cells are 0.
pub fn upstream_counts(table: &SuccessorTable, ranking: &Ranking) -> Vec<u64> {
    let mut n_up = vec![0u64; table.len()];
    for &cell in ranking.seq().iter().rev() {
        if let Some(ds) = table.downstream(cell) {
            n_up[ds] += 1 + n_up[cell];
        }
    }
    n_up
}

/// Weighted flow accumulation.
///
/// Each cell starts at its weight (1.0 when `weights` is `None`) and valid
/// cells add their running total into their successor. Cells that do not
/// reach a pit keep their own weight.
pub fn accuflux(
    table: &SuccessorTable,
    ranking: &Ranking,
    weights: Option<&[f64]>,
) -> Result<Vec<f64>> {
    let mut flux = match weights {
        Some(w) if w.len() != table.len() => {
            return Err(Error::InvalidParameter {
                name: "weights",
                value: format!("{} values", w.len()),
                reason: format!("expected one weight per cell ({})", table.len()),
            });
        }
        Some(w) => w.to_vec(),
        None => vec![1.0; table.len()],
    };

    for &cell in ranking.seq().iter().rev() {
        if let Some(ds) = table.downstream(cell) {
            flux[ds] += flux[cell];
        }
    }
    Ok(flux)
}
