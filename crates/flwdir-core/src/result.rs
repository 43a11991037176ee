//! Serializable analysis output and field-by-field comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one network analysis.
///
/// Per-cell arrays are row-major and have `size` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkResult {
    shape: [usize; 2],
    size: usize,
    nnodes: usize,
    rank: Vec<i32>,
    n_upstream: Vec<u64>,
    idxs_pit: Vec<usize>,
}

impl NetworkResult {
    pub(crate) fn new(
        shape: [usize; 2],
        nnodes: usize,
        rank: Vec<i32>,
        n_upstream: Vec<u64>,
        idxs_pit: Vec<usize>,
    ) -> Self {
        Self { shape, size: shape[0] * shape[1], nnodes, rank, n_upstream, idxs_pit }
    }

    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of valid cells.
    pub fn nnodes(&self) -> usize {
        self.nnodes
    }

    pub fn rank(&self) -> &[i32] {
        &self.rank
    }

    pub fn n_upstream(&self) -> &[u64] {
        &self.n_upstream
    }

    pub fn idxs_pit(&self) -> &[usize] {
        &self.idxs_pit
    }

    /// Compare every field against `other`, reporting the first differing
    /// position of each array.
    pub fn compare(&self, other: &NetworkResult) -> Comparison {
        let mut diffs = Vec::new();
        if self.shape != other.shape {
            diffs.push(FieldDiff::scalar("shape", &self.shape, &other.shape));
        }
        if self.size != other.size {
            diffs.push(FieldDiff::scalar("size", &self.size, &other.size));
        }
        if self.nnodes != other.nnodes {
            diffs.push(FieldDiff::scalar("nnodes", &self.nnodes, &other.nnodes));
        }
        diffs.extend(FieldDiff::array("rank", &self.rank, &other.rank));
        diffs.extend(FieldDiff::array("n_upstream", &self.n_upstream, &other.n_upstream));
        diffs.extend(FieldDiff::array("idxs_pit", &self.idxs_pit, &other.idxs_pit));
        Comparison { diffs }
    }
}

/// One mismatching field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub field: &'static str,
    /// First differing position, for arrays. `None` for scalars or when
    /// only the lengths differ.
    pub first_index: Option<usize>,
    /// Number of differing positions (arrays) or 1 (scalars).
    pub mismatches: usize,
    pub left: String,
    pub right: String,
}

impl FieldDiff {
    fn scalar<T: fmt::Debug>(field: &'static str, left: &T, right: &T) -> Self {
        Self {
            field,
            first_index: None,
            mismatches: 1,
            left: format!("{left:?}"),
            right: format!("{right:?}"),
        }
    }

    fn array<T: PartialEq + fmt::Debug>(field: &'static str, left: &[T], right: &[T]) -> Option<Self> {
        if left.len() != right.len() {
            return Some(Self {
                field,
                first_index: None,
                mismatches: left.len().abs_diff(right.len()),
                left: format!("len {}", left.len()),
                right: format!("len {}", right.len()),
            });
        }
        let mut first = None;
        let mut mismatches = 0;
        for (i, (a, b)) in left.iter().zip(right).enumerate() {
            if a != b {
                first.get_or_insert(i);
                mismatches += 1;
            }
        }
        first.map(|i| Self {
            field,
            first_index: Some(i),
            mismatches,
            left: format!("{:?}", left[i]),
            right: format!("{:?}", right[i]),
        })
    }
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_index {
            Some(i) => write!(
                f,
                "{}[{}]: {} != {} ({} mismatches)",
                self.field, i, self.left, self.right, self.mismatches
            ),
            None => write!(f, "{}: {} != {}", self.field, self.left, self.right),
        }
    }
}

/// Result of [`NetworkResult::compare`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Comparison {
    diffs: Vec<FieldDiff>,
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn diffs(&self) -> &[FieldDiff] {
        &self.diffs
    }
}
