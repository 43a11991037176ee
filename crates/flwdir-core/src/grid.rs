use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 2D grid of D8 flow-direction codes, row-major.
/// Cell index = `row * cols + col`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "GridRepr")]
pub struct FlowGrid {
    data: Vec<u8>,
    rows: usize,
    cols: usize,
}

impl FlowGrid {
    /// Wrap a row-major code buffer.
    ///
    /// Fails with [`Error::SizeMismatch`] if `data.len() != rows * cols`, and
    /// with [`Error::GridTooLarge`] if the cell count does not fit the `i32`
    /// rank range.
    pub fn new(rows: usize, cols: usize, data: Vec<u8>) -> Result<Self> {
        let size = rows
            .checked_mul(cols)
            .ok_or(Error::SizeMismatch { rows, cols, len: data.len() })?;
        if size != data.len() {
            return Err(Error::SizeMismatch { rows, cols, len: data.len() });
        }
        if size > i32::MAX as usize {
            return Err(Error::GridTooLarge { size });
        }
        Ok(Self { data, rows, cols })
    }

    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::SizeMismatch {
                    rows: rows.len(),
                    cols,
                    len: data.len() + row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), cols, data)
    }

    /// Parse either `{"rows", "cols", "data"}` or a nested array of rows.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn rowcol(&self, idx: usize) -> (usize, usize) {
        (idx / self.cols, idx % self.cols)
    }

    /// Flat index of the cell at `(row + drow, col + dcol)`, or `None` if
    /// that lies outside the grid.
    #[inline]
    pub fn offset_idx(&self, idx: usize, drow: isize, dcol: isize) -> Option<usize> {
        let (row, col) = self.rowcol(idx);
        let r = row.checked_add_signed(drow)?;
        let c = col.checked_add_signed(dcol)?;
        (r < self.rows && c < self.cols).then(|| r * self.cols + c)
    }
}

// ── Serde representation ──────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GridRepr {
    Flat { rows: usize, cols: usize, data: Vec<u8> },
    Nested(Vec<Vec<u8>>),
}

impl TryFrom<GridRepr> for FlowGrid {
    type Error = Error;

    fn try_from(repr: GridRepr) -> Result<Self> {
        match repr {
            GridRepr::Flat { rows, cols, data } => FlowGrid::new(rows, cols, data),
            GridRepr::Nested(rows) => FlowGrid::from_rows(&rows),
        }
    }
}

impl From<FlowGrid> for GridRepr {
    fn from(grid: FlowGrid) -> Self {
        GridRepr::Flat { rows: grid.rows, cols: grid.cols, data: grid.data }
    }
}
