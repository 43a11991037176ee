//! Flow graph construction: one downstream pointer per cell.
//!
//! Pits point at themselves; cells without a defined successor hold
//! [`UNDEFINED`]. Every cell therefore has out-degree at most one and the
//! flow graph is a forest of in-trees plus whatever cycles the input encodes.

use tracing::debug;

use crate::config::{AnalysisOptions, BoundaryPolicy};
use crate::d8::{self, Decoded};
use crate::grid::FlowGrid;
use crate::maybe_rayon::*;

/// Marker for "no successor": NODATA, invalid code, or off-grid target under
/// [`BoundaryPolicy::Invalid`].
pub const UNDEFINED: usize = usize::MAX;

/// Downstream neighbour of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    Down(usize),
    Pit,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessorTable {
    idxs_ds: Vec<usize>,
    rows: usize,
    cols: usize,
}

impl SuccessorTable {
    /// Decode every cell of `grid` into its downstream pointer.
    pub fn build(grid: &FlowGrid, opts: &AnalysisOptions) -> Self {
        let idxs_ds: Vec<usize> = (0..grid.size())
            .into_par_iter()
            .map(|idx| resolve(grid, idx, opts))
            .collect();

        let table = Self { idxs_ds, rows: grid.rows(), cols: grid.cols() };
        debug!(
            rows = table.rows,
            cols = table.cols,
            pits = table.pit_count(),
            undefined = table.undefined_count(),
            "successor table built"
        );
        table
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Successor {
        match self.idxs_ds[idx] {
            UNDEFINED => Successor::Undefined,
            ds if ds == idx => Successor::Pit,
            ds => Successor::Down(ds),
        }
    }

    /// Downstream index, or `None` for pits and undefined cells.
    #[inline]
    pub fn downstream(&self, idx: usize) -> Option<usize> {
        match self.get(idx) {
            Successor::Down(ds) => Some(ds),
            Successor::Pit | Successor::Undefined => None,
        }
    }

    #[inline]
    pub fn is_pit(&self, idx: usize) -> bool {
        self.idxs_ds[idx] == idx
    }

    /// Raw pointers: self-index for pits, [`UNDEFINED`] for undefined cells.
    pub fn as_slice(&self) -> &[usize] {
        &self.idxs_ds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.idxs_ds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idxs_ds.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn pit_count(&self) -> usize {
        self.idxs_ds.iter().enumerate().filter(|&(i, &ds)| ds == i).count()
    }

    pub fn undefined_count(&self) -> usize {
        self.idxs_ds.iter().filter(|&&ds| ds == UNDEFINED).count()
    }

    /// Re-encode the table as a D8 grid.
    ///
    /// Pits (including edge outlets) become `0`, undefined cells `nodata`.
    pub fn to_d8(&self, nodata: u8) -> Vec<u8> {
        let cols = self.cols as isize;
        self.idxs_ds
            .iter()
            .enumerate()
            .map(|(idx, &ds)| match ds {
                UNDEFINED => nodata,
                ds if ds == idx => d8::D8_PIT,
                ds => {
                    let (r0, c0) = ((idx as isize) / cols, (idx as isize) % cols);
                    let (r1, c1) = ((ds as isize) / cols, (ds as isize) % cols);
                    d8::encode(r1 - r0, c1 - c0).unwrap_or(nodata)
                }
            })
            .collect()
    }
}

fn resolve(grid: &FlowGrid, idx: usize, opts: &AnalysisOptions) -> usize {
    let dir = match d8::decode(grid.data()[idx], opts.nodata) {
        Decoded::Flow(dir) => dir,
        Decoded::Pit => return idx,
        Decoded::Nodata | Decoded::Invalid => return UNDEFINED,
    };
    let (drow, dcol) = dir.offset();
    match (grid.offset_idx(idx, drow, dcol), opts.boundary) {
        (Some(ds), BoundaryPolicy::Pit) if d8::is_nodata(grid.data()[ds], opts.nodata) => idx,
        (Some(ds), _) => ds,
        (None, BoundaryPolicy::Pit) => idx,
        (None, BoundaryPolicy::Invalid) => UNDEFINED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d8::{D8_E, D8_N, D8_NODATA, D8_PIT, D8_S, D8_SE, D8_W};

    fn table(rows: &[&[u8]], opts: &AnalysisOptions) -> SuccessorTable {
        let grid = FlowGrid::from_rows(rows).unwrap();
        SuccessorTable::build(&grid, opts)
    }

    #[test]
    fn pointers_follow_decoded_offsets() {
        let t = table(&[&[D8_E, D8_S], &[D8_N, D8_PIT]], &AnalysisOptions::default());
        assert_eq!(t.as_slice(), &[1, 3, 0, 3]);
        assert_eq!(t.get(0), Successor::Down(1));
        assert_eq!(t.get(3), Successor::Pit);
        assert_eq!(t.downstream(3), None);
        assert_eq!(t.pit_count(), 1);
    }

    #[test]
    fn bad_codes_and_nodata_are_undefined() {
        let t = table(&[&[3, D8_NODATA, D8_PIT]], &AnalysisOptions::default());
        assert_eq!(t.get(0), Successor::Undefined);
        assert_eq!(t.get(1), Successor::Undefined);
        assert_eq!(t.undefined_count(), 2);
    }

    #[test]
    fn edge_outflow_follows_boundary_policy() {
        let rows: &[&[u8]] = &[&[D8_N]];
        let as_pit = table(rows, &AnalysisOptions::default());
        assert_eq!(as_pit.get(0), Successor::Pit);

        let opts = AnalysisOptions { boundary: BoundaryPolicy::Invalid, ..Default::default() };
        let as_invalid = table(rows, &opts);
        assert_eq!(as_invalid.get(0), Successor::Undefined);
    }

    #[test]
    fn flow_into_nodata_is_an_outlet_only_under_pit_policy() {
        let rows: &[&[u8]] = &[&[D8_E, D8_NODATA]];
        assert_eq!(table(rows, &AnalysisOptions::default()).get(0), Successor::Pit);

        let opts = AnalysisOptions { boundary: BoundaryPolicy::Invalid, ..Default::default() };
        assert_eq!(table(rows, &opts).get(0), Successor::Down(1));
    }

    #[test]
    fn to_d8_reencodes_directions() {
        let rows: &[&[u8]] = &[&[D8_SE, D8_W, 7], &[D8_E, D8_N, D8_PIT]];
        let t = table(rows, &AnalysisOptions::default());
        // (0,1) points W to (0,0); (1,1) points N to (0,1); (0,2) holds a bad code.
        assert_eq!(t.to_d8(D8_NODATA), vec![D8_SE, D8_W, D8_NODATA, D8_E, D8_N, D8_PIT]);
    }
}
