use crate::maybe_rayon::*;
use crate::successors::SuccessorTable;

/// Ascending flat indices of all terminal cells: PIT codes plus, under
/// `BoundaryPolicy::Pit`, cells draining off the grid or into NODATA.
pub fn pit_indices(table: &SuccessorTable) -> Vec<usize> {
    (0..table.len())
        .into_par_iter()
        .filter(|&idx| table.is_pit(idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisOptions, BoundaryPolicy};
    use crate::d8::{D8_E, D8_N, D8_PIT, D8_S, D8_W};
    use crate::grid::FlowGrid;

    fn pits(rows: &[&[u8]], opts: &AnalysisOptions) -> Vec<usize> {
        let grid = FlowGrid::from_rows(rows).unwrap();
        pit_indices(&SuccessorTable::build(&grid, opts))
    }

    #[test]
    fn pits_are_strictly_ascending() {
        let p = pits(
            &[&[D8_PIT, D8_W, D8_PIT], &[D8_S, D8_PIT, D8_N], &[D8_PIT, D8_E, D8_PIT]],
            &AnalysisOptions { boundary: BoundaryPolicy::Invalid, ..Default::default() },
        );
        assert_eq!(p, vec![0, 2, 4, 6, 8]);
        assert!(p.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn edge_outlets_count_as_pits_by_default() {
        let rows: &[&[u8]] = &[&[D8_N, D8_S], &[D8_E, D8_PIT]];
        assert_eq!(pits(rows, &AnalysisOptions::default()), vec![0, 3]);

        let strict = AnalysisOptions { boundary: BoundaryPolicy::Invalid, ..Default::default() };
        assert_eq!(pits(rows, &strict), vec![3]);
    }
}
