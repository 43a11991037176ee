//! Validity classification and cycle detection.
//!
//! A cell is valid iff following successors from it reaches a pit without
//! revisiting a cell. Chains are walked iteratively with an explicit path
//! list; every cell is pushed at most once, so the pass is O(n) regardless of
//! path length.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AnalysisOptions;
use crate::d8::{self, Decoded};
use crate::grid::FlowGrid;
use crate::successors::{Successor, SuccessorTable};

/// Classification of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// Reaches a pit.
    Valid,
    /// Holds the NODATA code.
    Nodata,
    /// Holds a byte that is neither a direction, the pit code nor NODATA.
    MalformedCode,
    /// Points off the grid under `BoundaryPolicy::Invalid`.
    BoundaryEscape,
    /// Lies on a cycle of successors.
    Cycle,
    /// Valid code, but the chain runs into one of the cells above.
    DrainsToInvalid,
}

impl CellStatus {
    #[inline]
    pub fn is_valid(self) -> bool {
        self == CellStatus::Valid
    }
}

/// Per-reason counts of one validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub valid: usize,
    pub nodata: usize,
    pub malformed_code: usize,
    pub boundary_escape: usize,
    pub cycle: usize,
    pub drains_to_invalid: usize,
}

impl ValidationSummary {
    pub fn invalid(&self) -> usize {
        self.nodata + self.malformed_code + self.boundary_escape + self.cycle + self.drains_to_invalid
    }
}

#[derive(Debug, Clone)]
pub struct Validation {
    status: Vec<CellStatus>,
    summary: ValidationSummary,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

impl Validation {
    /// Classify every cell of `table`. `grid` and `opts` are only consulted to
    /// name the reason a cell has no successor.
    pub fn run(grid: &FlowGrid, table: &SuccessorTable, opts: &AnalysisOptions) -> Self {
        let n = table.len();
        let mut status = vec![CellStatus::Valid; n];
        let mut mark = vec![Mark::Unvisited; n];
        let mut path: Vec<usize> = Vec::new();

        for start in 0..n {
            if mark[start] != Mark::Unvisited {
                continue;
            }
            path.clear();
            let mut cur = start;

            // Status inherited by every cell still on `path` once the walk ends.
            let outcome = loop {
                match mark[cur] {
                    Mark::Done => {
                        break if status[cur].is_valid() {
                            CellStatus::Valid
                        } else {
                            CellStatus::DrainsToInvalid
                        };
                    }
                    Mark::OnPath => {
                        // OnPath cells are always on the current path.
                        let pos = path.iter().rposition(|&c| c == cur).unwrap_or(0);
                        for &c in &path[pos..] {
                            status[c] = CellStatus::Cycle;
                            mark[c] = Mark::Done;
                        }
                        path.truncate(pos);
                        break CellStatus::DrainsToInvalid;
                    }
                    Mark::Unvisited => {
                        mark[cur] = Mark::OnPath;
                        path.push(cur);
                        match table.get(cur) {
                            Successor::Pit => break CellStatus::Valid,
                            Successor::Undefined => {
                                status[cur] = undefined_reason(grid.data()[cur], opts);
                                mark[cur] = Mark::Done;
                                path.pop();
                                break CellStatus::DrainsToInvalid;
                            }
                            Successor::Down(ds) => cur = ds,
                        }
                    }
                }
            };

            for &c in &path {
                status[c] = outcome;
                mark[c] = Mark::Done;
            }
        }

        let summary = summarize(&status);
        debug!(valid = summary.valid, invalid = summary.invalid(), "validation done");
        if summary.invalid() > 0 {
            warn!(
                nodata = summary.nodata,
                malformed_code = summary.malformed_code,
                boundary_escape = summary.boundary_escape,
                cycle = summary.cycle,
                drains_to_invalid = summary.drains_to_invalid,
                "grid contains cells that do not reach a pit"
            );
        }
        Self { status, summary }
    }

    #[inline]
    pub fn status(&self, idx: usize) -> CellStatus {
        self.status[idx]
    }

    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        self.status[idx].is_valid()
    }

    pub fn statuses(&self) -> &[CellStatus] {
        &self.status
    }

    pub fn summary(&self) -> &ValidationSummary {
        &self.summary
    }

    pub fn valid_count(&self) -> usize {
        self.summary.valid
    }
}

fn undefined_reason(code: u8, opts: &AnalysisOptions) -> CellStatus {
    match d8::decode(code, opts.nodata) {
        Decoded::Nodata => CellStatus::Nodata,
        Decoded::Invalid => CellStatus::MalformedCode,
        // A direction with no successor only happens when it leaves the grid.
        Decoded::Flow(_) | Decoded::Pit => CellStatus::BoundaryEscape,
    }
}

fn summarize(status: &[CellStatus]) -> ValidationSummary {
    let mut s = ValidationSummary::default();
    for st in status {
        match st {
            CellStatus::Valid => s.valid += 1,
            CellStatus::Nodata => s.nodata += 1,
            CellStatus::MalformedCode => s.malformed_code += 1,
            CellStatus::BoundaryEscape => s.boundary_escape += 1,
            CellStatus::Cycle => s.cycle += 1,
            CellStatus::DrainsToInvalid => s.drains_to_invalid += 1,
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryPolicy;
    use crate::d8::{D8_E, D8_N, D8_NODATA, D8_NW, D8_PIT, D8_S, D8_W};

    fn validate(rows: &[&[u8]], opts: &AnalysisOptions) -> Validation {
        let grid = FlowGrid::from_rows(rows).unwrap();
        let table = SuccessorTable::build(&grid, opts);
        Validation::run(&grid, &table, opts)
    }

    #[test]
    fn chain_into_pit_is_valid() {
        let v = validate(&[&[D8_E, D8_E, D8_E, D8_PIT]], &AnalysisOptions::default());
        assert!(v.statuses().iter().all(|s| s.is_valid()));
        assert_eq!(v.valid_count(), 4);
    }

    #[test]
    fn two_cell_cycle_is_flagged_exactly() {
        // 0 <-> 1, 2 is an isolated pit.
        let v = validate(&[&[D8_E, D8_W, D8_PIT]], &AnalysisOptions::default());
        assert_eq!(v.status(0), CellStatus::Cycle);
        assert_eq!(v.status(1), CellStatus::Cycle);
        assert_eq!(v.status(2), CellStatus::Valid);
        assert_eq!(v.summary().cycle, 2);
    }

    #[test]
    fn lead_in_to_cycle_drains_to_invalid() {
        // Column: 0 -> 1 -> 2 -> 1 (cycle between rows 1 and 2).
        let v = validate(&[&[D8_S], &[D8_S], &[D8_N]], &AnalysisOptions::default());
        assert_eq!(v.status(0), CellStatus::DrainsToInvalid);
        assert_eq!(v.status(1), CellStatus::Cycle);
        assert_eq!(v.status(2), CellStatus::Cycle);
    }

    #[test]
    fn four_cell_loop_entered_midway() {
        // 2x2 ring E, S / N, W plus a tail feeding into it.
        let v = validate(&[&[D8_E, 4, D8_W], &[D8_N, D8_W, D8_PIT]], &AnalysisOptions::default());
        // ring: (0,0)E->(0,1)S->(1,1)W->(1,0)N->(0,0)
        for idx in [0, 1, 3, 4] {
            assert_eq!(v.status(idx), CellStatus::Cycle, "cell {idx}");
        }
        assert_eq!(v.status(2), CellStatus::DrainsToInvalid);
        assert_eq!(v.status(5), CellStatus::Valid);
    }

    #[test]
    fn bad_cells_report_their_reason() {
        let opts = AnalysisOptions { boundary: BoundaryPolicy::Invalid, ..Default::default() };
        let v = validate(&[&[D8_N, 3, D8_NODATA], &[D8_N, D8_N, D8_N]], &opts);
        assert_eq!(v.status(0), CellStatus::BoundaryEscape);
        assert_eq!(v.status(1), CellStatus::MalformedCode);
        assert_eq!(v.status(2), CellStatus::Nodata);
        assert_eq!(v.status(3), CellStatus::DrainsToInvalid);
        assert_eq!(v.status(4), CellStatus::DrainsToInvalid);
        assert_eq!(v.status(5), CellStatus::DrainsToInvalid);
        assert_eq!(v.summary().invalid(), 6);
        assert_eq!(v.valid_count(), 0);
    }

    #[test]
    fn pit_beside_cycle() {
        let v = validate(&[&[D8_PIT, D8_E, D8_W]], &AnalysisOptions::default());
        assert_eq!(v.status(0), CellStatus::Valid);
        assert_eq!(v.status(1), CellStatus::Cycle);
        assert_eq!(v.status(2), CellStatus::Cycle);
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let n = 200_000;
        let mut row = vec![D8_E; n];
        row[n - 1] = D8_PIT;
        let v = validate(&[&row[..]], &AnalysisOptions::default());
        assert_eq!(v.valid_count(), n);
    }

    #[test]
    fn long_lead_in_keeps_its_cells_out_of_the_cycle() {
        // Tail 0 -> 1 -> 2 feeds the ring 3 -> 4 -> 9 -> 3; row 1 is otherwise pits.
        let v = validate(
            &[&[D8_E, D8_E, D8_E, D8_E, D8_S], &[D8_PIT, D8_PIT, D8_PIT, D8_PIT, D8_NW]],
            &AnalysisOptions::default(),
        );
        for idx in [0, 1, 2] {
            assert_eq!(v.status(idx), CellStatus::DrainsToInvalid, "tail cell {idx}");
        }
        for idx in [3, 4, 9] {
            assert_eq!(v.status(idx), CellStatus::Cycle, "ring cell {idx}");
        }
        assert_eq!(v.summary().cycle, 3);
        assert_eq!(v.valid_count(), 4);
    }
}
