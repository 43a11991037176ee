//! D8 drainage-network analysis.
//!
//! Decode a grid of D8 flow-direction codes into a flow graph, flag cells
//! that never reach a pit, and compute per-cell topological rank and
//! upstream cell counts.
//!
//! ```
//! use flwdir_core::{analyze, AnalysisOptions, FlowGrid};
//!
//! // SE, S / E, PIT: every cell drains into the bottom-right pit.
//! let grid = FlowGrid::new(2, 2, vec![2, 4, 1, 0]).unwrap();
//! let res = analyze(&grid, &AnalysisOptions::default()).unwrap();
//! assert_eq!(res.rank(), &[1, 1, 1, 0]);
//! assert_eq!(res.n_upstream(), &[0, 0, 0, 3]);
//! assert_eq!(res.idxs_pit(), &[3]);
//! ```

pub mod accumulate;
pub mod config;
pub mod d8;
pub mod error;
pub mod grid;
mod maybe_rayon;
pub mod network;
pub mod pits;
pub mod rank;
pub mod result;
pub mod successors;
pub mod upstream;
pub mod validate;

pub use config::{AnalysisOptions, BoundaryPolicy};
pub use error::{Error, Result};
pub use grid::FlowGrid;
pub use network::FlowNetwork;
pub use result::{Comparison, FieldDiff, NetworkResult};
pub use validate::{CellStatus, ValidationSummary};

/// Run the full analysis and return the result bundle.
pub fn analyze(grid: &FlowGrid, options: &AnalysisOptions) -> Result<NetworkResult> {
    Ok(FlowNetwork::build(grid, options)?.into_result())
}
