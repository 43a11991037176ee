//! One-shot analysis of a D8 grid.
//!
//! `FlowNetwork` runs the passes in dependency order and keeps every
//! intermediate table, so derived products (basins, accumulation, main
//! stems) can be asked for without rebuilding anything.
//!
//! Ranking does not read the validation pass. The BFS starts at the pits
//! and follows predecessor links, so it reaches exactly the cells whose
//! chain ends in a pit: the cells `Validation` marks valid. Validation
//! exists to name the reason for every cell that is not reached.

use tracing::debug;

use crate::accumulate;
use crate::config::AnalysisOptions;
use crate::d8;
use crate::error::Result;
use crate::grid::FlowGrid;
use crate::pits::pit_indices;
use crate::rank::Ranking;
use crate::result::NetworkResult;
use crate::successors::SuccessorTable;
use crate::upstream::UpstreamIndex;
use crate::validate::Validation;

#[derive(Debug, Clone)]
pub struct FlowNetwork {
    options: AnalysisOptions,
    successors: SuccessorTable,
    validation: Validation,
    upstream: UpstreamIndex,
    ranking: Ranking,
    n_upstream: Vec<u64>,
    idxs_pit: Vec<usize>,
}

impl FlowNetwork {
    pub fn build(grid: &FlowGrid, options: &AnalysisOptions) -> Result<Self> {
        options.validate()?;

        let successors = SuccessorTable::build(grid, options);
        let validation = Validation::run(grid, &successors, options);
        let upstream = UpstreamIndex::build(&successors);
        let ranking = Ranking::compute(&successors, &upstream);
        let n_upstream = accumulate::upstream_counts(&successors, &ranking);
        let idxs_pit = pit_indices(&successors);

        debug_assert_eq!(ranking.nnodes(), validation.valid_count());
        debug!(
            size = grid.size(),
            nnodes = ranking.nnodes(),
            pits = idxs_pit.len(),
            "flow network built"
        );

        Ok(Self {
            options: options.clone(),
            successors,
            validation,
            upstream,
            ranking,
            n_upstream,
            idxs_pit,
        })
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn successors(&self) -> &SuccessorTable {
        &self.successors
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn upstream(&self) -> &UpstreamIndex {
        &self.upstream
    }

    pub fn rank(&self) -> &[i32] {
        self.ranking.ranks()
    }

    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    pub fn n_upstream(&self) -> &[u64] {
        &self.n_upstream
    }

    pub fn idxs_pit(&self) -> &[usize] {
        &self.idxs_pit
    }

    /// Valid cells ordered from downstream to upstream.
    pub fn idxs_seq(&self) -> &[usize] {
        self.ranking.seq()
    }

    pub fn nnodes(&self) -> usize {
        self.ranking.nnodes()
    }

    pub fn shape(&self) -> [usize; 2] {
        let (rows, cols) = self.successors.shape();
        [rows, cols]
    }

    pub fn result(&self) -> NetworkResult {
        NetworkResult::new(
            self.shape(),
            self.nnodes(),
            self.ranking.ranks().to_vec(),
            self.n_upstream.clone(),
            self.idxs_pit.clone(),
        )
    }

    pub fn into_result(self) -> NetworkResult {
        let shape = self.shape();
        let nnodes = self.nnodes();
        NetworkResult::new(shape, nnodes, self.ranking.into_ranks(), self.n_upstream, self.idxs_pit)
    }

    /// Weighted accumulation; see [`accumulate::accuflux`].
    pub fn accuflux(&self, weights: Option<&[f64]>) -> Result<Vec<f64>> {
        accumulate::accuflux(&self.successors, &self.ranking, weights)
    }

    /// Basin label per cell: 1-based position of the cell's pit in
    /// `idxs_pit`, 0 for cells that reach no pit.
    pub fn basins(&self) -> Vec<u32> {
        let mut label = vec![0u32; self.successors.len()];
        for (i, &pit) in self.idxs_pit.iter().enumerate() {
            label[pit] = i as u32 + 1;
        }
        // Downstream cells come first in the sequence.
        for &cell in self.ranking.seq() {
            if let Some(ds) = self.successors.downstream(cell) {
                label[cell] = label[ds];
            }
        }
        label
    }

    /// Direct predecessor carrying the most upstream cells.
    ///
    /// Ties go to the lowest index. Headwaters and invalid cells get `None`.
    pub fn main_upstream(&self) -> Vec<Option<usize>> {
        (0..self.successors.len())
            .map(|idx| {
                let mut best: Option<usize> = None;
                for &up in self.upstream.upstream(idx) {
                    match best {
                        Some(b) if self.n_upstream[up] <= self.n_upstream[b] => {}
                        _ => best = Some(up),
                    }
                }
                best
            })
            .collect()
    }

    /// Re-encoded D8 grid: edge outlets become PIT, cells without a
    /// successor get the NODATA code (255 when NODATA is disabled).
    pub fn to_d8(&self) -> Vec<u8> {
        self.successors.to_d8(self.options.nodata.unwrap_or(d8::D8_NODATA))
    }
}
