//! Topological rank: number of downstream hops from a cell to its pit.
//!
//! Level-synchronous BFS from all pits over reverse edges. Layer 0 holds the
//! pits in ascending index order; layer k+1 holds the predecessors of layer
//! k. Cells that never get reached (cycles, chains into invalid cells) keep
//! rank -1.

use tracing::debug;

use crate::successors::SuccessorTable;
use crate::upstream::UpstreamIndex;

/// Rank value of cells that do not reach a pit.
pub const RANK_INVALID: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    rank: Vec<i32>,
    /// Visited cells, downstream to upstream.
    seq: Vec<usize>,
    /// Layer k is `seq[bounds[k]..bounds[k + 1]]`.
    bounds: Vec<usize>,
}

impl Ranking {
    pub fn compute(table: &SuccessorTable, upstream: &UpstreamIndex) -> Self {
        let n = table.len();
        let mut rank = vec![RANK_INVALID; n];
        let mut seq: Vec<usize> = Vec::with_capacity(n);

        seq.extend((0..n).filter(|&idx| table.is_pit(idx)));
        for &pit in &seq {
            rank[pit] = 0;
        }

        let mut bounds = vec![0];
        let mut start = 0;
        let mut depth = 0i32;
        while start < seq.len() {
            let end = seq.len();
            bounds.push(end);
            depth += 1;
            for i in start..end {
                let cell = seq[i];
                for &up in upstream.upstream(cell) {
                    rank[up] = depth;
                    seq.push(up);
                }
            }
            start = end;
        }

        debug!(nnodes = seq.len(), layers = bounds.len() - 1, "ranking done");
        Self { rank, seq, bounds }
    }

    #[inline]
    pub fn rank(&self, idx: usize) -> i32 {
        self.rank[idx]
    }

    pub fn ranks(&self) -> &[i32] {
        &self.rank
    }

    /// Every reachable cell ordered from downstream to upstream; ranks are
    /// non-decreasing along the sequence.
    pub fn seq(&self) -> &[usize] {
        &self.seq
    }

    /// Number of cells with a rank >= 0.
    pub fn nnodes(&self) -> usize {
        self.seq.len()
    }

    pub fn n_layers(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn max_rank(&self) -> Option<i32> {
        self.n_layers().checked_sub(1).map(|k| k as i32)
    }

    pub fn into_ranks(self) -> Vec<i32> {
        self.rank
    }
}
