//! Rate dependency graph.
//!
//! An edge `pred -> succ` says "when `pred` fires, `succ`'s rate may
//! change". Adjacency is kept in both directions as dense per-index
//! lists so that removing a process touches only its own neighbours.
//!
//! Cycles are legal. Consumers only ever look one hop ahead (the direct
//! successors of the process that fired), so mutual dependencies cannot
//! cause update chains.

use crate::error::{StochError, StochResult};
use crate::process::ProcIndex;

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    successors: Vec<Vec<ProcIndex>>,
    predecessors: Vec<Vec<ProcIndex>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the adjacency lists for `process_count` processes.
    pub fn with_capacity(process_count: usize) -> Self {
        DependencyGraph {
            successors: vec![Vec::new(); process_count],
            predecessors: vec![Vec::new(); process_count],
        }
    }

    fn ensure(&mut self, index: ProcIndex) {
        let needed = index.raw() + 1;
        if self.successors.len() < needed {
            self.successors.resize_with(needed, Vec::new);
            self.predecessors.resize_with(needed, Vec::new);
        }
    }

    /// Record `pred -> succ`.
    ///
    /// Returns `Ok(false)` if the edge already existed. Self-loops are
    /// rejected with [`StochError::SelfLink`].
    pub fn link(&mut self, pred: ProcIndex, succ: ProcIndex) -> StochResult<bool> {
        if pred == succ {
            return Err(StochError::SelfLink(pred));
        }
        if self.contains(pred, succ) {
            return Ok(false);
        }
        self.ensure(pred.max(succ));
        self.successors[pred.raw()].push(succ);
        self.predecessors[succ.raw()].push(pred);
        Ok(true)
    }

    /// Drop `pred -> succ`. Returns `false` if there was no such edge.
    pub fn unlink(&mut self, pred: ProcIndex, succ: ProcIndex) -> bool {
        if !self.contains(pred, succ) {
            return false;
        }
        self.successors[pred.raw()].retain(|&p| p != succ);
        self.predecessors[succ.raw()].retain(|&p| p != pred);
        true
    }

    /// Purge every edge touching `proc`.
    pub fn remove(&mut self, proc: ProcIndex) {
        let Some(outgoing) = self.successors.get_mut(proc.raw()).map(std::mem::take) else {
            return;
        };
        let incoming = std::mem::take(&mut self.predecessors[proc.raw()]);
        for succ in outgoing {
            self.predecessors[succ.raw()].retain(|&p| p != proc);
        }
        for pred in incoming {
            self.successors[pred.raw()].retain(|&p| p != proc);
        }
    }

    /// Processes whose rate may change when `proc` fires.
    pub fn successors_of(&self, proc: ProcIndex) -> &[ProcIndex] {
        self.successors
            .get(proc.raw())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Processes whose firing may change `proc`'s rate.
    pub fn predecessors_of(&self, proc: ProcIndex) -> &[ProcIndex] {
        self.predecessors
            .get(proc.raw())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, pred: ProcIndex, succ: ProcIndex) -> bool {
        self.successors_of(pred).contains(&succ)
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }
}
