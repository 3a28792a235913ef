//! The system contract consumed by the algorithm drivers, plus a
//! reusable builder for systems whose dependencies are a static graph.
//!
//! # Contract
//!
//! Implementations **must**:
//! - Keep `processes()[i].index() == i` for every `i` in `0..N`.
//! - Return from `apply_event` every process whose rate may now differ
//!   from before the call. Omitting one silently corrupts the drivers'
//!   bookkeeping; listing extra processes only costs time.

use tracing::debug;

use crate::error::{StochError, StochResult};
use crate::event::Event;
use crate::graph::DependencyGraph;
use crate::process::{HasRate, Indexed, ProcIndex, Process};
use crate::rate::Rate;

// ── System ────────────────────────────────────────────────────────────

/// A collection of processes plus the rules for what firing one does.
pub trait System {
    type Proc: Process;

    /// Dense list of processes, ordered by index.
    fn processes(&self) -> &[Self::Proc];

    /// Apply `event` to the domain state and report which processes'
    /// rates may have changed.
    fn apply_event(&mut self, event: &Event) -> Vec<ProcIndex>;

    fn process(&self, index: ProcIndex) -> Option<&Self::Proc> {
        self.processes().get(index.raw())
    }

    fn process_count(&self) -> usize {
        self.processes().len()
    }

    /// Current rate of `index`, or an error if no such process exists.
    fn rate_of(&self, index: ProcIndex) -> StochResult<Rate> {
        self.process(index)
            .map(|p| p.rate())
            .ok_or(StochError::IndexOutOfRange {
                index,
                len: self.process_count(),
            })
    }

    /// Precondition check run by every driver at construction.
    fn validate_indexing(&self) -> StochResult<()> {
        validate_indexing(self.processes())
    }
}

/// Check that `processes[i].index() == i` for all `i`.
///
/// Reports the first out-of-range or duplicate index it meets, and
/// otherwise the first position whose process carries another index.
pub fn validate_indexing<P: Indexed>(processes: &[P]) -> StochResult<()> {
    let len = processes.len();
    let mut seen = vec![false; len];
    let mut misplaced = None;
    for (position, proc) in processes.iter().enumerate() {
        let index = proc.index();
        let slot = seen
            .get_mut(index.raw())
            .ok_or(StochError::IndexOutOfRange { index, len })?;
        if *slot {
            return Err(StochError::DuplicateIndex(index));
        }
        *slot = true;
        if index.raw() != position && misplaced.is_none() {
            misplaced = Some(StochError::NonContiguousIndex { position, index });
        }
    }
    match misplaced {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// ── LinkedSystem ──────────────────────────────────────────────────────

/// A system whose dependents are read off a static [`DependencyGraph`].
///
/// Firing a process runs `effect` over the process list, then reports
/// the fired process together with its graph successors.
pub struct LinkedSystem<P, F> {
    processes: Vec<P>,
    graph: DependencyGraph,
    effect: F,
}

impl<P, F> LinkedSystem<P, F>
where
    P: Process,
    F: FnMut(&mut [P], &Event),
{
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The fired process followed by its direct successors.
    pub fn dependents_of(&self, fired: ProcIndex) -> Vec<ProcIndex> {
        let successors = self.graph.successors_of(fired);
        let mut out = Vec::with_capacity(successors.len() + 1);
        out.push(fired);
        out.extend_from_slice(successors);
        out
    }
}

impl<P, F> System for LinkedSystem<P, F>
where
    P: Process,
    F: FnMut(&mut [P], &Event),
{
    type Proc = P;

    fn processes(&self) -> &[P] {
        &self.processes
    }

    fn apply_event(&mut self, event: &Event) -> Vec<ProcIndex> {
        (self.effect)(self.processes.as_mut_slice(), event);
        self.dependents_of(event.process)
    }
}

// ── SystemBuilder ─────────────────────────────────────────────────────

/// Registers processes, handing out indices `0..N` in registration
/// order, and records their dependency links.
///
/// # Example
/// ```rust
/// use stoch::{HasRate, Indexed, ProcIndex, Rate, SystemBuilder, System};
///
/// struct Channel { index: ProcIndex, rate: f64 }
/// impl HasRate for Channel { fn rate(&self) -> Rate { Rate::new(self.rate).unwrap() } }
/// impl Indexed for Channel { fn index(&self) -> ProcIndex { self.index } }
///
/// let mut builder = SystemBuilder::new();
/// let a = builder.register(|index| Channel { index, rate: 2.0 });
/// let b = builder.register(|index| Channel { index, rate: 3.0 });
/// builder.link(a, b).unwrap();
/// let system = builder
///     .build(|procs: &mut [Channel], _event: &stoch::Event| procs[1].rate *= 2.0)
///     .unwrap();
/// assert_eq!(system.process_count(), 2);
/// ```
pub struct SystemBuilder<P> {
    processes: Vec<P>,
    graph: DependencyGraph,
}

impl<P: Process> SystemBuilder<P> {
    pub fn new() -> Self {
        SystemBuilder {
            processes: Vec::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Register a process built by `factory` from its assigned index.
    pub fn register<B>(&mut self, factory: B) -> ProcIndex
    where
        B: FnOnce(ProcIndex) -> P,
    {
        let index = ProcIndex::new(self.processes.len());
        self.processes.push(factory(index));
        index
    }

    /// Record that `succ`'s rate may change when `pred` fires.
    pub fn link(&mut self, pred: ProcIndex, succ: ProcIndex) -> StochResult<&mut Self> {
        for index in [pred, succ] {
            if index.raw() >= self.processes.len() {
                return Err(StochError::IndexOutOfRange {
                    index,
                    len: self.processes.len(),
                });
            }
        }
        self.graph.link(pred, succ)?;
        Ok(self)
    }

    pub fn unlink(&mut self, pred: ProcIndex, succ: ProcIndex) -> &mut Self {
        self.graph.unlink(pred, succ);
        self
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Finish with the given firing effect. Fails if a factory ignored
    /// the index it was handed.
    pub fn build<F>(self, effect: F) -> StochResult<LinkedSystem<P, F>>
    where
        F: FnMut(&mut [P], &Event),
    {
        validate_indexing(&self.processes)?;
        debug!(
            processes = self.processes.len(),
            links = self.graph.edge_count(),
            "built linked system"
        );
        Ok(LinkedSystem {
            processes: self.processes,
            graph: self.graph,
            effect,
        })
    }
}

impl<P: Process> Default for SystemBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
