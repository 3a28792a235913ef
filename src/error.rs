//! Structured error types for the engine.
//!
//! Every variant except [`StochError::Quiescent`] is fatal: it means the
//! system was misconfigured or an internal invariant broke. Nothing in
//! the engine retries. `Quiescent` reports that no process can fire any
//! more; the caller decides whether that ends the run.

use thiserror::Error;

use crate::process::ProcIndex;
use crate::time::Time;

/// The top-level error type for the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StochError {
    // ── Value construction ────────────────────────────────

    #[error("invalid rate {0}: rates must be finite and non-negative")]
    InvalidRate(f64),

    #[error("invalid time {0}: times must be non-negative")]
    InvalidTime(f64),

    // ── Process indexing ──────────────────────────────────

    /// Position `position` in the process list holds process `index`.
    #[error("process at position {position} reports index {index}")]
    NonContiguousIndex { position: usize, index: ProcIndex },

    #[error("process index {0} is used more than once")]
    DuplicateIndex(ProcIndex),

    #[error("process index {index} out of range for {len} processes")]
    IndexOutOfRange { index: ProcIndex, len: usize },

    // ── Dependency graph ──────────────────────────────────

    #[error("process {0} cannot depend on itself")]
    SelfLink(ProcIndex),

    // ── Bookkeeping invariants ────────────────────────────

    #[error("heap order violated at slot {slot}")]
    HeapOrderViolated { slot: usize },

    #[error("inverse index points {process} at slot {slot}, which holds another process")]
    HeapIndexMismatch { process: ProcIndex, slot: usize },

    /// The selection scan ran out of processes before reaching the
    /// sampled threshold: the cached total drifted from the true sum.
    #[error("selection exhausted: accumulated {accumulated} of threshold {threshold}")]
    SelectionExhausted { threshold: f64, accumulated: f64 },

    #[error("running total rate went negative ({0})")]
    NegativeTotalRate(f64),

    #[error("dependent {dependent} was scheduled at {scheduled}, before the firing at {firing}")]
    LinkedEventInPast {
        dependent: ProcIndex,
        scheduled: Time,
        firing: Time,
    },

    #[error("time went backward: clock at {current}, event at {event}")]
    TimeWentBackward { current: Time, event: Time },

    // ── Run state ─────────────────────────────────────────

    /// No process has a positive rate.
    #[error("no process can fire at {at}")]
    Quiescent { at: Time },

    // ── Configuration ─────────────────────────────────────

    #[error("unknown simulation method {0:?}")]
    UnknownMethod(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl StochError {
    /// `true` for the one non-fatal variant.
    pub fn is_quiescent(&self) -> bool {
        matches!(self, StochError::Quiescent { .. })
    }
}

/// Convenience alias for `Result<T, StochError>`.
pub type StochResult<T> = Result<T, StochError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_self_link() {
        let e = StochError::SelfLink(ProcIndex::new(5));
        assert_eq!(e.to_string(), "process P5 cannot depend on itself");
    }

    #[test]
    fn test_error_display_linked_event() {
        let e = StochError::LinkedEventInPast {
            dependent: ProcIndex::new(2),
            scheduled: Time::new(1.0).unwrap(),
            firing: Time::new(3.0).unwrap(),
        };
        let s = e.to_string();
        assert!(s.contains("P2"));
        assert!(s.contains("t=1"));
        assert!(s.contains("t=3"));
    }

    #[test]
    fn test_quiescent_is_the_only_soft_error() {
        assert!(StochError::Quiescent { at: Time::ZERO }.is_quiescent());
        assert!(!StochError::HeapOrderViolated { slot: 3 }.is_quiescent());
    }

    #[test]
    fn test_error_is_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(StochError::DuplicateIndex(ProcIndex::new(0)));
        assert!(!e.to_string().is_empty());
    }
}
