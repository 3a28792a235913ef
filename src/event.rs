//! Event records for the simulation engine.
//!
//! An `Event` is an immutable `(process, rate, time)` triple. It is
//! either something that already happened or the next scheduled
//! occurrence of a process. Events are never edited in place: a
//! rescheduled process gets a fresh record via [`Event::rescheduled`].

use std::cmp::Ordering;

use crate::process::ProcIndex;
use crate::rate::Rate;
use crate::time::Time;

/// A single occurrence (past or scheduled) of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// The process that fires.
    pub process: ProcIndex,

    /// The process rate when this record was created.
    pub rate: Rate,

    /// When the process fires.
    pub time: Time,
}

impl Event {
    pub fn new(process: ProcIndex, rate: Rate, time: Time) -> Self {
        Event {
            process,
            rate,
            time,
        }
    }

    /// Same process and rate, different time.
    pub fn with_time(&self, time: Time) -> Self {
        Event { time, ..*self }
    }

    /// Same process, new rate and time.
    pub fn rescheduled(&self, rate: Rate, time: Time) -> Self {
        Event {
            process: self.process,
            rate,
            time,
        }
    }
}

/// Ordering: earliest time first, then the higher rate, then the lower
/// process index.
///
/// This is the *natural* order (the event that should happen first is
/// `Less`). The indexed heap is a min-heap over it.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| other.rate.cmp(&self.rate))
            .then_with(|| self.process.cmp(&other.process))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.process, self.time, self.rate)
    }
}
