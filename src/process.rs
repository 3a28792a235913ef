//! Process identity and the capabilities every process exposes.
//!
//! A process is anything with a current rate and a stable ordinal.
//! The two capabilities are separate traits so that domain types can
//! compose them; [`Process`] is implemented automatically for any type
//! that has both.

use crate::rate::Rate;

/// Dense ordinal of a process within its system, `0..N`.
///
/// A newtype rather than a bare `usize` so that process ordinals are
/// not confused with heap slots or list positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcIndex(usize);

impl ProcIndex {
    #[inline]
    pub fn new(raw: usize) -> Self {
        ProcIndex(raw)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Something with an instantaneous rate.
pub trait HasRate {
    /// The rate right now. May change whenever the owning system
    /// applies an event.
    fn rate(&self) -> Rate;
}

/// Something with a stable ordinal, fixed at creation.
pub trait Indexed {
    fn index(&self) -> ProcIndex;
}

/// A stochastic process: has a rate and an index.
pub trait Process: HasRate + Indexed {}

impl<T: HasRate + Indexed + ?Sized> Process for T {}
