//! Absolute simulation time.
//!
//! Time only moves when an algorithm driver fires an event. There is no
//! dependency on `std::time`; the clock is whatever the exponential
//! waiting-time draws add up to.

use std::cmp::Ordering;

use crate::error::{StochError, StochResult};

/// A non-negative point on the simulation clock.
///
/// `Time::INFINITY` is the schedule of a process that cannot fire
/// (its rate is zero). NaN and negative values are rejected at
/// construction, which is what makes the `Ord` impl total.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(f64);

impl Time {
    /// The zero-point of simulation time.
    pub const ZERO: Time = Time(0.0);

    /// Never. Used for processes whose rate is zero.
    pub const INFINITY: Time = Time(f64::INFINITY);

    /// Create a time from a raw value.
    ///
    /// Fails with [`StochError::InvalidTime`] for negative or NaN input.
    /// `f64::INFINITY` is accepted and equals [`Time::INFINITY`].
    pub fn new(value: f64) -> StochResult<Self> {
        if value.is_nan() || value < 0.0 {
            return Err(StochError::InvalidTime(value));
        }
        // Normalises -0.0 so that ordering and equality agree.
        Ok(Time(value + 0.0))
    }

    /// Return the raw value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// `false` only for [`Time::INFINITY`].
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Compute the time that is `interval` after `self`.
    ///
    /// Returns `None` if `interval` is negative or NaN. An infinite
    /// interval yields [`Time::INFINITY`].
    #[inline]
    pub fn plus(self, interval: f64) -> Option<Time> {
        if interval.is_nan() || interval < 0.0 {
            return None;
        }
        Some(Time(self.0 + interval))
    }

    /// Unchecked `plus` for intervals the caller has already proven
    /// non-negative (sampled waiting times, rescaled remainders).
    #[inline]
    pub(crate) fn after(self, interval: f64) -> Time {
        debug_assert!(interval >= 0.0, "negative interval {}", interval);
        Time(self.0 + interval)
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[inline]
    pub fn is_before(self, other: Time) -> bool {
        self.0 < other.0
    }

    /// Elapsed time from `earlier` to `self`.
    /// Returns `None` if `earlier` is after `self`.
    #[inline]
    pub fn duration_since(self, earlier: Time) -> Option<f64> {
        if earlier.0 > self.0 {
            None
        } else {
            Some(self.0 - earlier.0)
        }
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Time {}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for Time {
    fn default() -> Self {
        Time::ZERO
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_finite() {
            write!(f, "t={}", self.0)
        } else {
            write!(f, "t=inf")
        }
    }
}
