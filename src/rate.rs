//! Instantaneous transition rates.

use std::cmp::Ordering;

use rand::Rng;

use crate::error::{StochError, StochResult};
use crate::time::Time;

/// A non-negative, finite transition rate.
///
/// A process with `Rate::ZERO` cannot fire; its scheduled time is
/// [`Time::INFINITY`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Rate(f64);

impl Rate {
    /// The rate of a process that cannot fire.
    pub const ZERO: Rate = Rate(0.0);

    /// Create a rate, rejecting negative, NaN and infinite values.
    pub fn new(value: f64) -> StochResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(StochError::InvalidRate(value));
        }
        Ok(Rate(value + 0.0))
    }

    /// Wrap a value already known to be a valid rate (sums of valid rates).
    #[inline]
    pub(crate) fn from_sum(value: f64) -> Self {
        debug_assert!(value.is_finite() && value >= 0.0, "bad rate sum {}", value);
        Rate(value.max(0.0))
    }

    /// Return the raw value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Draw an exponentially distributed waiting time with this rate.
    ///
    /// Returns `f64::INFINITY` for a zero rate. Uses `1 - U` with
    /// `U ~ [0, 1)` so the logarithm never sees zero.
    pub fn sample_interval<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        if self.is_zero() {
            return f64::INFINITY;
        }
        let u: f64 = rng.gen();
        -(1.0 - u).ln() / self.0
    }

    /// Absolute time of the next occurrence when the clock reads `now`.
    pub fn sample_time_after<R: Rng + ?Sized>(self, now: Time, rng: &mut R) -> Time {
        if self.is_zero() {
            return Time::INFINITY;
        }
        now.after(self.sample_interval(rng))
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rate {}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::iter::Sum for Rate {
    fn sum<I: Iterator<Item = Rate>>(iter: I) -> Self {
        Rate::from_sum(iter.map(Rate::value).sum())
    }
}

impl std::fmt::Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r={}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_invalid() {
        assert!(Rate::new(-0.5).is_err());
        assert!(Rate::new(f64::NAN).is_err());
        assert!(Rate::new(f64::INFINITY).is_err());
        assert!(Rate::new(0.0).unwrap().is_zero());
    }

    #[test]
    fn test_ordering_and_sum() {
        let rates = [1.0, 2.0, 3.0, 4.0].map(|r| Rate::new(r).unwrap());
        assert!(rates[0] < rates[3]);
        let total: Rate = rates.iter().copied().sum();
        assert_eq!(total.value(), 10.0);
    }

    #[test]
    fn test_zero_rate_never_fires() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Rate::ZERO.sample_interval(&mut rng), f64::INFINITY);
        assert_eq!(
            Rate::ZERO.sample_time_after(Time::new(3.0).unwrap(), &mut rng),
            Time::INFINITY
        );
    }

    #[test]
    fn test_exponential_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let rate = Rate::new(4.0).unwrap();
        let n = 100_000;
        let mean: f64 = (0..n).map(|_| rate.sample_interval(&mut rng)).sum::<f64>() / n as f64;
        // Mean 0.25, standard error ~0.0008.
        assert!((mean - 0.25).abs() < 0.005, "mean was {}", mean);
    }

    #[test]
    fn test_sample_time_after_is_later() {
        let mut rng = StdRng::seed_from_u64(11);
        let now = Time::new(5.0).unwrap();
        let rate = Rate::new(2.0).unwrap();
        for _ in 0..1_000 {
            let t = rate.sample_time_after(now, &mut rng);
            assert!(t >= now && t.is_finite());
        }
    }
}
