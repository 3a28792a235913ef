//! Engine tuning knobs.

use crate::error::{StochError, StochResult};

/// Configuration shared by the algorithm drivers.
///
/// The defaults reproduce the standard bookkeeping: the rate manager
/// does a full recompute after `min(1_000_000, 100 * N)` partial
/// updates or whenever half or more of the processes changed at once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct EngineConfig {
    /// Upper bound on the rate-manager age threshold.
    pub age_cap: u64,
    /// Per-process contribution to the age threshold.
    pub age_per_process: u64,
    /// A partial update is used only when fewer than
    /// `full_update_fraction * N` processes changed.
    pub full_update_fraction: f64,
    /// Build the direct-method selection list sorted by descending rate.
    pub presort_selection: bool,
    /// Run the full heap validation pass after every next-reaction update.
    pub validate_heap: bool,
    /// Relative rounding shortfall accepted at the end of a selection scan.
    pub selection_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            age_cap: 1_000_000,
            age_per_process: 100,
            full_update_fraction: 0.5,
            presort_selection: true,
            validate_heap: false,
            selection_tolerance: 1e-9,
        }
    }
}

impl EngineConfig {
    /// Defaults plus heap validation on every step. Slow; for tests.
    pub fn checked() -> Self {
        EngineConfig {
            validate_heap: true,
            ..Self::default()
        }
    }

    pub fn with_age_cap(mut self, age_cap: u64) -> Self {
        self.age_cap = age_cap;
        self
    }

    pub fn with_age_per_process(mut self, age_per_process: u64) -> Self {
        self.age_per_process = age_per_process;
        self
    }

    pub fn with_full_update_fraction(mut self, fraction: f64) -> Self {
        self.full_update_fraction = fraction;
        self
    }

    pub fn with_presort_selection(mut self, presort: bool) -> Self {
        self.presort_selection = presort;
        self
    }

    pub fn with_validate_heap(mut self, validate: bool) -> Self {
        self.validate_heap = validate;
        self
    }

    /// Number of partial updates allowed between full recomputes for a
    /// system of `process_count` processes.
    pub fn age_threshold(&self, process_count: usize) -> u64 {
        self.age_cap
            .min(self.age_per_process.saturating_mul(process_count as u64))
    }

    pub fn validate(&self) -> StochResult<()> {
        if self.age_per_process == 0 || self.age_cap == 0 {
            return Err(StochError::InvalidConfig(
                "age threshold must be positive".into(),
            ));
        }
        if !(self.full_update_fraction > 0.0 && self.full_update_fraction <= 1.0) {
            return Err(StochError::InvalidConfig(format!(
                "full_update_fraction {} not in (0, 1]",
                self.full_update_fraction
            )));
        }
        if !(self.selection_tolerance >= 0.0 && self.selection_tolerance.is_finite()) {
            return Err(StochError::InvalidConfig(format!(
                "selection_tolerance {} must be finite and non-negative",
                self.selection_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_scales_with_size() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.age_threshold(4), 400);
        assert_eq!(cfg.age_threshold(10_000), 1_000_000);
        assert_eq!(cfg.age_threshold(50_000), 1_000_000);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::checked().validate_heap);
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let cfg = EngineConfig::default().with_full_update_fraction(0.0);
        assert!(matches!(cfg.validate(), Err(StochError::InvalidConfig(_))));
        let cfg = EngineConfig::default().with_full_update_fraction(f64::NAN);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_age() {
        let cfg = EngineConfig::default().with_age_per_process(0);
        assert!(cfg.validate().is_err());
    }
}
