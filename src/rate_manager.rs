//! Amortized total-rate bookkeeping for the direct method.
//!
//! Keeps a snapshot of every process rate and their running sum. After
//! an event only the changed processes are re-read (a *partial* update),
//! until either the number of partial updates since the last rescan
//! reaches the age threshold or a single event changed a large fraction
//! of the processes. Then the total is re-summed from scratch, which
//! discards whatever floating-point drift the partial updates built up.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{StochError, StochResult};
use crate::process::{ProcIndex, Process};
use crate::rate::Rate;

/// Slack, relative to the largest total since the last rescan, within
/// which a running sum near zero is treated as rounding rather than a
/// missing dependency.
const DRIFT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct RateManager {
    rates: Vec<Rate>,
    total: f64,
    /// Partial process updates since the last full recompute.
    age: u64,
    age_threshold: u64,
    full_update_fraction: f64,
    /// Magnitude used to scale `DRIFT_EPSILON`.
    scale: f64,
    partial_updates: u64,
    full_updates: u64,
}

impl RateManager {
    /// Snapshot every rate in `processes` and sum them.
    pub fn new<P: Process>(processes: &[P], config: &EngineConfig) -> Self {
        let mut manager = RateManager {
            rates: Vec::with_capacity(processes.len()),
            total: 0.0,
            age: 0,
            age_threshold: config.age_threshold(processes.len()),
            full_update_fraction: config.full_update_fraction,
            scale: 0.0,
            partial_updates: 0,
            full_updates: 0,
        };
        manager.recompute(processes);
        manager
    }

    /// Refresh the total after the processes in `changed` may have
    /// changed rate.
    pub fn update_total_rate<P: Process>(
        &mut self,
        processes: &[P],
        changed: &[ProcIndex],
    ) -> StochResult<()> {
        let n = self.rates.len();
        let small = (changed.len() as f64) < self.full_update_fraction * n as f64;
        if self.age >= self.age_threshold || !small {
            debug!(
                age = self.age,
                changed = changed.len(),
                processes = n,
                "full rate recompute"
            );
            self.recompute(processes);
            return Ok(());
        }

        for &index in changed {
            let cached = self
                .rates
                .get_mut(index.raw())
                .ok_or(StochError::IndexOutOfRange { index, len: n })?;
            let live = processes
                .get(index.raw())
                .ok_or(StochError::IndexOutOfRange {
                    index,
                    len: processes.len(),
                })?
                .rate();
            self.total -= cached.value();
            self.total += live.value();
            *cached = live;
            self.age += 1;
        }
        self.partial_updates += 1;
        self.scale = self.scale.max(self.total);

        let tolerance = DRIFT_EPSILON * self.scale.max(1.0);
        if self.total < -tolerance {
            return Err(StochError::NegativeTotalRate(self.total));
        }
        if self.total < tolerance {
            // Near-total cancellation: whatever is left is rounding residue.
            self.recompute(processes);
        }
        Ok(())
    }

    /// Re-sum every live rate and reset the age.
    pub fn force_full_update<P: Process>(&mut self, processes: &[P]) {
        self.recompute(processes);
    }

    fn recompute<P: Process>(&mut self, processes: &[P]) {
        self.rates.clear();
        self.rates.extend(processes.iter().map(|p| p.rate()));
        self.total = self.rates.iter().map(|r| r.value()).sum();
        self.scale = self.total;
        self.age = 0;
        self.full_updates += 1;
    }

    /// Current total rate.
    pub fn total(&self) -> Rate {
        Rate::from_sum(self.total.max(0.0))
    }

    /// Rate of `index` as of the last update that touched it.
    pub fn cached_rate(&self, index: ProcIndex) -> Option<Rate> {
        self.rates.get(index.raw()).copied()
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn age_threshold(&self) -> u64 {
        self.age_threshold
    }

    pub fn partial_updates(&self) -> u64 {
        self.partial_updates
    }

    /// Full recomputes so far, including the initial one.
    pub fn full_updates(&self) -> u64 {
        self.full_updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{HasRate, Indexed};

    #[derive(Debug, Clone)]
    struct Channel {
        index: usize,
        rate: f64,
    }

    impl HasRate for Channel {
        fn rate(&self) -> Rate {
            Rate::new(self.rate).unwrap()
        }
    }

    impl Indexed for Channel {
        fn index(&self) -> ProcIndex {
            ProcIndex::new(self.index)
        }
    }

    fn channels(rates: &[f64]) -> Vec<Channel> {
        rates
            .iter()
            .enumerate()
            .map(|(index, &rate)| Channel { index, rate })
            .collect()
    }

    fn p(i: usize) -> ProcIndex {
        ProcIndex::new(i)
    }

    #[test]
    fn test_initial_total() {
        let procs = channels(&[1.0, 2.0, 3.0, 4.0]);
        let rm = RateManager::new(&procs, &EngineConfig::default());
        assert_eq!(rm.total().value(), 10.0);
        assert_eq!(rm.age_threshold(), 400);
        assert_eq!(rm.full_updates(), 1);
    }

    #[test]
    fn test_partial_update_tracks_change() {
        let mut procs = channels(&[1.0, 2.0, 3.0, 4.0]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());

        procs[1].rate = 7.0;
        rm.update_total_rate(&procs, &[p(1)]).unwrap();

        assert_eq!(rm.total().value(), 15.0);
        assert_eq!(rm.age(), 1);
        assert_eq!(rm.partial_updates(), 1);
        assert_eq!(rm.cached_rate(p(1)).unwrap().value(), 7.0);
    }

    #[test]
    fn test_large_change_forces_full_update() {
        let mut procs = channels(&[1.0, 2.0, 3.0, 4.0]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());

        procs[0].rate = 0.5;
        procs[1].rate = 0.5;
        // Two of four is not fewer than N/2.
        rm.update_total_rate(&procs, &[p(0), p(1)]).unwrap();

        assert_eq!(rm.total().value(), 8.0);
        assert_eq!(rm.age(), 0);
        assert_eq!(rm.full_updates(), 2);
    }

    #[test]
    fn test_age_threshold_forces_full_update() {
        let procs = channels(&[1.0; 10]);
        let cfg = EngineConfig::default().with_age_cap(3);
        let mut rm = RateManager::new(&procs, &cfg);
        assert_eq!(rm.age_threshold(), 3);

        for _ in 0..3 {
            rm.update_total_rate(&procs, &[p(0)]).unwrap();
        }
        assert_eq!(rm.age(), 3);
        rm.update_total_rate(&procs, &[p(0)]).unwrap();
        assert_eq!(rm.age(), 0);
        assert_eq!(rm.full_updates(), 2);
    }

    #[test]
    fn test_accuracy_over_many_partial_updates() {
        let n = 200;
        let mut procs = channels(&vec![1.0; n]);
        let cfg = EngineConfig::default().with_age_cap(u64::MAX);
        let mut rm = RateManager::new(&procs, &cfg);

        // Known analytic changes: process i is set to 0.1 * (step % 7) + i * 1e-3.
        for step in 0..5_000usize {
            let i = (step * 31) % n;
            procs[i].rate = 0.1 * (step % 7) as f64 + i as f64 * 1e-3;
            rm.update_total_rate(&procs, &[p(i)]).unwrap();
        }
        let true_sum: f64 = procs.iter().map(|c| c.rate).sum();
        assert!(
            (rm.total().value() - true_sum).abs() < 1e-9,
            "drift {}",
            rm.total().value() - true_sum
        );

        rm.force_full_update(&procs);
        assert_eq!(rm.age(), 0);
        assert!((rm.total().value() - true_sum).abs() < 1e-12);
    }

    #[test]
    fn test_all_rates_to_zero_never_negative() {
        let mut procs = channels(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());
        for i in 0..procs.len() {
            procs[i].rate = 0.0;
            rm.update_total_rate(&procs, &[p(i)]).unwrap();
            assert!(rm.total().value() >= 0.0);
        }
        assert_eq!(rm.total(), Rate::ZERO);
        assert_eq!(rm.age(), 0, "near-zero total triggers a rescan");
    }

    #[test]
    fn test_unreported_change_stays_stale_until_rescan() {
        let mut procs = channels(&[1.0, 1.0, 1.0, 1.0, 1.0]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());
        for c in procs.iter_mut() {
            c.rate = 0.0;
        }
        // Only two of the five changes are reported.
        rm.update_total_rate(&procs, &[p(1), p(2)]).unwrap();
        assert_eq!(rm.total().value(), 3.0);

        rm.force_full_update(&procs);
        assert_eq!(rm.total(), Rate::ZERO);
    }

    #[test]
    fn test_corrupted_snapshot_goes_negative() {
        let mut procs = channels(&[1.0; 10]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());
        // A snapshot larger than anything the total ever counted.
        rm.rates[0] = Rate::new(12.0).unwrap();
        procs[0].rate = 0.0;
        assert_eq!(
            rm.update_total_rate(&procs, &[p(0)]),
            Err(StochError::NegativeTotalRate(-2.0))
        );
    }

    #[test]
    fn test_near_zero_rescan_does_not_hide_negative_total() {
        let mut procs = channels(&[1.0; 10]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());
        rm.rates[0] = Rate::new(10.000_001).unwrap();
        procs[0].rate = 0.0;
        let err = rm.update_total_rate(&procs, &[p(0)]).unwrap_err();
        assert!(matches!(err, StochError::NegativeTotalRate(t) if t < 0.0), "{:?}", err);
    }

    #[test]
    fn test_rounding_residue_below_zero_is_rescanned() {
        let mut procs = channels(&[1.0; 10]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());
        rm.rates[0] = Rate::new(10.0 + 1e-12).unwrap();
        procs[0].rate = 0.0;
        rm.update_total_rate(&procs, &[p(0)]).unwrap();
        assert_eq!(rm.total().value(), 9.0);
        assert_eq!(rm.age(), 0);
    }

    #[test]
    fn test_unknown_index_is_an_error() {
        let procs = channels(&[1.0, 1.0, 1.0]);
        let mut rm = RateManager::new(&procs, &EngineConfig::default());
        assert!(matches!(
            rm.update_total_rate(&procs, &[p(3)]),
            Err(StochError::IndexOutOfRange { .. })
        ));
    }
}
