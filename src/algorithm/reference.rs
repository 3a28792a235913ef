//! Brute-force SSA: re-sum and linearly scan every process on every
//! step. No state is carried between steps, which makes it the yardstick
//! the other drivers are checked against.

use rand::Rng;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{StochError, StochResult};
use crate::event::Event;
use crate::process::{HasRate, Indexed, ProcIndex};
use crate::rate::Rate;
use crate::selection::scan;
use crate::system::System;
use crate::time::Time;

use super::{Algorithm, Clock, Method};

pub struct Reference<R> {
    rng: R,
    clock: Clock,
    tolerance: f64,
}

impl<R: Rng> Reference<R> {
    pub fn new<S: System>(system: &S, rng: R, config: &EngineConfig) -> StochResult<Self> {
        config.validate()?;
        system.validate_indexing()?;
        info!(
            method = "reference",
            processes = system.process_count(),
            "driver ready"
        );
        Ok(Reference {
            rng,
            clock: Clock::new(),
            tolerance: config.selection_tolerance,
        })
    }

    pub fn event_count(&self) -> u64 {
        self.clock.events()
    }

    pub fn current_time(&self) -> Time {
        self.clock.now()
    }
}

impl<S: System, R: Rng> Algorithm<S> for Reference<R> {
    fn method(&self) -> Method {
        Method::Reference
    }

    fn next_event(&mut self, system: &S) -> StochResult<Event> {
        let processes = system.processes();
        let total: Rate = processes.iter().map(|p| p.rate()).sum();
        let now = self.clock.now();
        if total.is_zero() {
            debug!(at = %now, "quiescent");
            return Err(StochError::Quiescent { at: now });
        }

        let u: f64 = self.rng.gen();
        let position = scan(
            processes.iter().map(|p| p.rate()),
            u * total.value(),
            total.value(),
            self.tolerance,
        )?;
        let chosen = &processes[position];
        let time = total.sample_time_after(now, &mut self.rng);
        Ok(Event::new(chosen.index(), chosen.rate(), time))
    }

    fn update_state(&mut self, _: &S, _: &Event, _: &[ProcIndex]) -> StochResult<()> {
        Ok(())
    }

    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::fixtures::{constant, one_shot};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_selection_frequencies() {
        let mut system = constant(&[1.0, 2.0, 3.0, 4.0]);
        let mut driver =
            Reference::new(&system, StdRng::seed_from_u64(17), &EngineConfig::default()).unwrap();
        let mut counts = [0u64; 4];
        for _ in 0..40_000 {
            let event = driver.advance(&mut system).unwrap();
            counts[event.process.raw()] += 1;
        }
        for (i, expected) in [0.1, 0.2, 0.3, 0.4].iter().enumerate() {
            let freq = counts[i] as f64 / 40_000.0;
            assert!((freq - expected).abs() < 0.015, "P{} at {}", i, freq);
        }
        // 40k events at total rate 10: mean time 4000, sd 20.
        let t = driver.current_time().value();
        assert!((t - 4_000.0).abs() < 150.0, "final time {}", t);
    }

    #[test]
    fn test_one_shot_then_quiescent() {
        let mut system = one_shot();
        let mut driver =
            Reference::new(&system, StdRng::seed_from_u64(2), &EngineConfig::default()).unwrap();
        driver.advance(&mut system).unwrap();
        let err = driver.advance(&mut system).unwrap_err();
        assert_eq!(err, StochError::Quiescent { at: driver.current_time() });
        assert_eq!(driver.event_count(), 1);
    }
}
