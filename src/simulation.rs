/// Simulation execution loop.
///
/// Pairs a [`System`] with an [`Algorithm`] driver and hands every fired
/// event to a caller-supplied observer. The loop is synchronous and
/// single-threaded; the driver's seeded random source is the only
/// source of nondeterminism.

use crate::algorithm::Algorithm;
use crate::error::StochResult;
use crate::event::Event;
use crate::system::System;
use crate::time::Time;

// ── Observer trait ────────────────────────────────────────────────────

/// Sees every event after the system has applied it.
pub trait EventObserver<S> {
    fn observe(&mut self, system: &S, event: &Event);
}

/// An observer backed by a closure, for tests and one-off scripts.
impl<S, F> EventObserver<S> for F
where
    F: FnMut(&S, &Event),
{
    fn observe(&mut self, system: &S, event: &Event) {
        (self)(system, event);
    }
}

// ── Simulation ────────────────────────────────────────────────────────

/// Top-level simulation driver.
///
/// Owns the system and the algorithm. Call `step` to fire exactly one
/// event, or `run_for` / `run_until` to fire many.
pub struct Simulation<S, A> {
    system: S,
    algorithm: A,
}

impl<S, A> Simulation<S, A>
where
    S: System,
    A: Algorithm<S>,
{
    pub fn new(system: S, algorithm: A) -> Self {
        Simulation { system, algorithm }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    pub fn into_parts(self) -> (S, A) {
        (self.system, self.algorithm)
    }

    /// Current simulation time.
    pub fn current_time(&self) -> Time {
        self.algorithm.current_time()
    }

    /// Total events fired so far.
    pub fn events_processed(&self) -> u64 {
        self.algorithm.event_count()
    }

    /// Fire one event and show it to `observer`.
    ///
    /// Returns `Ok(None)` if no process can fire. Every other error is
    /// fatal and passed through.
    pub fn step(&mut self, observer: &mut dyn EventObserver<S>) -> StochResult<Option<Event>> {
        match self.algorithm.advance(&mut self.system) {
            Ok(event) => {
                observer.observe(&self.system, &event);
                Ok(Some(event))
            }
            Err(e) if e.is_quiescent() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fire up to `max_steps` events, stopping early if nothing can fire.
    ///
    /// Returns the number of events fired in this call.
    pub fn run_for(
        &mut self,
        max_steps: u64,
        observer: &mut dyn EventObserver<S>,
    ) -> StochResult<u64> {
        let start = self.events_processed();
        for _ in 0..max_steps {
            if self.step(observer)?.is_none() {
                break;
            }
        }
        Ok(self.events_processed() - start)
    }

    /// Fire events until the clock reaches `horizon` or nothing can fire.
    /// The event that crosses the horizon is fired and observed.
    pub fn run_until(
        &mut self,
        horizon: Time,
        observer: &mut dyn EventObserver<S>,
    ) -> StochResult<u64> {
        let start = self.events_processed();
        while self.current_time() < horizon {
            if self.step(observer)?.is_none() {
                break;
            }
        }
        Ok(self.events_processed() - start)
    }
}
