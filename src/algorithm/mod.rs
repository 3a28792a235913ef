//! SSA drivers.
//!
//! Every driver runs the same three-beat step:
//!
//! 1. [`Algorithm::next_event`] decides which process fires and when.
//! 2. The system applies the event and reports its dependents.
//! 3. [`Algorithm::update_state`] refreshes the driver's bookkeeping for
//!    just those dependents.
//!
//! [`Algorithm::advance`] strings the three together. Drivers own their
//! random source; the system is passed in on every call.
//!
//! | Driver | Per-step cost | State |
//! |---|---|---|
//! | [`Reference`] | O(N) sum + O(N) scan | none |
//! | [`Direct`] | O(changed) + expected-short scan | [`RateManager`](crate::RateManager), [`SelectionList`](crate::SelectionList) |
//! | [`NextReaction`] | O(dependents · log N) | [`IndexedEventHeap`](crate::IndexedEventHeap) |

mod direct;
mod next_reaction;
mod reference;

pub use direct::Direct;
pub use next_reaction::{reschedule, NextReaction};
pub use reference::Reference;

use std::str::FromStr;

use rand::Rng;

use crate::config::EngineConfig;
use crate::error::{StochError, StochResult};
use crate::event::Event;
use crate::process::ProcIndex;
use crate::system::System;
use crate::time::Time;

// ── Clock ─────────────────────────────────────────────────────────────

/// Step counter and last fired event, shared by all drivers.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    events: u64,
    last: Option<Event>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events fired so far.
    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.last.as_ref()
    }

    /// Time of the last fired event, or zero before the first step.
    pub fn now(&self) -> Time {
        self.last.map_or(Time::ZERO, |e| e.time)
    }

    /// Record that `event` fired. Simulation time never goes backward.
    pub(crate) fn record(&mut self, event: &Event) -> StochResult<()> {
        let now = self.now();
        if event.time < now {
            return Err(StochError::TimeWentBackward {
                current: now,
                event: event.time,
            });
        }
        self.events += 1;
        self.last = Some(*event);
        Ok(())
    }
}

// ── Algorithm ─────────────────────────────────────────────────────────

/// A stochastic simulation algorithm driving a [`System`].
pub trait Algorithm<S: System> {
    fn method(&self) -> Method;

    /// Choose the next process and its firing time. Fails with
    /// [`StochError::Quiescent`] when no process can fire.
    fn next_event(&mut self, system: &S) -> StochResult<Event>;

    /// Refresh internal bookkeeping after `event` was applied and the
    /// system reported `dependents`.
    fn update_state(&mut self, system: &S, event: &Event, dependents: &[ProcIndex])
        -> StochResult<()>;

    fn clock(&self) -> &Clock;

    fn clock_mut(&mut self) -> &mut Clock;

    /// Select, apply and update: one full step. An event dated before
    /// the clock is rejected before the system sees it.
    fn advance(&mut self, system: &mut S) -> StochResult<Event> {
        let event = self.next_event(system)?;
        self.clock_mut().record(&event)?;
        let dependents = system.apply_event(&event);
        self.update_state(system, &event, &dependents)?;
        tracing::trace!(process = %event.process, time = %event.time, "fired");
        Ok(event)
    }

    /// Advance up to `max_steps` times, stopping early on quiescence.
    /// Returns the number of events fired.
    fn run_for(&mut self, system: &mut S, max_steps: u64) -> StochResult<u64> {
        let start = self.event_count();
        for _ in 0..max_steps {
            match self.advance(system) {
                Ok(_) => {}
                Err(e) if e.is_quiescent() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(self.event_count() - start)
    }

    /// Advance until the clock reaches `horizon` or nothing can fire.
    ///
    /// The event that crosses the horizon is fired and counted.
    fn run_until(&mut self, system: &mut S, horizon: Time) -> StochResult<u64> {
        let start = self.event_count();
        while self.current_time() < horizon {
            match self.advance(system) {
                Ok(_) => {}
                Err(e) if e.is_quiescent() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(self.event_count() - start)
    }

    fn event_count(&self) -> u64 {
        self.clock().events()
    }

    fn current_time(&self) -> Time {
        self.clock().now()
    }

    fn last_event(&self) -> Option<&Event> {
        self.clock().last_event()
    }
}

impl<S: System, A: Algorithm<S> + ?Sized> Algorithm<S> for Box<A> {
    fn method(&self) -> Method {
        (**self).method()
    }

    fn next_event(&mut self, system: &S) -> StochResult<Event> {
        (**self).next_event(system)
    }

    fn update_state(
        &mut self,
        system: &S,
        event: &Event,
        dependents: &[ProcIndex],
    ) -> StochResult<()> {
        (**self).update_state(system, event, dependents)
    }

    fn clock(&self) -> &Clock {
        (**self).clock()
    }

    fn clock_mut(&mut self) -> &mut Clock {
        (**self).clock_mut()
    }
}

// ── Method ────────────────────────────────────────────────────────────

/// Which SSA variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "kebab-case"))]
pub enum Method {
    Reference,
    Direct,
    NextReaction,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Reference, Method::Direct, Method::NextReaction];

    pub fn name(self) -> &'static str {
        match self {
            Method::Reference => "reference",
            Method::Direct => "direct",
            Method::NextReaction => "next-reaction",
        }
    }

    /// Construct the driver for this method.
    pub fn build<S, R>(
        self,
        system: &S,
        rng: R,
        config: &EngineConfig,
    ) -> StochResult<Box<dyn Algorithm<S>>>
    where
        S: System + 'static,
        R: Rng + 'static,
    {
        let driver: Box<dyn Algorithm<S>> = match self {
            Method::Reference => Box::new(Reference::new(system, rng, config)?),
            Method::Direct => Box::new(Direct::new(system, rng, config)?),
            Method::NextReaction => Box::new(NextReaction::new(system, rng, config)?),
        };
        Ok(driver)
    }
}

impl FromStr for Method {
    type Err = StochError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" => Ok(Method::Reference),
            "direct" => Ok(Method::Direct),
            "next-reaction" | "next_reaction" | "nrm" => Ok(Method::NextReaction),
            _ => Err(StochError::UnknownMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small systems shared by the driver tests.

    use crate::event::Event;
    use crate::process::{HasRate, Indexed, ProcIndex};
    use crate::rate::Rate;
    use crate::system::{LinkedSystem, SystemBuilder};

    #[derive(Debug, Clone)]
    pub struct Channel {
        pub index: ProcIndex,
        pub rate: f64,
    }

    impl HasRate for Channel {
        fn rate(&self) -> Rate {
            Rate::new(self.rate).unwrap()
        }
    }

    impl Indexed for Channel {
        fn index(&self) -> ProcIndex {
            self.index
        }
    }

    pub type Effect = fn(&mut [Channel], &Event);

    /// Independent processes with fixed rates; firing changes nothing.
    pub fn constant(rates: &[f64]) -> LinkedSystem<Channel, Effect> {
        let mut builder = SystemBuilder::new();
        for &rate in rates {
            builder.register(|index| Channel { index, rate });
        }
        builder
            .build((|_: &mut [Channel], _: &Event| {}) as Effect)
            .unwrap()
    }

    /// A single process that switches itself off after firing once.
    pub fn one_shot() -> LinkedSystem<Channel, Effect> {
        let mut builder = SystemBuilder::new();
        builder.register(|index| Channel { index, rate: 1.0 });
        builder
            .build((|procs: &mut [Channel], _: &Event| procs[0].rate = 0.0) as Effect)
            .unwrap()
    }

    /// Two processes: firing 0 sets 1's rate to 0 or back to `on`
    /// alternately; firing 1 does nothing.
    pub fn toggle() -> LinkedSystem<Channel, Effect> {
        let mut builder = SystemBuilder::new();
        let a = builder.register(|index| Channel { index, rate: 1.0 });
        let b = builder.register(|index| Channel { index, rate: 2.0 });
        builder.link(a, b).unwrap();
        builder
            .build(
                (|procs: &mut [Channel], event: &Event| {
                    if event.process.raw() == 0 {
                        procs[1].rate = if procs[1].rate > 0.0 { 0.0 } else { 2.0 };
                    }
                }) as Effect,
            )
            .unwrap()
    }
}
