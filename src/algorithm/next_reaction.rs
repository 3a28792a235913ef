//! Gibson–Bruck next-reaction method.
//!
//! Every process has exactly one scheduled event in an
//! [`IndexedEventHeap`]; the root is the next thing to happen. After an
//! event fires, the fired process draws a fresh waiting time and every
//! other dependent has its existing schedule *rescaled* to its new rate
//! (see [`reschedule`]), so a step costs one random draw plus
//! O(dependents · log N) heap work.

use rand::Rng;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{StochError, StochResult};
use crate::event::Event;
use crate::heap::IndexedEventHeap;
use crate::process::{HasRate, Indexed, ProcIndex};
use crate::rate::Rate;
use crate::system::System;
use crate::time::Time;

use super::{Algorithm, Clock, Method};

/// Move `old` onto `new_rate` after an event fired at `firing`.
///
/// - a zero new rate never fires: [`Time::INFINITY`];
/// - an old schedule that could never fire (zero rate or infinite time)
///   has no unelapsed wait to reuse, so a fresh time is drawn from
///   `firing`;
/// - otherwise the unelapsed wait `old.time - firing` is scaled by
///   `old.rate / new_rate`.
///
/// Fails with [`StochError::LinkedEventInPast`] if `old` was due before
/// `firing`.
pub fn reschedule<R: Rng + ?Sized>(
    old: &Event,
    new_rate: Rate,
    firing: Time,
    rng: &mut R,
) -> StochResult<Event> {
    if old.time < firing {
        return Err(StochError::LinkedEventInPast {
            dependent: old.process,
            scheduled: old.time,
            firing,
        });
    }
    let time = if new_rate.is_zero() {
        Time::INFINITY
    } else if old.rate.is_zero() || !old.time.is_finite() {
        new_rate.sample_time_after(firing, rng)
    } else if old.rate == new_rate {
        old.time
    } else {
        let remaining = old.time.value() - firing.value();
        firing.after((old.rate.value() / new_rate.value()) * remaining)
    };
    Ok(old.rescheduled(new_rate, time))
}

pub struct NextReaction<R> {
    rng: R,
    clock: Clock,
    heap: IndexedEventHeap,
    validate: bool,
}

impl<R: Rng> NextReaction<R> {
    /// Schedule one event per process, sampled from time zero.
    pub fn new<S: System>(system: &S, mut rng: R, config: &EngineConfig) -> StochResult<Self> {
        config.validate()?;
        system.validate_indexing()?;
        let events = system
            .processes()
            .iter()
            .map(|p| {
                let rate = p.rate();
                Event::new(p.index(), rate, rate.sample_time_after(Time::ZERO, &mut rng))
            })
            .collect();
        let heap = IndexedEventHeap::new(events)?;
        if config.validate_heap {
            heap.validate()?;
        }
        info!(
            method = "next-reaction",
            processes = heap.len(),
            validate_heap = config.validate_heap,
            "driver ready"
        );
        Ok(NextReaction {
            rng,
            clock: Clock::new(),
            heap,
            validate: config.validate_heap,
        })
    }

    /// The schedule, for inspection.
    pub fn heap(&self) -> &IndexedEventHeap {
        &self.heap
    }

    pub fn event_count(&self) -> u64 {
        self.clock.events()
    }

    pub fn current_time(&self) -> Time {
        self.clock.now()
    }

    fn replace(&mut self, event: Event) -> StochResult<()> {
        self.heap.update_event(event)?;
        if self.validate {
            self.heap.validate()?;
        }
        Ok(())
    }
}

impl<S: System, R: Rng> Algorithm<S> for NextReaction<R> {
    fn method(&self) -> Method {
        Method::NextReaction
    }

    fn next_event(&mut self, _system: &S) -> StochResult<Event> {
        match self.heap.next_event() {
            Some(root) if root.time.is_finite() => Ok(*root),
            _ => {
                let now = self.clock.now();
                debug!(at = %now, "quiescent");
                Err(StochError::Quiescent { at: now })
            }
        }
    }

    fn update_state(
        &mut self,
        system: &S,
        event: &Event,
        dependents: &[ProcIndex],
    ) -> StochResult<()> {
        let firing = event.time;

        let rate = system.rate_of(event.process)?;
        let fresh = Event::new(event.process, rate, rate.sample_time_after(firing, &mut self.rng));
        self.replace(fresh)?;

        for &dependent in dependents {
            if dependent == event.process {
                continue;
            }
            let old = *self
                .heap
                .find_event(dependent)
                .ok_or(StochError::IndexOutOfRange {
                    index: dependent,
                    len: self.heap.len(),
                })?;
            let rate = system.rate_of(dependent)?;
            let updated = reschedule(&old, rate, firing, &mut self.rng)?;
            self.replace(updated)?;
        }
        Ok(())
    }

    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}
