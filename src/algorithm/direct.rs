//! Gillespie's direct method with amortized bookkeeping.
//!
//! The total rate comes from a [`RateManager`] that only re-reads the
//! processes an event touched, and the firing process is drawn from a
//! self-organizing [`SelectionList`]. The waiting time is exponential in
//! the current total, added to the clock.

use rand::Rng;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{StochError, StochResult};
use crate::event::Event;
use crate::process::ProcIndex;
use crate::rate_manager::RateManager;
use crate::selection::SelectionList;
use crate::system::System;
use crate::time::Time;

use super::{Algorithm, Clock, Method};

pub struct Direct<R> {
    rng: R,
    clock: Clock,
    rates: RateManager,
    list: SelectionList,
    /// Scratch buffer for the changed set, reused across steps.
    changed: Vec<ProcIndex>,
}

impl<R: Rng> Direct<R> {
    pub fn new<S: System>(system: &S, rng: R, config: &EngineConfig) -> StochResult<Self> {
        config.validate()?;
        system.validate_indexing()?;
        let processes = system.processes();
        let rates = RateManager::new(processes, config);
        info!(
            method = "direct",
            processes = processes.len(),
            age_threshold = rates.age_threshold(),
            "driver ready"
        );
        Ok(Direct {
            rng,
            clock: Clock::new(),
            list: SelectionList::new(
                processes,
                config.presort_selection,
                config.selection_tolerance,
            ),
            rates,
            changed: Vec::new(),
        })
    }

    pub fn rate_manager(&self) -> &RateManager {
        &self.rates
    }

    pub fn selection(&self) -> &SelectionList {
        &self.list
    }

    pub fn event_count(&self) -> u64 {
        self.clock.events()
    }

    pub fn current_time(&self) -> Time {
        self.clock.now()
    }
}

impl<S: System, R: Rng> Algorithm<S> for Direct<R> {
    fn method(&self) -> Method {
        Method::Direct
    }

    fn next_event(&mut self, system: &S) -> StochResult<Event> {
        let total = self.rates.total();
        let now = self.clock.now();
        if total.is_zero() {
            debug!(at = %now, "quiescent");
            return Err(StochError::Quiescent { at: now });
        }
        let process = self
            .list
            .select(system.processes(), &mut self.rng, total)?;
        let time = total.sample_time_after(now, &mut self.rng);
        Ok(Event::new(process, system.rate_of(process)?, time))
    }

    fn update_state(
        &mut self,
        system: &S,
        event: &Event,
        dependents: &[ProcIndex],
    ) -> StochResult<()> {
        // The fired process counts as changed whether or not it was reported.
        self.changed.clear();
        self.changed.push(event.process);
        self.changed
            .extend(dependents.iter().copied().filter(|&d| d != event.process));
        self.rates
            .update_total_rate(system.processes(), &self.changed)
    }

    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}
