/// In-memory event trace.
///
/// An [`EventObserver`] that tallies firings per process and folds every
/// event into an order-sensitive trajectory hash, so that two runs can be
/// checked for identical behaviour without keeping either trajectory.
/// Retaining the events themselves is opt-in.

use crate::event::Event;
use crate::process::ProcIndex;
use crate::simulation::EventObserver;
use crate::time::Time;

// ── Hash utility ──────────────────────────────────────────────────────

/// Combine two u64 hashes deterministically.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut h = a;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h = h.wrapping_add(b);
    h ^= h >> 32;
    h
}

/// Hash a byte slice deterministically (FNV-1a).
pub fn hash_bytes(data: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

fn event_hash(event: &Event) -> u64 {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&(event.process.raw() as u64).to_le_bytes());
    bytes[8..].copy_from_slice(&event.time.value().to_bits().to_le_bytes());
    hash_bytes(&bytes)
}

// ── Event Trace ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EventTrace {
    counts: Vec<u64>,
    total: u64,
    last_time: Time,
    hash: u64,
    events: Option<Vec<Event>>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace that also keeps every recorded event.
    pub fn retaining() -> Self {
        EventTrace {
            events: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn record(&mut self, event: &Event) {
        let i = event.process.raw();
        if i >= self.counts.len() {
            self.counts.resize(i + 1, 0);
        }
        self.counts[i] += 1;
        self.total += 1;
        self.last_time = event.time;
        self.hash = hash_combine(self.hash, event_hash(event));
        if let Some(events) = self.events.as_mut() {
            events.push(*event);
        }
    }

    /// Firings of `process` so far.
    pub fn count(&self, process: ProcIndex) -> u64 {
        self.counts.get(process.raw()).copied().unwrap_or(0)
    }

    /// Firings per process, indexed by process. Processes beyond the
    /// highest one seen are omitted.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Share of all firings that went to `process`; zero on an empty trace.
    pub fn fraction(&self, process: ProcIndex) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(process) as f64 / self.total as f64
    }

    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Time of the most recent event, or zero.
    pub fn last_time(&self) -> Time {
        self.last_time
    }

    /// Order-sensitive hash of every (process, time) recorded.
    pub fn trajectory_hash(&self) -> u64 {
        self.hash
    }

    /// Recorded events, if this trace retains them.
    pub fn events(&self) -> Option<&[Event]> {
        self.events.as_deref()
    }
}

impl<S> EventObserver<S> for EventTrace {
    fn observe(&mut self, _system: &S, event: &Event) {
        self.record(event);
    }
}

/// Compare two traces for identical trajectories.
pub fn traces_match(a: &EventTrace, b: &EventTrace) -> bool {
    a.total == b.total && a.hash == b.hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::Rate;

    fn ev(p: usize, time: f64) -> Event {
        Event::new(ProcIndex::new(p), Rate::new(1.0).unwrap(), Time::new(time).unwrap())
    }

    #[test]
    fn test_hash_determinism() {
        let data = b"stoch";
        assert_eq!(hash_bytes(data), hash_bytes(data));
        assert_ne!(hash_bytes(b"a"), hash_bytes(b"b"));
        assert_ne!(hash_combine(1, 2), hash_combine(2, 1));
    }

    #[test]
    fn test_counts_and_fraction() {
        let mut trace = EventTrace::new();
        for (p, t) in [(0, 0.5), (2, 0.7), (0, 1.1), (0, 1.9)] {
            trace.record(&ev(p, t));
        }
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.counts(), &[3, 0, 1]);
        assert_eq!(trace.count(ProcIndex::new(7)), 0);
        assert_eq!(trace.fraction(ProcIndex::new(0)), 0.75);
        assert_eq!(trace.last_time().value(), 1.9);
        assert!(trace.events().is_none());
    }

    #[test]
    fn test_empty_trace() {
        let trace = EventTrace::new();
        assert!(trace.is_empty());
        assert_eq!(trace.fraction(ProcIndex::new(0)), 0.0);
        assert_eq!(trace.last_time(), Time::ZERO);
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        let mut a = EventTrace::new();
        let mut b = EventTrace::new();
        a.record(&ev(0, 1.0));
        a.record(&ev(1, 2.0));
        b.record(&ev(1, 1.0));
        b.record(&ev(0, 2.0));
        assert_eq!(a.counts(), b.counts());
        assert!(!traces_match(&a, &b));
    }

    #[test]
    fn test_hash_sees_time_bits() {
        let mut a = EventTrace::new();
        let mut b = EventTrace::new();
        a.record(&ev(0, 1.0));
        b.record(&ev(0, 1.0 + f64::EPSILON));
        assert_ne!(a.trajectory_hash(), b.trajectory_hash());
    }

    #[test]
    fn test_retaining_trace_keeps_events() {
        let mut trace = EventTrace::retaining();
        trace.record(&ev(1, 0.25));
        trace.record(&ev(0, 0.5));
        let events = trace.events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].process.raw(), 1);
    }
}
