//! # Stoch — Coupled Stochastic Simulation Engine
//!
//! Exact, single-threaded simulation of continuous-time Markov jump
//! processes with Gillespie's stochastic simulation algorithm. Three
//! drivers share one interface: a brute-force reference, the direct
//! method with amortized rate bookkeeping, and the Gibson–Bruck
//! next-reaction method.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │            Simulation               │ ← step / run loop + observer
//! │  ┌───────────────┐ ┌─────────────┐  │
//! │  │    System     │ │  Algorithm  │  │
//! │  │  processes    │ │  Reference  │  │ ← O(N) per step
//! │  │  dependency   │ │  Direct     │  │ ← RateManager + SelectionList
//! │  │  graph        │ │  NextReact. │  │ ← IndexedEventHeap
//! │  └───────────────┘ └─────────────┘  │
//! │  ┌───────────────┐ ┌─────────────┐  │
//! │  │  Event        │ │ Time / Rate │  │ ← immutable records, newtypes
//! │  └───────────────┘ └─────────────┘  │
//! └─────────────────────────────────────┘
//! ```
//!
//! One step: the driver picks the next event, the system applies it and
//! reports which processes' rates may have changed, the driver refreshes
//! its bookkeeping for exactly those processes.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod event;
pub mod graph;
pub mod heap;
pub mod process;
pub mod rate;
pub mod rate_manager;
pub mod selection;
pub mod simulation;
pub mod system;
pub mod time;
pub mod trace;

// Re-exports for convenience.
pub use algorithm::{reschedule, Algorithm, Clock, Direct, Method, NextReaction, Reference};
pub use config::EngineConfig;
pub use error::{StochError, StochResult};
pub use event::Event;
pub use graph::DependencyGraph;
pub use heap::IndexedEventHeap;
pub use process::{HasRate, Indexed, ProcIndex, Process};
pub use rate::Rate;
pub use rate_manager::RateManager;
pub use selection::SelectionList;
pub use simulation::{EventObserver, Simulation};
pub use system::{LinkedSystem, System, SystemBuilder};
pub use time::Time;
pub use trace::{traces_match, EventTrace};
