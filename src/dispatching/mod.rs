//! Dispatching rules and rule engine for the non-preemptive schedulers.
//!
//! A dispatching rule scores a process; the engine orders processes by
//! one or more rules and breaks remaining ties deterministically. FIFO,
//! SJF and Priority scheduling are the same dispatch loop driven by
//! different rules.
//!
//! # Usage
//!
//! ```
//! use os_sched_sim::dispatching::{rules, RuleEngine};
//! use os_sched_sim::models::Process;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::ShortestBurst)
//!     .with_tie_breaker(rules::ArrivalOrder);
//!
//! let processes = vec![Process::new("A", 5, 0, 0), Process::new("B", 2, 3, 0)];
//! assert_eq!(engine.sort_indices(&processes), vec![1, 0]);
//! ```
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.3
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4

mod engine;
pub mod rules;

pub use engine::RuleEngine;

use crate::models::Process;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = dispatched first.
pub type RuleScore = i64;

/// A dispatching rule that ranks processes.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "FCFS", "SJF").
    fn name(&self) -> &'static str;

    /// Scores a process; lower runs first.
    fn evaluate(&self, process: &Process) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
