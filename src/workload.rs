//! Random process sets for exercises and stress runs.
//!
//! Every generated set is valid input for the schedulers: pids are
//! `P1..Pn`, bursts are positive, arrivals and priorities non-negative.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Process;

/// Parameters of a random workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadGenerator {
    /// Number of processes.
    pub count: usize,
    /// Burst times are drawn from `1..=max_burst`.
    pub max_burst: i64,
    /// Arrival times are drawn from `0..=max_arrival`.
    pub max_arrival: i64,
    /// Priorities are drawn from `0..=max_priority`.
    pub max_priority: i32,
}

impl Default for WorkloadGenerator {
    fn default() -> Self {
        Self {
            count: 5,
            max_burst: 10,
            max_arrival: 10,
            max_priority: 5,
        }
    }
}

impl WorkloadGenerator {
    /// Creates a generator for `count` processes with default ranges.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Sets the maximum burst time (clamped to at least 1).
    pub fn with_max_burst(mut self, max_burst: i64) -> Self {
        self.max_burst = max_burst.max(1);
        self
    }

    /// Sets the latest arrival time (clamped to at least 0).
    pub fn with_max_arrival(mut self, max_arrival: i64) -> Self {
        self.max_arrival = max_arrival.max(0);
        self
    }

    /// Sets the largest priority number (clamped to at least 0).
    pub fn with_max_priority(mut self, max_priority: i32) -> Self {
        self.max_priority = max_priority.max(0);
        self
    }

    /// Draws a process set from `rng`.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<Process> {
        let max_burst = self.max_burst.max(1);
        let max_arrival = self.max_arrival.max(0);
        let max_priority = self.max_priority.max(0);

        let processes: Vec<Process> = (1..=self.count)
            .map(|i| {
                Process::new(
                    format!("P{}", i),
                    rng.random_range(1..=max_burst),
                    rng.random_range(0..=max_arrival),
                    rng.random_range(0..=max_priority),
                )
            })
            .collect();
        debug!(count = processes.len(), "workload generated");
        processes
    }

    /// Draws a reproducible process set from `seed`.
    pub fn generate_seeded(&self, seed: u64) -> Vec<Process> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(&mut rng)
    }
}
