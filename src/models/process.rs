//! Process model.
//!
//! A process is a unit of CPU work: it arrives at some cycle, needs a
//! fixed number of cycles (its burst), and carries a static priority.
//! Schedulers fill in the four computed metrics.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.2

use serde::{Deserialize, Serialize};

use crate::heap::HeapKey;

/// A process to be scheduled.
///
/// # Time Representation
/// All times are integer cycles relative to the start of the simulation
/// (t=0). Computed fields stay `None` until a scheduler fills them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Unique process identifier.
    pub pid: String,
    /// Total CPU cycles required (> 0).
    pub burst_time: i64,
    /// Cycle at which the process becomes eligible to run (>= 0).
    pub arrival_time: i64,
    /// Static priority (>= 0, lower = more urgent).
    pub priority: i32,
    /// First cycle the process held the CPU.
    pub start_time: Option<i64>,
    /// Cycle at which the last unit of work finished.
    pub completion_time: Option<i64>,
    /// `turnaround_time - burst_time`.
    pub waiting_time: Option<i64>,
    /// `completion_time - arrival_time`.
    pub turnaround_time: Option<i64>,
}

impl Process {
    /// Creates a process with no computed metrics.
    pub fn new(pid: impl Into<String>, burst_time: i64, arrival_time: i64, priority: i32) -> Self {
        Self {
            pid: pid.into(),
            burst_time,
            arrival_time,
            priority,
            start_time: None,
            completion_time: None,
            waiting_time: None,
            turnaround_time: None,
        }
    }

    /// Sets the burst time. SRT uses this to requeue a process keyed by
    /// its remaining time.
    pub fn with_burst(mut self, burst_time: i64) -> Self {
        self.burst_time = burst_time;
        self
    }

    /// Records start and completion, deriving turnaround and waiting time.
    pub fn record_run(&mut self, start: i64, completion: i64) {
        self.start_time = Some(start);
        self.completion_time = Some(completion);
        let turnaround = completion - self.arrival_time;
        self.turnaround_time = Some(turnaround);
        self.waiting_time = Some(turnaround - self.burst_time);
    }

    /// Clears all computed metrics.
    pub fn reset_metrics(&mut self) {
        self.start_time = None;
        self.completion_time = None;
        self.waiting_time = None;
        self.turnaround_time = None;
    }

    /// Whether a scheduler has filled in the metrics.
    pub fn is_scheduled(&self) -> bool {
        self.completion_time.is_some()
    }

    /// Response time: first CPU cycle minus arrival.
    pub fn response_time(&self) -> Option<i64> {
        self.start_time.map(|s| s - self.arrival_time)
    }
}

/// Heap ordering by burst time; SRT stores remaining time in this field.
impl HeapKey for Process {
    fn heap_key(&self) -> i64 {
        self.burst_time
    }
}
