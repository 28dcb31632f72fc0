//! CPU scheduling algorithms and schedule metrics.
//!
//! Five disciplines over a fixed process set:
//!
//! | Algorithm | Preemptive | Ordering |
//! |-----------|-----------|----------|
//! | FIFO | no | arrival |
//! | SJF | no | burst time |
//! | Priority | no | priority number |
//! | Round Robin | quantum | arrival, then queue rotation |
//! | SRT | yes | remaining burst time |
//!
//! The free functions (`fifo`, `round_robin`, ...) return empty results
//! when the input cannot be scheduled. [`Scheduler::run`] reports why.
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4

mod kpi;
mod non_preemptive;
mod round_robin;
mod srt;

pub use kpi::{average_waiting_time, compare, AlgorithmResult, Comparison, ScheduleKpi};
pub use non_preemptive::{fifo_engine, priority_engine, sjf_engine, NonPreemptivePolicy};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SimError;
use crate::models::{ExecutionBlock, Process};
use crate::validation::{validate_processes, ValidationErrorKind};

/// A scheduling discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// First In, First Out.
    Fifo,
    /// Round Robin with the given quantum (cycles).
    RoundRobin { quantum: i64 },
    /// Non-preemptive Shortest Job First.
    ShortestJobFirst,
    /// Non-preemptive static priority.
    Priority,
    /// Preemptive Shortest Remaining Time.
    ShortestRemainingTime,
}

impl Algorithm {
    /// All five disciplines, Round Robin with `quantum`.
    pub fn all(quantum: i64) -> [Algorithm; 5] {
        [
            Algorithm::Fifo,
            Algorithm::RoundRobin { quantum },
            Algorithm::ShortestJobFirst,
            Algorithm::Priority,
            Algorithm::ShortestRemainingTime,
        ]
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Fifo => "FIFO",
            Algorithm::RoundRobin { .. } => "Round Robin",
            Algorithm::ShortestJobFirst => "SJF",
            Algorithm::Priority => "Priority",
            Algorithm::ShortestRemainingTime => "SRT",
        }
    }

    /// Whether a running process can lose the CPU before finishing.
    pub fn is_preemptive(&self) -> bool {
        matches!(
            self,
            Algorithm::RoundRobin { .. } | Algorithm::ShortestRemainingTime
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::RoundRobin { quantum } => write!(f, "Round Robin (q={quantum})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Result of one scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRun {
    /// Discipline that produced this run.
    pub algorithm: Algorithm,
    /// Processes with metrics filled in. Order depends on the algorithm:
    /// execution order for FIFO/SJF/Priority, input order for Round
    /// Robin, completion order for SRT.
    pub processes: Vec<Process>,
    /// CPU timeline.
    pub blocks: Vec<ExecutionBlock>,
}

impl ScheduleRun {
    /// Mean waiting time over the scheduled processes.
    pub fn average_waiting_time(&self) -> f64 {
        average_waiting_time(&[], &self.processes)
    }

    /// Finds a scheduled process by pid.
    pub fn process(&self, pid: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    /// Pids in result order.
    pub fn pid_order(&self) -> Vec<&str> {
        self.processes.iter().map(|p| p.pid.as_str()).collect()
    }
}

/// Runs a scheduling discipline over a process set.
///
/// # Example
///
/// ```
/// use os_sched_sim::models::Process;
/// use os_sched_sim::scheduler::{Algorithm, Scheduler};
///
/// let processes = vec![
///     Process::new("P1", 5, 0, 1),
///     Process::new("P2", 3, 1, 2),
///     Process::new("P3", 4, 2, 1),
/// ];
/// let run = Scheduler::new(Algorithm::ShortestRemainingTime)
///     .run(&processes)
///     .unwrap();
/// assert_eq!(run.pid_order(), vec!["P2", "P1", "P3"]);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    algorithm: Algorithm,
    policy: NonPreemptivePolicy,
}

impl Scheduler {
    /// Creates a scheduler for `algorithm` with the upfront-sort policy.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            policy: NonPreemptivePolicy::default(),
        }
    }

    /// Sets the policy used by SJF and Priority.
    pub fn with_policy(mut self, policy: NonPreemptivePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The configured discipline.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Validates `processes` and schedules them.
    ///
    /// # Errors
    /// - `EmptyInput` when `processes` is empty
    /// - `InvalidQuantum` for a Round Robin quantum below 1
    /// - `InvalidInput` with every bad process record
    pub fn run(&self, processes: &[Process]) -> Result<ScheduleRun, SimError> {
        if let Err(errors) = validate_processes(processes) {
            if errors
                .iter()
                .all(|e| e.kind == ValidationErrorKind::EmptyInput)
            {
                return Err(SimError::EmptyInput);
            }
            return Err(SimError::InvalidInput(errors));
        }

        let (processes, blocks) = match self.algorithm {
            Algorithm::Fifo => {
                non_preemptive::dispatch(processes, &fifo_engine(), self.policy)
            }
            Algorithm::ShortestJobFirst => {
                non_preemptive::dispatch(processes, &sjf_engine(), self.policy)
            }
            Algorithm::Priority => {
                non_preemptive::dispatch(processes, &priority_engine(), self.policy)
            }
            Algorithm::RoundRobin { quantum } => {
                if quantum < 1 {
                    return Err(SimError::InvalidQuantum(quantum));
                }
                round_robin::run(processes, quantum)
            }
            Algorithm::ShortestRemainingTime => srt::run(processes)?,
        };

        debug!(
            algorithm = %self.algorithm,
            processes = processes.len(),
            blocks = blocks.len(),
            "schedule complete"
        );

        Ok(ScheduleRun {
            algorithm: self.algorithm,
            processes,
            blocks,
        })
    }

    /// Like [`run`](Self::run), but logs the error and returns an empty run.
    fn run_or_empty(&self, processes: &[Process]) -> ScheduleRun {
        self.run(processes).unwrap_or_else(|err| {
            warn!(algorithm = %self.algorithm, error = %err, "could not schedule");
            ScheduleRun {
                algorithm: self.algorithm,
                processes: Vec::new(),
                blocks: Vec::new(),
            }
        })
    }
}

/// FIFO. Returns processes in execution order; empty if unschedulable.
pub fn fifo(processes: &[Process]) -> Vec<Process> {
    Scheduler::new(Algorithm::Fifo).run_or_empty(processes).processes
}

/// Non-preemptive SJF over an upfront burst-time sort.
pub fn shortest_job_first(processes: &[Process]) -> Vec<Process> {
    Scheduler::new(Algorithm::ShortestJobFirst)
        .run_or_empty(processes)
        .processes
}

/// Non-preemptive Priority over an upfront priority sort.
pub fn priority_scheduling(processes: &[Process]) -> Vec<Process> {
    Scheduler::new(Algorithm::Priority)
        .run_or_empty(processes)
        .processes
}

/// Round Robin. Returns processes in input order plus every slice.
pub fn round_robin(processes: &[Process], quantum: i64) -> (Vec<Process>, Vec<ExecutionBlock>) {
    let run = Scheduler::new(Algorithm::RoundRobin { quantum }).run_or_empty(processes);
    (run.processes, run.blocks)
}

/// SRT. Returns processes sorted by completion time plus the blocks.
pub fn shortest_remaining_time(processes: &[Process]) -> (Vec<Process>, Vec<ExecutionBlock>) {
    let run = Scheduler::new(Algorithm::ShortestRemainingTime).run_or_empty(processes);
    (run.processes, run.blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeline;
    use crate::validation::MAX_CYCLE;
    use proptest::prelude::*;

    fn example() -> Vec<Process> {
        vec![
            Process::new("P1", 5, 0, 1),
            Process::new("P2", 3, 1, 2),
            Process::new("P3", 4, 2, 1),
        ]
    }

    fn pids(processes: &[Process]) -> Vec<&str> {
        processes.iter().map(|p| p.pid.as_str()).collect()
    }

    #[test]
    fn test_free_functions_on_example() {
        let f = fifo(&example());
        assert_eq!(pids(&f), vec!["P1", "P2", "P3"]);
        assert_eq!(
            f.iter().map(|p| p.completion_time.unwrap()).collect::<Vec<_>>(),
            vec![5, 8, 12]
        );

        assert_eq!(pids(&shortest_job_first(&example())), vec!["P2", "P3", "P1"]);
        assert_eq!(pids(&priority_scheduling(&example())), vec!["P1", "P3", "P2"]);

        let (srt, blocks) = shortest_remaining_time(&example());
        assert_eq!(pids(&srt), vec!["P2", "P1", "P3"]);
        assert_eq!(blocks.len(), 4);

        let (rr, rr_blocks) = round_robin(&example(), 2);
        assert_eq!(pids(&rr), vec!["P1", "P2", "P3"]);
        assert_eq!(rr_blocks.len(), 7);
    }

    #[test]
    fn test_empty_input() {
        assert!(fifo(&[]).is_empty());
        assert!(matches!(
            Scheduler::new(Algorithm::Fifo).run(&[]),
            Err(SimError::EmptyInput)
        ));
    }

    #[test]
    fn test_invalid_quantum() {
        let (out, blocks) = round_robin(&example(), 0);
        assert!(out.is_empty());
        assert!(blocks.is_empty());
        assert!(matches!(
            Scheduler::new(Algorithm::RoundRobin { quantum: -3 }).run(&example()),
            Err(SimError::InvalidQuantum(-3))
        ));
    }

    #[test]
    fn test_malformed_process_rejected() {
        let mut bad = example();
        bad[1].burst_time = 0;
        assert!(shortest_job_first(&bad).is_empty());
        match Scheduler::new(Algorithm::Priority).run(&bad) {
            Err(SimError::InvalidInput(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_oversized_times_rejected_without_panic() {
        let huge = vec![Process::new("A", i64::MAX, 1, 0)];
        assert!(fifo(&huge).is_empty());
        assert!(shortest_job_first(&huge).is_empty());
        assert!(round_robin(&huge, 3).0.is_empty());
        assert!(shortest_remaining_time(&huge).0.is_empty());

        let overflowing = vec![
            Process::new("A", MAX_CYCLE, 0, 0),
            Process::new("B", MAX_CYCLE, MAX_CYCLE, 0),
        ];
        for algorithm in Algorithm::all(2) {
            assert!(matches!(
                Scheduler::new(algorithm).run(&overflowing),
                Err(SimError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_arrival_gated_policy() {
        let run = Scheduler::new(Algorithm::ShortestJobFirst)
            .with_policy(NonPreemptivePolicy::ArrivalGated)
            .run(&example())
            .unwrap();
        assert_eq!(run.pid_order(), vec!["P1", "P2", "P3"]);
        assert_eq!(run.process("P3").unwrap().completion_time, Some(12));
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(Algorithm::RoundRobin { quantum: 4 }.to_string(), "Round Robin (q=4)");
        assert_eq!(Algorithm::ShortestRemainingTime.to_string(), "SRT");
        assert!(Algorithm::ShortestRemainingTime.is_preemptive());
        assert!(!Algorithm::Priority.is_preemptive());
        assert_eq!(Algorithm::all(2).len(), 5);
    }

    #[test]
    fn test_run_serializes() {
        let run = Scheduler::new(Algorithm::Fifo).run(&example()).unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["algorithm"], "Fifo");
        assert_eq!(json["blocks"].as_array().unwrap().len(), 3);
    }

    fn process_set() -> impl Strategy<Value = Vec<Process>> {
        proptest::collection::vec((1_i64..12, 0_i64..20, 0_i32..5), 1..12).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (burst, arrival, priority))| {
                    Process::new(format!("P{}", i + 1), burst, arrival, priority)
                })
                .collect()
        })
    }

    fn stable_sorted_pids<K: Ord>(processes: &[Process], key: impl Fn(&Process) -> K) -> Vec<String> {
        let mut sorted = processes.to_vec();
        sorted.sort_by_key(|p| key(p));
        sorted.into_iter().map(|p| p.pid).collect()
    }

    proptest! {
        #[test]
        fn fifo_is_stable_arrival_sort(processes in process_set()) {
            let out: Vec<String> = fifo(&processes).into_iter().map(|p| p.pid).collect();
            prop_assert_eq!(out, stable_sorted_pids(&processes, |p| p.arrival_time));
        }

        #[test]
        fn sjf_is_stable_burst_sort(processes in process_set()) {
            let out: Vec<String> = shortest_job_first(&processes).into_iter().map(|p| p.pid).collect();
            prop_assert_eq!(out, stable_sorted_pids(&processes, |p| p.burst_time));
        }

        #[test]
        fn priority_is_stable_priority_sort(processes in process_set()) {
            let out: Vec<String> = priority_scheduling(&processes).into_iter().map(|p| p.pid).collect();
            prop_assert_eq!(out, stable_sorted_pids(&processes, |p| p.priority));
        }

        #[test]
        fn large_quantum_round_robin_matches_fifo(processes in process_set()) {
            let quantum = processes.iter().map(|p| p.burst_time).max().unwrap_or(1);
            let (rr, blocks) = round_robin(&processes, quantum);
            prop_assert_eq!(blocks.len(), processes.len());

            let fifo_out = fifo(&processes);
            for p in &fifo_out {
                let same = rr.iter().find(|r| r.pid == p.pid).unwrap();
                prop_assert_eq!(same.start_time, p.start_time);
                prop_assert_eq!(same.completion_time, p.completion_time);
            }
        }

        #[test]
        fn srt_blocks_tile_bursts(processes in process_set()) {
            let (out, blocks) = shortest_remaining_time(&processes);
            prop_assert_eq!(out.len(), processes.len());
            for p in &processes {
                prop_assert_eq!(timeline::executed_cycles(&blocks, &p.pid), p.burst_time);
            }
            prop_assert!(!timeline::has_overlap(&blocks));
            prop_assert!(blocks.iter().all(|b| b.duration >= 1));
            prop_assert!(out.windows(2).all(|w| w[0].completion_time <= w[1].completion_time));
        }

        #[test]
        fn metrics_are_consistent(processes in process_set(), quantum in 1_i64..6) {
            for algorithm in Algorithm::all(quantum) {
                let run = Scheduler::new(algorithm).run(&processes).unwrap();
                for p in &run.processes {
                    let completion = p.completion_time.unwrap();
                    prop_assert_eq!(p.turnaround_time, Some(completion - p.arrival_time));
                    prop_assert_eq!(p.waiting_time, Some(completion - p.arrival_time - p.burst_time));
                    prop_assert!(p.waiting_time.unwrap() >= 0);
                    prop_assert!(p.start_time.unwrap() >= p.arrival_time);
                }
                prop_assert!(!timeline::has_overlap(&run.blocks));
            }
        }
    }
}
