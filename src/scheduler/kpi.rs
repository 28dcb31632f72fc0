//! Schedule quality metrics (KPIs) and algorithm comparison.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Avg Waiting | mean(turnaround - burst) |
//! | Avg Turnaround | mean(completion - arrival) |
//! | Avg Response | mean(first run - arrival) |
//! | Makespan | latest completion |
//! | CPU Utilization | busy cycles / makespan |
//! | Throughput | processes / makespan |
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.2: Scheduling Criteria

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Algorithm, ScheduleRun, Scheduler};
use crate::models::{timeline, Process};

/// Mean waiting time over `executed`.
///
/// `original` is accepted for parity with callers that keep the input
/// set alongside the result; only `executed` contributes. Processes
/// without a computed waiting time are ignored. Returns 0.0 when nothing
/// was executed.
pub fn average_waiting_time(_original: &[Process], executed: &[Process]) -> f64 {
    mean(executed.iter().filter_map(|p| p.waiting_time))
}

fn mean(values: impl Iterator<Item = i64>) -> f64 {
    let (sum, count) = values.fold((0.0_f64, 0_usize), |(s, c), v| (s + v as f64, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Schedule performance indicators.
///
/// All time values are in cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Mean waiting time.
    pub avg_waiting_time: f64,
    /// Mean turnaround time.
    pub avg_turnaround_time: f64,
    /// Mean response time (first run - arrival).
    pub avg_response_time: f64,
    /// Latest completion time.
    pub makespan: i64,
    /// Cycles during which the CPU was busy.
    pub busy_cycles: i64,
    /// Fraction of the makespan the CPU was busy (0.0..1.0).
    pub cpu_utilization: f64,
    /// Completed processes per cycle.
    pub throughput: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a completed run.
    pub fn calculate(run: &ScheduleRun) -> Self {
        let processes = &run.processes;
        let makespan = processes
            .iter()
            .filter_map(|p| p.completion_time)
            .max()
            .unwrap_or_else(|| timeline::makespan(&run.blocks));
        let busy_cycles = timeline::busy_cycles(&run.blocks);
        let completed = processes.iter().filter(|p| p.is_scheduled()).count();

        let (cpu_utilization, throughput) = if makespan <= 0 {
            (0.0, 0.0)
        } else {
            (
                busy_cycles as f64 / makespan as f64,
                completed as f64 / makespan as f64,
            )
        };

        Self {
            avg_waiting_time: mean(processes.iter().filter_map(|p| p.waiting_time)),
            avg_turnaround_time: mean(processes.iter().filter_map(|p| p.turnaround_time)),
            avg_response_time: mean(processes.iter().filter_map(Process::response_time)),
            makespan,
            busy_cycles,
            cpu_utilization,
            throughput,
        }
    }
}

/// Outcome of one algorithm within a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Discipline that was run.
    pub algorithm: Algorithm,
    /// Mean waiting time of the run.
    pub average_waiting_time: f64,
    /// Full KPI set.
    pub kpi: ScheduleKpi,
    /// The run itself.
    pub run: ScheduleRun,
}

/// Side-by-side results of several algorithms on one process set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comparison {
    /// Successful runs, in the order requested.
    pub results: Vec<AlgorithmResult>,
    /// Algorithms that could not schedule the input, with the reason.
    pub failures: Vec<(Algorithm, String)>,
}

impl Comparison {
    /// The run with the lowest average waiting time. Earlier entries win ties.
    pub fn best(&self) -> Option<&AlgorithmResult> {
        self.results.iter().reduce(|best, next| {
            if next.average_waiting_time < best.average_waiting_time {
                next
            } else {
                best
            }
        })
    }

    /// Looks up the result for a discipline.
    pub fn get(&self, algorithm: Algorithm) -> Option<&AlgorithmResult> {
        self.results.iter().find(|r| r.algorithm == algorithm)
    }
}

/// Runs each algorithm on `processes` and collects their metrics.
///
/// # Example
///
/// ```
/// use os_sched_sim::models::Process;
/// use os_sched_sim::scheduler::{compare, Algorithm};
///
/// let processes = vec![Process::new("A", 8, 0, 0), Process::new("B", 1, 1, 0)];
/// let comparison = compare(&processes, &Algorithm::all(2));
/// // B arrives while A is running; only SRT lets it cut in.
/// assert_eq!(comparison.best().unwrap().algorithm, Algorithm::ShortestRemainingTime);
/// ```
pub fn compare(processes: &[Process], algorithms: &[Algorithm]) -> Comparison {
    let mut comparison = Comparison::default();
    for &algorithm in algorithms {
        match Scheduler::new(algorithm).run(processes) {
            Ok(run) => {
                let kpi = ScheduleKpi::calculate(&run);
                comparison.results.push(AlgorithmResult {
                    algorithm,
                    average_waiting_time: kpi.avg_waiting_time,
                    kpi,
                    run,
                });
            }
            Err(err) => {
                warn!(%algorithm, error = %err, "algorithm skipped in comparison");
                comparison.failures.push((algorithm, err.to_string()));
            }
        }
    }
    comparison
}
