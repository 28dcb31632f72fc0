//! Non-preemptive dispatch: FIFO, SJF and Priority.
//!
//! # Algorithm
//!
//! All three run the same loop: pick the next process by a dispatching
//! rule, wait for it to arrive if needed (`clock = max(clock, arrival)`),
//! run it to completion, repeat.
//!
//! - `UpfrontSort` orders every process once, ignoring arrival for
//!   eligibility. This models "all jobs already queued".
//! - `ArrivalGated` decides at each completion among the processes that
//!   have arrived; an idle CPU jumps to the next arrival.
//!
//! For FIFO both policies give the same schedule.
//!
//! # Complexity
//! O(n log n) upfront, O(n^2) arrival-gated.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dispatching::{rules, RuleEngine};
use crate::models::{ExecutionBlock, Process};

/// How a non-preemptive scheduler chooses among pending processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonPreemptivePolicy {
    /// Sort all processes once by the rule key, then run in that order.
    #[default]
    UpfrontSort,
    /// Only processes that have arrived are eligible at each decision.
    ArrivalGated,
}

/// Engine for FIFO: arrival order, stable on ties.
pub fn fifo_engine() -> RuleEngine {
    RuleEngine::new().with_rule(rules::ArrivalOrder)
}

/// Engine for SJF: burst time, stable on ties.
pub fn sjf_engine() -> RuleEngine {
    RuleEngine::new().with_rule(rules::ShortestBurst)
}

/// Engine for Priority: priority number, stable on ties.
pub fn priority_engine() -> RuleEngine {
    RuleEngine::new().with_rule(rules::LowestPriority)
}

/// Runs a non-preemptive schedule. Input must already be validated.
///
/// Returns processes in execution order and one block per process.
pub(crate) fn dispatch(
    processes: &[Process],
    engine: &RuleEngine,
    policy: NonPreemptivePolicy,
) -> (Vec<Process>, Vec<ExecutionBlock>) {
    trace!(rules = ?engine.rule_names(), ?policy, "dispatching");
    let order = match policy {
        NonPreemptivePolicy::UpfrontSort => engine.sort_indices(processes),
        NonPreemptivePolicy::ArrivalGated => gated_order(processes, engine),
    };

    let mut executed = Vec::with_capacity(order.len());
    let mut blocks = Vec::with_capacity(order.len());
    let mut clock = 0_i64;

    for index in order {
        let mut p = processes[index].clone();
        p.reset_metrics();
        clock = clock.max(p.arrival_time);
        let completion = clock + p.burst_time;
        p.record_run(clock, completion);
        blocks.push(ExecutionBlock::new(p.pid.clone(), clock, p.burst_time));
        clock = completion;
        executed.push(p);
    }

    (executed, blocks)
}

/// Decision order when only arrived processes are eligible.
///
/// Among arrived processes the engine decides; earlier arrival breaks
/// rule ties, then input order.
fn gated_order(processes: &[Process], engine: &RuleEngine) -> Vec<usize> {
    let engine = engine.clone().with_tie_breaker(rules::ArrivalOrder);
    let mut done = vec![false; processes.len()];
    let mut order = Vec::with_capacity(processes.len());
    let mut clock = 0_i64;

    while order.len() < processes.len() {
        let ready: Vec<usize> = (0..processes.len())
            .filter(|&i| !done[i] && processes[i].arrival_time <= clock)
            .collect();

        match engine.select_best(processes, &ready) {
            Some(next) => {
                done[next] = true;
                clock = clock.max(processes[next].arrival_time) + processes[next].burst_time;
                order.push(next);
            }
            None => {
                let next_arrival = (0..processes.len())
                    .filter(|&i| !done[i])
                    .map(|i| processes[i].arrival_time)
                    .min();
                match next_arrival {
                    Some(t) => clock = t,
                    None => break,
                }
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_fifo_example() {
        let (out, blocks) = dispatch(&example(), &fifo_engine(), NonPreemptivePolicy::UpfrontSort);
        assert_eq!(pids(&out), vec!["P1", "P2", "P3"]);
        let completions: Vec<i64> = out.iter().map(|p| p.completion_time.unwrap()).collect();
        assert_eq!(completions, vec![5, 8, 12]);
        let waits: Vec<i64> = out.iter().map(|p| p.waiting_time.unwrap()).collect();
        assert_eq!(waits, vec![0, 4, 6]);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], ExecutionBlock::new("P2", 5, 3));
    }

    #[test]
    fn test_fifo_idle_gap() {
        let processes = vec![Process::new("A", 2, 0, 0), Process::new("B", 1, 10, 0)];
        let (out, blocks) = dispatch(&processes, &fifo_engine(), NonPreemptivePolicy::UpfrontSort);
        assert_eq!(out[1].start_time, Some(10));
        assert_eq!(out[1].waiting_time, Some(0));
        assert_eq!(blocks[1].start, 10);
    }

    #[test]
    fn test_sjf_upfront_ignores_arrival() {
        let (out, _) = dispatch(&example(), &sjf_engine(), NonPreemptivePolicy::UpfrontSort);
        assert_eq!(pids(&out), vec!["P2", "P3", "P1"]);
        // P2 cannot start before it arrives at 1.
        assert_eq!(out[0].start_time, Some(1));
        assert_eq!(out[0].completion_time, Some(4));
        assert_eq!(out[2].completion_time, Some(13));
        assert!(out.iter().all(|p| p.waiting_time.unwrap() >= 0));
    }

    #[test]
    fn test_sjf_arrival_gated() {
        let (out, _) = dispatch(&example(), &sjf_engine(), NonPreemptivePolicy::ArrivalGated);
        assert_eq!(pids(&out), vec!["P1", "P2", "P3"]);
        let completions: Vec<i64> = out.iter().map(|p| p.completion_time.unwrap()).collect();
        assert_eq!(completions, vec![5, 8, 12]);
    }

    #[test]
    fn test_priority_upfront_stable() {
        let (out, _) = dispatch(&example(), &priority_engine(), NonPreemptivePolicy::UpfrontSort);
        assert_eq!(pids(&out), vec!["P1", "P3", "P2"]);
    }

    #[test]
    fn test_priority_arrival_gated() {
        let processes = vec![
            Process::new("P1", 5, 0, 2),
            Process::new("P2", 3, 1, 1),
            Process::new("P3", 4, 2, 3),
        ];
        let (out, _) = dispatch(&processes, &priority_engine(), NonPreemptivePolicy::ArrivalGated);
        assert_eq!(pids(&out), vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_gated_idle_jump() {
        let processes = vec![Process::new("late", 1, 7, 0), Process::new("later", 1, 9, 0)];
        let (out, _) = dispatch(&processes, &sjf_engine(), NonPreemptivePolicy::ArrivalGated);
        assert_eq!(out[0].start_time, Some(7));
        assert_eq!(out[1].start_time, Some(9));
    }
}
