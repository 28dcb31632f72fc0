//! Shortest Remaining Time (preemptive SJF).
//!
//! # Algorithm
//!
//! Cycle-by-cycle simulation driven by a [`MinHeap`] keyed on remaining
//! burst time:
//! 1. Admit arrived processes, keyed by their current remaining time.
//! 2. Preempt the running process if the heap holds a strictly shorter
//!    remaining time; the preempted process goes back into the heap.
//! 3. If the CPU is idle, pop the shortest; if the heap is also empty,
//!    jump to the next arrival or stop.
//! 4. Run one cycle.
//!
//! Equal remaining times never preempt, so the running process keeps the
//! CPU on ties.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.3.2

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::SimError;
use crate::heap::MinHeap;
use crate::models::{ExecutionBlock, Process};

/// The process holding the CPU and the length of its current run.
struct Running {
    process: Process,
    run_length: i64,
}

/// Runs SRT. Input must already be validated.
///
/// Returns processes sorted by completion time, plus the execution blocks
/// in the order they were closed.
pub(crate) fn run(processes: &[Process]) -> Result<(Vec<Process>, Vec<ExecutionBlock>), SimError> {
    let mut arrivals: Vec<Process> = processes.to_vec();
    arrivals.sort_by_key(|p| p.arrival_time);

    let mut remaining: BTreeMap<String, i64> = arrivals
        .iter()
        .map(|p| (p.pid.clone(), p.burst_time))
        .collect();
    let mut first_run: BTreeMap<String, i64> = BTreeMap::new();
    let mut last_end: BTreeMap<String, i64> = BTreeMap::new();

    let mut ready: MinHeap<Process> = MinHeap::with_capacity(arrivals.len());
    let mut blocks = Vec::new();
    let mut running: Option<Running> = None;
    let mut clock = 0_i64;
    let mut next = 0_usize;

    while next < arrivals.len() || !ready.is_empty() || running.is_some() {
        while next < arrivals.len() && arrivals[next].arrival_time <= clock {
            let entry = &arrivals[next];
            ready.insert(entry.clone().with_burst(remaining_of(&remaining, &entry.pid)));
            next += 1;
        }

        if let Some(current) = running.take() {
            let left = remaining_of(&remaining, &current.process.pid);
            let shorter_waiting = !ready.is_empty() && ready.peek()?.burst_time < left;
            if shorter_waiting {
                trace!(pid = %current.process.pid, clock, left, "preempted");
                if current.run_length > 0 {
                    blocks.push(ExecutionBlock::new(
                        current.process.pid.clone(),
                        clock - current.run_length,
                        current.run_length,
                    ));
                }
                if left > 0 {
                    ready.insert(current.process.with_burst(left));
                }
            } else {
                running = Some(current);
            }
        }

        if running.is_none() && !ready.is_empty() {
            let picked = ready.pop()?;
            let process = arrivals
                .iter()
                .find(|p| p.pid == picked.pid)
                .cloned()
                .unwrap_or(picked);
            first_run.entry(process.pid.clone()).or_insert(clock);
            running = Some(Running {
                process,
                run_length: 0,
            });
        }

        let Some(current) = running.as_mut() else {
            match arrivals.get(next) {
                Some(p) => {
                    clock = p.arrival_time;
                    continue;
                }
                None => break,
            }
        };

        clock += 1;
        current.run_length += 1;
        let left = remaining.entry(current.process.pid.clone()).or_insert(0);
        *left -= 1;

        if *left == 0 {
            last_end.insert(current.process.pid.clone(), clock);
            blocks.push(ExecutionBlock::new(
                current.process.pid.clone(),
                clock - current.run_length,
                current.run_length,
            ));
            running = None;
        }
    }

    let mut executed: Vec<Process> = processes
        .iter()
        .map(|p| {
            let mut out = p.clone();
            out.reset_metrics();
            if let (Some(&start), Some(&end)) = (first_run.get(&p.pid), last_end.get(&p.pid)) {
                out.record_run(start, end);
            }
            out
        })
        .collect();
    executed.sort_by_key(|p| p.completion_time);

    Ok((executed, blocks))
}

fn remaining_of(remaining: &BTreeMap<String, i64>, pid: &str) -> i64 {
    remaining.get(pid).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeline;

    fn example() -> Vec<Process> {
        vec![
            Process::new("P1", 5, 0, 1),
            Process::new("P2", 3, 1, 2),
            Process::new("P3", 4, 2, 1),
        ]
    }

    #[test]
    fn test_example_completion_order() {
        let (out, blocks) = run(&example()).unwrap();
        let order: Vec<&str> = out.iter().map(|p| p.pid.as_str()).collect();
        assert_eq!(order, vec!["P2", "P1", "P3"]);

        let completions: Vec<i64> = out.iter().map(|p| p.completion_time.unwrap()).collect();
        assert_eq!(completions, vec![4, 8, 12]);

        let trace: Vec<(&str, i64, i64)> = blocks
            .iter()
            .map(|b| (b.pid.as_str(), b.start, b.duration))
            .collect();
        assert_eq!(
            trace,
            vec![("P1", 0, 1), ("P2", 1, 3), ("P1", 4, 4), ("P3", 8, 4)]
        );
    }

    #[test]
    fn test_metrics_use_original_burst() {
        let (out, _) = run(&example()).unwrap();
        let p1 = out.iter().find(|p| p.pid == "P1").unwrap();
        assert_eq!(p1.burst_time, 5);
        assert_eq!(p1.start_time, Some(0));
        assert_eq!(p1.turnaround_time, Some(8));
        assert_eq!(p1.waiting_time, Some(3));
    }

    #[test]
    fn test_idle_gap_jump() {
        let processes = vec![Process::new("A", 2, 0, 0), Process::new("B", 3, 6, 0)];
        let (out, blocks) = run(&processes).unwrap();
        assert_eq!(blocks, vec![ExecutionBlock::new("A", 0, 2), ExecutionBlock::new("B", 6, 3)]);
        assert_eq!(out[1].completion_time, Some(9));
        assert_eq!(out[1].waiting_time, Some(0));
    }

    #[test]
    fn test_equal_remaining_does_not_preempt() {
        let processes = vec![Process::new("A", 3, 0, 0), Process::new("B", 2, 1, 0)];
        // At t=1 A has 2 left, B needs 2: A keeps the CPU.
        let (out, blocks) = run(&processes).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(out[0].pid, "A");
        assert_eq!(out[0].completion_time, Some(3));
    }

    #[test]
    fn test_blocks_cover_bursts_without_overlap() {
        let processes = vec![
            Process::new("A", 8, 0, 0),
            Process::new("B", 4, 1, 0),
            Process::new("C", 9, 2, 0),
            Process::new("D", 5, 3, 0),
        ];
        let (_, blocks) = run(&processes).unwrap();
        for p in &processes {
            assert_eq!(timeline::executed_cycles(&blocks, &p.pid), p.burst_time);
        }
        assert!(!timeline::has_overlap(&blocks));
        assert_eq!(timeline::busy_cycles(&blocks), 26);
    }
}
