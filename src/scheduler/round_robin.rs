//! Round Robin scheduling.
//!
//! # Algorithm
//!
//! 1. Admit every process whose arrival time has been reached.
//! 2. Dequeue the head of the ready queue and run it for
//!    `min(quantum, remaining)` cycles, emitting one block.
//! 3. Admit processes that arrived during the slice, then re-enqueue the
//!    current process at the tail if it still has work.
//!
//! Arrivals during a slice enter the queue ahead of the process that was
//! just preempted.

use std::collections::{BTreeMap, VecDeque};

use crate::models::{ExecutionBlock, Process};

/// Runs Round Robin. Input must already be validated and `quantum >= 1`.
///
/// Returns processes in input order with metrics, plus every slice.
pub(crate) fn run(processes: &[Process], quantum: i64) -> (Vec<Process>, Vec<ExecutionBlock>) {
    let mut arrivals: Vec<&Process> = processes.iter().collect();
    arrivals.sort_by_key(|p| p.arrival_time);

    let mut remaining: BTreeMap<String, i64> = processes
        .iter()
        .map(|p| (p.pid.clone(), p.burst_time))
        .collect();
    let mut first_run: BTreeMap<String, i64> = BTreeMap::new();
    let mut last_end: BTreeMap<String, i64> = BTreeMap::new();

    let mut ready: VecDeque<&Process> = VecDeque::new();
    let mut blocks = Vec::new();
    let mut clock = 0_i64;
    let mut next = 0_usize;

    while !ready.is_empty() || next < arrivals.len() {
        while next < arrivals.len() && arrivals[next].arrival_time <= clock {
            ready.push_back(arrivals[next]);
            next += 1;
        }

        let Some(current) = ready.pop_front() else {
            // Idle until the next arrival.
            clock = arrivals[next].arrival_time;
            continue;
        };

        first_run.entry(current.pid.clone()).or_insert(clock);

        let left = remaining.get(&current.pid).copied().unwrap_or(0);
        let slice = quantum.min(left);
        blocks.push(ExecutionBlock::new(current.pid.clone(), clock, slice));
        clock += slice;
        remaining.insert(current.pid.clone(), left - slice);
        last_end.insert(current.pid.clone(), clock);

        while next < arrivals.len() && arrivals[next].arrival_time <= clock {
            ready.push_back(arrivals[next]);
            next += 1;
        }
        if left - slice > 0 {
            ready.push_back(current);
        }
    }

    let executed = processes
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

    (executed, blocks)
}
