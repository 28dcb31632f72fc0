//! Built-in dispatching rules.
//!
//! All rules return lower scores for processes that should run first.

use super::{DispatchingRule, RuleScore};
use crate::models::Process;

/// First Come, First Served.
///
/// Orders by arrival time.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalOrder;

impl DispatchingRule for ArrivalOrder {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        process.arrival_time
    }

    fn description(&self) -> &'static str {
        "First Come, First Served"
    }
}

/// Shortest Job First.
///
/// Orders by total burst time. Minimizes mean waiting time when all
/// jobs are available at once.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct ShortestBurst;

impl DispatchingRule for ShortestBurst {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        process.burst_time
    }

    fn description(&self) -> &'static str {
        "Shortest Job First"
    }
}

/// Static priority (lower number = more urgent).
#[derive(Debug, Clone, Copy)]
pub struct LowestPriority;

impl DispatchingRule for LowestPriority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        i64::from(process.priority)
    }

    fn description(&self) -> &'static str {
        "Lowest Priority Number First"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_order() {
        let p = Process::new("P1", 5, 7, 2);
        assert_eq!(ArrivalOrder.evaluate(&p), 7);
        assert_eq!(ArrivalOrder.name(), "FCFS");
    }

    #[test]
    fn test_shortest_burst() {
        let short = Process::new("S", 2, 9, 0);
        let long = Process::new("L", 9, 0, 0);
        assert!(ShortestBurst.evaluate(&short) < ShortestBurst.evaluate(&long));
        assert_eq!(ShortestBurst.description(), "Shortest Job First");
    }

    #[test]
    fn test_lowest_priority() {
        let urgent = Process::new("U", 5, 0, 0);
        let lazy = Process::new("L", 5, 0, 4);
        assert!(LowestPriority.evaluate(&urgent) < LowestPriority.evaluate(&lazy));
    }
}
