//! Rule engine for multi-criteria dispatching.
//!
//! Applies rules in sequence, consulting the next rule only on ties. Full
//! ties keep the caller's order.

use std::cmp::Ordering;
use std::sync::Arc;

use super::DispatchingRule;
use crate::models::Process;

/// A composable rule engine for process ordering.
///
/// # Example
/// ```
/// use os_sched_sim::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::LowestPriority)
///     .with_tie_breaker(rules::ArrivalOrder);
/// assert_eq!(engine.rule_names(), vec!["PRIORITY", "FCFS"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primary rule.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a rule consulted only when every earlier rule ties.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Compares two processes under the rule chain.
    pub fn compare(&self, a: &Process, b: &Process) -> Ordering {
        for rule in &self.rules {
            match rule.evaluate(a).cmp(&rule.evaluate(b)) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// Returns indices into `processes`, highest priority first.
    ///
    /// The sort is stable, so full ties keep the caller's order.
    pub fn sort_indices(&self, processes: &[Process]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..processes.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&processes[a], &processes[b]));
        indices
    }

    /// Picks the best candidate among `candidates` (indices into
    /// `processes`). The earliest candidate wins full ties.
    pub fn select_best(&self, processes: &[Process], candidates: &[usize]) -> Option<usize> {
        candidates.iter().copied().reduce(|best, next| {
            if self.compare(&processes[next], &processes[best]) == Ordering::Less {
                next
            } else {
                best
            }
        })
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}
