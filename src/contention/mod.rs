//! Resource contention simulator (mutex / semaphore).
//!
//! Replays an action log against a resource table and produces a
//! WAIT/ACCESS timeline. Each ACCESS holds one slot for one cycle.
//!
//! # Algorithm
//!
//! 1. Validate every action (known pid, cycle not before arrival). Any
//!    violation aborts the run and all violations are returned.
//! 2. Sort actions by cycle, then process priority, then pid.
//! 3. For each action, release holds that ended before its cycle. If the
//!    resource is full, the request waits for the earliest release and a
//!    WAIT block covers the delay.
//! 4. Emit a one-cycle ACCESS block and record the hold.
//!
//! Blocks come out in processing order: a WAIT block is always directly
//! followed by the ACCESS block of the same action.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 6.5-6.6

mod state;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Action, Process, Resource, SyncBlock};
use crate::validation::{validate_and_sort, ValidationError};
use state::ResourceState;

/// Which synchronization primitive the resources model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentionMode {
    /// Every resource admits one holder, whatever its declared capacity.
    Mutex,
    /// Each resource admits up to its declared capacity.
    #[default]
    Semaphore,
}

impl ContentionMode {
    /// Maps the `is_mutex` flag used by file-driven front ends.
    pub fn from_mutex_flag(is_mutex: bool) -> Self {
        if is_mutex {
            ContentionMode::Mutex
        } else {
            ContentionMode::Semaphore
        }
    }
}

/// Simulates contention for `resources` by `actions`.
///
/// Actions on unknown resources, or on resources with capacity <= 0, are
/// skipped with a warning.
///
/// # Example
///
/// ```
/// use os_sched_sim::contention::{simulate_contention, ContentionMode};
/// use os_sched_sim::models::{Action, Process, Resource};
///
/// let processes = vec![Process::new("P1", 3, 0, 1), Process::new("P2", 3, 0, 1)];
/// let actions = vec![Action::read("P1", "R1", 0), Action::read("P2", "R1", 0)];
/// let resources = vec![Resource::mutex("R1")];
///
/// let timeline = simulate_contention(&actions, &resources, &processes, ContentionMode::Mutex).unwrap();
/// let summary: Vec<(&str, &str, i64, i64)> = timeline
///     .iter()
///     .map(|b| (b.pid.as_str(), b.state_label(), b.start, b.duration))
///     .collect();
/// assert_eq!(
///     summary,
///     vec![("P1", "ACCESS", 0, 1), ("P2", "WAIT", 0, 1), ("P2", "ACCESS", 1, 1)]
/// );
/// ```
pub fn simulate_contention(
    actions: &[Action],
    resources: &[Resource],
    processes: &[Process],
    mode: ContentionMode,
) -> Result<Vec<SyncBlock>, Vec<ValidationError>> {
    let ordered = validate_and_sort(actions, processes).map_err(|errors| {
        warn!(violations = errors.len(), "contention simulation rejected");
        errors
    })?;

    let mutex = mode == ContentionMode::Mutex;
    let mut states: BTreeMap<&str, ResourceState> = BTreeMap::new();
    for resource in resources {
        if !resource.is_usable() {
            warn!(resource = %resource.name, capacity = resource.capacity, "resource has no capacity; ignored");
            continue;
        }
        let state = ResourceState::new(resource, mutex);
        if state.is_clamped() {
            debug!(
                resource = %resource.name,
                declared = state.original_capacity,
                enforced = state.capacity,
                "mutex mode limits resource to one holder"
            );
        }
        states.insert(resource.name.as_str(), state);
    }

    let mut timeline = Vec::with_capacity(ordered.len() * 2);
    for action in &ordered {
        let Some(state) = states.get_mut(action.resource.as_str()) else {
            warn!(pid = %action.pid, resource = %action.resource, cycle = action.cycle, "action on unknown resource skipped");
            continue;
        };

        let grant = state.request(action.cycle);
        if grant.waited > 0 {
            timeline.push(SyncBlock::wait(
                action.pid.clone(),
                action.resource.clone(),
                action.kind,
                action.cycle,
                grant.waited,
            ));
        }
        timeline.push(SyncBlock::access(
            action.pid.clone(),
            action.resource.clone(),
            action.kind,
            grant.access,
        ));
    }

    debug!(
        ?mode,
        actions = ordered.len(),
        blocks = timeline.len(),
        "contention simulation complete"
    );
    Ok(timeline)
}

/// [`simulate_contention`] with every resource treated as a mutex.
pub fn simulate_mutex(
    actions: &[Action],
    resources: &[Resource],
    processes: &[Process],
) -> Result<Vec<SyncBlock>, Vec<ValidationError>> {
    simulate_contention(actions, resources, processes, ContentionMode::Mutex)
}

/// [`simulate_contention`] with declared capacities.
pub fn simulate_semaphore(
    actions: &[Action],
    resources: &[Resource],
    processes: &[Process],
) -> Result<Vec<SyncBlock>, Vec<ValidationError>> {
    simulate_contention(actions, resources, processes, ContentionMode::Semaphore)
}

/// Per-resource totals over a contention timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStats {
    /// ACCESS blocks granted.
    pub accesses: usize,
    /// Requests that had to wait.
    pub waits: usize,
    /// Total cycles spent waiting.
    pub wait_cycles: i64,
    /// Latest cycle at which some holder still had the resource.
    pub last_release: i64,
}

/// Aggregates a timeline into per-resource statistics, keyed by name.
pub fn summarize(timeline: &[SyncBlock]) -> BTreeMap<String, ResourceStats> {
    let mut stats: BTreeMap<String, ResourceStats> = BTreeMap::new();
    for block in timeline {
        let entry = stats.entry(block.resource.clone()).or_default();
        if block.accessed {
            entry.accesses += 1;
            entry.last_release = entry.last_release.max(block.end());
        } else {
            entry.waits += 1;
            entry.wait_cycles += block.duration;
        }
    }
    stats
}
