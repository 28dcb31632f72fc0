//! Input validation and canonical action ordering.
//!
//! Checks structural and semantic integrity before a simulation runs:
//! - Process records (positive burst, non-negative arrival/priority,
//!   unique non-empty pids, time values within [`MAX_CYCLE`])
//! - Resource records (unique non-empty names, non-negative capacity)
//! - Actions (known pid, cycle not before the process arrives)
//!
//! Every check collects all violations instead of stopping at the first.

use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::models::{Action, Process, Resource};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Latest cycle a simulation may reach.
///
/// Bursts, arrivals and action cycles are bounded by this, and so is the
/// latest arrival plus the total burst of a process table, which keeps
/// every clock value of a run representable.
pub const MAX_CYCLE: i64 = 1 << 48;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// No records supplied.
    EmptyInput,
    /// Bad burst/arrival/priority, empty or duplicate pid, unparsable line.
    InvalidProcessRecord,
    /// Empty or duplicate name, negative or unparsable capacity.
    InvalidResourceRecord,
    /// Unknown kind, empty field, bad cycle, duplicate or dangling reference.
    InvalidActionRecord,
    /// Action cycle precedes the owning process's arrival.
    ArrivalViolation,
    /// Action references a pid missing from the process table.
    UnknownProcess,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationErrorKind::EmptyInput => "empty input",
            ValidationErrorKind::InvalidProcessRecord => "invalid process record",
            ValidationErrorKind::InvalidResourceRecord => "invalid resource record",
            ValidationErrorKind::InvalidActionRecord => "invalid action record",
            ValidationErrorKind::ArrivalViolation => "arrival violation",
            ValidationErrorKind::UnknownProcess => "unknown process",
        };
        f.write_str(label)
    }
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a single process record in isolation.
pub(crate) fn check_process(p: &Process, errors: &mut Vec<ValidationError>) {
    let kind = ValidationErrorKind::InvalidProcessRecord;
    if p.pid.trim().is_empty() {
        errors.push(ValidationError::new(kind, "Process with empty PID"));
    }
    if p.burst_time <= 0 {
        errors.push(ValidationError::new(
            kind,
            format!("Process '{}' has non-positive burst time {}", p.pid, p.burst_time),
        ));
    } else if p.burst_time > MAX_CYCLE {
        errors.push(ValidationError::new(
            kind,
            format!("Process '{}' has burst time {} above {}", p.pid, p.burst_time, MAX_CYCLE),
        ));
    }
    if p.arrival_time < 0 {
        errors.push(ValidationError::new(
            kind,
            format!("Process '{}' has negative arrival time {}", p.pid, p.arrival_time),
        ));
    } else if p.arrival_time > MAX_CYCLE {
        errors.push(ValidationError::new(
            kind,
            format!("Process '{}' has arrival time {} above {}", p.pid, p.arrival_time, MAX_CYCLE),
        ));
    }
    if p.priority < 0 {
        errors.push(ValidationError::new(
            kind,
            format!("Process '{}' has negative priority {}", p.pid, p.priority),
        ));
    }
}

/// Validates a process table.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_processes(processes: &[Process]) -> ValidationResult {
    if processes.is_empty() {
        return Err(vec![ValidationError::new(
            ValidationErrorKind::EmptyInput,
            "No processes supplied",
        )]);
    }

    let mut errors = Vec::new();
    let mut pids = HashSet::new();
    for p in processes {
        check_process(p, &mut errors);
        if !pids.insert(p.pid.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidProcessRecord,
                format!("Duplicate PID: {}", p.pid),
            ));
        }
    }

    if errors.is_empty() {
        let latest_arrival = processes.iter().map(|p| p.arrival_time).max().unwrap_or(0);
        let horizon = processes
            .iter()
            .try_fold(latest_arrival, |acc, p| acc.checked_add(p.burst_time));
        if !matches!(horizon, Some(h) if h <= MAX_CYCLE) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidProcessRecord,
                format!("Latest arrival plus total burst time exceeds {} cycles", MAX_CYCLE),
            ));
        }
    }
    finish(errors)
}

/// Validates a resource table.
pub fn validate_resources(resources: &[Resource]) -> ValidationResult {
    let kind = ValidationErrorKind::InvalidResourceRecord;
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    for r in resources {
        if r.name.trim().is_empty() {
            errors.push(ValidationError::new(kind, "Resource with empty name"));
        }
        if r.capacity < 0 {
            errors.push(ValidationError::new(
                kind,
                format!("Resource '{}' has negative capacity {}", r.name, r.capacity),
            ));
        }
        if !names.insert(r.name.as_str()) {
            errors.push(ValidationError::new(
                kind,
                format!("Duplicate resource name: {}", r.name),
            ));
        }
    }
    finish(errors)
}

/// Validates actions against the process table.
///
/// Checks:
/// 1. Every action's pid exists in `processes`
/// 2. Every action's cycle is >= that process's arrival time
pub fn validate_actions(actions: &[Action], processes: &[Process]) -> ValidationResult {
    let by_pid = index_by_pid(processes);
    let mut errors = Vec::new();

    for action in actions {
        match by_pid.get(action.pid.as_str()) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownProcess,
                format!(
                    "Process {} not found for action at cycle {}",
                    action.pid, action.cycle
                ),
            )),
            Some(p) if action.cycle < p.arrival_time => errors.push(ValidationError::new(
                ValidationErrorKind::ArrivalViolation,
                format!(
                    "Process {} requests {} at cycle {} but arrives at {}",
                    action.pid, action.resource, action.cycle, p.arrival_time
                ),
            )),
            Some(_) => {}
        }
        if action.cycle > MAX_CYCLE {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidActionRecord,
                format!(
                    "Process {} requests {} at cycle {} above {}",
                    action.pid, action.resource, action.cycle, MAX_CYCLE
                ),
            ));
        }
    }
    finish(errors)
}

/// Sorts actions into canonical order: cycle, then process priority
/// (lower first), then pid.
///
/// Actions whose pid is missing from `processes` sort after known ones
/// within their cycle; validate first to rule them out.
pub fn sort_actions(actions: &mut [Action], processes: &[Process]) {
    let by_pid = index_by_pid(processes);
    let priority_of =
        |pid: &str| -> i64 { by_pid.get(pid).map_or(i64::MAX, |p| i64::from(p.priority)) };

    actions.sort_by(|a, b| {
        a.cycle
            .cmp(&b.cycle)
            .then_with(|| priority_of(&a.pid).cmp(&priority_of(&b.pid)))
            .then_with(|| a.pid.cmp(&b.pid))
    });
}

/// Validates, then returns a canonically sorted copy of `actions`.
pub fn validate_and_sort(
    actions: &[Action],
    processes: &[Process],
) -> Result<Vec<Action>, Vec<ValidationError>> {
    validate_actions(actions, processes)?;
    let mut sorted = actions.to_vec();
    sort_actions(&mut sorted, processes);
    Ok(sorted)
}

fn index_by_pid(processes: &[Process]) -> HashMap<&str, &Process> {
    processes.iter().map(|p| (p.pid.as_str(), p)).collect()
}
