//! Resource access requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of access a process requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    Read,
    Write,
}

impl ActionKind {
    /// Upper-case label used in files and timelines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Read => "READ",
            ActionKind::Write => "WRITE",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an action label is neither READ nor WRITE.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action kind '{0}'")]
pub struct UnknownActionKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionKind;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "READ" => Ok(ActionKind::Read),
            "WRITE" => Ok(ActionKind::Write),
            _ => Err(UnknownActionKind(s.to_string())),
        }
    }
}

/// A request by a process to access a resource at a given cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Requesting process.
    pub pid: String,
    /// Read or write.
    pub kind: ActionKind,
    /// Target resource name.
    pub resource: String,
    /// Cycle of the request. Must not precede the process's arrival.
    pub cycle: i64,
}

impl Action {
    /// Creates a new action.
    pub fn new(
        pid: impl Into<String>,
        kind: ActionKind,
        resource: impl Into<String>,
        cycle: i64,
    ) -> Self {
        Self {
            pid: pid.into(),
            kind,
            resource: resource.into(),
            cycle,
        }
    }

    /// Creates a READ action.
    pub fn read(pid: impl Into<String>, resource: impl Into<String>, cycle: i64) -> Self {
        Self::new(pid, ActionKind::Read, resource, cycle)
    }

    /// Creates a WRITE action.
    pub fn write(pid: impl Into<String>, resource: impl Into<String>, cycle: i64) -> Self {
        Self::new(pid, ActionKind::Write, resource, cycle)
    }
}
