//! Timeline blocks produced by the simulators.
//!
//! `ExecutionBlock`s describe who held the CPU and when; `SyncBlock`s
//! describe WAIT/ACCESS intervals on shared resources. Both are plain
//! data handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::ActionKind;

/// A contiguous interval during which one process holds the CPU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionBlock {
    /// Running process.
    pub pid: String,
    /// First cycle of the interval.
    pub start: i64,
    /// Length in cycles (>= 1).
    pub duration: i64,
}

impl ExecutionBlock {
    /// Creates a new execution block.
    pub fn new(pid: impl Into<String>, start: i64, duration: i64) -> Self {
        Self {
            pid: pid.into(),
            start,
            duration,
        }
    }

    /// Exclusive end cycle.
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }
}

/// A WAIT or ACCESS interval of a process on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBlock {
    /// Requesting process.
    pub pid: String,
    /// Resource name.
    pub resource: String,
    /// Requested access kind.
    pub kind: ActionKind,
    /// First cycle of the interval.
    pub start: i64,
    /// Length in cycles. ACCESS blocks always last one cycle.
    pub duration: i64,
    /// `true` = ACCESS, `false` = WAIT.
    pub accessed: bool,
}

impl SyncBlock {
    /// Creates an ACCESS block of one cycle.
    pub fn access(
        pid: impl Into<String>,
        resource: impl Into<String>,
        kind: ActionKind,
        start: i64,
    ) -> Self {
        Self {
            pid: pid.into(),
            resource: resource.into(),
            kind,
            start,
            duration: 1,
            accessed: true,
        }
    }

    /// Creates a WAIT block spanning `[start, start + duration)`.
    pub fn wait(
        pid: impl Into<String>,
        resource: impl Into<String>,
        kind: ActionKind,
        start: i64,
        duration: i64,
    ) -> Self {
        Self {
            pid: pid.into(),
            resource: resource.into(),
            kind,
            start,
            duration,
            accessed: false,
        }
    }

    /// Exclusive end cycle.
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    /// "ACCESS" or "WAIT".
    pub fn state_label(&self) -> &'static str {
        if self.accessed {
            "ACCESS"
        } else {
            "WAIT"
        }
    }
}

/// Latest end cycle across all blocks (0 if empty).
pub fn makespan(blocks: &[ExecutionBlock]) -> i64 {
    blocks.iter().map(ExecutionBlock::end).max().unwrap_or(0)
}

/// Total cycles during which some process held the CPU.
pub fn busy_cycles(blocks: &[ExecutionBlock]) -> i64 {
    blocks.iter().map(|b| b.duration).sum()
}

/// Cycles executed by one process across all of its blocks.
pub fn executed_cycles(blocks: &[ExecutionBlock], pid: &str) -> i64 {
    blocks
        .iter()
        .filter(|b| b.pid == pid)
        .map(|b| b.duration)
        .sum()
}

/// All blocks belonging to one process, in timeline order.
pub fn blocks_for<'a>(blocks: &'a [ExecutionBlock], pid: &str) -> Vec<&'a ExecutionBlock> {
    blocks.iter().filter(|b| b.pid == pid).collect()
}

/// Whether any two blocks share a cycle.
pub fn has_overlap(blocks: &[ExecutionBlock]) -> bool {
    let mut sorted: Vec<&ExecutionBlock> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.start);
    sorted.windows(2).any(|w| w[1].start < w[0].end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ExecutionBlock> {
        vec![
            ExecutionBlock::new("P1", 0, 1),
            ExecutionBlock::new("P2", 1, 3),
            ExecutionBlock::new("P1", 4, 4),
            ExecutionBlock::new("P3", 10, 2),
        ]
    }

    #[test]
    fn test_block_helpers() {
        let blocks = sample();
        assert_eq!(makespan(&blocks), 12);
        assert_eq!(busy_cycles(&blocks), 10);
        assert_eq!(executed_cycles(&blocks, "P1"), 5);
        assert_eq!(blocks_for(&blocks, "P1").len(), 2);
        assert!(!has_overlap(&blocks));
    }

    #[test]
    fn test_overlap_detected() {
        let blocks = vec![ExecutionBlock::new("P1", 0, 3), ExecutionBlock::new("P2", 2, 1)];
        assert!(has_overlap(&blocks));
    }

    #[test]
    fn test_empty_timeline() {
        assert_eq!(makespan(&[]), 0);
        assert_eq!(busy_cycles(&[]), 0);
        assert!(!has_overlap(&[]));
    }

    #[test]
    fn test_sync_block_labels() {
        let w = SyncBlock::wait("P2", "R1", ActionKind::Read, 0, 2);
        let a = SyncBlock::access("P2", "R1", ActionKind::Read, 2);
        assert_eq!(w.state_label(), "WAIT");
        assert_eq!(w.end(), a.start);
        assert_eq!(a.state_label(), "ACCESS");
        assert_eq!(a.duration, 1);
    }
}
