//! Simulation domain models.
//!
//! Plain value records shared by the schedulers, the contention
//! simulator and the flat-text loaders.
//!
//! # Domain Mappings
//!
//! | os-sched-sim | CPU scheduling | Synchronization |
//! |--------------|----------------|-----------------|
//! | Process | Job / thread | Competing process |
//! | ExecutionBlock | Gantt bar | - |
//! | Resource | - | Mutex / semaphore |
//! | Action | - | Acquire request |
//! | SyncBlock | - | WAIT / ACCESS bar |

mod action;
mod process;
mod resource;
pub mod timeline;

pub use action::{Action, ActionKind, UnknownActionKind};
pub use process::Process;
pub use resource::Resource;
pub use timeline::{ExecutionBlock, SyncBlock};
