//! Operating-system scheduling and synchronization simulator.
//!
//! Deterministic, single-threaded simulations over an integer clock for
//! teaching two OS mechanisms:
//!
//! - CPU scheduling of a fixed process set (FIFO, SJF, Priority,
//!   Round Robin, Shortest Remaining Time)
//! - Contention for shared resources under mutex and counting-semaphore
//!   semantics, producing a WAIT/ACCESS timeline
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Process`, `Resource`, `Action`,
//!   `ExecutionBlock`, `SyncBlock`
//! - **`heap`**: Array-backed binary min-heap driving SRT and resource
//!   release bookkeeping
//! - **`dispatching`**: Ordering rules for the non-preemptive schedulers
//! - **`scheduler`**: The five algorithms, metrics, multi-algorithm comparison
//! - **`contention`**: Mutex / semaphore simulator
//! - **`validation`**: Record checks and canonical action ordering
//! - **`io`**: Flat-text loaders and CSV writers
//! - **`workload`**: Seeded random process sets
//!
//! # Example
//!
//! ```
//! use os_sched_sim::models::Process;
//! use os_sched_sim::scheduler::{Algorithm, Scheduler};
//!
//! let processes = vec![
//!     Process::new("P1", 5, 0, 1),
//!     Process::new("P2", 3, 1, 2),
//!     Process::new("P3", 4, 2, 1),
//! ];
//! let run = Scheduler::new(Algorithm::Fifo).run(&processes).unwrap();
//! assert_eq!(run.pid_order(), vec!["P1", "P2", "P3"]);
//! assert_eq!(run.process("P3").unwrap().completion_time, Some(12));
//! ```
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts"
//! - Tanenbaum & Bos (2014), "Modern Operating Systems"

pub mod contention;
pub mod dispatching;
pub mod error;
pub mod heap;
pub mod io;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod workload;

pub use error::SimError;
