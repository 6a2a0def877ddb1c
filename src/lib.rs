//! Discrete-time single-server queue scheduling.
//!
//! Models a server with one service slot and a queue of clients. Each tick
//! gives one unit of service to the client in the slot. A burst policy
//! decides whether the client keeps the slot, and a discipline decides
//! where clients are (re-)admitted.
//!
//! # Modules
//!
//! - **`list`**: `OrderedList`, an arena-backed circular doubly-linked list
//!   with positional access and identity handles
//! - **`models`**: Domain types: `Client`, `BurstPolicy`
//! - **`discipline`**: Admission and turn-end rules: FIFO, Priority,
//!   Shortest Remaining Time, Round Robin
//! - **`scheduler`**: `ServiceScheduler`, the per-tick state machine
//! - **`simulation`**: Deterministic driver, burst log, timeline and KPIs
//! - **`config`**: Serde-loadable scheduler settings
//!
//! # Architecture
//!
//! The crate is a synchronous library. It spawns no threads, reads no
//! clock and performs no I/O; a driver owns the scheduler and calls it
//! once per tick. Events are reported through `tracing`.
//!
//! # References
//!
//! - Kleinrock (1976), "Queueing Systems, Volume 2: Computer Applications"
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5

pub mod config;
pub mod discipline;
pub mod error;
pub mod list;
pub mod models;
pub mod scheduler;
pub mod simulation;

pub use error::{QueueError, Result};
