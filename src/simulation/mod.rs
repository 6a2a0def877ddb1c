//! Tick-driven simulation over a [`ServiceScheduler`].
//!
//! Provides a deterministic driver that admits scheduled arrivals, serves
//! one tick at a time and records what happened.
//!
//! # Records
//!
//! - **`ServiceLog`**: one row per stay in the queue (waiting, running,
//!   preempted, finished, cancelled).
//! - **`Timeline`**: which client held the slot at each tick; merges into
//!   Gantt segments.
//! - **`SimulationKpi`**: turnaround, waiting, utilization, throughput.
//!
//! [`ServiceScheduler`]: crate::scheduler::ServiceScheduler

mod driver;
mod kpi;
mod log;

pub use driver::{Departure, Simulation};
pub use kpi::SimulationKpi;
pub use log::{BurstRecord, BurstState, Segment, ServiceLog, Timeline, TimelineSlot};
