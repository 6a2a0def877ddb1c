//! Single-server service scheduling.
//!
//! [`ServiceScheduler`] owns the waiting sequence and advances one unit of
//! work per call to `serve`. The discipline it was built with decides
//! admission order and what happens at turn end.
//!
//! # Concurrency
//!
//! The scheduler is a plain single-threaded state machine. The driver
//! serializes every call; nothing inside blocks, sleeps or spawns.

mod service;

pub use service::{ClientHandle, ServiceScheduler};
