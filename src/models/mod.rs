//! Queueing domain models.
//!
//! | u-service-queue | Ticket office | Operating system | Network |
//! |-----------------|---------------|------------------|---------|
//! | Client | Customer | Process | Flow |
//! | Demand | Tickets requested | CPU burst | Packets |
//! | Burst policy | Per-turn rule | Time slice | Scheduling quantum |

mod burst;
mod client;

pub use burst::BurstPolicy;
pub use client::Client;
