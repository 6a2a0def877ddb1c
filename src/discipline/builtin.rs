//! FIFO, shortest-remaining-time and round-robin disciplines.

use super::{insert_before_first, AdmissionContext, Discipline};
use crate::error::{QueueError, Result};
use crate::models::{BurstPolicy, Client};

/// First In, First Out.
///
/// Admits at the tail. An unfinished occupant is rotated to the tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

impl Discipline for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn admission_position(&self, _client: &Client, context: &AdmissionContext<'_>) -> usize {
        context.queue.len()
    }

    fn description(&self) -> &'static str {
        "First In, First Out"
    }
}

/// Shortest Remaining Time.
///
/// Admits before the first client with strictly more remaining demand,
/// so ties keep arrival order. An arrival that lands in the service slot
/// while the occupant is mid-turn preempts it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestRemainingTime;

impl Discipline for ShortestRemainingTime {
    fn name(&self) -> &'static str {
        "SRT"
    }

    fn admission_position(&self, client: &Client, context: &AdmissionContext<'_>) -> usize {
        let demand = client.remaining_demand();
        insert_before_first(context.queue, 0, |queued| demand < queued.remaining_demand())
    }

    fn description(&self) -> &'static str {
        "Shortest Remaining Time"
    }
}

/// Round Robin.
///
/// FIFO admission under a mandatory fixed quantum.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl Discipline for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn check_policy(&self, policy: &BurstPolicy) -> Result<()> {
        match policy {
            BurstPolicy::FixedQuantum(_) => Ok(()),
            other => Err(QueueError::invalid(format!(
                "round robin requires a fixed quantum, got {other:?}"
            ))),
        }
    }

    fn admission_position(&self, _client: &Client, context: &AdmissionContext<'_>) -> usize {
        context.queue.len()
    }

    fn description(&self) -> &'static str {
        "Round Robin"
    }
}
