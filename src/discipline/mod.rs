//! Service disciplines.
//!
//! A discipline decides where an admitted client is placed in the waiting
//! sequence and what happens to the occupant when its turn ends. The
//! service state machine itself lives in [`ServiceScheduler`] and is
//! shared by every discipline.
//!
//! # Built-in disciplines
//!
//! - **FIFO**: admit at the tail, serve in order.
//! - **Priority**: admit before the first client with a strictly greater
//!   priority value.
//! - **SRT**: admit before the first client with strictly more remaining
//!   demand.
//! - **RR**: FIFO admission with a mandatory fixed quantum.
//!
//! # Usage
//!
//! ```
//! use u_service_queue::discipline::ShortestRemainingTime;
//! use u_service_queue::models::{BurstPolicy, Client};
//! use u_service_queue::scheduler::ServiceScheduler;
//!
//! let mut scheduler =
//!     ServiceScheduler::with_discipline(BurstPolicy::EveryTick, ShortestRemainingTime).unwrap();
//! scheduler.enqueue(Client::new("long", 5, 0).unwrap()).unwrap();
//! scheduler.enqueue(Client::new("short", 1, 0).unwrap()).unwrap();
//! assert_eq!(scheduler.get(0).unwrap().id, "short");
//! ```
//!
//! [`ServiceScheduler`]: crate::scheduler::ServiceScheduler

mod builtin;
mod priority;

pub use builtin::{Fifo, RoundRobin, ShortestRemainingTime};
pub use priority::{Priority, PriorityPolicy, RandomPriority};

use std::fmt::Debug;

use crate::error::Result;
use crate::list::OrderedList;
use crate::models::{BurstPolicy, Client};

/// Read-only view of the waiting sequence offered to a discipline.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionContext<'a> {
    /// Clients in service order; position 0 is the service slot.
    pub queue: &'a OrderedList<Client>,
    /// Whether the client at position 0 is mid-turn (elapsed service > 0).
    pub in_service: bool,
}

/// What happens to the occupant when its turn ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// Re-admit the occupant through the discipline's admission rule.
    Rotate,
    /// Remove the occupant and report it as a departure.
    Depart,
}

/// Admission ordering and turn-end policy for a [`ServiceScheduler`].
///
/// [`ServiceScheduler`]: crate::scheduler::ServiceScheduler
pub trait Discipline: Send + Debug {
    /// Short name (e.g., "FIFO", "RR").
    fn name(&self) -> &'static str;

    /// Rejects burst policies the discipline cannot run under.
    fn check_policy(&self, _policy: &BurstPolicy) -> Result<()> {
        Ok(())
    }

    /// Rejects clients the discipline can never admit, without touching
    /// any discipline state.
    fn check_client(&self, _client: &Client) -> Result<()> {
        Ok(())
    }

    /// Validates or assigns the client's admission key before placement.
    ///
    /// Called once per external admission, not on rotation.
    fn prepare(&mut self, client: &mut Client) -> Result<()> {
        self.check_client(client)
    }

    /// Position at which `client` enters the waiting sequence.
    ///
    /// Must be within `0..=context.queue.len()`.
    fn admission_position(&self, client: &Client, context: &AdmissionContext<'_>) -> usize;

    /// Decides the fate of an occupant whose turn just ended.
    fn on_turn_end(&self, occupant: &Client) -> TurnEnd {
        if occupant.is_done() {
            TurnEnd::Depart
        } else {
            TurnEnd::Rotate
        }
    }

    /// Longer description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Position before the first client at or after `from` for which
/// `goes_after` is true, or the tail if there is none.
pub(crate) fn insert_before_first<F>(
    queue: &OrderedList<Client>,
    from: usize,
    mut goes_after: F,
) -> usize
where
    F: FnMut(&Client) -> bool,
{
    queue
        .iter()
        .skip(from)
        .position(|queued| goes_after(queued))
        .map_or(queue.len(), |offset| from + offset)
}
