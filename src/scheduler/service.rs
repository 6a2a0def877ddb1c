//! Single-server service state machine.
//!
//! # Algorithm
//!
//! Each call to [`ServiceScheduler::serve`] is one discrete tick:
//!
//! 1. The client at position 0 takes (or keeps) the service slot and
//!    receives one unit of service.
//! 2. If the burst policy lets it continue, nothing else happens.
//! 3. Otherwise its turn ends: a finished client departs and is handed
//!    back to the caller, an unfinished one is re-admitted through the
//!    discipline's admission rule.
//!
//! The elapsed-service counter belongs to the current turn and is reset
//! whenever the slot changes hands.

use tracing::{debug, trace};

use crate::discipline::{AdmissionContext, Discipline, Fifo, RoundRobin, TurnEnd};
use crate::error::{QueueError, Result};
use crate::list::{Handle, OrderedList};
use crate::models::{BurstPolicy, Client};

/// Identity of an admitted client.
///
/// Stays valid across rotations until the client departs or is removed.
pub type ClientHandle = Handle;

/// A single-server queue with a pluggable service discipline.
///
/// # Example
///
/// ```
/// use u_service_queue::models::{BurstPolicy, Client};
/// use u_service_queue::scheduler::ServiceScheduler;
///
/// let mut scheduler = ServiceScheduler::new(BurstPolicy::RunToCompletion).unwrap();
/// scheduler.enqueue(Client::new("A", 2, 0).unwrap()).unwrap();
///
/// assert!(scheduler.serve().unwrap().is_none());
/// let departed = scheduler.serve().unwrap().unwrap();
/// assert_eq!(departed.id, "A");
/// assert!(scheduler.is_empty());
/// ```
#[derive(Debug)]
pub struct ServiceScheduler {
    queue: OrderedList<Client>,
    discipline: Box<dyn Discipline>,
    policy: BurstPolicy,
    elapsed_service: usize,
    serving: Option<ClientHandle>,
}

impl ServiceScheduler {
    /// Creates a FIFO scheduler.
    ///
    /// Fails with `InvalidArgument` for `FixedQuantum(0)`.
    pub fn new(policy: BurstPolicy) -> Result<Self> {
        Self::with_discipline(policy, Fifo)
    }

    /// Creates a round-robin scheduler with the given quantum.
    pub fn round_robin(quantum: usize) -> Result<Self> {
        Self::with_discipline(BurstPolicy::FixedQuantum(quantum), RoundRobin)
    }

    /// Creates a scheduler running `discipline` under `policy`.
    pub fn with_discipline(
        policy: BurstPolicy,
        discipline: impl Discipline + 'static,
    ) -> Result<Self> {
        Self::from_boxed(policy, Box::new(discipline))
    }

    pub(crate) fn from_boxed(policy: BurstPolicy, discipline: Box<dyn Discipline>) -> Result<Self> {
        policy.validate()?;
        discipline.check_policy(&policy)?;
        Ok(Self {
            queue: OrderedList::new(),
            discipline,
            policy,
            elapsed_service: 0,
            serving: None,
        })
    }

    /// Admits a client under the active discipline.
    ///
    /// Fails with `InvalidArgument` for a malformed client or one missing
    /// the admission key the discipline requires, and with `OutOfRange`
    /// when the discipline picks a position past the tail. Failed
    /// admissions leave the queue and the current turn untouched.
    ///
    /// An admission that lands in the service slot while the occupant is
    /// mid-turn preempts it.
    pub fn enqueue(&mut self, mut client: Client) -> Result<ClientHandle> {
        client.validate()?;
        self.discipline.prepare(&mut client)?;

        let pos = self.discipline.admission_position(&client, &self.context());
        let len = self.queue.len();
        if pos > len {
            return Err(QueueError::OutOfRange { pos, len });
        }
        if pos == 0 && self.elapsed_service > 0 {
            debug!(
                client = %client.id,
                elapsed = self.elapsed_service,
                "arrival preempts the occupant"
            );
            self.end_turn();
        }

        debug!(
            client = %client.id,
            pos,
            discipline = self.discipline.name(),
            "client admitted"
        );
        self.queue.insert(client, pos)
    }

    /// Checks whether `client` could be admitted, without admitting it.
    ///
    /// Catches malformed clients and clients missing a required admission
    /// key.
    pub fn check_admission(&self, client: &Client) -> Result<()> {
        client.validate()?;
        self.discipline.check_client(client)
    }

    /// Serves one tick.
    ///
    /// Returns the departed client when the occupant's turn ends with its
    /// demand exhausted, `None` otherwise. Fails with `EmptyService` when
    /// no client is waiting, and with `OutOfRange` when the discipline
    /// re-admits the occupant past the tail; the occupant is then kept at
    /// the tail.
    pub fn serve(&mut self) -> Result<Option<Client>> {
        if self.queue.is_empty() {
            return Err(QueueError::EmptyService);
        }
        let occupant = self.queue.handle_at(0)?;
        if self.serving != Some(occupant) {
            self.serving = Some(occupant);
            self.elapsed_service = 0;
        }

        let client = self.queue.value_mut(occupant).ok_or(QueueError::NotFound)?;
        client.respond(1)?;
        self.elapsed_service += 1;
        trace!(
            client = %client.id,
            remaining = client.remaining_demand(),
            elapsed = self.elapsed_service,
            "tick served"
        );

        if self.policy.keeps_slot(self.elapsed_service, client.is_done()) {
            return Ok(None);
        }

        let turn_end = self.discipline.on_turn_end(client);
        self.end_turn();
        match turn_end {
            TurnEnd::Depart => {
                let departed = self.queue.remove_handle(occupant)?;
                debug!(client = %departed.id, sojourn = ?departed.sojourn_time(), "client departed");
                Ok(Some(departed))
            }
            TurnEnd::Rotate => {
                self.queue.detach(occupant)?;
                let client = self.queue.value(occupant).ok_or(QueueError::NotFound)?;
                let pos = self.discipline.admission_position(client, &self.context());
                let len = self.queue.len();
                if pos > len {
                    // Keep the client reachable before reporting the bad position.
                    self.queue.attach(occupant, len)?;
                    return Err(QueueError::OutOfRange { pos, len });
                }
                debug!(client = %client.id, pos, "occupant rotated");
                self.queue.attach(occupant, pos)?;
                Ok(None)
            }
        }
    }

    /// Cancels a waiting or serving client and hands it back.
    ///
    /// Removing the client at the service slot resets the elapsed service.
    pub fn remove(&mut self, handle: ClientHandle) -> Result<Client> {
        let pos = self.queue.index_of(handle).ok_or(QueueError::NotFound)?;
        if pos == 0 {
            self.end_turn();
        }
        let client = self.queue.remove_handle(handle)?;
        debug!(client = %client.id, pos, "client removed");
        Ok(client)
    }

    /// Ticks given to the current occupant in its ongoing turn.
    pub fn current_service(&self) -> usize {
        self.elapsed_service
    }

    /// Client at `pos` in service order (0 = service slot).
    pub fn get(&self, pos: usize) -> Result<&Client> {
        self.queue.get(pos)
    }

    /// Client behind `handle`, if it is still queued.
    pub fn client(&self, handle: ClientHandle) -> Option<&Client> {
        self.queue
            .contains(handle)
            .then(|| self.queue.value(handle))
            .flatten()
    }

    /// Position of `handle` in service order.
    pub fn position(&self, handle: ClientHandle) -> Option<usize> {
        self.queue.index_of(handle)
    }

    /// Handle of the client at `pos`.
    pub fn handle_at(&self, pos: usize) -> Result<ClientHandle> {
        self.queue.handle_at(pos)
    }

    /// The client holding the service slot mid-turn, if any.
    pub fn occupant(&self) -> Option<&Client> {
        self.serving.and_then(|handle| self.queue.value(handle))
    }

    /// Handle of the client holding the service slot mid-turn.
    pub fn occupant_handle(&self) -> Option<ClientHandle> {
        self.serving
    }

    /// Number of clients, including the one in the service slot.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no client is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Active burst policy.
    pub fn policy(&self) -> BurstPolicy {
        self.policy
    }

    /// Active discipline.
    pub fn discipline(&self) -> &dyn Discipline {
        self.discipline.as_ref()
    }

    /// Clients in service order, front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Client> + '_ {
        self.queue.iter()
    }

    /// Clients with their handles, in service order.
    pub fn entries(&self) -> impl Iterator<Item = (ClientHandle, &Client)> + '_ {
        self.queue.entries()
    }

    /// Ring invariants of the backing list.
    pub fn is_consistent(&self) -> bool {
        self.queue.is_consistent()
    }

    fn context(&self) -> AdmissionContext<'_> {
        AdmissionContext {
            queue: &self.queue,
            in_service: self.elapsed_service > 0,
        }
    }

    fn end_turn(&mut self) {
        self.elapsed_service = 0;
        self.serving = None;
    }
}
