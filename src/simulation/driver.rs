//! Deterministic tick driver.
//!
//! # Algorithm
//!
//! Each tick:
//! 1. Admit every pending arrival whose `arrival_time` has been reached.
//! 2. Serve one tick if anyone is queued, otherwise record an idle tick.
//! 3. Close and reopen burst rows for turns that ended.
//! 4. Advance the clock.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::log::{BurstState, ServiceLog, Timeline};
use crate::error::{QueueError, Result};
use crate::models::Client;
use crate::scheduler::{ClientHandle, ServiceScheduler};

/// A client that left the system, with the tick it completed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departure {
    /// The departed client.
    pub client: Client,
    /// Tick during which its final unit of service was given.
    pub completed_at: i64,
}

impl Departure {
    /// Ticks from arrival through completion, inclusive.
    pub fn turnaround(&self) -> i64 {
        self.completed_at - self.client.arrival_time() + 1
    }

    /// Turnaround ticks spent outside the service slot.
    ///
    /// Ticks a finished client keeps the slot until its quantum expires
    /// count as slot time, not waiting.
    pub fn waiting(&self) -> i64 {
        self.turnaround() - self.client.sojourn_time().unwrap_or(0)
    }
}

/// Drives a [`ServiceScheduler`] through discrete ticks.
///
/// # Example
///
/// ```
/// use u_service_queue::models::{BurstPolicy, Client};
/// use u_service_queue::scheduler::ServiceScheduler;
/// use u_service_queue::simulation::Simulation;
///
/// let scheduler = ServiceScheduler::round_robin(2).unwrap();
/// let mut sim = Simulation::new(scheduler);
/// sim.add_arrival(Client::new("A", 3, 0).unwrap()).unwrap();
/// sim.add_arrival(Client::new("B", 1, 1).unwrap()).unwrap();
///
/// let ticks = sim.run_until_idle(100).unwrap();
/// assert_eq!(ticks, 6);
/// assert_eq!(sim.departures().len(), 2);
/// ```
#[derive(Debug)]
pub struct Simulation {
    scheduler: ServiceScheduler,
    start_time: i64,
    clock: i64,
    pending: VecDeque<Client>,
    log: ServiceLog,
    timeline: Timeline,
    departures: Vec<Departure>,
    open_rows: HashMap<ClientHandle, usize>,
}

impl Simulation {
    /// Wraps a scheduler; the clock starts at 0.
    pub fn new(scheduler: ServiceScheduler) -> Self {
        Self {
            scheduler,
            start_time: 0,
            clock: 0,
            pending: VecDeque::new(),
            log: ServiceLog::new(),
            timeline: Timeline::new(),
            departures: Vec::new(),
            open_rows: HashMap::new(),
        }
    }

    /// Sets the first tick number.
    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = start_time;
        self.clock = start_time;
        self
    }

    /// Schedules a client for admission once the clock reaches its
    /// arrival time. Arrivals already in the past are admitted on the
    /// next tick.
    ///
    /// Fails with `InvalidArgument` for clients the scheduler's discipline
    /// would reject on admission.
    pub fn add_arrival(&mut self, client: Client) -> Result<()> {
        self.scheduler.check_admission(&client)?;
        let at = self
            .pending
            .partition_point(|queued| queued.arrival_time() <= client.arrival_time());
        self.pending.insert(at, client);
        Ok(())
    }

    /// Runs one tick and returns the departure it produced, if any.
    pub fn tick(&mut self) -> Result<Option<&Departure>> {
        self.admit_due()?;
        let tick = self.clock;
        self.clock += 1;

        if self.scheduler.is_empty() {
            trace!(tick, "server idle");
            self.timeline.push(tick, None);
            return Ok(None);
        }

        let occupant = self.scheduler.handle_at(0)?;
        let id = self.scheduler.get(0)?.id.clone();
        let row = self.open_rows.get(&occupant).copied();
        if let Some(row) = row {
            self.log.record_service(row);
        }

        let departed = self.scheduler.serve()?;
        self.timeline.push(tick, Some(id));

        if self.scheduler.current_service() > 0 {
            return Ok(None);
        }

        match departed {
            Some(client) => {
                if let Some(row) = self.open_rows.remove(&occupant) {
                    self.log.close(row, BurstState::Finished, tick);
                }
                debug!(client = %client.id, tick, "departure recorded");
                self.departures.push(Departure {
                    client,
                    completed_at: tick,
                });
                Ok(self.departures.last())
            }
            None => {
                self.reopen(occupant, BurstState::Preempted, tick);
                Ok(None)
            }
        }
    }

    /// Ticks until nothing is pending or queued; returns the ticks run.
    ///
    /// Fails with `InvalidArgument` if `max_ticks` runs out first.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> Result<usize> {
        let mut ticks = 0;
        while !self.is_idle() {
            if ticks == max_ticks {
                return Err(QueueError::invalid(format!(
                    "simulation still busy after {max_ticks} ticks"
                )));
            }
            self.tick()?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Cancels a queued client and closes its burst row.
    pub fn cancel(&mut self, handle: ClientHandle) -> Result<Client> {
        let client = self.scheduler.remove(handle)?;
        if let Some(row) = self.open_rows.remove(&handle) {
            self.log.close(row, BurstState::Cancelled, self.clock);
        }
        Ok(client)
    }

    /// Whether no client is pending or queued.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.scheduler.is_empty()
    }

    /// Next tick number.
    pub fn clock(&self) -> i64 {
        self.clock
    }

    /// First tick number.
    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Ticks run so far.
    pub fn elapsed(&self) -> i64 {
        self.clock - self.start_time
    }

    /// The driven scheduler.
    pub fn scheduler(&self) -> &ServiceScheduler {
        &self.scheduler
    }

    /// Arrivals not admitted yet.
    pub fn pending(&self) -> impl Iterator<Item = &Client> + '_ {
        self.pending.iter()
    }

    /// Burst rows.
    pub fn log(&self) -> &ServiceLog {
        &self.log
    }

    /// Slot occupancy per tick.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Departures in completion order.
    pub fn departures(&self) -> &[Departure] {
        &self.departures
    }

    fn admit_due(&mut self) -> Result<()> {
        while self
            .pending
            .front()
            .is_some_and(|client| client.arrival_time() <= self.clock)
        {
            // Stays pending until the scheduler accepts it.
            let Some(client) = self.pending.front().cloned() else {
                break;
            };
            let id = client.id.clone();
            let arrival = client.arrival_time();
            let demand = client.remaining_demand();

            let occupant = self.scheduler.occupant_handle();
            let handle = self.scheduler.enqueue(client)?;
            self.pending.pop_front();

            if let Some(previous) = occupant {
                if self.scheduler.current_service() == 0 {
                    self.reopen(previous, BurstState::Preempted, self.clock - 1);
                }
            }

            let row = self.log.open(&id, arrival, self.clock, demand);
            self.open_rows.insert(handle, row);
        }
        Ok(())
    }

    /// Closes the client's current row and opens a fresh waiting row.
    fn reopen(&mut self, handle: ClientHandle, state: BurstState, closed_at: i64) {
        if let Some(row) = self.open_rows.remove(&handle) {
            self.log.close(row, state, closed_at);
        }
        if let Some(client) = self.scheduler.client(handle) {
            let row = self.log.open(
                &client.id,
                client.arrival_time(),
                closed_at + 1,
                client.remaining_demand(),
            );
            self.open_rows.insert(handle, row);
        }
    }
}
