//! Burst log and service timeline.
//!
//! The log keeps one row per stay in the queue: a row opens when a client
//! is admitted (or re-admitted after its turn) and closes when its turn
//! ends. The timeline is the Gantt row of the server: who held the slot
//! at every tick.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a burst row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurstState {
    /// Queued, not served yet in this stay.
    Waiting,
    /// Holding the service slot.
    Running,
    /// Turn ended with demand left; the client was re-admitted.
    Preempted,
    /// Turn ended with no demand left; the client departed.
    Finished,
    /// Removed by the driver.
    Cancelled,
}

/// One stay of a client in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstRecord {
    /// Client identifier.
    pub client_id: String,
    /// Current state.
    pub state: BurstState,
    /// Tick at which the client first arrived.
    pub arrival_time: i64,
    /// Tick at which this stay began.
    pub opened_at: i64,
    /// Remaining demand when this stay began.
    pub demand: i64,
    /// Ticks of service received during this stay.
    pub served: i64,
    /// Tick at which this stay ended.
    pub closed_at: Option<i64>,
}

impl BurstRecord {
    /// Whether the stay is still in progress.
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

/// Ordered collection of burst rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceLog {
    rows: Vec<BurstRecord>,
}

impl ServiceLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in the order they were opened.
    pub fn rows(&self) -> &[BurstRecord] {
        &self.rows
    }

    /// Rows belonging to `client_id`.
    pub fn rows_for<'a>(&'a self, client_id: &'a str) -> impl Iterator<Item = &'a BurstRecord> {
        self.rows.iter().filter(move |row| row.client_id == client_id)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was ever opened.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn open(
        &mut self,
        client_id: &str,
        arrival_time: i64,
        opened_at: i64,
        demand: i64,
    ) -> usize {
        self.rows.push(BurstRecord {
            client_id: client_id.to_string(),
            state: BurstState::Waiting,
            arrival_time,
            opened_at,
            demand,
            served: 0,
            closed_at: None,
        });
        self.rows.len() - 1
    }

    pub(crate) fn record_service(&mut self, row: usize) {
        if let Some(record) = self.rows.get_mut(row) {
            record.state = BurstState::Running;
            record.served += 1;
        }
    }

    pub(crate) fn close(&mut self, row: usize, state: BurstState, at: i64) {
        if let Some(record) = self.rows.get_mut(row) {
            record.state = state;
            record.closed_at = Some(at);
        }
    }
}

/// Slot occupancy at one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSlot {
    /// Tick number.
    pub tick: i64,
    /// Client served during the tick, `None` when idle.
    pub client_id: Option<String>,
}

/// Consecutive ticks served to the same client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Client served.
    pub client_id: String,
    /// First tick (inclusive).
    pub start: i64,
    /// Last tick (inclusive).
    pub end: i64,
}

/// Per-tick record of the service slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    slots: Vec<TimelineSlot>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, tick: i64, client_id: Option<String>) {
        self.slots.push(TimelineSlot { tick, client_id });
    }

    /// Recorded ticks.
    pub fn slots(&self) -> &[TimelineSlot] {
        &self.slots
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no tick was recorded.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Ticks during which a client was served.
    pub fn busy_ticks(&self) -> usize {
        self.slots.iter().filter(|s| s.client_id.is_some()).count()
    }

    /// Merges consecutive ticks of the same client into Gantt bars.
    ///
    /// Idle ticks split segments. Two distinct clients sharing an id are
    /// merged if served back to back.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        for slot in &self.slots {
            let Some(id) = &slot.client_id else {
                continue;
            };
            match segments.last_mut() {
                Some(last) if last.client_id == *id && last.end + 1 == slot.tick => {
                    last.end = slot.tick;
                }
                _ => segments.push(Segment {
                    client_id: id.clone(),
                    start: slot.tick,
                    end: slot.tick,
                }),
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_row_lifecycle() {
        let mut log = ServiceLog::new();
        let row = log.open("A", 0, 0, 3);
        assert!(log.rows()[row].is_open());
        assert_eq!(log.rows()[row].state, BurstState::Waiting);

        log.record_service(row);
        log.record_service(row);
        assert_eq!(log.rows()[row].state, BurstState::Running);
        assert_eq!(log.rows()[row].served, 2);

        log.close(row, BurstState::Preempted, 1);
        log.open("A", 0, 2, 1);
        assert_eq!(log.rows_for("A").count(), 2);
        assert_eq!(log.rows()[row].closed_at, Some(1));
    }

    #[test]
    fn test_timeline_segments() {
        let mut timeline = Timeline::new();
        for (tick, id) in [(0, Some("A")), (1, Some("A")), (2, None), (3, Some("A")), (4, Some("B"))] {
            timeline.push(tick, id.map(String::from));
        }

        assert_eq!(timeline.busy_ticks(), 4);
        let bars: Vec<_> = timeline
            .segments()
            .into_iter()
            .map(|s| (s.client_id, s.start, s.end))
            .collect();
        assert_eq!(
            bars,
            vec![
                ("A".to_string(), 0, 1),
                ("A".to_string(), 3, 3),
                ("B".to_string(), 4, 4)
            ]
        );
    }
}
