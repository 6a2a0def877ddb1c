//! Client model.
//!
//! A client is a unit of work waiting for (or receiving) service. Its
//! demand only ever decreases, one tick of service at a time.

use serde::{Deserialize, Serialize};

use crate::error::{QueueError, Result};

/// An entity with bounded remaining demand.
///
/// # Time Representation
/// All times are discrete tick counts supplied by the driver.
/// `service_clock` starts at `arrival_time` and advances by exactly one
/// for every tick of service received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Caller-assigned identifier (not required to be unique).
    pub id: String,
    remaining_demand: i64,
    arrival_time: i64,
    service_clock: i64,
    /// Admission key for priority ordering (lower = served first).
    pub priority: Option<i32>,
}

impl Client {
    /// Creates a client arriving at `arrival_time` with `demand` units of work.
    ///
    /// Fails with `InvalidArgument` if `demand` is negative.
    pub fn new(id: impl Into<String>, demand: i64, arrival_time: i64) -> Result<Self> {
        if demand < 0 {
            return Err(QueueError::invalid(format!(
                "client demand must be non-negative, got {demand}"
            )));
        }
        Ok(Self {
            id: id.into(),
            remaining_demand: demand,
            arrival_time,
            service_clock: arrival_time,
            priority: None,
        })
    }

    /// Sets the priority used by priority-ordered admission.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Remaining units of work.
    pub fn remaining_demand(&self) -> i64 {
        self.remaining_demand
    }

    /// Tick at which the client arrived.
    pub fn arrival_time(&self) -> i64 {
        self.arrival_time
    }

    /// Tick count advanced once per unit of service received.
    pub fn service_clock(&self) -> i64 {
        self.service_clock
    }

    /// Serves up to `quantity` units of demand during one tick.
    ///
    /// The demand is clamped at zero, but the service clock always
    /// advances by one, even when nothing was left to serve.
    pub fn respond(&mut self, quantity: i64) -> Result<()> {
        if quantity < 0 {
            return Err(QueueError::invalid(format!(
                "service quantity must be non-negative, got {quantity}"
            )));
        }
        self.remaining_demand -= quantity.min(self.remaining_demand);
        self.service_clock += 1;
        Ok(())
    }

    /// Whether all demand has been served.
    pub fn is_done(&self) -> bool {
        self.remaining_demand == 0
    }

    /// `service_clock - arrival_time`, or `None` while demand remains.
    pub fn sojourn_time(&self) -> Option<i64> {
        self.is_done()
            .then_some(self.service_clock - self.arrival_time)
    }

    /// Checks a client that did not come through [`Client::new`]
    /// (e.g. one deserialized from a driver's input).
    pub fn validate(&self) -> Result<()> {
        if self.remaining_demand < 0 {
            return Err(QueueError::invalid(format!(
                "client '{}' has negative demand {}",
                self.id, self.remaining_demand
            )));
        }
        if self.service_clock < self.arrival_time {
            return Err(QueueError::invalid(format!(
                "client '{}' service clock precedes its arrival",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = Client::new("A", 3, 5).unwrap().with_priority(2);
        assert_eq!(client.id, "A");
        assert_eq!(client.remaining_demand(), 3);
        assert_eq!(client.arrival_time(), 5);
        assert_eq!(client.service_clock(), 5);
        assert_eq!(client.priority, Some(2));
        assert!(!client.is_done());
        assert_eq!(client.sojourn_time(), None);
    }

    #[test]
    fn test_negative_demand_rejected() {
        assert!(matches!(
            Client::new("A", -1, 0),
            Err(QueueError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_respond_clamps_and_always_ticks() {
        let mut client = Client::new("A", 2, 0).unwrap();
        client.respond(5).unwrap();
        assert_eq!(client.remaining_demand(), 0);
        assert_eq!(client.service_clock(), 1);

        client.respond(1).unwrap();
        assert_eq!(client.remaining_demand(), 0);
        assert_eq!(client.service_clock(), 2);
        assert_eq!(client.sojourn_time(), Some(2));
    }

    #[test]
    fn test_respond_zero_still_ticks() {
        let mut client = Client::new("A", 2, 10).unwrap();
        client.respond(0).unwrap();
        assert_eq!(client.remaining_demand(), 2);
        assert_eq!(client.service_clock(), 11);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let mut client = Client::new("A", 2, 0).unwrap();
        assert!(matches!(
            client.respond(-1),
            Err(QueueError::InvalidArgument(_))
        ));
        assert_eq!(client.service_clock(), 0);
    }

    #[test]
    fn test_zero_demand_is_done_immediately() {
        let client = Client::new("A", 0, 4).unwrap();
        assert!(client.is_done());
        assert_eq!(client.sojourn_time(), Some(0));
    }

    #[test]
    fn test_validate_deserialized() {
        let ok: Client = serde_json::from_str(
            r#"{"id":"A","remaining_demand":3,"arrival_time":0,"service_clock":0,"priority":null}"#,
        )
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: Client = serde_json::from_str(
            r#"{"id":"B","remaining_demand":-2,"arrival_time":0,"service_clock":0,"priority":1}"#,
        )
        .unwrap();
        assert!(matches!(bad.validate(), Err(QueueError::InvalidArgument(_))));
    }
}
