//! Priority-ordered admission.
//!
//! Lower priority values are served first. Clients without a priority are
//! either rejected or given one by a [`PriorityPolicy`].

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{insert_before_first, AdmissionContext, Discipline};
use crate::error::{QueueError, Result};
use crate::models::Client;

/// Assigns a priority to a client admitted without one.
pub trait PriorityPolicy: Send {
    /// Returns the priority for `client`.
    fn assign(&mut self, client: &Client) -> i32;
}

impl<F> PriorityPolicy for F
where
    F: FnMut(&Client) -> i32 + Send,
{
    fn assign(&mut self, client: &Client) -> i32 {
        self(client)
    }
}

/// Uniformly random priority in `[min, max]`.
#[derive(Debug, Clone)]
pub struct RandomPriority {
    rng: StdRng,
    min: i32,
    max: i32,
}

impl RandomPriority {
    /// Creates a policy seeded from the operating system.
    pub fn new(min: i32, max: i32) -> Result<Self> {
        Self::check_range(min, max)?;
        Ok(Self {
            rng: StdRng::from_os_rng(),
            min,
            max,
        })
    }

    /// Creates a reproducible policy.
    pub fn seeded(min: i32, max: i32, seed: u64) -> Result<Self> {
        Self::check_range(min, max)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            min,
            max,
        })
    }

    fn check_range(min: i32, max: i32) -> Result<()> {
        if min > max {
            return Err(QueueError::invalid(format!(
                "empty priority range [{min}, {max}]"
            )));
        }
        Ok(())
    }
}

impl PriorityPolicy for RandomPriority {
    fn assign(&mut self, _client: &Client) -> i32 {
        self.rng.random_range(self.min..=self.max)
    }
}

/// Priority discipline.
///
/// Admits before the first client with a strictly greater priority value,
/// the occupant included. While the occupant is mid-turn a newcomer that
/// would land in the service slot is placed at position 1 instead, even
/// if that puts it ahead of more urgent waiting clients.
pub struct Priority {
    policy: Option<Box<dyn PriorityPolicy>>,
}

impl Priority {
    /// Requires every admitted client to carry a priority.
    pub fn strict() -> Self {
        Self { policy: None }
    }

    /// Assigns missing priorities through `policy`.
    pub fn with_policy(policy: impl PriorityPolicy + 'static) -> Self {
        Self {
            policy: Some(Box::new(policy)),
        }
    }

    /// Assigns missing priorities uniformly from `[min, max]`.
    pub fn random(min: i32, max: i32) -> Result<Self> {
        Ok(Self::with_policy(RandomPriority::new(min, max)?))
    }
}

impl fmt::Debug for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Priority")
            .field("assigns_missing", &self.policy.is_some())
            .finish()
    }
}

impl Discipline for Priority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn check_client(&self, client: &Client) -> Result<()> {
        if client.priority.is_none() && self.policy.is_none() {
            return Err(QueueError::invalid(format!(
                "client '{}' has no priority",
                client.id
            )));
        }
        Ok(())
    }

    fn prepare(&mut self, client: &mut Client) -> Result<()> {
        self.check_client(client)?;
        if client.priority.is_none() {
            if let Some(policy) = self.policy.as_mut() {
                client.priority = Some(policy.assign(client));
            }
        }
        Ok(())
    }

    fn admission_position(&self, client: &Client, context: &AdmissionContext<'_>) -> usize {
        let Some(key) = client.priority else {
            return context.queue.len();
        };
        let pos = insert_before_first(context.queue, 0, |queued| {
            queued.priority.is_some_and(|p| key < p)
        });
        if context.in_service && pos == 0 {
            1
        } else {
            pos
        }
    }

    fn description(&self) -> &'static str {
        "Lowest priority value first"
    }
}
