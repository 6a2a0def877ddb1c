//! Scheduler configuration.
//!
//! A [`SchedulerConfig`] can be built in code or deserialized from a
//! driver's settings file, then turned into a [`ServiceScheduler`].
//!
//! # Example
//!
//! ```
//! use u_service_queue::config::{DisciplineConfig, SchedulerConfig};
//! use u_service_queue::models::BurstPolicy;
//!
//! let scheduler = SchedulerConfig::new(BurstPolicy::FixedQuantum(3))
//!     .with_discipline(DisciplineConfig::RoundRobin)
//!     .build()
//!     .unwrap();
//! assert_eq!(scheduler.discipline().name(), "RR");
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discipline::{
    Discipline, Fifo, Priority, RandomPriority, RoundRobin, ShortestRemainingTime,
};
use crate::error::Result;
use crate::models::BurstPolicy;
use crate::scheduler::ServiceScheduler;

fn default_min_priority() -> i32 {
    1
}

fn default_max_priority() -> i32 {
    5
}

/// Which discipline to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisciplineConfig {
    /// First In, First Out.
    #[default]
    Fifo,
    /// Priority order; clients without a priority get a random one.
    Priority {
        /// Lowest assignable priority.
        #[serde(default = "default_min_priority")]
        min: i32,
        /// Highest assignable priority.
        #[serde(default = "default_max_priority")]
        max: i32,
        /// Seed for reproducible assignment.
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Priority order; clients must carry a priority.
    StrictPriority,
    /// Shortest remaining demand first.
    ShortestRemainingTime,
    /// Round robin (requires a fixed quantum).
    RoundRobin,
}

/// Scheduler settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How long an occupant keeps the slot.
    #[serde(default)]
    pub burst: BurstPolicy,
    /// Admission and rotation rules.
    #[serde(default)]
    pub discipline: DisciplineConfig,
}

impl SchedulerConfig {
    /// FIFO under the given burst policy.
    pub fn new(burst: BurstPolicy) -> Self {
        Self {
            burst,
            discipline: DisciplineConfig::Fifo,
        }
    }

    /// Round robin with quantum `quantum`.
    pub fn round_robin(quantum: usize) -> Self {
        Self::new(BurstPolicy::FixedQuantum(quantum)).with_discipline(DisciplineConfig::RoundRobin)
    }

    /// Sets the discipline.
    pub fn with_discipline(mut self, discipline: DisciplineConfig) -> Self {
        self.discipline = discipline;
        self
    }

    /// Validates the settings and constructs the scheduler.
    ///
    /// Fails with `InvalidArgument` for a zero quantum, an empty priority
    /// range, or round robin without a fixed quantum.
    pub fn build(&self) -> Result<ServiceScheduler> {
        let discipline: Box<dyn Discipline> = match &self.discipline {
            DisciplineConfig::Fifo => Box::new(Fifo),
            DisciplineConfig::Priority { min, max, seed } => {
                let policy = match seed {
                    Some(seed) => RandomPriority::seeded(*min, *max, *seed)?,
                    None => RandomPriority::new(*min, *max)?,
                };
                Box::new(Priority::with_policy(policy))
            }
            DisciplineConfig::StrictPriority => Box::new(Priority::strict()),
            DisciplineConfig::ShortestRemainingTime => Box::new(ShortestRemainingTime),
            DisciplineConfig::RoundRobin => Box::new(RoundRobin),
        };
        debug!(burst = ?self.burst, discipline = discipline.name(), "building scheduler");
        ServiceScheduler::from_boxed(self.burst, discipline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::models::Client;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.burst, BurstPolicy::RunToCompletion);
        assert_eq!(config.discipline, DisciplineConfig::Fifo);
        assert_eq!(config.build().unwrap().discipline().name(), "FIFO");
    }

    #[test]
    fn test_deserialize_round_robin() {
        let config: SchedulerConfig = serde_json::from_str(
            r#"{"burst":{"fixed_quantum":5},"discipline":{"kind":"round_robin"}}"#,
        )
        .unwrap();
        assert_eq!(config, SchedulerConfig::round_robin(5));
        let scheduler = config.build().unwrap();
        assert_eq!(scheduler.policy().quantum(), Some(5));
    }

    #[test]
    fn test_deserialize_priority_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"burst":"every_tick","discipline":{"kind":"priority","seed":9}}"#)
                .unwrap();
        assert_eq!(
            config.discipline,
            DisciplineConfig::Priority {
                min: 1,
                max: 5,
                seed: Some(9)
            }
        );

        let mut scheduler = config.build().unwrap();
        let handle = scheduler.enqueue(Client::new("A", 1, 0).unwrap()).unwrap();
        let priority = scheduler.client(handle).and_then(|c| c.priority);
        assert!(priority.is_some_and(|p| (1..=5).contains(&p)));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            SchedulerConfig::new(BurstPolicy::FixedQuantum(0)).build(),
            Err(QueueError::InvalidArgument(_))
        ));
        assert!(matches!(
            SchedulerConfig::new(BurstPolicy::EveryTick)
                .with_discipline(DisciplineConfig::RoundRobin)
                .build(),
            Err(QueueError::InvalidArgument(_))
        ));
        assert!(matches!(
            SchedulerConfig::new(BurstPolicy::EveryTick)
                .with_discipline(DisciplineConfig::Priority {
                    min: 3,
                    max: 1,
                    seed: None
                })
                .build(),
            Err(QueueError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serialize_roundtrip_shape() {
        let config = SchedulerConfig::new(BurstPolicy::RunToCompletion)
            .with_discipline(DisciplineConfig::ShortestRemainingTime);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"burst":"run_to_completion","discipline":{"kind":"shortest_remaining_time"}}"#
        );
    }
}
