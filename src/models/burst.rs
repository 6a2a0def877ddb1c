//! Burst policy: how long an occupant keeps the service slot.

use serde::{Deserialize, Serialize};

use crate::error::{QueueError, Result};

/// Rule deciding whether the occupant keeps the slot after a tick.
///
/// # Example
///
/// ```
/// use u_service_queue::models::BurstPolicy;
///
/// let policy = BurstPolicy::FixedQuantum(2);
/// assert!(policy.keeps_slot(1, false));
/// assert!(!policy.keeps_slot(2, false));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurstPolicy {
    /// The occupant keeps the slot until its demand reaches zero.
    #[default]
    RunToCompletion,
    /// The occupant's turn ends after every tick.
    EveryTick,
    /// The occupant keeps the slot for exactly `n` consecutive ticks,
    /// even if its demand runs out earlier.
    FixedQuantum(usize),
}

impl BurstPolicy {
    /// Rejects a zero quantum.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::FixedQuantum(0) => Err(QueueError::invalid("quantum must be positive")),
            _ => Ok(()),
        }
    }

    /// The fixed time slice, if any.
    pub fn quantum(&self) -> Option<usize> {
        match self {
            Self::FixedQuantum(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the policy lets an occupant run until it is finished.
    pub fn run_to_completion(&self) -> bool {
        matches!(self, Self::RunToCompletion)
    }

    /// Continue-serving condition, evaluated after `elapsed` ticks of the
    /// current turn.
    pub fn keeps_slot(&self, elapsed: usize, occupant_done: bool) -> bool {
        let within_quantum = self.quantum().is_some_and(|quantum| elapsed < quantum);
        within_quantum || (self.run_to_completion() && !occupant_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantum() {
        assert!(BurstPolicy::FixedQuantum(1).validate().is_ok());
        assert!(BurstPolicy::RunToCompletion.validate().is_ok());
        assert!(matches!(
            BurstPolicy::FixedQuantum(0).validate(),
            Err(QueueError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_keeps_slot() {
        assert!(!BurstPolicy::EveryTick.keeps_slot(1, false));

        assert!(BurstPolicy::RunToCompletion.keeps_slot(7, false));
        assert!(!BurstPolicy::RunToCompletion.keeps_slot(7, true));

        // A finished client still holds the slot until the quantum expires.
        assert!(BurstPolicy::FixedQuantum(3).keeps_slot(1, true));
        assert!(!BurstPolicy::FixedQuantum(3).keeps_slot(3, false));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BurstPolicy::FixedQuantum(4)).unwrap();
        assert_eq!(json, r#"{"fixed_quantum":4}"#);
        let policy: BurstPolicy = serde_json::from_str(r#""run_to_completion""#).unwrap();
        assert_eq!(policy, BurstPolicy::RunToCompletion);
    }
}
