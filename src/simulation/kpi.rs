//! Simulation performance indicators.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | Ticks from start through the last completion |
//! | Avg Turnaround | Mean(completion - arrival + 1) |
//! | Avg Waiting | Mean(turnaround - ticks spent in the slot) |
//! | Utilization | Busy ticks / elapsed ticks |
//! | Throughput | Departures / elapsed ticks |

use std::collections::HashMap;

use super::Simulation;

/// Queue performance indicators. All times are in ticks.
#[derive(Debug, Clone)]
pub struct SimulationKpi {
    /// Number of departed clients.
    pub completed: usize,
    /// Ticks from the start through the last completion.
    pub makespan: i64,
    /// Mean turnaround of departed clients.
    pub avg_turnaround: f64,
    /// Mean waiting time of departed clients.
    pub avg_waiting: f64,
    /// Largest waiting time of any departed client.
    pub max_waiting: i64,
    /// Fraction of elapsed ticks the server was busy (0.0..1.0).
    pub utilization: f64,
    /// Departures per elapsed tick.
    pub throughput: f64,
    /// Number of turns each client id received.
    pub turns_by_client: HashMap<String, usize>,
}

impl SimulationKpi {
    /// Computes KPIs from a simulation's departures, log and timeline.
    pub fn calculate(simulation: &Simulation) -> Self {
        let departures = simulation.departures();
        let completed = departures.len();

        let makespan = departures
            .iter()
            .map(|d| d.completed_at - simulation.start_time() + 1)
            .max()
            .unwrap_or(0);

        let (total_turnaround, total_waiting, max_waiting) = departures.iter().fold(
            (0_i64, 0_i64, 0_i64),
            |(turnaround, waiting, max), d| {
                (
                    turnaround + d.turnaround(),
                    waiting + d.waiting(),
                    max.max(d.waiting()),
                )
            },
        );
        let mean = |total: i64| {
            if completed > 0 {
                total as f64 / completed as f64
            } else {
                0.0
            }
        };

        let elapsed = simulation.elapsed();
        let per_tick = |count: usize| {
            if elapsed > 0 {
                count as f64 / elapsed as f64
            } else {
                0.0
            }
        };

        let mut turns_by_client: HashMap<String, usize> = HashMap::new();
        for row in simulation.log().rows().iter().filter(|r| r.served > 0) {
            *turns_by_client.entry(row.client_id.clone()).or_default() += 1;
        }

        Self {
            completed,
            makespan,
            avg_turnaround: mean(total_turnaround),
            avg_waiting: mean(total_waiting),
            max_waiting,
            utilization: per_tick(simulation.timeline().busy_ticks()),
            throughput: per_tick(completed),
            turns_by_client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BurstPolicy, Client};
    use crate::scheduler::ServiceScheduler;

    #[test]
    fn test_kpi_run_to_completion() {
        let mut sim = Simulation::new(ServiceScheduler::new(BurstPolicy::RunToCompletion).unwrap());
        sim.add_arrival(Client::new("A", 2, 0).unwrap()).unwrap();
        sim.add_arrival(Client::new("B", 2, 0).unwrap()).unwrap();
        sim.add_arrival(Client::new("C", 1, 6).unwrap()).unwrap();
        sim.run_until_idle(20).unwrap();

        let kpi = SimulationKpi::calculate(&sim);
        assert_eq!(kpi.completed, 3);
        // A: 0-1, B: 2-3, idle 4-5, C: 6
        assert_eq!(kpi.makespan, 7);
        assert!((kpi.avg_turnaround - (2.0 + 4.0 + 1.0) / 3.0).abs() < 1e-10);
        assert!((kpi.avg_waiting - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(kpi.max_waiting, 2);
        assert!((kpi.utilization - 5.0 / 7.0).abs() < 1e-10);
        assert!((kpi.throughput - 3.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_turns_under_round_robin() {
        let mut sim = Simulation::new(ServiceScheduler::round_robin(1).unwrap());
        sim.add_arrival(Client::new("A", 3, 0).unwrap()).unwrap();
        sim.add_arrival(Client::new("B", 1, 0).unwrap()).unwrap();
        sim.run_until_idle(20).unwrap();

        let kpi = SimulationKpi::calculate(&sim);
        assert_eq!(kpi.turns_by_client.get("A"), Some(&3));
        assert_eq!(kpi.turns_by_client.get("B"), Some(&1));
        assert!((kpi.utilization - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty_simulation() {
        let sim = Simulation::new(ServiceScheduler::new(BurstPolicy::EveryTick).unwrap());
        let kpi = SimulationKpi::calculate(&sim);
        assert_eq!(kpi.completed, 0);
        assert_eq!(kpi.makespan, 0);
        assert_eq!(kpi.avg_waiting, 0.0);
        assert_eq!(kpi.utilization, 0.0);
    }
}
