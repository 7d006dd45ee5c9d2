//! Side-by-side runs of the built-in game presets.
//!
//! A comparison takes one base configuration and replays it once per
//! [`Scenario`], overriding only the payoff table and the neighborhood.
//! Every scenario starts from the same seed, so on a generated lattice
//! they all share the initial placement and strategies.

use dilemma_agents::PayoffMatrix;
use dilemma_types::{NeighborhoodType, PayoffSummary};
use serde::Serialize;
use tracing::info;

use crate::config::SimulationConfig;
use crate::runner::{NoOpCallback, run_simulation};
use crate::simulation::{Simulation, SimulationError};

/// A named game preset.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Label used in logs and reports.
    pub name: &'static str,
    /// Payoff table for this run.
    pub payoff: PayoffMatrix,
    /// Neighborhood for this run.
    pub neighborhood: NeighborhoodType,
}

impl Scenario {
    /// The standard comparison set: Prisoner's Dilemma, Hawk-Dove and
    /// Stag Hunt on Moore neighborhoods, then the Prisoner's Dilemma again
    /// on Von Neumann neighborhoods.
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self {
                name: "Classic PD",
                payoff: PayoffMatrix::prisoners_dilemma(),
                neighborhood: NeighborhoodType::Moore,
            },
            Self {
                name: "Hawk-Dove",
                payoff: PayoffMatrix::hawk_dove(),
                neighborhood: NeighborhoodType::Moore,
            },
            Self {
                name: "Stag Hunt",
                payoff: PayoffMatrix::stag_hunt(),
                neighborhood: NeighborhoodType::Moore,
            },
            Self {
                name: "Von Neumann PD",
                payoff: PayoffMatrix::prisoners_dilemma(),
                neighborhood: NeighborhoodType::VonNeumann,
            },
        ]
    }
}

/// Final state of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    /// The scenario label.
    pub name: &'static str,
    /// The payoff table that was played.
    pub payoff: PayoffSummary,
    /// The neighborhood that was used.
    pub neighborhood: NeighborhoodType,
    /// Ticks executed.
    pub total_ticks: u64,
    /// Cooperation rate after the last tick.
    pub cooperation_rate: f64,
    /// Mean per-tick score after the last tick.
    pub average_score: f64,
}

/// Run every scenario for `config.run.max_ticks` ticks.
///
/// Outcomes are returned in scenario order.
///
/// # Errors
///
/// Returns [`SimulationError::Config`] if the base configuration is
/// invalid. No scenario runs in that case.
pub fn run_comparison(
    config: &SimulationConfig,
    scenarios: &[Scenario],
) -> Result<Vec<ScenarioOutcome>, SimulationError> {
    config.validate()?;
    info!(
        scenarios = scenarios.len(),
        max_ticks = config.run.max_ticks,
        seed = config.run.seed,
        "Comparison starting"
    );

    let mut outcomes = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let mut scenario_config = config.clone();
        scenario_config.dynamics.neighborhood = scenario.neighborhood;

        let mut simulation = Simulation::new(&scenario_config)?;
        simulation.set_payoff(scenario.payoff);
        let result = run_simulation(&mut simulation, config.run.max_ticks, &mut NoOpCallback);

        let metrics = simulation.metrics();
        let outcome = ScenarioOutcome {
            name: scenario.name,
            payoff: scenario.payoff.summary(),
            neighborhood: scenario.neighborhood,
            total_ticks: result.total_ticks,
            cooperation_rate: metrics.cooperation_rate,
            average_score: metrics.average_score,
        };
        info!(
            scenario = outcome.name,
            cooperation_rate = outcome.cooperation_rate,
            average_score = outcome.average_score,
            "Scenario finished"
        );
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// A full lattice of defectors that never mutates, so each table's
    /// punishment entry fixes the final average score.
    fn frozen_defectors() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.lattice.width = 6;
        config.lattice.height = 6;
        config.dynamics.initial_cooperation_rate = 0.0;
        config.dynamics.mutation_rate = 0.0;
        config.run.max_ticks = 3;
        config
    }

    #[test]
    fn standard_set_lists_the_four_presets() {
        let names: Vec<&str> = Scenario::standard_set().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["Classic PD", "Hawk-Dove", "Stag Hunt", "Von Neumann PD"]
        );
        let last = Scenario::standard_set().pop();
        assert_eq!(
            last.map(|s| s.neighborhood),
            Some(NeighborhoodType::VonNeumann)
        );
    }

    #[test]
    fn each_scenario_plays_its_own_table_and_neighborhood() {
        let outcomes = run_comparison(&frozen_defectors(), &Scenario::standard_set())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(outcomes.len(), 4);

        // punishment * neighbor count: 8 Moore neighbors, 4 Von Neumann.
        let expected = [8.0, 0.0, 16.0, 4.0];
        for (outcome, score) in outcomes.iter().zip(expected) {
            assert_eq!(outcome.total_ticks, 3);
            assert!(close(outcome.cooperation_rate, 0.0), "{}", outcome.name);
            assert!(
                close(outcome.average_score, score),
                "{}: {}",
                outcome.name,
                outcome.average_score
            );
        }
    }

    #[test]
    fn repeated_scenarios_give_identical_outcomes() {
        let mut config = SimulationConfig::default();
        config.lattice.width = 12;
        config.lattice.height = 12;
        config.run.max_ticks = 15;
        let classic = Scenario::standard_set().into_iter().take(1);
        let twice: Vec<Scenario> = classic.clone().chain(classic).collect();

        let outcomes = run_comparison(&config, &twice).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(outcomes.first(), outcomes.get(1));
    }

    #[test]
    fn invalid_base_config_runs_nothing() {
        let mut config = frozen_defectors();
        config.lattice.width = 0;
        let result = run_comparison(&config, &Scenario::standard_set());
        assert!(matches!(result, Err(SimulationError::Config { .. })));
    }
}
