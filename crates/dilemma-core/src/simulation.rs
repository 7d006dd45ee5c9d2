//! The simulation facade: one lattice, one generator, one tick counter.
//!
//! [`Simulation`] owns the [`Population`], the [`Dynamics`] and the single
//! seeded [`StdRng`] every random draw comes from (placement, initial
//! strategies, mutation, random tie-breaks, asynchronous subsets). It
//! keeps no history: [`Simulation::step`] returns the tick outputs and
//! callers that want a time series collect it themselves.

use dilemma_agents::{Agent, AgentError, PayoffMatrix, Population};
use dilemma_types::{LatticeSnapshot, MetricsReport, NeighborhoodType, PayoffSummary, Strategy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::{ConfigError, SimulationConfig};
use crate::metrics;
use crate::tick::{self, Dynamics, TickSummary};

/// Errors that can occur while building or reconfiguring a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configuration was rejected.
    #[error("invalid configuration: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The population could not be built or a rule rejected its input.
    #[error("agent error: {source}")]
    Agents {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Where the starting population comes from on construction and reset.
#[derive(Debug, Clone)]
enum Origin {
    /// Random placement from the lattice parameters and the seed.
    Generated,
    /// A fixed, hand-built population.
    Fixed(Population),
}

/// A running spatial game.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Construction parameters, kept for `reset`.
    config: SimulationConfig,
    /// Payoff, neighborhood, update scheme and imitation rule.
    dynamics: Dynamics,
    /// Seed of the current run.
    seed: u64,
    /// Starting population source.
    origin: Origin,
    /// Lattice and agents.
    population: Population,
    /// The only source of randomness.
    rng: StdRng,
    /// Number of completed ticks.
    tick: u64,
}

impl Simulation {
    /// Validate `config` and place a random population.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] naming the first invalid field.
    /// No agent is created when validation fails.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let dynamics = dynamics_from(config)?;
        let seed = config.run.seed;
        let mut rng = StdRng::seed_from_u64(seed);
        let population = generate(config, &mut rng)?;

        info!(
            width = config.lattice.width,
            height = config.lattice.height,
            agents = population.len(),
            neighborhood = ?dynamics.neighborhood,
            update_type = ?dynamics.update_type,
            seed,
            "Simulation created"
        );

        Ok(Self {
            config: config.clone(),
            dynamics,
            seed,
            origin: Origin::Generated,
            population,
            rng,
            tick: 0,
        })
    }

    /// Run a hand-built population under the dynamics of `config`.
    ///
    /// The lattice section of `config` is ignored; the population defines
    /// the lattice. [`Simulation::reset`] restores this population.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] naming the first invalid field.
    pub fn from_population(
        config: &SimulationConfig,
        population: Population,
    ) -> Result<Self, SimulationError> {
        let dynamics = dynamics_from(config)?;
        let seed = config.run.seed;
        Ok(Self {
            config: config.clone(),
            dynamics,
            seed,
            origin: Origin::Fixed(population.clone()),
            population,
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
        })
    }

    /// Advance one tick and return its outputs.
    pub fn step(&mut self) -> TickSummary {
        let tick = self.tick.saturating_add(1);
        let summary = tick::run_tick(tick, &mut self.population, &self.dynamics, &mut self.rng);
        self.tick = tick;
        debug!(
            tick,
            cooperation_rate = summary.metrics.cooperation_rate,
            switched = summary.commit.switched,
            "Tick complete"
        );
        summary
    }

    /// Reinitialize agents from the construction parameters and seed.
    ///
    /// A reset run reproduces a fresh construction tick for tick, so a
    /// generated lattice gets the same placement again. Call
    /// [`Simulation::reset_with_seed`] with a new seed for a fresh random
    /// layout. The payoff table keeps any replacement made with
    /// [`Simulation::set_payoff`].
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Agents`] if placement fails; the
    /// configuration was validated at construction, so this does not
    /// happen for a simulation built with [`Simulation::new`].
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let population = match &self.origin {
            Origin::Fixed(population) => population.clone(),
            Origin::Generated => generate(&self.config, &mut rng)?,
        };
        self.population = population;
        self.rng = rng;
        self.tick = 0;
        info!(seed = self.seed, agents = self.population.len(), "Simulation reset");
        Ok(())
    }

    /// Reinitialize with a different seed.
    ///
    /// # Errors
    ///
    /// See [`Simulation::reset`].
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<(), SimulationError> {
        self.seed = seed;
        self.reset()
    }

    /// Replace the payoff table. Lattice state is untouched.
    pub fn set_payoff(&mut self, payoff: PayoffMatrix) {
        self.dynamics.payoff = payoff;
        debug!(payoff = ?payoff.summary(), "Payoff table replaced");
    }

    /// Replace the payoff table from its four classical entries.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Agents`] if an entry is not finite; the
    /// current table is kept.
    pub fn set_payoff_matrix(
        &mut self,
        reward: f64,
        sucker: f64,
        temptation: f64,
        punishment: f64,
    ) -> Result<(), SimulationError> {
        let payoff = PayoffMatrix::new(reward, sucker, temptation, punishment)?;
        self.set_payoff(payoff);
        Ok(())
    }

    /// The current payoff table.
    pub const fn payoff(&self) -> &PayoffMatrix {
        &self.dynamics.payoff
    }

    /// The payoff entries under their classical names.
    pub const fn payoff_summary(&self) -> PayoffSummary {
        self.dynamics.payoff.summary()
    }

    /// Number of completed ticks.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Seed of the current run.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Neighborhood in use.
    pub const fn neighborhood(&self) -> NeighborhoodType {
        self.dynamics.neighborhood
    }

    /// Tick parameters in use.
    pub const fn dynamics(&self) -> &Dynamics {
        &self.dynamics
    }

    /// Lattice and agents.
    pub const fn population(&self) -> &Population {
        &self.population
    }

    /// Metrics over the committed state.
    pub fn metrics(&self) -> MetricsReport {
        metrics::measure(&self.population, self.dynamics.neighborhood, self.tick)
    }

    /// Export view of every occupied cell.
    pub fn snapshot(&self) -> LatticeSnapshot {
        let lattice = self.population.lattice();
        LatticeSnapshot {
            tick: self.tick,
            width: lattice.width(),
            height: lattice.height(),
            agents: self.population.agents().iter().map(Agent::snapshot).collect(),
        }
    }

    /// Row-major `height x width` grid of committed strategies.
    pub fn strategy_grid(&self) -> Vec<Vec<Option<Strategy>>> {
        let lattice = self.population.lattice();
        let mut grid = vec![vec![None; lattice.width()]; lattice.height()];
        for agent in self.population.agents() {
            let pos = agent.position();
            if let Some(cell) = grid.get_mut(pos.y).and_then(|row| row.get_mut(pos.x)) {
                *cell = Some(agent.strategy());
            }
        }
        grid
    }
}

/// Validate `config` and derive the tick parameters.
fn dynamics_from(config: &SimulationConfig) -> Result<Dynamics, SimulationError> {
    config.validate()?;
    Ok(Dynamics {
        payoff: config.payoff_matrix()?,
        neighborhood: config.dynamics.neighborhood,
        update_type: config.dynamics.update_type,
        update_fraction: config.dynamics.update_fraction,
        rule: config.imitation_rule()?,
    })
}

/// Random placement from the lattice section.
fn generate(config: &SimulationConfig, rng: &mut StdRng) -> Result<Population, AgentError> {
    Population::generate(
        config.lattice.width,
        config.lattice.height,
        config.lattice.density,
        config.dynamics.initial_cooperation_rate,
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.lattice.width = 12;
        config.lattice.height = 10;
        config.lattice.density = 0.9;
        config.run.seed = seed;
        config
    }

    fn build(config: &SimulationConfig) -> Simulation {
        Simulation::new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn new_places_expected_agent_count() {
        let sim = build(&small_config(1));
        // round(12 * 10 * 0.9)
        assert_eq!(sim.population().len(), 108);
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn invalid_config_is_rejected_before_placement() {
        let mut config = small_config(1);
        config.lattice.width = 0;
        assert!(matches!(
            Simulation::new(&config),
            Err(SimulationError::Config { .. })
        ));
    }

    #[test]
    fn step_advances_tick_counter() {
        let mut sim = build(&small_config(2));
        let first = sim.step();
        let second = sim.step();
        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);
        assert_eq!(sim.metrics().tick, 2);
        assert_eq!(sim.snapshot().tick, 2);
    }

    #[test]
    fn reset_replays_the_same_run() {
        let mut sim = build(&small_config(5));
        let first: Vec<f64> = (0..15).map(|_| sim.step().metrics.cooperation_rate).collect();
        assert!(sim.reset().is_ok());
        assert_eq!(sim.tick(), 0);
        let second: Vec<f64> = (0..15).map(|_| sim.step().metrics.cooperation_rate).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn reset_with_seed_changes_placement() {
        let mut sim = build(&small_config(5));
        let before = sim.snapshot();
        assert!(sim.reset_with_seed(6).is_ok());
        assert_eq!(sim.seed(), 6);
        assert_ne!(before, sim.snapshot());
    }

    #[test]
    fn set_payoff_keeps_lattice_state() {
        let mut sim = build(&small_config(3));
        sim.step();
        let before = sim.snapshot();
        let result = sim.set_payoff_matrix(4.0, 1.0, 6.0, 2.0);
        assert!(result.is_ok());
        assert_eq!(before, sim.snapshot());
        let summary = sim.payoff_summary();
        assert!((summary.temptation - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_payoff_keeps_old_table() {
        let mut sim = build(&small_config(3));
        let result = sim.set_payoff_matrix(3.0, f64::NAN, 5.0, 1.0);
        assert!(matches!(result, Err(SimulationError::Agents { .. })));
        assert_eq!(*sim.payoff(), PayoffMatrix::prisoners_dilemma());
    }

    #[test]
    fn strategy_grid_matches_snapshot() {
        let sim = build(&small_config(9));
        let grid = sim.strategy_grid();
        assert_eq!(grid.len(), 10);
        assert!(grid.iter().all(|row| row.len() == 12));
        let snapshot = sim.snapshot();
        let occupied = grid.iter().flatten().filter(|c| c.is_some()).count();
        assert_eq!(occupied, snapshot.agents.len());
        for agent in &snapshot.agents {
            let cell = grid
                .get(agent.position.y)
                .and_then(|row| row.get(agent.position.x))
                .copied()
                .flatten();
            assert_eq!(cell, Some(agent.strategy));
        }
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let sim = build(&small_config(4));
        let json = serde_json::to_value(sim.snapshot()).unwrap_or_default();
        assert_eq!(json["width"], 12);
        assert_eq!(json["agents"].as_array().map(Vec::len), Some(108));
    }
}
