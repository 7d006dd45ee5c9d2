//! Aggregate statistics over the committed lattice state.
//!
//! Everything here is a pure read of a [`Population`]. Degenerate inputs
//! have defined values instead of errors: an empty population reports
//! zeros, and cooperators without neighbors are left out of the
//! clustering average.

use dilemma_agents::{Agent, Population};
use dilemma_types::{MetricsReport, NeighborhoodType};

/// Compute every metric for the population at `tick`.
pub fn measure(population: &Population, kind: NeighborhoodType, tick: u64) -> MetricsReport {
    let total_agents = population.len();
    let cooperators = population
        .agents()
        .iter()
        .filter(|a| a.strategy().is_cooperative())
        .count();

    MetricsReport {
        tick,
        total_agents,
        cooperators,
        defectors: total_agents.saturating_sub(cooperators),
        cooperation_rate: cooperation_rate(population),
        average_score: average_score(population),
        score_variance: score_variance(population),
        average_neighbors: average_neighbors(population, kind),
        cooperator_clustering: cooperator_clustering(population, kind),
    }
}

/// Cooperators divided by total agents; `0.0` without agents.
#[allow(clippy::cast_precision_loss)]
pub fn cooperation_rate(population: &Population) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let cooperators = population
        .agents()
        .iter()
        .filter(|a| a.strategy().is_cooperative())
        .count();
    cooperators as f64 / population.len() as f64
}

/// Mean current-step score; `0.0` without agents.
#[allow(clippy::cast_precision_loss)]
pub fn average_score(population: &Population) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let sum: f64 = population.agents().iter().map(Agent::score).sum();
    sum / population.len() as f64
}

/// Population variance (divisor `N`) of current-step scores.
#[allow(clippy::cast_precision_loss)]
pub fn score_variance(population: &Population) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let mean = average_score(population);
    let squares: f64 = population
        .agents()
        .iter()
        .map(|a| {
            let d = a.score() - mean;
            d * d
        })
        .sum();
    squares / population.len() as f64
}

/// Mean number of occupied neighbor cells per agent.
#[allow(clippy::cast_precision_loss)]
pub fn average_neighbors(population: &Population, kind: NeighborhoodType) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let links: usize = population
        .agents()
        .iter()
        .map(|a| population.neighbors(a.id(), kind).len())
        .sum();
    links as f64 / population.len() as f64
}

/// Mean share of cooperating neighbors over cooperators that have at
/// least one neighbor; `0.0` when no cooperator qualifies.
#[allow(clippy::cast_precision_loss)]
pub fn cooperator_clustering(population: &Population, kind: NeighborhoodType) -> f64 {
    let shares: Vec<f64> = population
        .agents()
        .iter()
        .filter(|a| a.strategy().is_cooperative())
        .filter_map(|a| {
            let neighbors = population.neighbors(a.id(), kind);
            if neighbors.is_empty() {
                return None;
            }
            let cooperating = neighbors
                .iter()
                .filter(|n| n.strategy().is_cooperative())
                .count();
            Some(cooperating as f64 / neighbors.len() as f64)
        })
        .collect();

    if shares.is_empty() {
        return 0.0;
    }
    shares.iter().sum::<f64>() / shares.len() as f64
}
