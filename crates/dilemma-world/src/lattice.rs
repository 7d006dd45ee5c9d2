//! Toroidal lattice: fixed-size 2D grid with periodic boundaries.
//!
//! The [`Lattice`] owns the cell -> agent association and nothing else.
//! Agents themselves live in an arena elsewhere; each occupied cell
//! stores only the [`AgentId`] indexing into it, and the lattice keeps
//! the reverse index (id -> position) so neighbor queries can start from
//! an agent.
//!
//! # Neighbor enumeration
//!
//! Offsets are applied in a fixed scan order and each coordinate wraps
//! modulo the lattice extent:
//!
//! | Neighborhood | Offsets `(dx, dy)` in scan order |
//! |--------------|-----------------------------------|
//! | Moore        | `(-1,-1) (-1,0) (-1,1) (0,-1) (0,1) (1,-1) (1,0) (1,1)` |
//! | Von Neumann  | `(0,1) (1,0) (0,-1) (-1,0)` |
//!
//! On lattices narrower or shorter than 3 cells, several offsets wrap
//! onto the same cell, or back onto the origin. Those collisions are
//! collapsed: a wrapped cell equal to the origin is dropped, and a cell
//! already produced earlier in the scan is dropped. A 1x1 lattice has no
//! neighbors; a 2x2 Moore lattice has exactly 3.

use dilemma_types::{AgentId, NeighborhoodType, Position};
use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::error::WorldError;

/// Moore offsets, dx-major.
const MOORE_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Von Neumann offsets.
const VON_NEUMANN_OFFSETS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Return the neighbor offsets for a neighborhood type, in scan order.
const fn offsets(kind: NeighborhoodType) -> &'static [(i8, i8)] {
    match kind {
        NeighborhoodType::Moore => &MOORE_OFFSETS,
        NeighborhoodType::VonNeumann => &VON_NEUMANN_OFFSETS,
    }
}

/// Step `coord` by `delta` (one of -1, 0, 1) on a ring of `extent` cells.
fn wrap_step(coord: usize, delta: i8, extent: usize) -> usize {
    match delta.signum() {
        -1 => coord
            .checked_sub(1)
            .unwrap_or_else(|| extent.saturating_sub(1)),
        1 => {
            let next = coord.saturating_add(1);
            if next >= extent { 0 } else { next }
        }
        _ => coord,
    }
}

/// A fixed-size toroidal grid where each cell holds at most one agent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Lattice {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Row-major occupancy: `cells[y * width + x]`.
    cells: Vec<Option<AgentId>>,
    /// Reverse index: `positions[id]` is the cell of agent `id`.
    positions: Vec<Position>,
}

impl Lattice {
    /// Build a lattice from an explicit list of occupied cells.
    ///
    /// Agent ids are assigned densely in iteration order: the first
    /// position receives `AgentId(0)`, the next `AgentId(1)`, and so on.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ZeroDimension`] or [`WorldError::TooLarge`]
    /// for invalid dimensions, [`WorldError::OutOfBounds`] for a position
    /// outside the grid, and [`WorldError::CellOccupied`] if a position
    /// repeats.
    pub fn from_occupants<I>(width: usize, height: usize, occupants: I) -> Result<Self, WorldError>
    where
        I: IntoIterator<Item = Position>,
    {
        let cell_count = checked_cell_count(width, height)?;
        let mut lattice = Self {
            width,
            height,
            cells: vec![None; cell_count],
            positions: Vec::new(),
        };

        for position in occupants {
            let idx = lattice.cell_index(position)?;
            let id = AgentId::from_index(lattice.positions.len()).ok_or(WorldError::TooManyAgents)?;
            let cell = lattice
                .cells
                .get_mut(idx)
                .ok_or(WorldError::OutOfBounds { position, width, height })?;
            if cell.is_some() {
                return Err(WorldError::CellOccupied(position));
            }
            *cell = Some(id);
            lattice.positions.push(position);
        }

        Ok(lattice)
    }

    /// Build a lattice with `round(width * height * density)` agents
    /// placed on distinct cells chosen uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDensity`] if `density` is outside
    /// `[0, 1]`, plus the dimension errors of [`Lattice::from_occupants`].
    pub fn scatter<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        density: f64,
        rng: &mut R,
    ) -> Result<Self, WorldError> {
        let cell_count = checked_cell_count(width, height)?;
        if !(0.0..=1.0).contains(&density) {
            return Err(WorldError::InvalidDensity(density));
        }

        let target = occupied_count(cell_count, density);
        let chosen = index::sample(rng, cell_count, target);
        let lattice = Self::from_occupants(
            width,
            height,
            chosen.iter().map(|idx| position_of_index(idx, width)),
        )?;

        debug!(
            width,
            height,
            density,
            agents = lattice.agent_count(),
            "Lattice populated"
        );
        Ok(lattice)
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of occupied cells (equivalently, number of agents).
    pub const fn agent_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether `position` lies inside the lattice.
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Return the agent occupying `position`, or `None` for an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` lies outside the
    /// lattice. Coordinates are never wrapped here; callers that walk
    /// across edges must use [`Lattice::neighbors_of`].
    pub fn agent_at(&self, position: Position) -> Result<Option<AgentId>, WorldError> {
        let idx = self.cell_index(position)?;
        Ok(self.cells.get(idx).copied().flatten())
    }

    /// Return the cell occupied by `agent`.
    pub fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.positions.get(agent.index()).copied()
    }

    /// Iterate over `(agent, position)` pairs in id order.
    pub fn occupants(&self) -> impl Iterator<Item = (AgentId, Position)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(i, pos)| AgentId::from_index(i).map(|id| (id, *pos)))
    }

    /// Occupied cells adjacent to `position` under `kind`, in scan order.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` lies outside the
    /// lattice.
    pub fn neighbors_of(
        &self,
        position: Position,
        kind: NeighborhoodType,
    ) -> Result<Vec<Position>, WorldError> {
        self.cell_index(position)?;
        Ok(self
            .wrapped_cells(position, kind)
            .into_iter()
            .filter(|p| self.occupant(*p).is_some())
            .collect())
    }

    /// Agents adjacent to `agent` under `kind`, in scan order.
    ///
    /// This is the lookup used by scoring, imitation and metrics. An
    /// unknown id yields an empty list.
    pub fn neighbor_agents(&self, agent: AgentId, kind: NeighborhoodType) -> Vec<AgentId> {
        let Some(origin) = self.position_of(agent) else {
            return Vec::new();
        };
        self.wrapped_cells(origin, kind)
            .into_iter()
            .filter_map(|p| self.occupant(p))
            .collect()
    }

    /// Apply every offset to an in-range `origin`, wrap, and drop the
    /// origin itself plus any repeats.
    fn wrapped_cells(&self, origin: Position, kind: NeighborhoodType) -> Vec<Position> {
        let table = offsets(kind);
        let mut out: Vec<Position> = Vec::with_capacity(table.len());
        for &(dx, dy) in table {
            let candidate = Position::new(
                wrap_step(origin.x, dx, self.width),
                wrap_step(origin.y, dy, self.height),
            );
            if candidate != origin && !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out
    }

    /// Occupant of an in-range cell.
    fn occupant(&self, position: Position) -> Option<AgentId> {
        let idx = position.y.checked_mul(self.width)?.checked_add(position.x)?;
        self.cells.get(idx).copied().flatten()
    }

    /// Row-major index of `position`, rejecting out-of-range coordinates.
    fn cell_index(&self, position: Position) -> Result<usize, WorldError> {
        let out_of_bounds = || WorldError::OutOfBounds {
            position,
            width: self.width,
            height: self.height,
        };
        if !self.contains(position) {
            return Err(out_of_bounds());
        }
        position
            .y
            .checked_mul(self.width)
            .and_then(|row| row.checked_add(position.x))
            .ok_or_else(out_of_bounds)
    }
}

/// Validate dimensions and return `width * height`.
fn checked_cell_count(width: usize, height: usize) -> Result<usize, WorldError> {
    if width == 0 || height == 0 {
        return Err(WorldError::ZeroDimension { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(WorldError::TooLarge { width, height })
}

/// `round(cell_count * density)`, never exceeding `cell_count`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn occupied_count(cell_count: usize, density: f64) -> usize {
    let target = (cell_count as f64 * density).round();
    (target as usize).min(cell_count)
}

/// Inverse of the row-major cell index.
#[allow(clippy::arithmetic_side_effects)]
const fn position_of_index(idx: usize, width: usize) -> Position {
    // width is non-zero once the cell count has been validated.
    Position::new(idx % width, idx / width)
}
