//! Predator/prey ecosystem on a discrete grid.
//!
//! A [`Terrain`] of cell states is shared by a [`Population`] of wandering
//! agents. The [`Simulation`] driver ticks both and turns pointer events from
//! an external renderer into world mutations.

pub mod agents;
pub mod engine;
pub mod population;
pub mod rng;
pub mod scenario;
pub mod systems;
pub mod terrain;
pub mod web;
pub mod world;

pub use agents::{Agent, AgentKind, Position, Predator, Prey, SpeciesTraits};
pub use engine::{SimError, Simulation, SimulationBuilder, TickSummary};
pub use population::{DeathPolicy, Population};
pub use scenario::{Scenario, ScenarioLoader};
pub use terrain::{BoundaryPolicy, CellState, Terrain, TerrainError, Viewport};
pub use world::{Census, World, WorldSnapshot};
