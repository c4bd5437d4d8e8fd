use serde::Serialize;

use crate::agents::AgentKind;
use crate::population::Population;
use crate::terrain::{CellState, Terrain};

/// Head counts and terrain composition after the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    pub prey: usize,
    pub predators: usize,
    pub prey_alive: usize,
    pub predators_alive: usize,
    pub food_cells: usize,
    pub fertile_cells: usize,
    pub food_eaten: usize,
    pub pruned: usize,
}

/// Everything that changes while the simulation runs.
#[derive(Debug)]
pub struct World {
    tick: u64,
    elapsed: f64,
    pub(crate) terrain: Terrain,
    pub(crate) population: Population,
    pub(crate) census: Census,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub kind: AgentKind,
    pub x: f32,
    pub y: f32,
    pub energy: f32,
    pub alive: bool,
}

/// Read-only picture of the world handed to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub elapsed: f64,
    pub rows: usize,
    pub cols: usize,
    /// Row-major, `rows * cols` entries.
    pub cells: Vec<CellState>,
    pub agents: Vec<AgentView>,
    pub census: Census,
}

impl World {
    pub fn new(terrain: Terrain, population: Population) -> Self {
        let mut world = Self {
            tick: 0,
            elapsed: 0.0,
            terrain,
            population,
            census: Census::default(),
        };
        world.recount();
        world
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seconds of simulated time since setup.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed += f64::from(dt);
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut Terrain {
        &mut self.terrain
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    pub fn census(&self) -> Census {
        self.census
    }

    /// Refreshes head counts and cell counts, leaving per-tick flows alone.
    pub fn recount(&mut self) {
        let population = &self.population;
        self.census.prey = population.count(AgentKind::Prey);
        self.census.predators = population.count(AgentKind::Predator);
        self.census.prey_alive = population.alive_count(AgentKind::Prey);
        self.census.predators_alive = population.alive_count(AgentKind::Predator);
        self.census.food_cells = self.terrain.count(CellState::Food);
        self.census.fertile_cells = self.terrain.count(CellState::Fertile);
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        let agents = self
            .population
            .iter()
            .map(|agent| {
                let position = agent.position();
                AgentView {
                    kind: agent.kind(),
                    x: position.x,
                    y: position.y,
                    energy: agent.energy(),
                    alive: agent.is_alive(),
                }
            })
            .collect();
        WorldSnapshot {
            scenario: scenario.to_string(),
            tick: self.tick,
            elapsed: self.elapsed,
            rows: self.terrain.rows(),
            cols: self.terrain.cols(),
            cells: self.terrain.cells().to_vec(),
            agents,
            census: self.census,
        }
    }
}
