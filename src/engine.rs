use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::agents::AgentKind;
use crate::population::{validate_dt, Population};
use crate::rng::{RngManager, SystemRng};
use crate::scenario::{Scenario, ScenarioError};
use crate::systems::{CensusSystem, ForagingSystem, TerrainSystem};
use crate::terrain::{CellState, Terrain, TerrainError};
use crate::world::{Census, World, WorldSnapshot};

const SETUP_STREAM: &str = "setup";

#[derive(Debug, Error)]
pub enum SimError {
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

pub struct SystemContext {
    pub tick: u64,
    pub dt: f32,
}

/// One phase of a tick. Systems run in registration order.
pub trait System: Send {
    fn name(&self) -> &str;

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<(), SimError>;

    /// Drops any per-run state. Called when the simulation is reset.
    fn reset(&mut self) {}
}

#[derive(Clone, Debug)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct TickSummary {
    pub tick: u64,
    pub elapsed: f64,
    pub system_reports: Vec<SystemRunReport>,
    pub census: Census,
}

pub struct SimulationBuilder {
    scenario: Scenario,
    systems: Vec<Box<dyn System>>,
}

impl SimulationBuilder {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Terrain first, then agents, then bookkeeping.
    pub fn with_default_systems(self) -> Self {
        self.with_system(TerrainSystem::new())
            .with_system(ForagingSystem::new())
            .with_system(CensusSystem::new())
    }

    pub fn build(self) -> Result<Simulation, SimError> {
        self.scenario.validate()?;
        let mut rng = RngManager::new(self.scenario.seed);
        let world = setup_world(&self.scenario, &mut rng)?;
        Ok(Simulation {
            scenario: self.scenario,
            rng,
            systems: self.systems,
            world,
        })
    }
}

/// Drives the ecosystem: owns the world and translates external events into
/// world mutations.
pub struct Simulation {
    scenario: Scenario,
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    world: World,
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Result<Self, SimError> {
        SimulationBuilder::new(scenario)
            .with_default_systems()
            .build()
    }

    /// Advances the world by `dt` seconds.
    ///
    /// An invalid `dt` is rejected before any system runs.
    pub fn tick(&mut self, dt: f32) -> Result<TickSummary, SimError> {
        let dt = validate_dt(dt).map_err(|err| {
            warn!(dt, "rejected time step");
            err
        })?;
        let ctx = SystemContext {
            tick: self.world.tick() + 1,
            dt,
        };
        let mut system_reports = Vec::with_capacity(self.systems.len());
        for system in self.systems.iter_mut() {
            let start = Instant::now();
            let mut stream = self.rng.stream(system.name());
            system.run(&ctx, &mut self.world, &mut stream)?;
            system_reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            });
        }
        self.world.advance_time(dt);
        let census = self.world.census();
        debug!(
            tick = self.world.tick(),
            prey = census.prey_alive,
            predators = census.predators_alive,
            food = census.food_cells,
            "tick complete"
        );
        Ok(TickSummary {
            tick: self.world.tick(),
            elapsed: self.world.elapsed(),
            system_reports,
            census,
        })
    }

    /// Runs `ticks` ticks with the scenario's time step.
    pub fn run(&mut self, ticks: u64) -> Result<(), SimError> {
        self.run_with_hook(ticks, |_, _| {})
    }

    pub fn run_with_hook<F>(&mut self, ticks: u64, mut hook: F) -> Result<(), SimError>
    where
        F: FnMut(&TickSummary, &World),
    {
        let dt = self.scenario.dt_seconds;
        for _ in 0..ticks {
            let summary = self.tick(dt)?;
            hook(&summary, &self.world);
        }
        Ok(())
    }

    /// Spawns a prey in the middle of the cell under a pixel.
    ///
    /// Returns the cell, or `None` when the pixel lies outside the grid.
    pub fn on_primary_click(&mut self, px: i32, py: i32) -> Option<(usize, usize)> {
        let terrain = self.world.terrain();
        let Some((x, y)) = self
            .scenario
            .viewport
            .cell_at(px, py, terrain.rows(), terrain.cols())
        else {
            debug!(px, py, "click outside the grid ignored");
            return None;
        };
        self.world
            .population_mut()
            .add_prey(x as f32 + 0.5, y as f32 + 0.5);
        self.world.recount();
        debug!(x, y, "prey spawned");
        Some((x, y))
    }

    /// Cycles the cell under a pixel to its next state.
    pub fn on_drag(&mut self, px: i32, py: i32) -> Option<CellState> {
        let viewport = self.scenario.viewport;
        let state = self.world.terrain_mut().toggle_state(px, py, &viewport);
        if state.is_some() {
            self.world.recount();
        }
        state
    }

    /// Throws the current world away and runs setup again.
    pub fn on_reset(&mut self) -> Result<(), SimError> {
        self.world = setup_world(&self.scenario, &mut self.rng)?;
        for system in self.systems.iter_mut() {
            system.reset();
        }
        info!(scenario = %self.scenario.name, "simulation reset");
        Ok(())
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn terrain(&self) -> &Terrain {
        self.world.terrain()
    }

    pub fn population(&self) -> &Population {
        self.world.population()
    }

    pub fn current_tick(&self) -> u64 {
        self.world.tick()
    }

    pub fn elapsed(&self) -> f64 {
        self.world.elapsed()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot(&self.scenario.name)
    }
}

fn setup_world(scenario: &Scenario, rng: &mut RngManager) -> Result<World, SimError> {
    let mut stream = rng.stream(SETUP_STREAM);
    let mut terrain = scenario.build_terrain()?;
    terrain.init_random(&mut stream);
    let mut population = scenario.build_population();
    population.init_random(
        scenario.population.prey,
        scenario.population.predators,
        &terrain,
        &mut stream,
    );
    let world = World::new(terrain, population);
    info!(
        scenario = %scenario.name,
        rows = world.terrain().rows(),
        cols = world.terrain().cols(),
        prey = world.population().count(AgentKind::Prey),
        predators = world.population().count(AgentKind::Predator),
        "world ready"
    );
    Ok(world)
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("scenario", &self.scenario.name)
            .field("tick", &self.world.tick())
            .field(
                "systems",
                &self.systems.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

