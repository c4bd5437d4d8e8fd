use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::agents::{Agent, AgentKind, Position, Predator, Prey, SpeciesTraits};
use crate::engine::SimError;
use crate::terrain::{CellState, Terrain};

/// What the population does with agents whose energy ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathPolicy {
    /// Dead agents stay and keep being updated, energy going further negative.
    Keep,
    /// Dead agents stay in the collection but are no longer updated.
    Freeze,
    /// Dead agents are removed at the end of the update.
    #[default]
    Prune,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub updated: usize,
    pub pruned: usize,
    pub food_eaten: usize,
}

/// Owns every agent in the simulation, in insertion order.
#[derive(Debug)]
pub struct Population {
    agents: Vec<Box<dyn Agent>>,
    prey_traits: SpeciesTraits,
    predator_traits: SpeciesTraits,
    death_policy: DeathPolicy,
}

impl Population {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            prey_traits: Prey::DEFAULT_TRAITS,
            predator_traits: Predator::DEFAULT_TRAITS,
            death_policy: DeathPolicy::default(),
        }
    }

    pub fn with_traits(mut self, prey: SpeciesTraits, predator: SpeciesTraits) -> Self {
        self.prey_traits = prey;
        self.predator_traits = predator;
        self
    }

    pub fn with_death_policy(mut self, policy: DeathPolicy) -> Self {
        self.death_policy = policy;
        self
    }

    pub fn death_policy(&self) -> DeathPolicy {
        self.death_policy
    }

    /// Appends `num_prey` prey then `num_predators` predators at uniformly
    /// random positions inside the terrain.
    pub fn init_random<R: Rng + ?Sized>(
        &mut self,
        num_prey: usize,
        num_predators: usize,
        terrain: &Terrain,
        rng: &mut R,
    ) {
        self.agents.reserve(num_prey + num_predators);
        for _ in 0..num_prey {
            let position = random_position(terrain, rng);
            self.agents
                .push(Box::new(Prey::with_traits(position, self.prey_traits)));
        }
        for _ in 0..num_predators {
            let position = random_position(terrain, rng);
            self.agents
                .push(Box::new(Predator::with_traits(position, self.predator_traits)));
        }
    }

    /// Updates every agent in collection order against the shared terrain.
    ///
    /// Agents run one after another, so when two of them land on the same
    /// food cell in one tick only the first one eats.
    pub fn update(
        &mut self,
        dt: f32,
        terrain: &mut Terrain,
        rng: &mut dyn RngCore,
    ) -> Result<UpdateReport, SimError> {
        let dt = validate_dt(dt)?;
        let food_before = terrain.count(CellState::Food);
        let mut report = UpdateReport::default();

        for agent in self.agents.iter_mut() {
            if self.death_policy == DeathPolicy::Freeze && !agent.is_alive() {
                continue;
            }
            agent.update(dt, terrain, rng);
            report.updated += 1;
        }

        if self.death_policy == DeathPolicy::Prune {
            let before = self.agents.len();
            self.agents.retain(|agent| agent.is_alive());
            report.pruned = before - self.agents.len();
        }

        report.food_eaten = food_before.saturating_sub(terrain.count(CellState::Food));
        trace!(?report, "population updated");
        Ok(report)
    }

    pub fn add_prey(&mut self, x: f32, y: f32) {
        self.push(Box::new(Prey::with_traits(
            Position::new(x, y),
            self.prey_traits,
        )));
    }

    pub fn add_predator(&mut self, x: f32, y: f32) {
        self.push(Box::new(Predator::with_traits(
            Position::new(x, y),
            self.predator_traits,
        )));
    }

    /// Inserts an already built agent, e.g. one with custom energy.
    pub fn push(&mut self, agent: Box<dyn Agent>) {
        self.agents.push(agent);
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Agent> {
        self.agents.iter().map(|agent| agent.as_ref())
    }

    pub fn count(&self, kind: AgentKind) -> usize {
        self.iter().filter(|agent| agent.kind() == kind).count()
    }

    pub fn alive_count(&self, kind: AgentKind) -> usize {
        self.iter()
            .filter(|agent| agent.kind() == kind && agent.is_alive())
            .count()
    }
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_dt(dt: f32) -> Result<f32, SimError> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(dt)
    } else {
        Err(SimError::InvalidTimeStep(dt))
    }
}

fn random_position<R: Rng + ?Sized>(terrain: &Terrain, rng: &mut R) -> Position {
    Position::new(
        rng.gen_range(0.0..terrain.cols() as f32),
        rng.gen_range(0.0..terrain.rows() as f32),
    )
}
