use rand::RngCore;

use super::{Agent, AgentKind, Body, Position, SpeciesTraits};
use crate::terrain::{CellState, Terrain};

/// Grazer that eats food cells and leaves them fertile.
#[derive(Debug, Clone)]
pub struct Prey {
    body: Body,
    traits: SpeciesTraits,
}

impl Prey {
    pub const DEFAULT_TRAITS: SpeciesTraits = SpeciesTraits {
        speed: 0.5,
        decay_rate: 2.0,
        feeding_gain: 20.0,
    };

    pub fn new(position: Position) -> Self {
        Self::with_traits(position, Self::DEFAULT_TRAITS)
    }

    pub fn with_traits(position: Position, traits: SpeciesTraits) -> Self {
        Self {
            body: Body::new(position),
            traits,
        }
    }

    pub fn with_energy(mut self, energy: f32) -> Self {
        self.body.energy = energy;
        self
    }

    pub fn traits(&self) -> SpeciesTraits {
        self.traits
    }

    fn graze(&mut self, terrain: &mut Terrain) {
        let Some((x, y)) = terrain.cell_under(self.body.position) else {
            return;
        };
        if let Ok(CellState::Food) = terrain.state(x, y) {
            self.body.energy += self.traits.feeding_gain;
            // the cell is in range, cell_under already checked it
            let _ = terrain.set_state(x, y, CellState::Fertile);
        }
    }
}

impl Agent for Prey {
    fn kind(&self) -> AgentKind {
        AgentKind::Prey
    }

    fn position(&self) -> Position {
        self.body.position
    }

    fn energy(&self) -> f32 {
        self.body.energy
    }

    fn update(&mut self, dt: f32, terrain: &mut Terrain, rng: &mut dyn RngCore) {
        self.body.wander(self.traits.speed, terrain, rng);
        self.body.metabolize(dt, self.traits.decay_rate);
        self.graze(terrain);
    }
}
