use rand::RngCore;

use super::{Agent, AgentKind, Body, Position, SpeciesTraits};
use crate::terrain::Terrain;

/// Hunter. Its prey shows up on the terrain as food cells, so hunting never
/// looks at `Prey` agents directly.
#[derive(Debug, Clone)]
pub struct Predator {
    body: Body,
    traits: SpeciesTraits,
}

impl Predator {
    pub const DEFAULT_TRAITS: SpeciesTraits = SpeciesTraits {
        speed: 0.7,
        decay_rate: 3.0,
        feeding_gain: 50.0,
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

    fn hunt(&mut self, terrain: &mut Terrain) {
        let Some((x, y)) = terrain.cell_under(self.body.position) else {
            return;
        };
        // cell_under only yields in-range cells, so neither call can fail
        if let Ok(true) = terrain.has_prey_at(x, y) {
            self.body.energy += self.traits.feeding_gain;
            let _ = terrain.remove_prey(x, y);
        }
    }
}

impl Agent for Predator {
    fn kind(&self) -> AgentKind {
        AgentKind::Predator
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
        self.hunt(terrain);
    }
}
