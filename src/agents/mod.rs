//! Mobile agents living on the terrain.
//!
//! Every agent wanders by an unbiased random walk: each update adds a random
//! unit vector scaled by the species speed. The step is fixed per call and
//! does not depend on `dt`; only energy decay is integrated over time.

mod predator;
mod prey;

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::rng::unit_vector;
use crate::terrain::Terrain;

pub use predator::Predator;
pub use prey::Prey;

/// Energy every agent is born with.
pub const INITIAL_ENERGY: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Prey,
    Predator,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Prey => write!(f, "prey"),
            AgentKind::Predator => write!(f, "predator"),
        }
    }
}

/// Terrain-space position; `x` runs along columns, `y` along rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Per-species movement and metabolism constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTraits {
    /// Distance covered per update call.
    pub speed: f32,
    /// Energy lost per second.
    pub decay_rate: f32,
    /// Energy gained from one food cell.
    pub feeding_gain: f32,
}

pub trait Agent: fmt::Debug + Send {
    fn kind(&self) -> AgentKind;

    fn position(&self) -> Position;

    fn energy(&self) -> f32;

    /// Moves, burns `dt` seconds worth of energy and feeds on the terrain.
    ///
    /// `dt` must be finite and non-negative; the population validates it.
    fn update(&mut self, dt: f32, terrain: &mut Terrain, rng: &mut dyn RngCore);

    fn is_alive(&self) -> bool {
        self.energy() > 0.0
    }
}

/// State shared by every species.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Body {
    pub position: Position,
    pub energy: f32,
}

impl Body {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            energy: INITIAL_ENERGY,
        }
    }

    pub fn wander(&mut self, speed: f32, terrain: &Terrain, rng: &mut dyn RngCore) {
        let (dx, dy) = unit_vector(rng);
        let moved = Position::new(self.position.x + dx * speed, self.position.y + dy * speed);
        self.position = terrain.confine(moved);
    }

    pub fn metabolize(&mut self, dt: f32, decay_rate: f32) {
        debug_assert!(dt.is_finite() && dt >= 0.0, "invalid dt {dt}");
        self.energy -= dt * decay_rate;
    }
}
