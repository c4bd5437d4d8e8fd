use tracing::trace;

use crate::{
    engine::{SimError, System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Autonomous terrain dynamics, run before any agent moves.
pub struct TerrainSystem;

impl TerrainSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerrainSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TerrainSystem {
    fn name(&self) -> &str {
        "terrain"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<(), SimError> {
        let regrown = world.terrain.update(rng);
        if regrown > 0 {
            trace!(tick = ctx.tick, regrown, "food regrew");
        }
        Ok(())
    }
}
