use crate::{
    engine::{SimError, System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Moves, starves and feeds every agent.
pub struct ForagingSystem;

impl ForagingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ForagingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ForagingSystem {
    fn name(&self) -> &str {
        "foraging"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<(), SimError> {
        let report = world.population.update(ctx.dt, &mut world.terrain, rng)?;
        world.census.food_eaten = report.food_eaten;
        world.census.pruned = report.pruned;
        Ok(())
    }
}
