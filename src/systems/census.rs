use tracing::debug;

use crate::{
    engine::{SimError, System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Recounts agents and cells once everything else has run.
pub struct CensusSystem {
    extinct_logged: bool,
}

impl CensusSystem {
    pub fn new() -> Self {
        Self {
            extinct_logged: false,
        }
    }
}

impl Default for CensusSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CensusSystem {
    fn name(&self) -> &str {
        "census"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<(), SimError> {
        world.recount();
        let census = world.census();
        let extinct = census.prey_alive == 0 && census.predators_alive == 0;
        if extinct && !self.extinct_logged {
            debug!(tick = ctx.tick, "no living agents left");
        }
        self.extinct_logged = extinct;
        Ok(())
    }

    fn reset(&mut self) {
        self.extinct_logged = false;
    }
}
