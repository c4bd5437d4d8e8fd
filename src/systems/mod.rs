mod census;
mod foraging;
mod terrain;

pub use census::CensusSystem;
pub use foraging::ForagingSystem;
pub use terrain::TerrainSystem;
