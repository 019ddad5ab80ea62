pub mod collisions;
pub mod connections;
pub mod effects;
pub mod forces;
pub mod orbital;
pub mod planets;
pub mod spawn;
