pub mod black_hole;
pub mod color;
pub mod planet;
pub mod seed;
pub mod star;
pub mod sun;
