// Cleaning stages applied, in order, to the loaded table

pub mod dates;
pub mod filter;
pub mod normalize;
pub mod quality_gate;
