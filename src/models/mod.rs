//! Domain models: normalized flights, search constraints, airports

mod flight;
mod location;

pub use flight::*;
pub use location::*;
