pub mod ids;
pub mod instrument;
pub mod order;
pub mod player;

pub use ids::*;
pub use instrument::*;
pub use order::*;
pub use player::*;

#[cfg(test)]
mod tests;
