//! Core data types.

mod configuration;
mod job;
mod stage;

pub use configuration::*;
pub use job::*;
pub use stage::*;
