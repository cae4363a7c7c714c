//! # Stagehand Config
//!
//! Local settings for the Stagehand background host. The remote pipeline
//! configuration lives in `stagehand-protocols`; this crate only covers the
//! host's own `stagehand.toml`.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::SettingsError;
pub use loader::SettingsLoader;
pub use schema::*;
pub use validator::{SettingsValidator, ValidationError, ValidationResult, ValidationWarning};
