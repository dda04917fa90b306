// src/config/mod.rs

//! TOML configuration: raw deserialized form, validation, and loading.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, RawConfigFile, SlurmSection, StoreSection, SubmitSection};
