//! Configuration management for the modem client
//!
//! This module handles loading and managing configuration settings
//! for the library and the `hilink` command-line tool.

pub mod loader;
pub mod settings;

pub use loader::{ConfigLoader, EnvOverrides};
pub use settings::Settings;
