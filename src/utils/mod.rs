//! Small shared helpers

pub mod version;

pub use version::{VERSION, get_version, version_banner};
