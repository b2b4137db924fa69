//! Command-line front end
//!
//! Contains the logic behind the `hilink` binary.

pub mod command;

pub use command::{GlobalArgs, ModemCommand, run};
