//! mdvars core - Shared functionality for the mdvars tools
//!
//! Standard locations on disk and the user-facing configuration file.

pub mod config;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
