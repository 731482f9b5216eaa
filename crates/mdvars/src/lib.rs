//! mdvars - Variable expansion for Markdown documents
//!
//! Documents reference variables with `{{name}}` placeholders. Values come
//! from two places: declarations inside the document itself
//! (`<!-- @var name: value -->`), and a process-wide store of global
//! variables that can be loaded from and exported to YAML.
//!
//! Document-local declarations always win over globals of the same name,
//! and only for the call that processed that document.

pub mod document;
pub mod error;
pub mod processor;
pub mod protocol;
pub mod server;
pub mod store;

pub use document::{extract_declarations, Extracted};
pub use error::{Result, VariableError};
pub use processor::Processor;
pub use server::Server;
pub use store::{Variable, VariableSet, VariableStore};
