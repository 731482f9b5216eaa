//! Global variable store
//!
//! A process-wide name -> value mapping shared by every document that gets
//! processed. The mapping never leaves the lock: readers get copies.
//!
//! The store reads and writes a YAML document of the form:
//!
//! ```yaml
//! variables:
//!   - name: author
//!     value: Jane Doe
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, VariableError};

/// A single name/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The YAML document exchanged by `load_yaml` and `export_yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<Variable>,
}

/// YAML null (`~`, `null` or an empty value) reads as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl VariableSet {
    /// Parse a variables document. Blank input is an empty set.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(VariableError::Parse)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(VariableError::Serialize)
    }
}

/// Thread-safe store of global variables
#[derive(Debug, Default)]
pub struct VariableStore {
    vars: RwLock<HashMap<String, String>>,
}

impl VariableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a variable
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.read().get(name).cloned()
    }

    /// Remove a variable, returning its previous value
    pub fn remove(&self, name: &str) -> Option<String> {
        self.vars.write().remove(name)
    }

    /// Snapshot of every global variable
    pub fn get_all(&self) -> HashMap<String, String> {
        self.vars.read().clone()
    }

    pub fn len(&self) -> usize {
        self.vars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.read().is_empty()
    }

    /// Merge the records of a YAML variables document into the store.
    ///
    /// The whole document is parsed before anything is applied, so a parse
    /// failure leaves the store untouched. Existing variables not named in
    /// the document are kept. Returns the number of records applied.
    pub fn load_yaml(&self, text: &str) -> Result<usize> {
        let set = VariableSet::from_yaml(text)?;
        let count = set.variables.len();

        let mut vars = self.vars.write();
        for var in set.variables {
            vars.insert(var.name, var.value);
        }
        drop(vars);

        debug!("Loaded {} variables", count);
        Ok(count)
    }

    /// Render every global variable as a YAML variables document, sorted by name
    pub fn export_yaml(&self) -> Result<String> {
        let mut variables: Vec<Variable> = self
            .vars
            .read()
            .iter()
            .map(|(name, value)| Variable::new(name.clone(), value.clone()))
            .collect();
        variables.sort_by(|a, b| a.name.cmp(&b.name));

        VariableSet { variables }.to_yaml()
    }

    /// Merge variables from a YAML file. A missing file loads nothing.
    pub fn load_file(&self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let text = fs::read_to_string(path)?;
        self.load_yaml(&text)
    }

    /// Write every global variable to a YAML file, creating parent directories
    pub fn save_file(&self, path: &Path) -> Result<()> {
        let yaml = self.export_yaml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, yaml)?;
        debug!("Saved {} variables to {}", self.len(), path.display());
        Ok(())
    }
}
