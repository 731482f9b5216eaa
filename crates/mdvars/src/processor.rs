//! Placeholder expansion
//!
//! Replaces `{{name}}` placeholders using document-local declarations first,
//! then the global store. Unknown placeholders are left exactly as written.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::document::extract_declarations;
use crate::store::VariableStore;

/// `{{` followed by anything up to the first `}`, then `}}`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid")
});

/// Expands documents against a shared global store
#[derive(Debug, Clone)]
pub struct Processor {
    globals: Arc<VariableStore>,
}

impl Processor {
    pub fn new(globals: Arc<VariableStore>) -> Self {
        Self { globals }
    }

    /// The global store this processor falls back to
    pub fn globals(&self) -> &Arc<VariableStore> {
        &self.globals
    }

    /// Strip declarations from `content` and expand every placeholder.
    ///
    /// Inserted values are not scanned again, so a value containing
    /// `{{other}}` comes out verbatim.
    pub fn process(&self, content: &str) -> String {
        let extracted = extract_declarations(content);
        if !extracted.includes.is_empty() {
            debug!("Ignoring include markers: {:?}", extracted.includes);
        }

        let mut local = HashMap::new();
        for var in extracted.variables {
            local.insert(var.name, var.value);
        }
        let globals = self.globals.get_all();

        let mut unresolved = 0usize;
        let expanded = PLACEHOLDER.replace_all(&extracted.body, |caps: &Captures| {
            let name = caps[1].trim();
            match local.get(name).or_else(|| globals.get(name)) {
                Some(value) => value.clone(),
                None => {
                    unresolved += 1;
                    caps[0].to_string()
                }
            }
        });

        debug!(
            "Processed document: {} local variables, {} unresolved placeholders",
            local.len(),
            unresolved
        );
        expanded.into_owned()
    }

    /// Distinct placeholder names used in `content`, sorted
    pub fn placeholders(content: &str) -> Vec<String> {
        let body = extract_declarations(content).body;
        let mut names: Vec<String> = PLACEHOLDER
            .captures_iter(&body)
            .map(|caps| caps[1].trim().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Placeholder names in `content` that neither the document nor the
    /// global store defines, sorted
    pub fn unresolved(&self, content: &str) -> Vec<String> {
        let extracted = extract_declarations(content);
        let globals = self.globals.get_all();

        let mut names: Vec<String> = PLACEHOLDER
            .captures_iter(&extracted.body)
            .map(|caps| caps[1].trim().to_string())
            .filter(|name| {
                !extracted.variables.iter().any(|v| &v.name == name) && !globals.contains_key(name)
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
