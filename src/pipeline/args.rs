//! Caller-supplied record arguments.

use serde::Serialize;
use serde_json::Value;

/// Arguments passed alongside a message template.
///
/// Named arguments bind to the hole of the same name; positional arguments
/// bind to the template's remaining holes in order of appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    named: Vec<(String, Value)>,
    positional: Vec<Value>,
    errors: Vec<String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named argument. A later value for the same name replaces the earlier one.
    pub fn with(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let name = name.into();
        match serde_json::to_value(value) {
            Ok(value) => match self.named.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => self.named.push((name, value)),
            },
            Err(e) => self.errors.push(format!("{}: {}", name, e)),
        }
        self
    }

    /// Add a positional argument.
    pub fn push(mut self, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => self.positional.push(value),
            Err(e) => self
                .errors
                .push(format!("#{}: {}", self.positional.len(), e)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }

    /// Capture failures, one line per argument that could not be serialized.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, Value)>, Vec<Value>) {
        (self.named, self.positional)
    }
}
