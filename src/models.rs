use serde::{Deserialize, Serialize};

/// A generation model advertised by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
}

/// Ordered list of models, fetched once per session.
///
/// Selection defaults to the first advertised model when none has been
/// chosen yet; an explicit selection survives a re-fetch.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    selected: Option<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the fetched list and resolve a default selection.
    pub fn populate(&mut self, models: Vec<ModelDescriptor>) {
        self.models = models;
        if self.selected.is_none() {
            self.selected = self.models.first().map(|m| m.name.clone());
        }
    }

    pub fn is_populated(&self) -> bool {
        !self.models.is_empty()
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, name: impl Into<String>) {
        self.selected = Some(name.into());
    }
}
