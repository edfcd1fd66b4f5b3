//! Camel-K trait definitions, used by modeline completion and hover.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::CatalogError;

use super::render_value;

const BUILTIN_TRAITS: &str = include_str!("traits.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitProperty {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Go-style type name: `bool`, `int`, `string`, `[]string`.
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,
}

impl TraitProperty {
    pub fn is_boolean(&self) -> bool {
        self.value_type == "bool"
    }

    pub fn rendered_default(&self) -> Option<String> {
        self.default_value.as_ref().and_then(render_value)
    }

    /// Values worth offering after `=`.
    pub fn value_choices(&self) -> Vec<String> {
        if !self.enum_values.is_empty() {
            self.enum_values.clone()
        } else if self.is_boolean() {
            vec!["true".to_string(), "false".to_string()]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Vec<TraitProperty>,
}

impl TraitDefinition {
    pub fn property(&self, name: &str) -> Option<&TraitProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Trait definitions in load order.
#[derive(Debug, Clone, Default)]
pub struct TraitCatalog {
    traits: Vec<TraitDefinition>,
}

impl TraitCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json("built-in traits", BUILTIN_TRAITS)
    }

    pub fn from_json(origin: &str, json: &str) -> Result<Self, CatalogError> {
        let traits = serde_json::from_str(json).map_err(|source| CatalogError::Json {
            origin: origin.to_string(),
            source,
        })?;
        Ok(Self { traits })
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), &json)
    }

    /// Add definitions from `other`, replacing traits of the same name in place.
    pub fn merge(&mut self, other: TraitCatalog) {
        for definition in other.traits {
            match self.traits.iter_mut().find(|t| t.name == definition.name) {
                Some(existing) => *existing = definition,
                None => self.traits.push(definition),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TraitDefinition> {
        self.traits.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitDefinition> {
        self.traits.iter()
    }
}
