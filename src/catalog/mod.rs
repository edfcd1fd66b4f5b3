//! Component and trait catalogs.
//!
//! The catalogs are read-only after loading and shared across requests.
//! Descriptors follow the JSON layout of the Camel component catalog
//! (`component` / `componentProperties` / `properties`), with property order
//! preserved because path options are positional.

mod traits;
pub mod validate;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CatalogError;
use crate::model::EndpointRole;

pub use traits::{TraitCatalog, TraitDefinition, TraitProperty};

const BUILTIN_COMPONENTS: &str = include_str!("components.json");

/// Deployment target that decides which components are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeProvider {
    #[default]
    Default,
    SpringBoot,
    Quarkus,
    Karaf,
}

impl FromStr for RuntimeProvider {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "main" => Ok(RuntimeProvider::Default),
            "springboot" | "spring-boot" => Ok(RuntimeProvider::SpringBoot),
            "quarkus" => Ok(RuntimeProvider::Quarkus),
            "karaf" => Ok(RuntimeProvider::Karaf),
            _ => Err(CatalogError::UnknownRuntimeProvider(s.to_string())),
        }
    }
}

impl fmt::Display for RuntimeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeProvider::Default => "default",
            RuntimeProvider::SpringBoot => "springboot",
            RuntimeProvider::Quarkus => "quarkus",
            RuntimeProvider::Karaf => "karaf",
        };
        f.write_str(name)
    }
}

/// Where an option is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Positional, in the URI path.
    Path,
    /// `key=value` in the URI query.
    Parameter,
    /// Component-level configuration (`camel.component.<scheme>.<name>`).
    Property,
}

/// One option of a component.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub kind: ParameterKind,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(rename = "type", default = "default_type")]
    pub value_type: String,
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub description: String,
}

fn default_type() -> String {
    "string".to_string()
}

impl ParameterDescriptor {
    pub fn is_boolean(&self) -> bool {
        self.value_type == "boolean"
    }

    pub fn is_integer(&self) -> bool {
        self.value_type == "integer"
    }

    /// Options whose value is a bean looked up in the registry (`#name`).
    pub fn is_reference(&self) -> bool {
        self.value_type == "object"
    }

    pub fn applies_to(&self, role: Option<EndpointRole>) -> bool {
        role.map_or(true, |r| r.accepts_group(self.group.as_deref()))
    }

    /// Default value as it would be written in a URI.
    pub fn rendered_default(&self) -> Option<String> {
        self.default_value.as_ref().and_then(render_value)
    }
}

/// Render a JSON scalar the way it is typed in a URI or modeline.
///
/// Integral numbers lose any fractional part (`8080.0` becomes `8080`).
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i.to_string());
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Some((f as i64).to_string())
                }
                _ => Some(n.to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub scheme: String,
    pub syntax: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deprecated: bool,
    /// Runtimes the component is available on; absent means all of them.
    #[serde(default)]
    pub runtimes: Option<Vec<RuntimeProvider>>,
}

/// Everything the catalog knows about one component.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub component: ComponentInfo,
    #[serde(default)]
    pub component_properties: IndexMap<String, ParameterDescriptor>,
    #[serde(default)]
    pub properties: IndexMap<String, ParameterDescriptor>,
}

impl ComponentDescriptor {
    pub fn scheme(&self) -> &str {
        &self.component.scheme
    }

    /// Path options in declaration order.
    pub fn path_parameters(&self) -> impl Iterator<Item = (&str, &ParameterDescriptor)> {
        self.properties
            .iter()
            .filter(|(_, p)| p.kind == ParameterKind::Path)
            .map(|(name, p)| (name.as_str(), p))
    }

    /// Query options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = (&str, &ParameterDescriptor)> {
        self.properties
            .iter()
            .filter(|(_, p)| p.kind == ParameterKind::Parameter)
            .map(|(name, p)| (name.as_str(), p))
    }

    pub fn option(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.properties
            .get(name)
            .filter(|p| p.kind == ParameterKind::Parameter)
    }

    /// Characters separating path parameters, taken from the syntax string
    /// (`jms:destinationType:destinationName` gives `[':']`).
    pub fn path_separators(&self) -> Vec<char> {
        let syntax = &self.component.syntax;
        let path = syntax.split_once(':').map_or("", |(_, path)| path);
        let mut separators = Vec::new();
        for c in path.chars() {
            if !(c.is_alphanumeric() || c == '_') && !separators.contains(&c) {
                separators.push(c);
            }
        }
        separators
    }

    pub fn available_on(&self, runtime: RuntimeProvider) -> bool {
        self.component
            .runtimes
            .as_ref()
            .map_or(true, |runtimes| runtimes.contains(&runtime))
    }
}

/// Component descriptors keyed by scheme, in load order.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    components: IndexMap<String, ComponentDescriptor>,
}

impl ComponentCatalog {
    /// The catalog embedded in the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        catalog.extend_from_str("built-in components", BUILTIN_COMPONENTS)?;
        Ok(catalog)
    }

    /// Add descriptors from a JSON array. Later schemes replace earlier ones.
    pub fn extend_from_str(&mut self, origin: &str, json: &str) -> Result<usize, CatalogError> {
        let descriptors: Vec<ComponentDescriptor> =
            serde_json::from_str(json).map_err(|source| CatalogError::Json {
                origin: origin.to_string(),
                source,
            })?;
        let count = descriptors.len();
        for descriptor in descriptors {
            self.components
                .insert(descriptor.scheme().to_string(), descriptor);
        }
        Ok(count)
    }

    pub fn extend_from_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extend_from_str(&path.display().to_string(), &json)
    }

    pub fn get(&self, scheme: &str) -> Option<&ComponentDescriptor> {
        self.components.get(scheme)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Everything a request needs to know about the Camel world.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub components: ComponentCatalog,
    pub traits: TraitCatalog,
    pub runtime: RuntimeProvider,
}

impl Catalog {
    /// Built-in components and traits on the default runtime.
    pub fn builtin() -> Result<Self, CatalogError> {
        Ok(Self {
            components: ComponentCatalog::builtin()?,
            traits: TraitCatalog::builtin()?,
            runtime: RuntimeProvider::Default,
        })
    }

    pub fn with_runtime(mut self, runtime: RuntimeProvider) -> Self {
        self.runtime = runtime;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = ComponentCatalog::builtin().unwrap();
        assert!(catalog.get("timer").is_some());
        assert!(catalog.get("jms").is_some());
        assert!(catalog.get("nope").is_none());
    }

    #[test]
    fn property_order_is_preserved() {
        let catalog = ComponentCatalog::builtin().unwrap();
        let jms = catalog.get("jms").unwrap();
        let paths: Vec<_> = jms.path_parameters().map(|(name, _)| name).collect();
        assert_eq!(paths, vec!["destinationType", "destinationName"]);
    }

    #[test]
    fn separators_from_syntax() {
        let catalog = ComponentCatalog::builtin().unwrap();
        assert_eq!(catalog.get("jms").unwrap().path_separators(), vec![':']);
        assert!(catalog.get("timer").unwrap().path_separators().is_empty());
    }

    #[test]
    fn later_descriptors_replace_earlier() {
        let mut catalog = ComponentCatalog::builtin().unwrap();
        let before = catalog.len();
        catalog
            .extend_from_str(
                "test",
                r#"[{"component": {"scheme": "timer", "syntax": "timer:name", "description": "replaced"}}]"#,
            )
            .unwrap();
        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.get("timer").unwrap().component.description, "replaced");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut catalog = ComponentCatalog::default();
        let err = catalog.extend_from_str("broken", "{").unwrap_err();
        assert!(matches!(err, CatalogError::Json { .. }));
    }

    #[test]
    fn runtime_provider_parsing() {
        assert_eq!(
            "SpringBoot".parse::<RuntimeProvider>().unwrap(),
            RuntimeProvider::SpringBoot
        );
        assert_eq!("quarkus".parse::<RuntimeProvider>().unwrap(), RuntimeProvider::Quarkus);
        assert!("wildfly".parse::<RuntimeProvider>().is_err());
    }

    #[test]
    fn runtime_restricted_component() {
        let catalog = ComponentCatalog::builtin().unwrap();
        let event = catalog.get("spring-event").unwrap();
        assert!(event.available_on(RuntimeProvider::SpringBoot));
        assert!(!event.available_on(RuntimeProvider::Quarkus));
        assert!(catalog.get("timer").unwrap().available_on(RuntimeProvider::Karaf));
    }

    #[test]
    fn integral_values_render_without_decimals() {
        assert_eq!(render_value(&serde_json::json!(8080.0)).as_deref(), Some("8080"));
        assert_eq!(render_value(&serde_json::json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(render_value(&serde_json::json!(true)).as_deref(), Some("true"));
        assert_eq!(render_value(&serde_json::json!("INFO")).as_deref(), Some("INFO"));
        assert_eq!(render_value(&Value::Null), None);
    }
}
