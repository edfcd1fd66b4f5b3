//! Settings infrastructure for camelsp.
//!
//! This module loads `settings.toml` files that point the server at extra
//! component descriptors, a trait-definition schema and the runtime provider
//! used to filter components.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, RuntimeProvider, TraitCatalog};
use crate::error::{CatalogError, SettingsError};

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Catalog configuration.
    pub catalog: Option<CatalogSettings>,
}

/// Where descriptors come from and which runtime they are filtered for.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSettings {
    /// Component descriptor files (JSON arrays), relative to the settings
    /// directory. Loaded after the built-in catalog, in order.
    #[serde(default)]
    pub components: Vec<PathBuf>,

    /// Trait-definition schema (JSON array) merged over the built-in traits.
    pub traits: Option<PathBuf>,

    /// `default`, `springboot`, `quarkus` or `karaf`.
    pub runtime_provider: Option<String>,
}

/// Read and parse a settings.toml file.
pub fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match read_settings(path) {
        Ok(settings) => settings,
        Err(SettingsError::Io { .. }) => Settings::default(),
        Err(e) => {
            warn!(error = %e, "ignoring settings file");
            Settings::default()
        }
    }
}

/// Discover settings.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found settings.toml (used for resolving relative paths).
/// If not found, returns `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join("settings.toml");
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join("settings.toml");
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}

fn resolve(path: &Path, settings_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        settings_dir.join(path)
    }
}

/// Build the catalog described by `settings`.
///
/// Only a broken built-in catalog is an error; configured files that cannot
/// be loaded are logged and skipped.
pub fn load_catalog(settings: &Settings, settings_dir: &Path) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::builtin()?;
    let Some(config) = &settings.catalog else {
        return Ok(catalog);
    };

    for path in &config.components {
        let full_path = resolve(path, settings_dir);
        match catalog.components.extend_from_file(&full_path) {
            Ok(count) => info!(path = %full_path.display(), count, "loaded component descriptors"),
            Err(e) => warn!(error = %e, "skipping component descriptors"),
        }
    }

    if let Some(path) = &config.traits {
        let full_path = resolve(path, settings_dir);
        match TraitCatalog::from_file(&full_path) {
            Ok(traits) => catalog.traits.merge(traits),
            Err(e) => warn!(error = %e, "skipping trait definitions"),
        }
    }

    if let Some(name) = &config.runtime_provider {
        match name.parse::<RuntimeProvider>() {
            Ok(runtime) => catalog.runtime = runtime,
            Err(e) => warn!(error = %e, "keeping default runtime provider"),
        }
    }

    Ok(catalog)
}
