//! Application registry: per-app window defaults and capability flags.

use std::collections::{BTreeMap, HashMap};

use desktop_kernel_contract::{ApplicationId, Position, Size};
use leptos::logging;
use serde::{Deserialize, Serialize};

use crate::{
    error::KernelError,
    model::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH},
};

/// Manifest bundled with the shell for its built-in mini-applications.
pub const BUILTIN_APPS_MANIFEST: &str = include_str!("../apps.toml");

/// Where the first window of an application lands before cascading takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionStrategy {
    Center,
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// Fixed coordinates; never cascaded.
    Explicit { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub x: i32,
    pub y: i32,
}

impl Default for Margin {
    fn default() -> Self {
        Self { x: 40, y: 48 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppWindowConfig {
    pub title: String,
    pub icon_id: String,
    pub default_size: Size,
    pub min_size: Size,
    pub max_size: Option<Size>,
    pub position: PositionStrategy,
    pub margin: Margin,
    pub can_resize: bool,
    pub can_minimize: bool,
    pub can_maximize: bool,
}

impl Default for AppWindowConfig {
    fn default() -> Self {
        Self {
            title: "Window".to_string(),
            icon_id: "application".to_string(),
            default_size: Size::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
            min_size: Size::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT),
            max_size: None,
            position: PositionStrategy::default(),
            margin: Margin::default(),
            can_resize: true,
            can_minimize: true,
            can_maximize: true,
        }
    }
}

impl AppWindowConfig {
    /// Returns the explicit coordinates when the strategy pins the window.
    pub fn explicit_position(&self) -> Option<Position> {
        match self.position {
            PositionStrategy::Explicit { x, y } => Some(Position::new(x, y)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppManifest {
    #[serde(default)]
    apps: BTreeMap<String, AppWindowConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationRegistry {
    apps: HashMap<ApplicationId, AppWindowConfig>,
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for the shell's built-in apps.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_APPS_MANIFEST).unwrap_or_else(|err| {
            logging::error!("built-in app manifest rejected: {err}");
            Self::default()
        })
    }

    /// Parses an `[apps."<application-id>"]` manifest.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidConfig`] for malformed TOML or invalid application ids.
    pub fn from_toml_str(raw: &str) -> Result<Self, KernelError> {
        let manifest: AppManifest =
            toml::from_str(raw).map_err(|err| KernelError::InvalidConfig(err.to_string()))?;
        let mut registry = Self::default();
        for (raw_id, config) in manifest.apps {
            let application_id = ApplicationId::new(raw_id).map_err(KernelError::InvalidConfig)?;
            registry.register(application_id, config);
        }
        Ok(registry)
    }

    /// Adds or replaces an entry.
    pub fn register(&mut self, application_id: ApplicationId, config: AppWindowConfig) {
        self.apps.insert(application_id, config);
    }

    /// # Errors
    ///
    /// Returns [`KernelError::ConfigMissing`] when `application_id` is not registered.
    pub fn config_for(&self, application_id: &ApplicationId) -> Result<&AppWindowConfig, KernelError> {
        self.apps
            .get(application_id)
            .ok_or_else(|| KernelError::ConfigMissing {
                application_id: application_id.clone(),
            })
    }

    /// Returns the registered config, or the default config when none is registered.
    pub fn resolve(&self, application_id: &ApplicationId) -> AppWindowConfig {
        match self.config_for(application_id) {
            Ok(config) => config.clone(),
            Err(err) => {
                logging::warn!("{err}; using default window configuration");
                AppWindowConfig::default()
            }
        }
    }

    /// Registered ids in sorted order.
    pub fn application_ids(&self) -> Vec<ApplicationId> {
        let mut ids: Vec<ApplicationId> = self.apps.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
