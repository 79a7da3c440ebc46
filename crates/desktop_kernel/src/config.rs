//! Kernel-wide configuration, loadable from TOML.

use desktop_kernel_contract::Size;
use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Default desktop area: a 1024x768 screen minus the taskbar strip.
pub const DEFAULT_VIEWPORT: Size = Size::new(1024, 728);
/// Offset applied per axis when cascading new windows.
pub const DEFAULT_CASCADE_STEP: i32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Log operations on unknown window ids at warn level instead of debug-only.
    pub warn_on_stale_ids: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Desktop area new windows are placed within.
    pub viewport: Size,
    /// Cascade offset between consecutively created windows.
    pub cascade_step: i32,
    pub diagnostics: DiagnosticsConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            viewport: DEFAULT_VIEWPORT,
            cascade_step: DEFAULT_CASCADE_STEP,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl KernelConfig {
    /// Parses a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidConfig`] for malformed TOML, a non-positive viewport, or a
    /// non-positive cascade step.
    pub fn from_toml_str(raw: &str) -> Result<Self, KernelError> {
        let config: Self =
            toml::from_str(raw).map_err(|err| KernelError::InvalidConfig(err.to_string()))?;
        if config.viewport.width <= 0 || config.viewport.height <= 0 {
            return Err(KernelError::InvalidConfig(format!(
                "viewport must be positive, got {}x{}",
                config.viewport.width, config.viewport.height
            )));
        }
        if config.cascade_step <= 0 {
            return Err(KernelError::InvalidConfig(format!(
                "cascade_step must be positive, got {}",
                config.cascade_step
            )));
        }
        Ok(config)
    }
}
