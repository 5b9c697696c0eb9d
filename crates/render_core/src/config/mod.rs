//! Configuration system
//!
//! [`Config`] gives any serde type TOML/RON file loading keyed on the file
//! extension. [`ResourceConfig`] is the one configuration the resource
//! managers read: where the compiled-in asset paths are rooted and how large
//! the initialization arenas are.

use std::path::{Path, PathBuf};

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    ///
    /// # Errors
    /// I/O failures, parse failures and unknown extensions.
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Serialization failures, I/O failures and unknown extensions.
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Resource manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directory the compiled-in asset paths are resolved against
    pub asset_root: PathBuf,

    /// Arena size for one mesh initialization pass
    pub mesh_arena_bytes: usize,

    /// Arena size for one shader initialization pass
    pub shader_arena_bytes: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("resources"),
            mesh_arena_bytes: 4 * 1024 * 1024,
            shader_arena_bytes: 256 * 1024,
        }
    }
}

impl Config for ResourceConfig {}

impl ResourceConfig {
    /// Default sizes rooted at `asset_root`
    pub fn with_asset_root(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            ..Self::default()
        }
    }

    /// Join a compiled-in relative asset path onto the asset root
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.asset_root.join(relative)
    }

    /// Check arena sizes
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when an arena size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mesh_arena_bytes == 0 {
            return Err(ConfigError::Invalid("mesh_arena_bytes must be non-zero".to_string()));
        }
        if self.shader_arena_bytes == 0 {
            return Err(ConfigError::Invalid("shader_arena_bytes must be non-zero".to_string()));
        }
        Ok(())
    }
}
