// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Renderer configuration, loadable from RON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables of the renderer.
///
/// Every field has a default, so a RON file only needs to name what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Maximum number of commands recorded per frame.
    pub command_capacity: usize,
    /// Directory holding `<program>.<stage>.spv` artifacts.
    pub shader_dir: PathBuf,
    /// Linear RGBA color the main target is cleared to.
    pub clear_color: [f32; 4],
    /// Whether timestamp markers are recorded.
    pub enable_gpu_timestamps: bool,
    /// Whether the overlay pass is drawn at startup.
    pub overlay_enabled: bool,
    /// Whether shader reloads are triggered by the change monitor.
    pub hot_reload: bool,
    /// Number of animated quad instances.
    pub animated_quads: u32,
    /// Upper bound in bytes on loaded shader bytecode.
    pub shader_arena_limit: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command_capacity: 4096,
            shader_dir: PathBuf::from("shaders/compiled"),
            clear_color: [0.05, 0.05, 0.08, 1.0],
            enable_gpu_timestamps: true,
            overlay_enabled: true,
            hot_reload: false,
            animated_quads: 16,
            shader_arena_limit: 100 * 1024 * 1024,
        }
    }
}

/// An error raised while loading a [`RendererConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read renderer config '{}': {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not a valid configuration.
    #[error("Invalid renderer config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// A value is out of its allowed range.
    #[error("Invalid renderer config: {0}")]
    Invalid(&'static str),
}

impl RendererConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        log::debug!("Loaded renderer config from '{}'", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.command_capacity == 0 {
            return Err(ConfigError::Invalid("command_capacity must be non-zero"));
        }
        if self.shader_arena_limit == 0 {
            return Err(ConfigError::Invalid("shader_arena_limit must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_struct_takes_defaults() {
        let config = RendererConfig::from_ron_str("()").unwrap();
        assert_eq!(config, RendererConfig::default());
        assert_eq!(config.command_capacity, 4096);
        assert!(!config.hot_reload);
    }

    #[test]
    fn overrides_are_applied() {
        let config = RendererConfig::from_ron_str(
            r#"(
                command_capacity: 64,
                shader_dir: "assets/spv",
                hot_reload: true,
            )"#,
        )
        .unwrap();
        assert_eq!(config.command_capacity, 64);
        assert_eq!(config.shader_dir, PathBuf::from("assets/spv"));
        assert!(config.hot_reload);
        assert!(config.overlay_enabled);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = RendererConfig::from_ron_str("(command_capacity: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_arena_limit_is_rejected() {
        let err = RendererConfig::from_ron_str("(shader_arena_limit: 0)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(msg) if msg.contains("shader_arena_limit")
        ));
        let config = RendererConfig::from_ron_str("(shader_arena_limit: 4096)").unwrap();
        assert_eq!(config.shader_arena_limit, 4096);
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = RendererConfig::from_ron_str("(command_capacity: )").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
