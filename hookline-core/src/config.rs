// Copyright 2025 Hookline Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Hook system configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Tuning knobs for dispatch behavior.
///
/// # Example JSON configuration
///
/// ```json
/// {
///     "catch_panics": true,
///     "trace_dispatch": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Convert handler panics into isolated failures instead of letting
    /// them unwind through the dispatcher.
    #[serde(default = "default_catch_panics")]
    pub catch_panics: bool,

    /// Emit a debug event per dispatch with hook name and result counts.
    #[serde(default)]
    pub trace_dispatch: bool,
}

fn default_catch_panics() -> bool {
    true
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            catch_panics: default_catch_panics(),
            trace_dispatch: false,
        }
    }
}

/// Errors raised while loading a [`HookConfig`].
#[derive(Debug, Error)]
pub enum HookConfigError {
    #[error("failed to parse hook configuration: {0}")]
    Parse(String),

    #[error("failed to read hook configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl HookConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, HookConfigError> {
        serde_json::from_str(json).map_err(|e| HookConfigError::Parse(e.to_string()))
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, HookConfigError> {
        toml::from_str(toml_str).map_err(|e| HookConfigError::Parse(e.to_string()))
    }

    /// Load a configuration from a `.toml` or `.json` file, chosen by
    /// extension (anything that is not `.toml` parses as JSON).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HookConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            Self::from_toml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }
}
