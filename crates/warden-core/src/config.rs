// Copyright 2024 Warden Contributors
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


//! Configuration for a permissions registry.

use crate::errors::{Result, WardenError};
use serde::{Deserialize, Serialize};

/// Settings applied when a registry is built.
///
/// None of these change what a dispatch returns; they only shape how the
/// registry reports itself through `tracing`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionsConfig {
    /// Label attached to every log event emitted by the registry.
    pub name: String,
    /// Emit a warning when a later definition replaces an earlier one with the
    /// same resource name.
    pub warn_on_overwrite: bool,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            warn_on_overwrite: true,
        }
    }
}

impl PermissionsConfig {
    /// Default settings under a different registry name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    pub fn from_json(document: &str) -> Result<Self> {
        let config: PermissionsConfig = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings for values the registry cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(WardenError::Config(
                "registry name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
