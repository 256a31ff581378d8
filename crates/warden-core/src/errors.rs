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


//! Error types for permission lookup and dispatch.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = WardenError> = std::result::Result<T, E>;

/// Errors raised by the registry and its dispatchers.
///
/// Dispatch only ever produces [`WardenError::UnknownResource`] and
/// [`WardenError::UnknownAction`]. Both are returned before any handler runs.
/// Failures inside a handler are part of the handler's output and are never
/// wrapped in this type.
#[derive(Error, Debug)]
pub enum WardenError {
    /// No definition is registered under the requested resource name.
    #[error("unknown resource '{resource}'")]
    UnknownResource {
        /// The resource name that was looked up.
        resource: String,
    },

    /// The resource exists but declares no handler for the requested action.
    #[error("unknown action '{action}' for resource '{resource}'")]
    UnknownAction {
        /// The resource whose definition was searched.
        resource: String,
        /// The action name that was looked up.
        action: String,
    },

    /// Error related to configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error during deserialization of a configuration document.
    #[error("Serialization/Deserialization Error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl WardenError {
    pub(crate) fn unknown_resource(resource: &str) -> Self {
        WardenError::UnknownResource {
            resource: resource.to_string(),
        }
    }

    pub(crate) fn unknown_action(resource: &str, action: &str) -> Self {
        WardenError::UnknownAction {
            resource: resource.to_string(),
            action: action.to_string(),
        }
    }

    /// Returns `true` for [`WardenError::UnknownResource`].
    pub fn is_unknown_resource(&self) -> bool {
        matches!(self, WardenError::UnknownResource { .. })
    }

    /// Returns `true` for [`WardenError::UnknownAction`].
    pub fn is_unknown_action(&self) -> bool {
        matches!(self, WardenError::UnknownAction { .. })
    }
}
