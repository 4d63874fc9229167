// Copyright 2024 Saptak Santra
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

//! Error types

use std::fmt;

use crate::entity::Entity;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity id already registered
    DuplicateEntity(Entity),

    /// Every auto-assignable entity id is taken
    EntityIdsExhausted,

    /// Schedule advanced with nothing registered
    NoSystemsRegistered,

    /// A system's update reported failure
    SystemFailed { system: String, reason: String },

    /// A hook callback reported failure
    HookFailed { hook: String, reason: String },

    /// Configuration could not be parsed
    ConfigError(String),

    /// IO error (config files, log sinks)
    IoError(String),

    /// Tracing subscriber could not be installed
    LoggingError(String),
}

impl EcsError {
    /// Convenience constructor for failures raised inside `System::update`
    pub fn system(system: impl Into<String>, reason: impl fmt::Display) -> Self {
        EcsError::SystemFailed {
            system: system.into(),
            reason: reason.to_string(),
        }
    }

    /// Convenience constructor for failures raised inside a hook callback
    pub fn hook(hook: impl Into<String>, reason: impl fmt::Display) -> Self {
        EcsError::HookFailed {
            hook: hook.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::DuplicateEntity(entity) => {
                write!(f, "Entity {entity} is already registered")
            }
            EcsError::EntityIdsExhausted => write!(f, "No free entity id left to assign"),
            EcsError::NoSystemsRegistered => {
                write!(f, "Cannot advance schedule: no systems registered")
            }
            EcsError::SystemFailed { system, reason } => {
                write!(f, "System '{system}' failed: {reason}")
            }
            EcsError::HookFailed { hook, reason } => write!(f, "Hook '{hook}' failed: {reason}"),
            EcsError::ConfigError(msg) => write!(f, "Config error: {msg}"),
            EcsError::IoError(msg) => write!(f, "IO error: {msg}"),
            EcsError::LoggingError(msg) => write!(f, "Logging error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<std::io::Error> for EcsError {
    fn from(err: std::io::Error) -> Self {
        EcsError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::ConfigError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
