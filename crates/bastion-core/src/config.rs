// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::time::Duration;

use thiserror::Error;

/// Rotation interval used when none is configured.
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_millis(500);

/// Environment variable holding the rotation interval in milliseconds.
pub const ENV_ROTATION_INTERVAL_MS: &str = "BASTION_ROTATION_INTERVAL_MS";

/// Environment variable toggling core-dump suppression (`0|1|true|false`).
pub const ENV_DISABLE_CORE_DUMPS: &str = "BASTION_DISABLE_CORE_DUMPS";

/// Errors from reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The rotation interval is not a positive integer.
    #[error("BASTION_ROTATION_INTERVAL_MS: expected a positive integer, got {0:?}")]
    InvalidRotationInterval(String),

    /// A boolean setting is not one of `0`, `1`, `true` or `false`.
    #[error("{var}: expected 0, 1, true or false, got {value:?}")]
    InvalidBool {
        /// Variable name.
        var: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Runtime settings applied by [`init`](crate::init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How often the current coffer's shares are re-masked.
    pub rotation_interval: Duration,

    /// Whether [`init`](crate::init) disables core dumps for the process.
    pub disable_core_dumps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rotation_interval: DEFAULT_ROTATION_INTERVAL,
            disable_core_dumps: true,
        }
    }
}

impl Config {
    /// Sets the rotation interval.
    pub fn with_rotation_interval(mut self, interval: Duration) -> Self {
        self.rotation_interval = interval;
        self
    }

    /// Sets whether core dumps are disabled.
    pub fn with_disable_core_dumps(mut self, disable: bool) -> Self {
        self.disable_core_dumps = disable;
        self
    }

    /// Defaults overlaid with [`ENV_ROTATION_INTERVAL_MS`] and
    /// [`ENV_DISABLE_CORE_DUMPS`] from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ROTATION_INTERVAL_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidRotationInterval(raw.clone()))?;
            config.rotation_interval = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_DISABLE_CORE_DUMPS) {
            config.disable_core_dumps = parse_bool(ENV_DISABLE_CORE_DUMPS, &raw)?;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}
