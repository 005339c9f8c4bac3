// Copyright 2024 FastLabs Developers
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

//! Serde-loadable logger configuration.

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Level;
use crate::LoggerBuilder;
use crate::RotationPolicy;
use crate::builder;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// Logger settings as they appear in a configuration file.
///
/// Only `path` is required. An unknown `level` falls back to `info`.
///
/// # Examples
///
/// ```
/// use logsplit::Config;
/// use logsplit::Level;
///
/// let config: Config = serde_json::from_str(
///     r#"{"path": "/var/log/app.log", "level": "warn", "rotation": {"max_backups": 10}}"#,
/// )
/// .unwrap();
/// assert_eq!(config.level(), Level::Warn);
/// assert_eq!(config.rotation.max_backups, 10);
/// assert_eq!(config.rotation.max_age_days, 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The base path of every channel's file.
    pub path: PathBuf,
    /// The minimum level, by name.
    #[serde(default = "default_level")]
    pub level: String,
    /// Open the request channel.
    #[serde(default)]
    pub need_request_log: bool,
    /// Record call sites.
    #[serde(default)]
    pub caller: bool,
    /// Rotation applied to every channel.
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_level() -> String {
    Level::Info.as_str().to_string()
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            level: default_level(),
            need_request_log: false,
            caller: false,
            rotation: RotationPolicy::default(),
        }
    }

    /// The configured level, or `info` if the name is not recognized.
    pub fn level(&self) -> Level {
        self.level.parse().unwrap_or(Level::Info)
    }

    /// Turn the configuration into a builder.
    ///
    /// An unrecognized level is reported to `trap` before falling back to `info`.
    pub fn builder_with_trap(self, trap: impl Trap) -> LoggerBuilder {
        let level = match self.level.parse::<Level>() {
            Ok(level) => level,
            Err(err) => {
                trap.trap(&err.with_context("fallback", Level::Info));
                Level::Info
            }
        };

        builder(self.path, level)
            .need_request_log(self.need_request_log)
            .caller(self.caller)
            .rotation(self.rotation)
            .trap(trap)
    }
}

impl From<Config> for LoggerBuilder {
    fn from(config: Config) -> Self {
        config.builder_with_trap(DefaultTrap::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::Channel;
    use crate::trap::testing::CollectingTrap;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"path": "./t.log"}"#).unwrap();
        assert_eq!(config, Config::new("./t.log"));
        assert_eq!(config.level(), Level::Info);
        assert_eq!(config.rotation, RotationPolicy::default());
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            level: "verbose".to_string(),
            ..Config::new(temp_dir.path().join("t.log"))
        };
        assert_eq!(config.level(), Level::Info);

        let trap = Arc::new(CollectingTrap::default());
        let logger = config.builder_with_trap(trap.clone()).build().unwrap();
        assert_eq!(logger.level(), Level::Info);
        assert!(logger.sink(Channel::Info).is_some());
        assert!(logger.sink(Channel::Debug).is_none());

        let errors = trap.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("malformed level"), "{}", errors[0]);
        assert!(errors[0].contains("fallback: info"), "{}", errors[0]);
    }

    #[test]
    fn test_config_reaches_every_sink() {
        let temp_dir = TempDir::new().unwrap();
        let config: Config = serde_json::from_value(serde_json::json!({
            "path": temp_dir.path().join("t.log"),
            "level": "DEBUG",
            "need_request_log": true,
            "caller": true,
            "rotation": {
                "max_file_size_mb": 2,
                "max_backups": 0,
                "max_age_days": 1,
                "compress": false
            }
        }))
        .unwrap();

        let logger = LoggerBuilder::from(config.clone()).build().unwrap();
        assert_eq!(logger.level(), Level::Debug);
        assert_eq!(logger.sinks().count(), 5);
        for sink in logger.sinks() {
            assert_eq!(*sink.rotation(), config.rotation);
            assert!(sink.caller());
        }
    }
}
