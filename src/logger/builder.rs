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

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Channel;
use crate::Error;
use crate::Level;
use crate::Logger;
use crate::RotationPolicy;
use crate::global::set_logger;
use crate::sink::SinkBuilder;
use crate::trap::Trap;
use crate::trap::default_trap;

/// Create a [`LoggerBuilder`] writing under `path` with `level` as the minimum level.
///
/// # Examples
///
/// ```
/// use logsplit::Level;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = logsplit::builder(dir.path().join("app.log"), Level::Info)
///     .need_request_log(true)
///     .max_backups(10)
///     .build()
///     .unwrap();
/// logger.info(&[&"started"]);
/// ```
pub fn builder(path: impl Into<PathBuf>, level: Level) -> LoggerBuilder {
    LoggerBuilder {
        path: path.into(),
        level,
        need_request_log: false,
        caller: false,
        rotation: RotationPolicy::default(),
        trap: default_trap(),
    }
}

/// A builder accumulating the logger's configuration before its sinks are opened.
///
/// Every setter applies to all channels alike; there is no per-channel override.
#[must_use = "call `apply` to set the global logger or `build` to construct a logger instance"]
#[derive(Debug)]
pub struct LoggerBuilder {
    path: PathBuf,
    level: Level,
    need_request_log: bool,
    caller: bool,
    rotation: RotationPolicy,
    trap: Arc<dyn Trap>,
}

impl LoggerBuilder {
    /// Open the request channel as well.
    pub fn need_request_log(mut self, need: bool) -> Self {
        self.need_request_log = need;
        self
    }

    /// Record the call site of each emit in every channel.
    pub fn caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Replace the rotation policy of every channel.
    pub fn rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotate files once they reach `mb` megabytes.
    pub fn max_file_size(mut self, mb: usize) -> Self {
        self.rotation.max_file_size_mb = mb;
        self
    }

    /// Keep at most `n` backups per channel. `0` keeps all of them.
    pub fn max_backups(mut self, n: usize) -> Self {
        self.rotation.max_backups = n;
        self
    }

    /// Remove backups older than `days`. `0` keeps them regardless of age.
    pub fn max_age(mut self, days: usize) -> Self {
        self.rotation.max_age_days = days;
        self
    }

    /// Gzip backups on rotation.
    pub fn compress(mut self, compress: bool) -> Self {
        self.rotation.compress = compress;
        self
    }

    /// Set the trap for errors raised while writing or rotating.
    ///
    /// Default to [`DefaultTrap`](crate::trap::DefaultTrap).
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.trap = Arc::new(trap);
        self
    }

    /// Open one sink per active channel and build the [`Logger`].
    ///
    /// # Errors
    ///
    /// Return an error if any channel's file cannot be opened. Files opened before the failure
    /// are closed again.
    pub fn build(self) -> Result<Logger, Error> {
        let LoggerBuilder {
            path,
            level,
            need_request_log,
            caller,
            rotation,
            trap,
        } = self;

        let mut sinks = BTreeMap::new();
        for channel in Channel::derive(level, need_request_log) {
            let sink = SinkBuilder::new(channel, &path)
                .caller(caller)
                .rotation(rotation)
                .shared_trap(trap.clone())
                .build()
                .map_err(|err| {
                    Error::new("failed to open log channel")
                        .with_context("channel", channel)
                        .with_source(err)
                })?;
            sinks.insert(channel, sink);
        }

        Ok(Logger::new(path, level, need_request_log, sinks, trap))
    }

    /// Build the logger and install it as the process-wide logger, replacing any previous one.
    ///
    /// The previous logger is dropped once no in-flight call holds it; it is not synced first.
    ///
    /// # Errors
    ///
    /// Return an error if [`build`](LoggerBuilder::build) fails. The process-wide logger is
    /// cleared in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use logsplit::Level;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// if let Err(err) = logsplit::builder(dir.path().join("app.log"), Level::Warn).try_apply() {
    ///     eprintln!("failed to set logger: {err}");
    /// }
    /// ```
    pub fn try_apply(self) -> Result<(), Error> {
        match self.build() {
            Ok(logger) => {
                set_logger(Some(Arc::new(logger)));
                Ok(())
            }
            Err(err) => {
                set_logger(None);
                Err(err)
            }
        }
    }

    /// Like [`try_apply`](LoggerBuilder::try_apply), but reports a failure to the trap instead of
    /// returning it, leaving the process-wide logger unset.
    pub fn apply(self) {
        let trap = self.trap.clone();
        if let Err(err) = self.try_apply() {
            trap.trap(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_options_apply_to_every_channel() {
        let temp_dir = TempDir::new().unwrap();
        let logger = builder(temp_dir.path().join("t.log"), Level::Debug)
            .need_request_log(true)
            .caller(true)
            .max_file_size(8)
            .max_backups(5)
            .max_age(14)
            .compress(false)
            .build()
            .unwrap();

        let expected = RotationPolicy {
            max_file_size_mb: 8,
            max_backups: 5,
            max_age_days: 14,
            compress: false,
        };
        let channels = logger.sinks().map(|s| s.channel()).collect::<Vec<_>>();
        assert_eq!(
            channels,
            vec![
                Channel::Debug,
                Channel::Info,
                Channel::Warn,
                Channel::Error,
                Channel::Request
            ]
        );
        for sink in logger.sinks() {
            assert_eq!(*sink.rotation(), expected, "channel {}", sink.channel());
            assert!(sink.caller(), "channel {}", sink.channel());
        }
    }

    #[test]
    fn test_unbounded_max_age_builds() {
        let temp_dir = TempDir::new().unwrap();
        let logger = builder(temp_dir.path().join("t.log"), Level::Info)
            .max_age(usize::MAX)
            .build()
            .unwrap();
        for sink in logger.sinks() {
            assert_eq!(sink.rotation().max_age_days, usize::MAX);
        }
    }

    #[test]
    fn test_build_fails_when_directory_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let err = builder(blocker.join("t.log"), Level::Info)
            .build()
            .unwrap_err();
        assert_eq!(err.message(), "failed to open log channel");
        assert_eq!(err.context("channel"), Some("INFO"));
    }
}
