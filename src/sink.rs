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

//! One channel's level gate, caller capture and rotating file.

use std::panic::Location;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Append;
use crate::Channel;
use crate::Error;
use crate::Level;
use crate::RotationPolicy;
use crate::append::file::RollingFileBuilder;
use crate::kv::KeyValue;
use crate::layout::JsonLayout;
use crate::record::Record;
use crate::trap::Trap;
use crate::trap::default_trap;

/// A builder holding a sink's configuration until it is built.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use logsplit::Channel;
/// use logsplit::sink::SinkBuilder;
///
/// let dir = tempfile::tempdir().unwrap();
/// let sink = SinkBuilder::new(Channel::Warn, &dir.path().join("app.log"))
///     .caller(true)
///     .max_backups(5)
///     .build()
///     .unwrap();
/// assert!(sink.file_path().ends_with("app.log.WARN"));
/// ```
#[must_use = "call `build` to open the sink's file"]
#[derive(Debug)]
pub struct SinkBuilder {
    channel: Channel,
    filepath: PathBuf,
    caller: bool,
    rotation: RotationPolicy,
    trap: Arc<dyn Trap>,
}

impl SinkBuilder {
    /// Create a builder for `channel` under the base path.
    ///
    /// The sink is gated at the channel's level.
    pub fn new(channel: Channel, base_path: &Path) -> Self {
        Self {
            channel,
            filepath: channel.file_path(base_path),
            caller: false,
            rotation: RotationPolicy::default(),
            trap: default_trap(),
        }
    }

    /// Record the call site of each emit.
    pub fn caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Replace the whole rotation policy.
    pub fn rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the rotation threshold in megabytes.
    pub fn max_file_size(mut self, mb: usize) -> Self {
        self.rotation.max_file_size_mb = mb;
        self
    }

    /// Set the number of backups kept.
    pub fn max_backups(mut self, n: usize) -> Self {
        self.rotation.max_backups = n;
        self
    }

    /// Set the age in days after which backups are removed.
    pub fn max_age(mut self, days: usize) -> Self {
        self.rotation.max_age_days = days;
        self
    }

    /// Set whether backups are compressed.
    pub fn compress(mut self, compress: bool) -> Self {
        self.rotation.compress = compress;
        self
    }

    /// Set the trap for write and rotation errors.
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.trap = Arc::new(trap);
        self
    }

    pub(crate) fn shared_trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = trap;
        self
    }

    /// Open the file and wire the JSON layout to it.
    ///
    /// # Errors
    ///
    /// Return an error if the file or its directory cannot be created.
    pub fn build(self) -> Result<Sink, Error> {
        let SinkBuilder {
            channel,
            filepath,
            caller,
            rotation,
            trap,
        } = self;

        let builder = RollingFileBuilder::new(&filepath)
            .layout(JsonLayout::default())
            .shared_trap(trap.clone());
        let append = rotation.apply(builder).build()?;

        Ok(Sink {
            channel,
            filepath,
            level: channel.level(),
            caller,
            rotation,
            append: Box::new(append),
            trap,
        })
    }
}

/// A built sink. Its configuration is fixed for its whole life.
#[derive(Debug)]
pub struct Sink {
    channel: Channel,
    filepath: PathBuf,
    level: Level,
    caller: bool,
    rotation: RotationPolicy,
    append: Box<dyn Append>,
    trap: Arc<dyn Trap>,
}

impl Sink {
    /// The channel this sink serves.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The current log file.
    pub fn file_path(&self) -> &Path {
        &self.filepath
    }

    /// The level the sink is gated at, which is always its channel's level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether records carry their call site.
    pub fn caller(&self) -> bool {
        self.caller
    }

    /// The rotation policy the file was opened with.
    pub fn rotation(&self) -> &RotationPolicy {
        &self.rotation
    }

    /// Emit a record at `level`, attributed to the caller's call site.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, kvs: &[KeyValue]) {
        let location = Location::caller();
        let record =
            Record::new(level, message, kvs).with_location(location.file(), location.line());
        self.log_record(&record);
    }

    /// Emit a prepared record.
    ///
    /// Records less severe than the sink's level are dropped, and the call site is stripped
    /// unless caller capture is on. Write failures go to the trap.
    pub fn log_record(&self, record: &Record) {
        if !record.level().passes(self.level) {
            return;
        }

        let result = if self.caller {
            self.append.append(record)
        } else {
            self.append.append(&record.clone().without_location())
        };
        if let Err(err) = result {
            let err = Error::new("failed to write record")
                .with_context("channel", self.channel)
                .with_source(err);
            self.trap.trap(&err);
        }
    }

    /// Write a panic record, flush, then panic with the message.
    #[track_caller]
    pub fn panic(&self, message: &str, kvs: &[KeyValue]) -> ! {
        self.log(Level::Panic, message, kvs);
        self.flush_or_trap();
        panic!("{message}");
    }

    /// Write a fatal record, flush, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: &str, kvs: &[KeyValue]) -> ! {
        self.log(Level::Fatal, message, kvs);
        self.flush_or_trap();
        std::process::exit(1);
    }

    /// Flush the underlying file.
    pub fn flush(&self) -> Result<(), Error> {
        self.append.flush()
    }

    fn flush_or_trap(&self) {
        if let Err(err) = self.flush() {
            self.trap.trap(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::panic;
    use std::panic::AssertUnwindSafe;

    use tempfile::TempDir;

    use super::*;
    use crate::trap::testing::CollectingTrap;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_level_gate() {
        let temp_dir = TempDir::new().unwrap();
        let sink = SinkBuilder::new(Channel::Warn, &temp_dir.path().join("t.log"))
            .build()
            .unwrap();
        assert_eq!(sink.level(), Level::Warn);

        sink.log(Level::Info, "dropped", &[]);
        sink.log(Level::Warn, "kept", &[]);
        sink.log(Level::Error, "also kept", &[]);
        sink.flush().unwrap();

        let lines = read_lines(sink.file_path());
        let messages = lines.iter().map(|l| l["msg"].clone()).collect::<Vec<_>>();
        assert_eq!(messages, vec!["kept", "also kept"]);
        assert!(lines.iter().all(|l| l.get("caller").is_none()));
    }

    #[test]
    fn test_every_sink_is_gated_at_its_channel_level() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("t.log");
        for channel in Channel::derive(Level::Debug, true) {
            let sink = SinkBuilder::new(channel, &base).build().unwrap();
            assert_eq!(sink.level(), channel.level(), "channel {channel}");
        }
    }

    #[test]
    fn test_caller_points_at_call_site() {
        let temp_dir = TempDir::new().unwrap();
        let sink = SinkBuilder::new(Channel::Info, &temp_dir.path().join("t.log"))
            .caller(true)
            .build()
            .unwrap();

        let line = line!() + 1;
        sink.log(Level::Info, "here", &[]);
        sink.flush().unwrap();

        let lines = read_lines(sink.file_path());
        assert_eq!(lines[0]["caller"], format!("{}:{line}", file!()));
    }

    #[test]
    fn test_panic_writes_before_unwinding() {
        let temp_dir = TempDir::new().unwrap();
        let sink = SinkBuilder::new(Channel::Error, &temp_dir.path().join("t.log"))
            .build()
            .unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            sink.panic("boom", &[("code", 7.into())]);
        }));
        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<String>().unwrap(), "boom");

        let lines = read_lines(sink.file_path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "panic");
        assert_eq!(lines[0]["msg"], "boom");
        assert_eq!(lines[0]["code"], 7);
    }

    #[test]
    fn test_builder_setters_reach_policy() {
        let temp_dir = TempDir::new().unwrap();
        let trap = Arc::new(CollectingTrap::default());
        let sink = SinkBuilder::new(Channel::Request, &temp_dir.path().join("t.log"))
            .max_file_size(16)
            .max_backups(9)
            .max_age(30)
            .compress(false)
            .trap(trap.clone())
            .build()
            .unwrap();

        assert_eq!(
            *sink.rotation(),
            RotationPolicy {
                max_file_size_mb: 16,
                max_backups: 9,
                max_age_days: 30,
                compress: false,
            }
        );
        assert_eq!(sink.level(), Level::Info);
        assert!(trap.errors().is_empty());
    }
}
