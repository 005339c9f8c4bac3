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
use std::fmt;
use std::fmt::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Channel;
use crate::Error;
use crate::Level;
use crate::kv::KeyValue;
use crate::record::Record;
use crate::sink::Sink;
use crate::trap::Trap;

/// A logger routing records by severity to one rotating file per channel.
///
/// Build one with [`builder`](crate::builder). Emitting to a channel that is not open is a no-op.
#[derive(Debug)]
pub struct Logger {
    path: PathBuf,
    level: Level,
    need_request_log: bool,
    sinks: BTreeMap<Channel, Sink>,
    trap: Arc<dyn Trap>,
}

macro_rules! emit_methods {
    ($level:expr, $name:ident, $namef:ident, $namew:ident, $label:literal) => {
        #[doc = concat!("Emit the values, concatenated, at ", $label, " level.")]
        #[track_caller]
        pub fn $name(&self, values: &[&dyn fmt::Display]) {
            if let Some(sink) = self.sink_for($level) {
                sink.log($level, &concat(values), &[]);
            }
        }

        #[doc = concat!("Emit a formatted message at ", $label, " level.")]
        #[track_caller]
        pub fn $namef(&self, args: fmt::Arguments) {
            if let Some(sink) = self.sink_for($level) {
                sink.log($level, &fmt::format(args), &[]);
            }
        }

        #[doc = concat!("Emit a message with key-values at ", $label, " level.")]
        #[track_caller]
        pub fn $namew(&self, message: &str, kvs: &[KeyValue]) {
            if let Some(sink) = self.sink_for($level) {
                sink.log($level, message, kvs);
            }
        }
    };
}

impl Logger {
    pub(super) fn new(
        path: PathBuf,
        level: Level,
        need_request_log: bool,
        sinks: BTreeMap<Channel, Sink>,
        trap: Arc<dyn Trap>,
    ) -> Self {
        Self {
            path,
            level,
            need_request_log,
            sinks,
            trap,
        }
    }

    /// The base path every channel's file is derived from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The minimum level the logger was built with.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether the request channel is open.
    pub fn need_request_log(&self) -> bool {
        self.need_request_log
    }

    /// The sink serving `channel`, if that channel is open.
    pub fn sink(&self, channel: Channel) -> Option<&Sink> {
        self.sinks.get(&channel)
    }

    /// All open sinks, in channel order.
    pub fn sinks(&self) -> impl Iterator<Item = &Sink> {
        self.sinks.values()
    }

    /// Whether a record at `level` would be written anywhere.
    pub fn enabled(&self, level: Level) -> bool {
        self.sink_for(level)
            .is_some_and(|sink| level.passes(sink.level()))
    }

    emit_methods!(Level::Debug, debug, debugf, debugw, "debug");
    emit_methods!(Level::Info, info, infof, infow, "info");
    emit_methods!(Level::Warn, warn, warnf, warnw, "warn");
    emit_methods!(Level::Error, error, errorf, errorw, "error");

    /// Write the values, concatenated, to the error channel, then panic with them.
    ///
    /// Nothing happens if the error channel is not open.
    #[track_caller]
    pub fn panic(&self, values: &[&dyn fmt::Display]) {
        if let Some(sink) = self.sink_for(Level::Panic) {
            sink.panic(&concat(values), &[]);
        }
    }

    /// Write a formatted message to the error channel, then panic with it.
    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments) {
        if let Some(sink) = self.sink_for(Level::Panic) {
            sink.panic(&fmt::format(args), &[]);
        }
    }

    /// Write a message with key-values to the error channel, then panic with the message.
    #[track_caller]
    pub fn panicw(&self, message: &str, kvs: &[KeyValue]) {
        if let Some(sink) = self.sink_for(Level::Panic) {
            sink.panic(message, kvs);
        }
    }

    /// Write the values, concatenated, to the error channel, then exit the process.
    ///
    /// Nothing happens if the error channel is not open.
    #[track_caller]
    pub fn fatal(&self, values: &[&dyn fmt::Display]) {
        if let Some(sink) = self.sink_for(Level::Fatal) {
            sink.fatal(&concat(values), &[]);
        }
    }

    /// Write a formatted message to the error channel, then exit the process.
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments) {
        if let Some(sink) = self.sink_for(Level::Fatal) {
            sink.fatal(&fmt::format(args), &[]);
        }
    }

    /// Write a message with key-values to the error channel, then exit the process.
    #[track_caller]
    pub fn fatalw(&self, message: &str, kvs: &[KeyValue]) {
        if let Some(sink) = self.sink_for(Level::Fatal) {
            sink.fatal(message, kvs);
        }
    }

    /// Write an info record with an empty message to the request channel.
    ///
    /// Nothing happens unless the logger was built with `need_request_log`.
    #[track_caller]
    pub fn request_log_infow(&self, kvs: &[KeyValue]) {
        if !self.need_request_log {
            return;
        }
        if let Some(sink) = self.sinks.get(&Channel::Request) {
            sink.log(Level::Info, "", kvs);
        }
    }

    /// Route a prepared record to the channel of its level.
    ///
    /// The record's own location is kept; panic and fatal records are written without panicking
    /// or exiting.
    pub fn log(&self, record: &Record) {
        if let Some(sink) = self.sink_for(record.level()) {
            sink.log_record(record);
        }
    }

    /// Flush every open sink.
    ///
    /// # Errors
    ///
    /// Every sink is flushed even if an earlier one fails; the first failure is returned.
    pub fn sync(&self) -> Result<(), Error> {
        let mut result = Ok(());
        for sink in self.sinks.values() {
            if let Err(err) = sink.flush() {
                let err = Error::new("failed to sync log channel")
                    .with_context("channel", sink.channel())
                    .with_source(err);
                if result.is_ok() {
                    result = Err(err);
                } else {
                    self.trap.trap(&err);
                }
            }
        }
        result
    }

    pub(crate) fn trap(&self) -> &dyn Trap {
        self.trap.as_ref()
    }

    fn sink_for(&self, level: Level) -> Option<&Sink> {
        self.sinks.get(&Channel::for_level(level))
    }
}

fn concat(values: &[&dyn fmt::Display]) -> String {
    let mut message = String::new();
    for value in values {
        // writing into a String cannot fail
        let _ = write!(message, "{value}");
    }
    message
}
