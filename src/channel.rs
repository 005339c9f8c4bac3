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

//! Channels and the rule deciding which of them a logger opens.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::Level;

/// A named log stream backed by exactly one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Debug records, in `<path>.DEBUG`.
    Debug,
    /// Info records, in `<path>.INFO`.
    Info,
    /// Warn records, in `<path>.WARN`.
    Warn,
    /// Error, panic and fatal records, in `<path>.ERROR`.
    Error,
    /// Request/access records, in `<path>.Request`.
    Request,
}

impl Channel {
    /// The label appended to the base path.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Debug => "DEBUG",
            Channel::Info => "INFO",
            Channel::Warn => "WARN",
            Channel::Error => "ERROR",
            Channel::Request => "Request",
        }
    }

    /// The level the channel's sink is gated at.
    pub fn level(&self) -> Level {
        match self {
            Channel::Debug => Level::Debug,
            Channel::Info | Channel::Request => Level::Info,
            Channel::Warn => Level::Warn,
            Channel::Error => Level::Error,
        }
    }

    /// The severity channel a record at `level` is routed to.
    pub fn for_level(level: Level) -> Channel {
        match level {
            Level::Debug => Channel::Debug,
            Level::Info => Channel::Info,
            Level::Warn => Channel::Warn,
            Level::Error | Level::Panic | Level::Fatal => Channel::Error,
        }
    }

    /// The file this channel writes to: `base` with `.<label>` appended.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use logsplit::Channel;
    ///
    /// let path = Channel::Warn.file_path(Path::new("/var/log/app.log"));
    /// assert_eq!(path, Path::new("/var/log/app.log.WARN"));
    /// ```
    pub fn file_path(&self, base: &Path) -> PathBuf {
        let mut path = OsString::from(base.as_os_str());
        path.push(".");
        path.push(self.label());
        PathBuf::from(path)
    }

    /// Derive the channels opened for a minimum level.
    ///
    /// Every severity channel from `min_level` through error is active; panic and fatal only
    /// open the error channel. The request channel is added when `need_request_log` is set.
    pub fn derive(min_level: Level, need_request_log: bool) -> Vec<Channel> {
        let mut channels = match min_level {
            Level::Debug => vec![Channel::Debug, Channel::Info, Channel::Warn, Channel::Error],
            Level::Info => vec![Channel::Info, Channel::Warn, Channel::Error],
            Level::Warn => vec![Channel::Warn, Channel::Error],
            Level::Error | Level::Panic | Level::Fatal => vec![Channel::Error],
        };
        if need_request_log {
            channels.push(Channel::Request);
        }
        channels
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
