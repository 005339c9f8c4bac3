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

//! Log record and severity levels.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;

use crate::Error;
use crate::kv::KeyValue;

/// An enum representing the available severity levels.
///
/// Levels are ordered from the most severe to the most verbose, so `Level::Fatal` is the
/// smallest and `Level::Debug` the greatest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Logs the record, then exits the process.
    Fatal,
    /// Logs the record, then panics.
    Panic,
    /// Designates errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
}

impl Level {
    /// Return the lowercase name of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "fatal",
            Level::Panic => "panic",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Whether a record at this level passes a sink gated at `threshold`.
    ///
    /// # Examples
    ///
    /// ```
    /// use logsplit::Level;
    ///
    /// assert!(Level::Error.passes(Level::Warn));
    /// assert!(Level::Warn.passes(Level::Warn));
    /// assert!(!Level::Info.passes(Level::Warn));
    /// ```
    pub fn passes(self, threshold: Level) -> bool {
        self <= threshold
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for (name, level) in [
            ("fatal", Level::Fatal),
            ("panic", Level::Panic),
            ("error", Level::Error),
            ("warn", Level::Warn),
            ("info", Level::Info),
            ("debug", Level::Debug),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::new(format!("malformed level: {s:?}")))
    }
}

/// The payload of a log message.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    time: Timestamp,
    level: Level,
    file: Option<&'a str>,
    line: Option<u32>,
    message: &'a str,
    kvs: &'a [KeyValue<'a>],
}

impl<'a> Record<'a> {
    /// Create a record observed now, with no call site attached.
    pub fn new(level: Level, message: &'a str, kvs: &'a [KeyValue<'a>]) -> Self {
        Self {
            time: Timestamp::now(),
            level,
            file: None,
            line: None,
            message,
            kvs,
        }
    }

    /// Attach the call site that emitted this record.
    pub fn with_location(mut self, file: &'a str, line: u32) -> Self {
        self.file = Some(file);
        self.line = Some(line);
        self
    }

    /// Strip the call site.
    pub fn without_location(mut self) -> Self {
        self.file = None;
        self.line = None;
        self
    }

    /// Override the observed time.
    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = time;
        self
    }

    /// The observed time.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The severity of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The source file containing the call site, if captured.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// The line containing the call site, if captured.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn message(&self) -> &'a str {
        self.message
    }

    /// The key-values, in call order.
    pub fn key_values(&self) -> &'a [KeyValue<'a>] {
        self.kvs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order_follows_severity() {
        assert!(Level::Fatal < Level::Panic);
        assert!(Level::Panic < Level::Error);
        assert!(Level::Error < Level::Warn);
        assert!(Level::Warn < Level::Info);
        assert!(Level::Info < Level::Debug);

        assert!(Level::Fatal.passes(Level::Error));
        assert!(Level::Debug.passes(Level::Debug));
        assert!(!Level::Debug.passes(Level::Info));
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("Panic".parse::<Level>().unwrap(), Level::Panic);

        let err = "verbose".parse::<Level>().unwrap_err();
        assert_eq!(err.message(), r#"malformed level: "verbose""#);
    }
}
