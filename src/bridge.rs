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

//! A bridge to forward logs from the `log` crate to the process-wide logger.

use crate::Level;
use crate::default_logger;
use crate::kv::KeyValue;
use crate::record::Record;

struct LogCrateLogger(());

fn level_of(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

struct KeyValueVisitor<'kvs> {
    kvs: Vec<(log::kv::Key<'kvs>, log::kv::Value<'kvs>)>,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KeyValueVisitor<'kvs> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.kvs.push((key, value));
        Ok(())
    }
}

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        default_logger().is_some_and(|logger| logger.enabled(level_of(metadata.level())))
    }

    fn log(&self, record: &log::Record) {
        let Some(logger) = default_logger() else {
            return;
        };
        let level = level_of(record.level());
        if !logger.enabled(level) {
            return;
        }

        let mut visitor = KeyValueVisitor { kvs: Vec::new() };
        // the visitor never fails
        let _ = record.key_values().visit(&mut visitor);
        let kvs = visitor
            .kvs
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect::<Vec<KeyValue>>();

        let message = record.args().to_string();
        let mut forwarded = Record::new(level, &message, &kvs);
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            forwarded = forwarded.with_location(file, line);
        }
        logger.log(&forwarded);
    }

    fn flush(&self) {
        crate::sync();
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] so that all logs from the log crate are forwarded to
/// the process-wide logger installed by [`init`](crate::init). Records are dropped while no logger
/// is installed.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// if let Err(err) = logsplit::bridge::try_setup_log_crate() {
///     eprintln!("failed to setup log crate: {err}");
/// }
/// ```
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// See [`try_setup_log_crate`].
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// logsplit::bridge::setup_log_crate();
/// ```
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "logsplit::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_of(log::Level::Error), Level::Error);
        assert_eq!(level_of(log::Level::Warn), Level::Warn);
        assert_eq!(level_of(log::Level::Info), Level::Info);
        assert_eq!(level_of(log::Level::Debug), Level::Debug);
        assert_eq!(level_of(log::Level::Trace), Level::Debug);
    }
}
