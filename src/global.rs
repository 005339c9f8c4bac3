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

//! The process-wide logger and the free functions dispatching to it.
//!
//! Every function here is a no-op until [`init`] (or [`LoggerBuilder::apply`]) has installed a
//! logger.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::Error;
use crate::Level;
use crate::Logger;
use crate::LoggerBuilder;
use crate::builder;
use crate::kv::KeyValue;

static LOGGER: RwLock<Option<Arc<Logger>>> = RwLock::new(None);

/// Return the process-wide logger, if one is installed.
pub fn default_logger() -> Option<Arc<Logger>> {
    LOGGER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub(crate) fn set_logger(logger: Option<Arc<Logger>>) {
    let previous = {
        let mut slot = LOGGER.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, logger)
    };
    // the previous logger closes its files outside the lock
    drop(previous);
}

/// Install a logger writing under `path` with default rotation, replacing any previous one.
///
/// Failures to open the log files are reported to stderr and leave no logger installed. Use
/// [`builder`] for more options.
///
/// # Examples
///
/// ```
/// use logsplit::Level;
///
/// let dir = tempfile::tempdir().unwrap();
/// logsplit::init(dir.path().join("app.log"), Level::Info, false);
/// logsplit::infow("started", &[("port", 8080.into())]);
/// logsplit::sync();
/// ```
pub fn init(path: impl Into<PathBuf>, level: Level, need_request_log: bool) {
    init_builder(path, level, need_request_log).apply()
}

/// Like [`init`], but returns the error instead of reporting it.
///
/// # Errors
///
/// Return an error if a channel's file or directory cannot be created.
pub fn try_init(
    path: impl Into<PathBuf>,
    level: Level,
    need_request_log: bool,
) -> Result<(), Error> {
    init_builder(path, level, need_request_log).try_apply()
}

fn init_builder(path: impl Into<PathBuf>, level: Level, need_request_log: bool) -> LoggerBuilder {
    builder(path, level).need_request_log(need_request_log)
}

/// Flush every channel of the process-wide logger.
pub fn sync() {
    if let Some(logger) = default_logger() {
        if let Err(err) = logger.sync() {
            logger.trap().trap(&err);
        }
    }
}

macro_rules! global_emit_fns {
    ($name:ident, $namef:ident, $namew:ident) => {
        #[doc = concat!("Dispatch to [`Logger::", stringify!($name), "`] on the process-wide logger.")]
        #[track_caller]
        pub fn $name(values: &[&dyn fmt::Display]) {
            if let Some(logger) = default_logger() {
                logger.$name(values);
            }
        }

        #[doc = concat!("Dispatch to [`Logger::", stringify!($namef), "`] on the process-wide logger.")]
        #[track_caller]
        pub fn $namef(args: fmt::Arguments) {
            if let Some(logger) = default_logger() {
                logger.$namef(args);
            }
        }

        #[doc = concat!("Dispatch to [`Logger::", stringify!($namew), "`] on the process-wide logger.")]
        #[track_caller]
        pub fn $namew(message: &str, kvs: &[KeyValue]) {
            if let Some(logger) = default_logger() {
                logger.$namew(message, kvs);
            }
        }
    };
}

global_emit_fns!(debug, debugf, debugw);
global_emit_fns!(info, infof, infow);
global_emit_fns!(warn, warnf, warnw);
global_emit_fns!(error, errorf, errorw);
global_emit_fns!(panic, panicf, panicw);
global_emit_fns!(fatal, fatalf, fatalw);

/// Dispatch to [`Logger::request_log_infow`] on the process-wide logger.
#[track_caller]
pub fn request_log_infow(kvs: &[KeyValue]) {
    if let Some(logger) = default_logger() {
        logger.request_log_infow(kvs);
    }
}
