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

//! Logsplit is a leveled logging facade that writes each severity to its own rotating JSON file.
//!
//! # Overview
//!
//! A logger is built from a base path and a minimum level. Every severity from that level up to
//! `error` gets a channel and a file next to the base path (`app.log.DEBUG`, `app.log.INFO`,
//! `app.log.WARN`, `app.log.ERROR`), and an optional request channel writes to
//! `app.log.Request`. Panic and fatal records go to the error file. Files rotate by size, keep a
//! bounded number of (optionally gzipped) backups, and drop backups past a maximum age.
//!
//! Each level can be emitted in three shapes: concatenated values (`info`), a format string
//! (`infof`), and a message with ordered key-values (`infow`).
//!
//! # Examples
//!
//! Process-wide logger:
//!
//! ```
//! use logsplit::Level;
//!
//! let dir = tempfile::tempdir().unwrap();
//! logsplit::init(dir.path().join("app.log"), Level::Info, true);
//!
//! logsplit::info(&[&"listening on ", &8080]);
//! logsplit::warnf(format_args!("slow request: {}ms", 1503));
//! logsplit::errorw("query failed", &[("table", "users".into()), ("retries", 3.into())]);
//! logsplit::request_log_infow(&[("path", "/".into()), ("status", 200.into())]);
//! logsplit::sync();
//! ```
//!
//! Explicit handle with custom rotation:
//!
//! ```
//! use logsplit::Level;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = logsplit::builder(dir.path().join("app.log"), Level::Debug)
//!     .caller(true)
//!     .max_file_size(100)
//!     .max_backups(10)
//!     .max_age(30)
//!     .compress(false)
//!     .build()
//!     .unwrap();
//!
//! logger.debugw("cache miss", &[("key", "user:42".into())]);
//! logger.sync().unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod kv;
pub mod layout;
pub mod record;
pub mod sink;
pub mod trap;

#[cfg(feature = "bridge-log")]
pub mod bridge;

mod channel;
mod config;
mod error;
mod global;
mod logger;
mod policy;

pub use self::append::Append;
pub use self::channel::Channel;
pub use self::config::Config;
pub use self::error::Error;
pub use self::global::*;
pub use self::layout::Layout;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::logger::builder;
pub use self::policy::RotationPolicy;
pub use self::record::Level;
pub use self::record::Record;
