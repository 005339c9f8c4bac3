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

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;

use logsplit::Channel;
use logsplit::Level;
use logsplit::RotationPolicy;
use tempfile::TempDir;

// the process-wide logger is shared by every test in this binary
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

fn read_records(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_warn_with_request_log() {
    let _guard = serial();
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("t.log");

    logsplit::init(&base, Level::Warn, true);
    logsplit::warn(&[&"x"]);
    logsplit::debug(&[&"x"]);
    logsplit::info(&[&"x"]);
    logsplit::request_log_infow(&[("k", "v".into())]);
    logsplit::sync();

    let warn = read_records(&Channel::Warn.file_path(&base));
    assert_eq!(warn.len(), 1);
    assert_eq!(warn[0]["level"], "warn");
    assert_eq!(warn[0]["msg"], "x");

    assert!(!Channel::Debug.file_path(&base).exists());
    assert!(!Channel::Info.file_path(&base).exists());
    assert!(read_records(&Channel::Error.file_path(&base)).is_empty());

    let request = read_records(&Channel::Request.file_path(&base));
    assert_eq!(request.len(), 1);
    assert_eq!(request[0]["level"], "info");
    assert_eq!(request[0]["k"], "v");
}

#[test]
fn test_error_without_request_log() {
    let _guard = serial();
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("t.log");

    logsplit::init(&base, Level::Error, false);
    logsplit::request_log_infow(&[("k", "v".into())]);
    logsplit::warn(&[&"dropped"]);
    logsplit::errorw("kept", &[("code", 500.into())]);
    logsplit::sync();

    assert!(!Channel::Request.file_path(&base).exists());
    assert!(!Channel::Warn.file_path(&base).exists());
    let error = read_records(&Channel::Error.file_path(&base));
    assert_eq!(error.len(), 1);
    assert_eq!(error[0]["msg"], "kept");
    assert_eq!(error[0]["code"], 500);
}

#[test]
fn test_reinit_never_writes_to_previous_path() {
    let _guard = serial();
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.log");
    let second = temp_dir.path().join("second.log");

    logsplit::init(&first, Level::Info, false);
    logsplit::info(&[&"before"]);
    logsplit::sync();

    logsplit::init(&second, Level::Info, false);
    logsplit::info(&[&"after"]);
    logsplit::warn(&[&"after"]);
    logsplit::sync();

    let first_info = read_records(&Channel::Info.file_path(&first));
    assert_eq!(first_info.len(), 1);
    assert_eq!(first_info[0]["msg"], "before");
    assert!(read_records(&Channel::Warn.file_path(&first)).is_empty());

    let second_info = read_records(&Channel::Info.file_path(&second));
    assert_eq!(second_info.len(), 1);
    assert_eq!(second_info[0]["msg"], "after");
}

#[test]
fn test_caller_is_the_emit_call_site() {
    let _guard = serial();
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("t.log");

    logsplit::builder(&base, Level::Debug)
        .caller(true)
        .try_apply()
        .unwrap();
    let line = line!() + 1;
    logsplit::debugf(format_args!("value {}", 1));
    logsplit::sync();

    let debug = read_records(&Channel::Debug.file_path(&base));
    assert_eq!(debug[0]["caller"], format!("{}:{line}", file!()));
}

#[test]
fn test_options_observed_on_every_sink() {
    let _guard = serial();
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("t.log");

    logsplit::builder(&base, Level::Debug)
        .need_request_log(true)
        .max_file_size(10)
        .max_backups(4)
        .max_age(2)
        .compress(false)
        .try_apply()
        .unwrap();

    let logger = logsplit::default_logger().unwrap();
    let expected = RotationPolicy {
        max_file_size_mb: 10,
        max_backups: 4,
        max_age_days: 2,
        compress: false,
    };
    assert_eq!(logger.sinks().count(), 5);
    for sink in logger.sinks() {
        assert_eq!(*sink.rotation(), expected, "channel {}", sink.channel());
        assert!(!sink.caller(), "channel {}", sink.channel());
    }
}

#[test]
fn test_failed_init_leaves_no_logger() {
    let _guard = serial();
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    logsplit::init(temp_dir.path().join("t.log"), Level::Info, false);
    assert!(logsplit::default_logger().is_some());

    let err = logsplit::try_init(blocker.join("t.log"), Level::Info, false).unwrap_err();
    assert_eq!(err.message(), "failed to open log channel");
    assert!(logsplit::default_logger().is_none());
}
