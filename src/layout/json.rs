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

use jiff::tz::TimeZone;
use serde_json::Map;
use serde_json::Value as JsonValue;

use crate::Error;
use crate::layout::Layout;
use crate::record::Record;

/// A JSON layout for formatting log records.
///
/// Output format:
///
/// ```json
/// {"level":"info","ts":"2024-08-11T22:44:57.172+08:00","caller":"src/main.rs:12","msg":"hello"}
/// {"level":"warn","ts":"2024-08-11T22:44:57.173+08:00","msg":"slow request","path":"/","elapsed_ms":1503}
/// ```
///
/// `caller` is present only when the record carries a call site. Key-values follow `msg` in the
/// order they were given.
///
/// # Examples
///
/// ```
/// use logsplit::layout::JsonLayout;
///
/// let json_layout = JsonLayout::default();
/// ```
#[derive(Default, Debug, Clone)]
pub struct JsonLayout {
    tz: Option<TimeZone>,
}

impl JsonLayout {
    // timestamps use the system timezone outside tests
    #[cfg(test)]
    pub(crate) fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    fn timestamp(&self, record: &Record) -> String {
        let ts = record.time();
        let offset = match &self.tz {
            Some(tz) => tz.to_offset(ts),
            None => TimeZone::system().to_offset(ts),
        };
        format!("{:.3}", ts.display_with_offset(offset))
    }
}

impl Layout for JsonLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let mut line = Map::new();
        line.insert("level".to_string(), record.level().as_str().into());
        line.insert("ts".to_string(), self.timestamp(record).into());
        if let (Some(file), Some(no)) = (record.file(), record.line()) {
            line.insert("caller".to_string(), format!("{file}:{no}").into());
        }
        line.insert("msg".to_string(), record.message().into());

        for (key, value) in record.key_values() {
            let value = match serde_json::to_value(value) {
                Ok(value) => value,
                Err(_) => JsonValue::String(value.to_string()),
            };
            line.insert(key.to_string(), value);
        }

        serde_json::to_vec(&line)
            .map_err(|err| Error::new("failed to serialize record").with_source(err))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::Timestamp;

    use super::*;
    use crate::Level;
    use crate::kv::KeyValue;
    use crate::kv::Value;

    fn render(record: &Record) -> String {
        let layout = JsonLayout::default().timezone(TimeZone::UTC);
        String::from_utf8(layout.format(record).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_record() {
        let ts = Timestamp::from_str("2024-08-10T17:12:52.123456Z").unwrap();
        let record = Record::new(Level::Info, "hello", &[]).with_time(ts);

        assert_eq!(
            render(&record),
            r#"{"level":"info","ts":"2024-08-10T17:12:52.123+00:00","msg":"hello"}"#
        );
    }

    #[test]
    fn test_caller_and_ordered_key_values() {
        let ts = Timestamp::from_str("2024-08-10T17:12:52Z").unwrap();
        let path = String::from("/health");
        let kvs: [KeyValue; 4] = [
            ("status", 200.into()),
            ("path", Value::from_display(&path)),
            ("cached", false.into()),
            ("alpha", 0.5.into()),
        ];
        let record = Record::new(Level::Warn, "slow", &kvs)
            .with_time(ts)
            .with_location("src/server.rs", 42);

        assert_eq!(
            render(&record),
            concat!(
                r#"{"level":"warn","ts":"2024-08-10T17:12:52.000+00:00","#,
                r#""caller":"src/server.rs:42","msg":"slow","#,
                r#""status":200,"path":"/health","cached":false,"alpha":0.5}"#
            )
        );
    }
}
