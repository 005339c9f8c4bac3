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

//! Key-value pairs attached to a record.
//!
//! Values are [`log::kv::Value`]s, so primitives and strings convert with `into()` and keep their
//! type in the JSON output, while anything else can be captured by `Display` or `Debug`:
//!
//! ```
//! use logsplit::kv::KeyValue;
//! use logsplit::kv::Value;
//!
//! let addr = std::net::Ipv4Addr::LOCALHOST;
//! let kvs: [KeyValue; 3] = [
//!     ("status", 200.into()),
//!     ("path", "/index.html".into()),
//!     ("peer", Value::from_display(&addr)),
//! ];
//! ```

pub use log::kv::ToValue;
pub use log::kv::Value;

/// One key-value pair. Slices of these keep their order in the rendered record.
pub type KeyValue<'a> = (&'a str, Value<'a>);
