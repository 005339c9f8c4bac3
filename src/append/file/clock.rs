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

use jiff::Timestamp;

/// Source of "now" for stamping and aging backups.
///
/// Follows the system clock unless frozen, which only tests do.
#[derive(Debug, Default)]
pub struct Clock {
    frozen: Option<Timestamp>,
}

impl Clock {
    pub fn now(&self) -> Timestamp {
        self.frozen.unwrap_or_else(Timestamp::now)
    }

    #[cfg(test)]
    pub fn frozen_at(now: Timestamp) -> Clock {
        Clock { frozen: Some(now) }
    }

    #[cfg(test)]
    pub fn set_now(&mut self, now: Timestamp) {
        self.frozen = Some(now);
    }
}
