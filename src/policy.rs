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

use std::num::NonZeroUsize;

use jiff::SignedDuration;
use serde::Deserialize;
use serde::Serialize;

use crate::append::file::RollingFileBuilder;

const MEGABYTE: usize = 1024 * 1024;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// When and how a channel's file is rotated.
///
/// Defaults to 1024 MB files, 3 backups, 7 days of retention and gzip-compressed backups.
///
/// # Examples
///
/// ```
/// use logsplit::RotationPolicy;
///
/// let policy = RotationPolicy {
///     max_file_size_mb: 100,
///     ..RotationPolicy::default()
/// };
/// assert_eq!(policy.max_backups, 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicy {
    /// Rotate once the file reaches this many megabytes. `0` is treated as `1`.
    pub max_file_size_mb: usize,
    /// Keep at most this many backups. `0` keeps all of them.
    pub max_backups: usize,
    /// Remove backups older than this many days. `0` keeps them regardless of age.
    pub max_age_days: usize,
    /// Gzip backups on rotation.
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_file_size_mb: 1024,
            max_backups: 3,
            max_age_days: 7,
            compress: true,
        }
    }
}

impl RotationPolicy {
    /// The rotation threshold in bytes.
    pub fn max_file_size_bytes(&self) -> NonZeroUsize {
        let bytes = self.max_file_size_mb.max(1).saturating_mul(MEGABYTE);
        NonZeroUsize::new(bytes).unwrap_or(NonZeroUsize::MIN)
    }

    pub(crate) fn apply(&self, mut builder: RollingFileBuilder) -> RollingFileBuilder {
        builder = builder
            .max_file_size(self.max_file_size_bytes())
            .compress(self.compress);
        if let Some(n) = NonZeroUsize::new(self.max_backups) {
            builder = builder.max_backups(n);
        }
        if self.max_age_days > 0 {
            builder = builder.max_age(self.max_age());
        }
        builder
    }

    /// The backup retention as a duration, saturating at [`SignedDuration::MAX`].
    pub fn max_age(&self) -> SignedDuration {
        i64::try_from(self.max_age_days)
            .ok()
            .and_then(|days| days.checked_mul(SECONDS_PER_DAY))
            .map_or(SignedDuration::MAX, SignedDuration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_file_size_mb, 1024);
        assert_eq!(policy.max_backups, 3);
        assert_eq!(policy.max_age_days, 7);
        assert!(policy.compress);
        assert_eq!(policy.max_file_size_bytes().get(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_zero_size_clamps_to_one_megabyte() {
        let policy = RotationPolicy {
            max_file_size_mb: 0,
            ..RotationPolicy::default()
        };
        assert_eq!(policy.max_file_size_bytes().get(), MEGABYTE);
    }

    #[test]
    fn test_huge_max_age_saturates() {
        let policy = RotationPolicy {
            max_age_days: usize::MAX,
            ..RotationPolicy::default()
        };
        assert_eq!(policy.max_age(), SignedDuration::MAX);

        let policy = RotationPolicy {
            max_age_days: 200_000_000_000_000,
            ..RotationPolicy::default()
        };
        assert_eq!(policy.max_age(), SignedDuration::MAX);

        let temp_dir = tempfile::TempDir::new().unwrap();
        let builder = RollingFileBuilder::new(temp_dir.path().join("t.log"));
        assert!(policy.apply(builder).build().is_ok());
    }

    #[test]
    fn test_max_age_in_days() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_age(), SignedDuration::from_hours(7 * 24));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let policy: RotationPolicy =
            serde_json::from_str(r#"{"max_backups": 10, "compress": false}"#).unwrap();
        assert_eq!(
            policy,
            RotationPolicy {
                max_file_size_mb: 1024,
                max_backups: 10,
                max_age_days: 7,
                compress: false,
            }
        );
    }
}
