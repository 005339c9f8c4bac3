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

use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;

use flate2::Compression;
use flate2::write::GzEncoder;
use jiff::SignedDuration;
use jiff::Timestamp;

use super::clock::Clock;
use crate::Error;
use crate::trap::Trap;
use crate::trap::default_trap;

const GZIP_SUFFIX: &str = ".gz";

/// A writer for a size-rotated file.
///
/// When a write would take the current file past the configured size, the file is first moved
/// aside as backup `<file>.1` (shifting older backups to `.2`, `.3`, ...), optionally gzips it to
/// `<file>.1.gz`, prunes backups by count and age, and continues on a fresh `<file>`.
#[derive(Debug)]
pub struct RollingFileWriter {
    state: State,
    writer: File,
}

impl Drop for RollingFileWriter {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            let err = Error::new("failed to flush file writer on dropped").with_source(err);
            self.state.trap.trap(&err);
        }
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.state.should_rollover_on_size(buf.len())
            && self.state.refresh_writer(&mut self.writer)
        {
            self.state.current_filesize = 0;
        }

        self.writer
            .write(buf)
            .inspect(|&n| self.state.current_filesize += n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A builder for configuring [`RollingFileWriter`].
#[derive(Debug)]
pub struct RollingFileWriterBuilder {
    // required
    filepath: PathBuf,

    // has default
    max_size: Option<NonZeroUsize>,
    max_backups: Option<NonZeroUsize>,
    max_age: Option<SignedDuration>,
    compress: bool,
    clock: Clock,
    trap: Arc<dyn Trap>,
}

impl RollingFileWriterBuilder {
    /// Creates a new [`RollingFileWriterBuilder`] writing to `filepath`.
    ///
    /// Without further configuration the file grows without bound.
    #[must_use]
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            max_size: None,
            max_backups: None,
            max_age: None,
            compress: false,
            clock: Clock::default(),
            trap: default_trap(),
        }
    }

    /// Set the trap for errors raised while rotating.
    #[must_use]
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.trap = Arc::new(trap);
        self
    }

    pub(crate) fn shared_trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = trap;
        self
    }

    /// Set the size in bytes at which the current file is rotated.
    #[must_use]
    pub fn max_file_size(mut self, n: NonZeroUsize) -> Self {
        self.max_size = Some(n);
        self
    }

    /// Set the maximum number of backups to keep. Unlimited if not set.
    #[must_use]
    pub fn max_backups(mut self, n: NonZeroUsize) -> Self {
        self.max_backups = Some(n);
        self
    }

    /// Set the maximum age of a backup. Backups are kept regardless of age if not set.
    #[must_use]
    pub fn max_age(mut self, age: SignedDuration) -> Self {
        self.max_age = Some(age);
        self
    }

    /// Set whether backups are gzip-compressed.
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    #[cfg(test)]
    fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the [`RollingFileWriter`].
    ///
    /// # Errors
    ///
    /// Return an error if the path names no file, or the file or its directory cannot be created.
    pub fn build(self) -> Result<RollingFileWriter, Error> {
        let Self {
            filepath,
            max_size,
            max_backups,
            max_age,
            compress,
            clock,
            trap,
        } = self;

        let Some(log_filename) = filepath.file_name().and_then(|s| s.to_str()) else {
            let err = Error::new("log file path must end in a UTF-8 file name");
            return Err(err.with_path(&filepath));
        };
        let log_dir = match filepath.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let state = State {
            log_dir,
            log_filename: log_filename.to_string(),
            current_filesize: 0,
            max_size,
            max_backups,
            max_age,
            compress,
            clock,
            trap,
        };
        let (state, writer) = state.open()?;
        Ok(RollingFileWriter { state, writer })
    }
}

#[derive(Debug)]
struct Backup {
    filepath: PathBuf,
    index: usize,
    modified: Option<Timestamp>,
}

#[derive(Debug)]
struct State {
    log_dir: PathBuf,
    log_filename: String,
    current_filesize: usize,
    max_size: Option<NonZeroUsize>,
    max_backups: Option<NonZeroUsize>,
    max_age: Option<SignedDuration>,
    compress: bool,
    clock: Clock,
    trap: Arc<dyn Trap>,
}

impl State {
    fn open(mut self) -> Result<(Self, File), Error> {
        fs::create_dir_all(&self.log_dir).map_err(|err| {
            Error::new("failed to create log directory")
                .with_path(&self.log_dir)
                .with_source(err)
        })?;

        // continue an existing current log; its size counts towards the limit
        let file = self.create_log_writer()?;
        let metadata = file.metadata().map_err(|err| {
            Error::new("failed to stat current log")
                .with_path(&self.current_filepath())
                .with_source(err)
        })?;
        self.current_filesize = usize::try_from(metadata.len()).unwrap_or(usize::MAX);

        Ok((self, file))
    }

    fn current_filepath(&self) -> PathBuf {
        self.log_dir.join(&self.log_filename)
    }

    fn backup_filepath(&self, index: usize, compressed: bool) -> PathBuf {
        let filename = &self.log_filename;
        if compressed {
            self.log_dir.join(format!("{filename}.{index}{GZIP_SUFFIX}"))
        } else {
            self.log_dir.join(format!("{filename}.{index}"))
        }
    }

    fn find_backup(&self, index: usize) -> Option<(PathBuf, bool)> {
        [false, true].into_iter().find_map(|compressed| {
            let filepath = self.backup_filepath(index, compressed);
            fs::exists(&filepath)
                .is_ok_and(|ok| ok)
                .then_some((filepath, compressed))
        })
    }

    fn create_log_writer(&self) -> Result<File, Error> {
        let filepath = self.current_filepath();
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&filepath)
            .map_err(|err| {
                Error::new("failed to open log file")
                    .with_path(&filepath)
                    .with_source(err)
            })
    }

    fn list_backups(&self) -> Result<Vec<Backup>, Error> {
        let read_dir = fs::read_dir(&self.log_dir).map_err(|err| {
            Error::new("failed to read log dir")
                .with_path(&self.log_dir)
                .with_source(err)
        })?;

        let prefix = format!("{}.", self.log_filename);
        let backups = read_dir
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let metadata = entry.metadata().ok()?;
                // the writer only creates files, never directories or symlinks
                if !metadata.is_file() {
                    return None;
                }

                let filename = entry.file_name();
                // if the filename is not a UTF-8 string, skip it.
                let filename = filename.to_str()?;
                let rest = filename.strip_prefix(&prefix)?;
                let rest = rest.strip_suffix(GZIP_SUFFIX).unwrap_or(rest);
                let index = usize::from_str(rest).ok()?;

                let modified = metadata
                    .modified()
                    .ok()
                    .and_then(|mtime| Timestamp::try_from(mtime).ok());

                Some(Backup {
                    filepath: entry.path(),
                    index,
                    modified,
                })
            })
            .collect::<Vec<_>>();

        Ok(backups)
    }

    fn prune_backups(&self, now: Timestamp) -> Result<(), Error> {
        if self.max_backups.is_none() && self.max_age.is_none() {
            return Ok(());
        }

        let mut backups = self.list_backups()?;
        // newest first
        backups.sort_by_key(|backup| backup.index);

        for (n, backup) in backups.iter().enumerate() {
            let over_count = self.max_backups.is_some_and(|max| n >= max.get());
            let too_old = match (self.max_age, backup.modified) {
                (Some(max_age), Some(modified)) => now.duration_since(modified) > max_age,
                _ => false,
            };

            if over_count || too_old {
                let filepath = &backup.filepath;
                fs::remove_file(filepath).map_err(|err| {
                    Error::new("failed to remove old log")
                        .with_path(filepath)
                        .with_source(err)
                })?;
            }
        }

        Ok(())
    }

    fn rotate_log_writer(&self) -> Result<File, Error> {
        let mut renames = vec![];
        let mut index = 1;
        while let Some((filepath, compressed)) = self.find_backup(index) {
            renames.push((filepath, self.backup_filepath(index + 1, compressed)));
            index += 1;
        }

        for (old, new) in renames.iter().rev() {
            fs::rename(old, new).map_err(|err| {
                Error::new("failed to shift log backup")
                    .with_path(old)
                    .with_source(err)
            })?;
        }

        let archive_filepath = self.backup_filepath(1, false);
        let current_filepath = self.current_filepath();
        fs::rename(&current_filepath, &archive_filepath).map_err(|err| {
            Error::new("failed to archive log")
                .with_path(&current_filepath)
                .with_source(err)
        })?;

        // backup ages count from the moment they are archived
        let now = self.clock.now();
        if let Err(err) = touch(&archive_filepath, now) {
            self.trap.trap(&err);
        }

        if self.compress {
            if let Err(err) = compress_backup(&archive_filepath, now) {
                self.trap.trap(&err);
            }
        }

        if let Err(err) = self.prune_backups(now) {
            let err = Error::new("failed to prune log backups").with_source(err);
            self.trap.trap(&err);
        }

        self.create_log_writer()
    }

    /// Return whether `file` was replaced by a fresh one.
    fn refresh_writer(&self, file: &mut File) -> bool {
        match self.rotate_log_writer() {
            Ok(new_file) => {
                if let Err(err) = file.flush() {
                    let err = Error::new("failed to flush previous writer").with_source(err);
                    self.trap.trap(&err);
                }
                *file = new_file;
                true
            }
            Err(err) => {
                let err = Error::new("failed to rotate log writer").with_source(err);
                self.trap.trap(&err);
                false
            }
        }
    }

    // a write larger than the limit still goes to an empty file as a whole
    fn should_rollover_on_size(&self, incoming: usize) -> bool {
        self.current_filesize > 0
            && self
                .max_size
                .is_some_and(|n| self.current_filesize.saturating_add(incoming) > n.get())
    }
}

fn touch(filepath: &Path, now: Timestamp) -> Result<(), Error> {
    OpenOptions::new()
        .write(true)
        .open(filepath)
        .and_then(|file| file.set_modified(SystemTime::from(now)))
        .map_err(|err| {
            Error::new("failed to set backup time")
                .with_path(filepath)
                .with_source(err)
        })
}

fn compress_backup(filepath: &Path, now: Timestamp) -> Result<(), Error> {
    let mut gz_filepath = OsString::from(filepath.as_os_str());
    gz_filepath.push(GZIP_SUFFIX);
    let gz_filepath = PathBuf::from(gz_filepath);

    let compress = || -> io::Result<()> {
        let mut input = File::open(filepath)?;
        let output = File::create(&gz_filepath)?;
        let mut encoder = GzEncoder::new(output, Compression::default());
        io::copy(&mut input, &mut encoder)?;
        let output = encoder.finish()?;
        output.set_modified(SystemTime::from(now))?;
        fs::remove_file(filepath)
    };

    compress().map_err(|err| {
        Error::new("failed to compress log backup")
            .with_path(filepath)
            .with_source(err)
    })
}
