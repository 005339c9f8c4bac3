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

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use jiff::SignedDuration;

use super::rolling::RollingFileWriter;
use super::rolling::RollingFileWriterBuilder;
use crate::Error;
use crate::Layout;
use crate::append::Append;
use crate::layout::JsonLayout;
use crate::record::Record;
use crate::trap::Trap;

/// A builder to configure and create a [`RollingFile`] appender.
#[derive(Debug)]
pub struct RollingFileBuilder {
    filepath: PathBuf,
    builder: RollingFileWriterBuilder,
    layout: Box<dyn Layout>,
}

impl RollingFileBuilder {
    /// Create a new file appender builder writing to `filepath`.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        let filepath = filepath.into();
        Self {
            builder: RollingFileWriterBuilder::new(filepath.clone()),
            filepath,
            layout: Box::new(JsonLayout::default()),
        }
    }

    /// Build the [`RollingFile`] appender.
    ///
    /// # Errors
    ///
    /// Return an error if either:
    ///
    /// * The log directory cannot be created.
    /// * The log file cannot be opened for append.
    pub fn build(self) -> Result<RollingFile, Error> {
        let RollingFileBuilder {
            filepath,
            builder,
            layout,
        } = self;
        let writer = builder.build()?;
        Ok(RollingFile::new(filepath, writer, layout))
    }

    /// Set the layout for the logs.
    ///
    /// Default to [`JsonLayout`].
    pub fn layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Set the trap for errors raised while rotating.
    ///
    /// Default to [`DefaultTrap`](crate::trap::DefaultTrap).
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.builder = self.builder.trap(trap);
        self
    }

    pub(crate) fn shared_trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.builder = self.builder.shared_trap(trap);
        self
    }

    /// Rotate the file once it reaches `n` bytes.
    pub fn max_file_size(mut self, n: NonZeroUsize) -> Self {
        self.builder = self.builder.max_file_size(n);
        self
    }

    /// Keep at most `n` backups.
    pub fn max_backups(mut self, n: NonZeroUsize) -> Self {
        self.builder = self.builder.max_backups(n);
        self
    }

    /// Remove backups older than `age` on rotation.
    pub fn max_age(mut self, age: SignedDuration) -> Self {
        self.builder = self.builder.max_age(age);
        self
    }

    /// Gzip backups on rotation.
    pub fn compress(mut self, compress: bool) -> Self {
        self.builder = self.builder.compress(compress);
        self
    }
}

/// An appender that writes log records, one per line, to a size-rotated file.
#[derive(Debug)]
pub struct RollingFile {
    filepath: PathBuf,
    writer: Mutex<RollingFileWriter>,
    layout: Box<dyn Layout>,
}

impl RollingFile {
    fn new(filepath: PathBuf, writer: RollingFileWriter, layout: Box<dyn Layout>) -> Self {
        let writer = Mutex::new(writer);
        Self {
            filepath,
            writer,
            layout,
        }
    }

    /// The path of the current (not yet rotated) log file.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    fn writer(&self) -> MutexGuard<'_, RollingFileWriter> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Append for RollingFile {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');
        let mut writer = self.writer();
        writer
            .write_all(&bytes)
            .map_err(|err| Error::from_io_error(err).with_path(&self.filepath))?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        let mut writer = self.writer();
        writer
            .flush()
            .map_err(|err| Error::from_io_error(err).with_path(&self.filepath))?;
        Ok(())
    }
}

impl Drop for RollingFile {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(|e| e.into_inner());
        let _ = writer.flush();
    }
}
