//! CaskDB - Append-Only Data File
//! Owns the backing file handle and the write cursor.
//! Every append is flushed and fsynced before it is acknowledged.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CaskError, Result};

/// Append-only log of records on disk.
pub struct DataFile {
    /// Path to the data file on disk.
    path: PathBuf,
    /// File handle opened for append + read.
    file: File,
    /// Offset at which the next record will land.
    write_position: u64,
    /// Set when a failed append could not be rolled back.
    poisoned: bool,
}

impl DataFile {
    /// Open or create the data file. `write_position` is where recovery
    /// found the end of the last complete record (0 for a fresh file).
    pub fn open(path: impl Into<PathBuf>, write_position: u64) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path).map_err(|source| CaskError::Open {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            file,
            write_position,
            poisoned: false,
        })
    }

    /// Returns the path to the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offset at which the next append starts.
    pub fn write_position(&self) -> u64 {
        self.write_position
    }

    /// Append bytes at the end of the log and fsync.
    /// Returns the offset the bytes were written at.
    ///
    /// On failure the file is cut back to `write_position`, so a partial
    /// write never shifts the offset of the next record.
    pub fn append(&mut self, data: &[u8]) -> Result<u64> {
        if self.poisoned {
            return Err(CaskError::Corruption(format!(
                "{:?} holds bytes from a failed write that could not be rolled back",
                self.path
            )));
        }

        let position = self.write_position;
        if let Err(e) = self.write_and_sync(data) {
            log::warn!(
                "append of {} bytes at offset {} failed: {}; rolling back",
                data.len(),
                position,
                e
            );
            self.rollback()?;
            return Err(e);
        }
        self.write_position += data.len() as u64;
        Ok(position)
    }

    fn write_and_sync(&mut self, data: &[u8]) -> Result<()> {
        self.file.write_all(data)?;
        self.sync()
    }

    /// Truncate the file to `write_position` and reopen the append handle.
    fn rollback(&mut self) -> Result<()> {
        let result = (|| -> std::io::Result<File> {
            let file = OpenOptions::new().write(true).open(&self.path)?;
            file.set_len(self.write_position)?;
            file.sync_all()?;
            open_append(&self.path)
        })();

        match result {
            Ok(file) => {
                self.file = file;
                Ok(())
            }
            Err(e) => {
                log::error!("rollback of {:?} failed: {}", self.path, e);
                self.poisoned = true;
                Err(e.into())
            }
        }
    }

    /// Read exactly `len` bytes starting at `position`.
    pub fn read_at(&self, position: u64, len: u64) -> Result<Vec<u8>> {
        if position + len > self.write_position {
            return Err(CaskError::Corruption(format!(
                "range {}..{} is past the end of the log ({})",
                position,
                position + len,
                self.write_position
            )));
        }
        let mut buf = vec![0u8; len as usize];
        read_exact_at(&self.file, &mut buf, position)?;
        Ok(buf)
    }

    /// Flush and fsync to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Swap in a handle that rejects writes, so the next append fails.
    #[cfg(test)]
    pub(crate) fn reopen_read_only(&mut self) -> std::io::Result<()> {
        self.file = File::open(&self.path)?;
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .read(true)
        .open(path)
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(not(unix))]
fn read_exact_at(mut file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::io::{Read, Seek, SeekFrom};
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)
}
