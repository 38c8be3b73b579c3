//! CaskDB - Recovery Scanner
//! Rebuilds the KeyDir at startup by replaying the data file from offset 0.
//!
//! The scan is a lazy, finite sequence of records that ends at the first
//! zero-byte read. There is no trailing sentinel record.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use crate::config::RecoveryMode;
use crate::error::{CaskError, Result};
use crate::types::KeyEntry;

use super::format::{decode_header, record_size, HEADER_SIZE};
use super::keydir::KeyDir;

/// Index information for one record found during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    pub key: String,
    pub entry: KeyEntry,
    pub value_size: u32,
}

/// Iterator over the records of a log, yielding their locations.
///
/// Only keys are decoded. Value bytes are consumed to keep the
/// running offset correct but are never materialized.
pub struct RecordScanner<R> {
    reader: R,
    offset: u64,
    done: bool,
}

impl<R: Read> RecordScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            done: false,
        }
    }

    /// Offset just past the last complete record yielded so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_record(&mut self) -> Result<Option<ScannedRecord>> {
        let start = self.offset;

        let mut header = [0u8; HEADER_SIZE];
        let n = read_full(&mut self.reader, &mut header)?;
        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_SIZE {
            return Err(CaskError::Truncated {
                offset: start,
                expected: HEADER_SIZE as u64,
                found: n as u64,
            });
        }

        let (timestamp, key_size, value_size) = decode_header(&header)?;
        let total_size = record_size(key_size as u64, value_size as u64);

        // Grows as bytes arrive, so a garbage key_size cannot force a huge allocation.
        let mut key = Vec::new();
        let key_read = (&mut self.reader)
            .take(key_size as u64)
            .read_to_end(&mut key)? as u64;
        let value_read = if key_read == key_size as u64 {
            io::copy(&mut (&mut self.reader).take(value_size as u64), &mut io::sink())?
        } else {
            0
        };
        let found = HEADER_SIZE as u64 + key_read + value_read;
        if found < total_size {
            return Err(CaskError::Truncated {
                offset: start,
                expected: total_size,
                found,
            });
        }

        let key = String::from_utf8(key)?;
        self.offset += total_size;

        Ok(Some(ScannedRecord {
            key,
            entry: KeyEntry::new(timestamp, start, total_size),
            value_size,
        }))
    }
}

impl<R: Read> Iterator for RecordScanner<R> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the reader allows, returning the byte count.
/// A short count means end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Outcome of replaying a data file.
#[derive(Debug, Default)]
pub struct Recovered {
    /// Index of the latest record for every key.
    pub key_dir: KeyDir,
    /// Offset just past the last complete record.
    pub write_position: u64,
    /// Number of records replayed, superseded ones included.
    pub records: u64,
    /// Bytes cut from the end of the file by `RecoveryMode::TruncateTail`.
    pub truncated_bytes: u64,
}

/// Replay the data file at `path` and rebuild the KeyDir.
///
/// A torn record at the end of the file fails recovery under
/// `RecoveryMode::Strict`. Under `RecoveryMode::TruncateTail` the file is cut
/// back to the last complete record instead.
pub fn recover(path: &Path, mode: RecoveryMode) -> Result<Recovered> {
    let open_error = |source| CaskError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_error)?;
    if !file.metadata().map_err(open_error)?.is_file() {
        return Err(open_error(io::Error::new(
            ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    let mut scanner = RecordScanner::new(BufReader::new(file));
    let mut recovered = Recovered::default();

    for item in scanner.by_ref() {
        match item {
            Ok(record) => {
                log::trace!(
                    "recovered key={:?} at offset {} ({} bytes)",
                    record.key,
                    record.entry.position,
                    record.entry.total_size
                );
                recovered.key_dir.insert(record.key, record.entry);
                recovered.records += 1;
            }
            Err(CaskError::Truncated {
                offset,
                expected,
                found,
            }) if mode == RecoveryMode::TruncateTail => {
                log::warn!(
                    "torn record at offset {} in {:?} (expected {} bytes, found {}), truncating",
                    offset,
                    path,
                    expected,
                    found
                );
                recovered.truncated_bytes = truncate_tail(path, offset)?;
            }
            Err(e) => return Err(e),
        }
    }

    recovered.write_position = scanner.offset();
    Ok(recovered)
}

/// Cut the file back to `len` bytes, returning how many bytes were removed.
fn truncate_tail(path: &Path, len: u64) -> Result<u64> {
    let file = OpenOptions::new().write(true).open(path)?;
    let original = file.metadata()?.len();
    file.set_len(len)?;
    file.sync_all()?;
    Ok(original.saturating_sub(len))
}
