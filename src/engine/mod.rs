//! CaskDB - Storage Engine Module
//! Top-level module for the log-structured hash table.
//!
//! Writes append a record to the data file and point the KeyDir at it.
//! Reads look up the KeyDir and fetch exactly one record from disk.

pub mod datafile;
pub mod format;
pub mod keydir;
pub mod metrics;
pub mod recovery;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{CaskError, Result};
use crate::types::{now_secs, KeyEntry};

use self::datafile::DataFile;
use self::keydir::KeyDir;
use self::metrics::EngineMetrics;

/// The core CaskDB storage engine.
///
/// Owns the data file handle and the KeyDir. Both are released together by
/// [`CaskDb::close`] or on drop. A single engine assumes it is the only
/// writer of its data file; nothing locks the file against other processes.
pub struct CaskDb {
    /// Append-only log of records.
    file: DataFile,
    /// Key -> location of its latest record.
    key_dir: KeyDir,
    /// Engine configuration.
    config: Config,
    /// Per-instance operation counters.
    metrics: EngineMetrics,
}

impl CaskDb {
    /// Open or create a CaskDB storage engine at the configured path.
    ///
    /// An existing data file is replayed before this returns, so the engine
    /// is fully indexed once it is handed to the caller.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        config.ensure_dirs().map_err(|source| CaskError::Open {
            path: config.data_file.clone(),
            source,
        })?;

        let metrics = EngineMetrics::new();
        let (key_dir, write_position) = if config.data_file.exists() {
            let recovered = recovery::recover(&config.data_file, config.recovery_mode)?;
            metrics.record_recovery(recovered.records);
            log::info!(
                "CaskDB recovered {} keys from {} records in {:?} ({} bytes, {} truncated)",
                recovered.key_dir.len(),
                recovered.records,
                config.data_file,
                recovered.write_position,
                recovered.truncated_bytes
            );
            (recovered.key_dir, recovered.write_position)
        } else {
            (KeyDir::new(), 0)
        };

        let file = DataFile::open(&config.data_file, write_position)?;

        log::info!(
            "CaskDB engine opened at {:?} ({} keys indexed)",
            config.data_file,
            key_dir.len()
        );

        Ok(Self {
            file,
            key_dir,
            config,
            metrics,
        })
    }

    /// Open an engine on `path` with default settings.
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::new(path))
    }

    /// Store a key-value pair.
    ///
    /// Returns only after the record is fsynced. Storing an empty value is
    /// how a key is deleted: a later `get` cannot tell it from a missing key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let timestamp = now_secs();
        let (total_size, data) = format::encode_record(timestamp, key, value)?;

        let position = self.file.append(&data)?;
        // encode_record already proved the timestamp fits
        let entry = KeyEntry::new(timestamp as u32, position, total_size);
        self.key_dir.insert(key.to_owned(), entry);
        self.metrics.record_set(total_size);

        log::debug!(
            "set key={:?} at offset {} ({} bytes)",
            key,
            position,
            total_size
        );
        Ok(())
    }

    /// Fetch the latest value for `key`.
    ///
    /// An unknown key yields an empty string. Any failure to read or decode
    /// an indexed record is an error, never a miss.
    pub fn get(&self, key: &str) -> Result<String> {
        let Some(entry) = self.key_dir.get(key) else {
            self.metrics.record_get(None);
            return Ok(String::new());
        };

        let data = self.file.read_at(entry.position, entry.total_size)?;
        let record = format::decode_record(&data)?;
        if record.key != key {
            return Err(CaskError::Corruption(format!(
                "record at offset {} holds key {:?}, index expected {:?}",
                entry.position, record.key, key
            )));
        }

        self.metrics.record_get(Some(entry.total_size));
        Ok(record.value)
    }

    /// Flush, fsync and release the data file and the KeyDir.
    pub fn close(mut self) -> Result<()> {
        self.file.sync()?;
        log::info!(
            "CaskDB engine closed at {:?} ({} keys, {} bytes)",
            self.config.data_file,
            self.key_dir.len(),
            self.file.write_position()
        );
        Ok(())
    }

    /// Returns true if `key` has a record in the index.
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_dir.contains_key(key)
    }

    /// Iterate over indexed keys, including keys whose latest value is empty.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.key_dir.keys()
    }

    /// Returns the number of indexed keys.
    pub fn len(&self) -> usize {
        self.key_dir.len()
    }

    /// Returns true if no key has ever been set.
    pub fn is_empty(&self) -> bool {
        self.key_dir.is_empty()
    }

    /// Offset at which the next record will be appended.
    pub fn write_position(&self) -> u64 {
        self.file.write_position()
    }

    /// Bytes held by superseded records.
    pub fn dead_bytes(&self) -> u64 {
        self.file.write_position() - self.key_dir.live_bytes()
    }

    /// Path of the backing data file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the configuration the engine was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Operation counters for this engine.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::format::HEADER_SIZE;

    fn open_temp() -> (tempfile::TempDir, CaskDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = CaskDb::open_path(dir.path().join("cask.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_set_get() {
        let (_dir, mut db) = open_temp();
        db.set("name", "jojo").unwrap();
        assert_eq!(db.get("name").unwrap(), "jojo");
        assert_eq!(db.get("nope").unwrap(), "");
    }

    #[test]
    fn test_offsets_advance() {
        let (_dir, mut db) = open_temp();
        db.set("a", "1").unwrap();
        db.set("bb", "22").unwrap();
        assert_eq!(db.write_position(), 2 * HEADER_SIZE as u64 + 6);
        assert_eq!(db.key_dir.get("bb").unwrap().position, HEADER_SIZE as u64 + 2);
    }

    #[test]
    fn test_dead_bytes() {
        let (_dir, mut db) = open_temp();
        db.set("a", "1").unwrap();
        assert_eq!(db.dead_bytes(), 0);
        db.set("a", "2").unwrap();
        assert_eq!(db.dead_bytes(), 14);
    }

    #[test]
    fn test_index_mismatch_is_corruption() {
        let (_dir, mut db) = open_temp();
        db.set("a", "1").unwrap();
        db.set("b", "2").unwrap();
        let wrong = *db.key_dir.get("b").unwrap();
        db.key_dir.insert("a".into(), wrong);

        assert!(matches!(db.get("a"), Err(CaskError::Corruption(_))));
    }

    #[test]
    fn test_failed_set_leaves_index_and_cursor_intact() {
        let (dir, mut db) = open_temp();
        db.set("a", "1").unwrap();

        // half-written record from a crashed write
        let mut raw = std::fs::OpenOptions::new()
            .append(true)
            .open(db.path())
            .unwrap();
        std::io::Write::write_all(&mut raw, b"torn").unwrap();
        drop(raw);

        db.file.reopen_read_only().unwrap();
        assert!(db.set("b", "2").is_err());
        assert!(!db.contains_key("b"));
        assert_eq!(db.len(), 1);
        assert_eq!(db.write_position(), 14);
        assert_eq!(std::fs::metadata(db.path()).unwrap().len(), 14);

        db.set("b", "2").unwrap();
        assert_eq!(db.key_dir.get("b").unwrap().position, 14);
        assert_eq!(db.get("a").unwrap(), "1");
        assert_eq!(db.get("b").unwrap(), "2");
        db.close().unwrap();

        let db = CaskDb::open_path(dir.path().join("cask.db")).unwrap();
        assert_eq!(db.get("b").unwrap(), "2");
        assert_eq!(db.write_position(), 28);
    }

    #[test]
    fn test_metrics_track_hits_and_misses() {
        let (_dir, mut db) = open_temp();
        db.set("k", "v").unwrap();
        db.get("k").unwrap();
        db.get("missing").unwrap();

        let m = db.metrics();
        assert_eq!(m.sets.load(std::sync::atomic::Ordering::Relaxed), 1);
        assert_eq!(m.misses.load(std::sync::atomic::Ordering::Relaxed), 1);
        assert_eq!(m.bytes_read.load(std::sync::atomic::Ordering::Relaxed), 14);
    }
}
