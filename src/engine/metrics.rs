//! CaskDB - Engine Metrics & Observability
//! Provides atomic counters for tracking engine operations
//! in a lock-free manner using `AtomicU64`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Atomic operation counters for one CaskDB engine instance.
///
/// All counters use `Ordering::Relaxed`; they are only read for reporting.
#[derive(Debug)]
pub struct EngineMetrics {
    /// Total number of `set` operations.
    pub sets: AtomicU64,
    /// Total number of `get` operations.
    pub gets: AtomicU64,
    /// `get` calls for keys absent from the KeyDir.
    pub misses: AtomicU64,
    /// Record bytes appended to the data file.
    pub bytes_written: AtomicU64,
    /// Record bytes read back from the data file.
    pub bytes_read: AtomicU64,
    /// Records replayed while opening the engine.
    pub records_recovered: AtomicU64,
    engine_started: Instant,
}

impl EngineMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self {
            sets: AtomicU64::new(0),
            gets: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            records_recovered: AtomicU64::new(0),
            engine_started: Instant::now(),
        }
    }

    /// Record a set of `record_size` bytes.
    pub fn record_set(&self, record_size: u64) {
        self.sets.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(record_size, Ordering::Relaxed);
    }

    /// Record a get. `None` means the key was not indexed.
    pub fn record_get(&self, record_size: Option<u64>) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        match record_size {
            Some(size) => {
                self.bytes_read.fetch_add(size, Ordering::Relaxed);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record the outcome of startup recovery.
    pub fn record_recovery(&self, records: u64) {
        self.records_recovered.fetch_add(records, Ordering::Relaxed);
    }

    /// Get engine uptime in seconds.
    pub fn uptime_secs(&self) -> f64 {
        self.engine_started.elapsed().as_secs_f64()
    }

    /// Get total number of operations (sets + gets).
    pub fn total_ops(&self) -> u64 {
        self.sets.load(Ordering::Relaxed) + self.gets.load(Ordering::Relaxed)
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        format!(
            "\n═══ CaskDB Engine Metrics ═══\n\
             Operations:\n\
               sets:      {}\n\
               gets:      {}\n\
               misses:    {}\n\
               total ops: {}\n\
             I/O:\n\
               written:   {} bytes\n\
               read:      {} bytes\n\
             Recovery:\n\
               records:   {}\n\
             Uptime: {:.2}s",
            self.sets.load(Ordering::Relaxed),
            self.gets.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.total_ops(),
            self.bytes_written.load(Ordering::Relaxed),
            self.bytes_read.load(Ordering::Relaxed),
            self.records_recovered.load(Ordering::Relaxed),
            self.uptime_secs(),
        )
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
