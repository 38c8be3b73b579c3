//! CaskDB - Core Type Definitions
//! Defines fundamental types shared by the codec, the index and the engine.

/// Seconds since the Unix epoch, as stored in a record header.
pub type Timestamp = u32;

/// Location of the latest record for a key inside the data file.
/// The KeyDir stores these instead of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    /// Time the record was written.
    pub timestamp: Timestamp,
    /// Byte offset of the record header.
    pub position: u64,
    /// Header, key and value bytes together.
    pub total_size: u64,
}

impl KeyEntry {
    pub fn new(timestamp: Timestamp, position: u64, total_size: u64) -> Self {
        Self {
            timestamp,
            position,
            total_size,
        }
    }
}

/// A fully decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: Timestamp,
    pub key: String,
    pub value: String,
}

/// Current Unix time in whole seconds.
/// Kept as `u64` so the codec can reject values past the 32-bit range.
pub fn now_secs() -> u64 {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs(),
        Err(e) => {
            log::warn!(
                "system clock is {:?} before the Unix epoch, stamping 0",
                e.duration()
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_secs_is_after_epoch() {
        // 2020-01-01T00:00:00Z
        assert!(now_secs() > 1_577_836_800);
    }
}
