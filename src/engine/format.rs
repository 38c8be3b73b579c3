//! CaskDB - Record Codec
//! Pure functions to serialize and deserialize a single record. No I/O, no state.
//!
//! ## Binary Format (per record)
//! ```text
//! [timestamp: 4 bytes (LE)][key_size: 4 bytes (LE)][value_size: 4 bytes (LE)][key: N bytes][value: M bytes]
//! ```
//! The first three fields form a fixed 12-byte header. Sizes count UTF-8 bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CaskError, Result};
use crate::types::{Record, Timestamp};

/// Size of the fixed record header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Total on-disk size of a record with the given key and value lengths.
pub fn record_size(key_size: u64, value_size: u64) -> u64 {
    HEADER_SIZE as u64 + key_size + value_size
}

fn to_u32(field: &'static str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| CaskError::Overflow { field, value })
}

/// Pack the header fields as three little-endian `u32`s.
pub fn encode_header(timestamp: u64, key_size: u64, value_size: u64) -> Result<[u8; HEADER_SIZE]> {
    let timestamp = to_u32("timestamp", timestamp)?;
    let key_size = to_u32("key_size", key_size)?;
    let value_size = to_u32("value_size", value_size)?;

    let mut header = [0u8; HEADER_SIZE];
    let mut buf = &mut header[..];
    buf.put_u32_le(timestamp);
    buf.put_u32_le(key_size);
    buf.put_u32_le(value_size);
    Ok(header)
}

/// Encode a full record. Returns the record size together with its bytes.
pub fn encode_record(timestamp: u64, key: &str, value: &str) -> Result<(u64, Bytes)> {
    let header = encode_header(timestamp, key.len() as u64, value.len() as u64)?;
    let total_size = record_size(key.len() as u64, value.len() as u64);

    let mut buf = BytesMut::with_capacity(total_size as usize);
    buf.put_slice(&header);
    buf.put_slice(key.as_bytes());
    buf.put_slice(value.as_bytes());
    Ok((total_size, buf.freeze()))
}

/// Decode the fixed header into `(timestamp, key_size, value_size)`.
pub fn decode_header(data: &[u8]) -> Result<(Timestamp, u32, u32)> {
    if data.len() < HEADER_SIZE {
        return Err(CaskError::Format(format!(
            "header needs {} bytes, got {}",
            HEADER_SIZE,
            data.len()
        )));
    }
    let mut buf = &data[..HEADER_SIZE];
    let timestamp = buf.get_u32_le();
    let key_size = buf.get_u32_le();
    let value_size = buf.get_u32_le();
    Ok((timestamp, key_size, value_size))
}

/// Decode a full record. Bytes past the declared value are ignored.
pub fn decode_record(data: &[u8]) -> Result<Record> {
    let (timestamp, key_size, value_size) = decode_header(data)?;
    let total_size = record_size(key_size as u64, value_size as u64);
    if (data.len() as u64) < total_size {
        return Err(CaskError::Format(format!(
            "record declares {} bytes, got {}",
            total_size,
            data.len()
        )));
    }

    let key_end = HEADER_SIZE + key_size as usize;
    let value_end = key_end + value_size as usize;
    let key = String::from_utf8(data[HEADER_SIZE..key_end].to_vec())?;
    let value = String::from_utf8(data[key_end..value_end].to_vec())?;

    Ok(Record {
        timestamp,
        key,
        value,
    })
}
