//! CaskDB - Log-Structured Key-Value Storage Engine
//!
//! A crash-recoverable storage engine in the style of BitCask: an append-only
//! record log on disk plus an in-memory index of where each key's latest
//! record lives.
//!
//! ## Features
//! - **Record Codec**: fixed 12-byte little-endian header followed by raw key and value bytes
//! - **Data File**: append-only, every write fsynced before it returns
//! - **KeyDir**: in-memory hash index of record offsets, never values
//! - **Recovery**: replays the log from offset 0 on open to rebuild the KeyDir
//! - **Metrics**: lock-free atomic counters for observability
//!
//! Deleting a key is done by storing an empty value.
//!
//! ## Example
//! ```no_run
//! use caskdb::{config::Config, engine::CaskDb};
//!
//! let mut db = CaskDb::open(Config::new("books.db")).unwrap();
//!
//! db.set("othello", "shakespeare").unwrap();
//! assert_eq!(db.get("othello").unwrap(), "shakespeare");
//! assert_eq!(db.get("ulysses").unwrap(), "");
//! db.close().unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use config::{Config, RecoveryMode};
pub use engine::CaskDb;
pub use error::{CaskError, Result};
