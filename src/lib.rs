//! ShardStore - Partitioned In-Memory Record Store
//!
//! A horizontally-partitioned in-memory record store: a single
//! coordinator fans commands out to a fixed set of partition workers and
//! gathers their results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Command Parser                         │
//! │                 (one structured Command per line)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Coordinator                            │
//! │     route(field3) = 1 + (field3 mod N)   ·   fan-out/gather  │
//! └───────┬──────────────────┬──────────────────┬────────────────┘
//!         │                  │                  │
//!         ▼                  ▼                  ▼
//!  ┌────────────┐     ┌────────────┐     ┌────────────┐
//!  │  Worker 1  │     │  Worker 2  │ ... │  Worker N  │
//!  │ RecordStore│     │ RecordStore│     │ RecordStore│
//!  └────────────┘     └────────────┘     └────────────┘
//! ```
//!
//! # Features
//!
//! - Deterministic sharding on the integer field, stable for the life
//!   of a record
//! - Closed enum wire protocol between coordinator and workers
//! - Prefix-wildcard predicate matching (`*`, `value*`, exact)
//! - Soft deletes: tombstoned slots stay addressable but invisible
//! - Injected result/metrics/change-log sinks

pub mod error;
pub mod config;
pub mod matcher;
pub mod store;
pub mod command;
pub mod fanout;
pub mod sinks;

pub use config::ShardStoreConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{parser::parse_line, Assignments, Command, Predicate, Projection};
    pub use crate::config::ShardStoreConfig;
    pub use crate::error::{Error, Result};
    pub use crate::fanout::{Coordinator, Outcome};
    pub use crate::sinks::{MemorySink, SinkSet, WriterSink};
    pub use crate::store::{Record, RecordStore};
}
