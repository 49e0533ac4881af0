//! Store Module
//!
//! The per-partition record container: records, slots, and the
//! append-only soft-deleting table that holds them.

pub mod record;
pub mod table;

pub use record::{clip_field, Record, MAX_FIELD_LEN};
pub use table::{RecordStore, ScanBuffer};
