//! Record Types
//!
//! A record carries two short text fields and one integer field. The
//! integer field doubles as the sharding key. Text fields are clipped to
//! [`MAX_FIELD_LEN`] bytes at every ingestion point.

use serde::{Deserialize, Serialize};

/// Maximum stored length of a text field, in bytes
pub const MAX_FIELD_LEN: usize = 100;

/// A stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// First text field
    pub field1: String,
    /// Second text field
    pub field2: String,
    /// Integer field; also the sharding key
    pub field3: u32,
}

impl Record {
    /// Create a record, clipping text fields to the maximum length
    pub fn new(field1: &str, field2: &str, field3: u32) -> Self {
        Self {
            field1: clip_field(field1),
            field2: clip_field(field2),
            field3,
        }
    }

    /// Render the record as a full row: `field1, field2, field3`
    pub fn display_row(&self) -> String {
        format!("{}, {}, {}", self.field1, self.field2, self.field3)
    }
}

/// Clip a text field to [`MAX_FIELD_LEN`] bytes on a char boundary
pub fn clip_field(value: &str) -> String {
    if value.len() <= MAX_FIELD_LEN {
        return value.to_string();
    }

    let mut end = MAX_FIELD_LEN;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// One slot in a partition's store
///
/// The tombstone flag lives inside the slot itself, so a slot is marked
/// deleted at exactly the position it was inserted at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// The record occupying this slot
    pub record: Record,
    /// Set once by delete; never cleared, slot never reclaimed
    pub tombstone: bool,
}

impl Slot {
    /// Create a live slot holding the given record
    pub fn live(record: Record) -> Self {
        Self {
            record,
            tombstone: false,
        }
    }

    /// Whether this slot is visible to reads
    pub fn is_live(&self) -> bool {
        !self.tombstone
    }
}
