//! Command Types
//!
//! The structured commands the coordinator consumes, plus the predicate,
//! projection, and assignment shapes they carry. The textual surface that
//! produces these lives in [`parser`].

pub mod parser;

use serde::{Deserialize, Serialize};

use crate::matcher;
use crate::store::record::{clip_field, Record};

/// A structured command for the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Insert a new record
    Insert {
        field1: String,
        field2: String,
        field3: u32,
    },
    /// Scan all partitions for matching records
    Select {
        projection: Projection,
        predicate: Predicate,
    },
    /// Overwrite fields of matching records in place
    Update {
        predicate: Predicate,
        assignments: Assignments,
    },
    /// Tombstone matching records
    Delete { predicate: Predicate },
}

/// A conjunctive three-field condition
///
/// Text conditions follow the pattern matcher rules (`*`/empty match-all,
/// trailing-`*` prefix, exact otherwise). The integer condition is either
/// an exact value or unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Predicate {
    /// Condition on field1
    pub field1: String,
    /// Condition on field2
    pub field2: String,
    /// Condition on field3; `None` means no constraint
    pub field3: Option<u32>,
}

impl Predicate {
    /// A predicate matching every record
    pub fn any() -> Self {
        Self::default()
    }

    /// Evaluate the predicate against a record
    pub fn matches(&self, record: &Record) -> bool {
        matcher::matches(&record.field1, &self.field1)
            && matcher::matches(&record.field2, &self.field2)
            && self.field3.map_or(true, |v| record.field3 == v)
    }

    /// Summarize the explicitly-specified conditions, if any
    ///
    /// Used for the "no records found" fallback: only non-wildcard
    /// conditions are listed, in fixed field order.
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !matcher::is_wildcard(&self.field1) {
            parts.push(format!("field1={}", self.field1));
        }
        if !matcher::is_wildcard(&self.field2) {
            parts.push(format!("field2={}", self.field2));
        }
        if let Some(v) = self.field3 {
            parts.push(format!("field3={}", v));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Which fields a SELECT emits, always in field1, field2, field3 order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub field1: bool,
    pub field2: bool,
    pub field3: bool,
}

impl Projection {
    /// Project every field
    pub fn all() -> Self {
        Self {
            field1: true,
            field2: true,
            field3: true,
        }
    }

    /// Build a projection from field names; unknown names are ignored
    /// and an empty selection falls back to projecting everything
    pub fn from_names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Self {
        let mut projection = Self {
            field1: false,
            field2: false,
            field3: false,
        };

        for name in names {
            match name.trim() {
                "field1" => projection.field1 = true,
                "field2" => projection.field2 = true,
                "field3" => projection.field3 = true,
                _ => {}
            }
        }

        if !projection.field1 && !projection.field2 && !projection.field3 {
            return Self::all();
        }
        projection
    }

    /// Render a record through this projection: values joined by `, `
    pub fn format_row(&self, record: &Record) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.field1 {
            parts.push(record.field1.clone());
        }
        if self.field2 {
            parts.push(record.field2.clone());
        }
        if self.field3 {
            parts.push(record.field3.to_string());
        }
        parts.join(", ")
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

/// The SET clause of an UPDATE: only present fields are overwritten
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assignments {
    pub field1: Option<String>,
    pub field2: Option<String>,
    pub field3: Option<u32>,
}

impl Assignments {
    /// Whether the SET clause assigns anything at all
    pub fn is_empty(&self) -> bool {
        self.field1.is_none() && self.field2.is_none() && self.field3.is_none()
    }

    /// Overwrite the supplied fields of a record, clipping text values
    pub fn apply(&self, record: &mut Record) {
        if let Some(v) = &self.field1 {
            record.field1 = clip_field(v);
        }
        if let Some(v) = &self.field2 {
            record.field2 = clip_field(v);
        }
        if let Some(v) = self.field3 {
            record.field3 = v;
        }
    }
}
