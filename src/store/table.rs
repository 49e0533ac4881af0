//! Record Store
//!
//! The append-only, soft-deleting container behind one partition worker.
//! Slots keep insertion order forever: deletes set a tombstone and
//! nothing is ever reordered, reclaimed, or compacted.

use crate::command::{Assignments, Predicate, Projection};
use crate::store::record::{Record, Slot};

/// Per-partition record container
pub struct RecordStore {
    slots: Vec<Slot>,
    /// Slot ceiling; counts tombstoned slots too since they are never reclaimed
    capacity: usize,
    /// Byte ceiling for a single scan's formatted output
    max_result_bytes: usize,
}

impl RecordStore {
    /// Create an empty store with the given ceilings
    pub fn new(capacity: usize, max_result_bytes: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
            max_result_bytes,
        }
    }

    /// Append a new live record
    ///
    /// Returns `false` when the store is at capacity and the record was
    /// dropped. The caller decides whether to log it; nothing else is
    /// reported.
    pub fn insert(&mut self, field1: &str, field2: &str, field3: u32) -> bool {
        if self.slots.len() >= self.capacity {
            return false;
        }

        self.slots.push(Slot::live(Record::new(field1, field2, field3)));
        true
    }

    /// Number of non-tombstoned records; recomputed on every call
    pub fn count_live(&self) -> u64 {
        self.slots.iter().filter(|s| s.is_live()).count() as u64
    }

    /// Total slots ever inserted, tombstoned or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store has never held a record
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Scan live records in insertion order, formatting matches through
    /// the projection into a newline-terminated row buffer
    ///
    /// Once the buffer would exceed its byte ceiling, remaining matches
    /// are dropped without notice.
    pub fn scan(&self, predicate: &Predicate, projection: &Projection) -> String {
        let mut buffer = ScanBuffer::new(self.max_result_bytes);

        for slot in self.slots.iter().filter(|s| s.is_live()) {
            if !predicate.matches(&slot.record) {
                continue;
            }
            if !buffer.push_row(&projection.format_row(&slot.record)) {
                break;
            }
        }

        buffer.into_text()
    }

    /// Overwrite supplied fields of every live matching record
    ///
    /// Returns the touch count and one before/after line per record.
    pub fn update(&mut self, predicate: &Predicate, assignments: &Assignments) -> (u64, String) {
        let mut count = 0u64;
        let mut change_log = String::new();

        for slot in self.slots.iter_mut().filter(|s| s.is_live()) {
            if !predicate.matches(&slot.record) {
                continue;
            }

            let before = slot.record.display_row();
            assignments.apply(&mut slot.record);
            change_log.push_str(&format!("{} -> {}\n", before, slot.record.display_row()));
            count += 1;
        }

        (count, change_log)
    }

    /// Tombstone every live matching record
    ///
    /// Returns the count and one deletion line per record. Slots stay in
    /// place; only `count_live` and scans change.
    pub fn delete(&mut self, predicate: &Predicate) -> (u64, String) {
        let mut count = 0u64;
        let mut change_log = String::new();

        for slot in self.slots.iter_mut().filter(|s| s.is_live()) {
            if !predicate.matches(&slot.record) {
                continue;
            }

            slot.tombstone = true;
            change_log.push_str(&format!("deleted: {}\n", slot.record.display_row()));
            count += 1;
        }

        (count, change_log)
    }
}

/// Row accumulator with a hard byte ceiling
pub struct ScanBuffer {
    text: String,
    limit: usize,
}

impl ScanBuffer {
    /// Create an empty buffer with the given byte limit
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    /// Append a row plus its trailing newline if it fits; `false` once full
    pub fn push_row(&mut self, row: &str) -> bool {
        if self.text.len() + row.len() + 1 > self.limit {
            return false;
        }

        self.text.push_str(row);
        self.text.push('\n');
        true
    }

    /// Consume the buffer, yielding the accumulated text
    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Assignments, Predicate, Projection};

    fn store() -> RecordStore {
        RecordStore::new(100, 4096)
    }

    fn field3_is(v: u32) -> Predicate {
        Predicate {
            field3: Some(v),
            ..Predicate::any()
        }
    }

    #[test]
    fn test_insert_and_scan() {
        let mut store = store();
        assert!(store.insert("alice", "eng", 5));
        assert!(store.insert("bob", "ops", 8));

        let out = store.scan(&field3_is(5), &Projection::all());
        assert_eq!(out, "alice, eng, 5\n");
    }

    #[test]
    fn test_scan_preserves_insertion_order() {
        let mut store = store();
        store.insert("carol", "eng", 2);
        store.insert("alice", "eng", 2);
        store.insert("bob", "eng", 2);

        let out = store.scan(&Predicate::any(), &Projection::all());
        assert_eq!(out, "carol, eng, 2\nalice, eng, 2\nbob, eng, 2\n");
    }

    #[test]
    fn test_capacity_drop_is_reported_to_caller() {
        let mut store = RecordStore::new(2, 4096);
        assert!(store.insert("a", "x", 1));
        assert!(store.insert("b", "x", 2));
        assert!(!store.insert("c", "x", 3));
        assert_eq!(store.count_live(), 2);
    }

    #[test]
    fn test_tombstones_count_toward_capacity() {
        let mut store = RecordStore::new(2, 4096);
        store.insert("a", "x", 1);
        store.insert("b", "x", 2);
        store.delete(&Predicate::any());
        // Slots are never reclaimed, so the store is still full.
        assert!(!store.insert("c", "x", 3));
        assert_eq!(store.count_live(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_touches_only_matches() {
        let mut store = store();
        store.insert("alice", "eng", 5);
        store.insert("bob", "ops", 8);

        let predicate = Predicate {
            field1: "alice*".into(),
            ..Predicate::any()
        };
        let assignments = Assignments {
            field2: Some("mgmt".into()),
            ..Default::default()
        };

        let (count, log) = store.update(&predicate, &assignments);
        assert_eq!(count, 1);
        assert_eq!(log, "alice, eng, 5 -> alice, mgmt, 5\n");

        let out = store.scan(&field3_is(5), &Projection::all());
        assert_eq!(out, "alice, mgmt, 5\n");
    }

    #[test]
    fn test_update_with_empty_set_clause_rewrites_nothing() {
        let mut store = store();
        store.insert("alice", "eng", 5);

        let (count, log) = store.update(&Predicate::any(), &Assignments::default());
        assert_eq!(count, 1);
        assert_eq!(log, "alice, eng, 5 -> alice, eng, 5\n");
    }

    #[test]
    fn test_delete_hides_record_from_everything() {
        let mut store = store();
        store.insert("alice", "eng", 5);
        store.insert("bob", "ops", 8);

        let (count, log) = store.delete(&field3_is(5));
        assert_eq!(count, 1);
        assert_eq!(log, "deleted: alice, eng, 5\n");
        assert_eq!(store.count_live(), 1);

        assert_eq!(store.scan(&field3_is(5), &Projection::all()), "");
        let (updated, _) = store.update(&field3_is(5), &Assignments::default());
        assert_eq!(updated, 0);
    }

    #[test]
    fn test_delete_is_idempotent_per_record() {
        let mut store = store();
        store.insert("alice", "eng", 5);
        assert_eq!(store.delete(&field3_is(5)).0, 1);
        assert_eq!(store.delete(&field3_is(5)).0, 0);
    }

    #[test]
    fn test_scan_truncates_silently_at_byte_ceiling() {
        let mut store = RecordStore::new(100, 32);
        for i in 0..10 {
            store.insert("somebody", "eng", i);
        }

        let out = store.scan(&Predicate::any(), &Projection::all());
        assert!(out.len() <= 32);
        // "somebody, eng, N\n" is 17 bytes: exactly one row fits.
        assert_eq!(out, "somebody, eng, 0\n");
    }

    #[test]
    fn test_projection_subset() {
        let mut store = store();
        store.insert("alice", "eng", 5);

        let projection = Projection::from_names(["field1", "field3"]);
        assert_eq!(store.scan(&Predicate::any(), &projection), "alice, 5\n");
    }
}
