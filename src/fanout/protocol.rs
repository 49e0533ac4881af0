//! Fan-out Protocol
//!
//! The closed set of messages exchanged between the coordinator and its
//! partition workers. Every request kind carries a strongly-typed
//! payload; there is no tag arithmetic and no send/receive ordering to
//! remember.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::command::{Assignments, Predicate, Projection};

/// A request from the coordinator to one worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Store a new record (the worker still verifies ownership)
    Insert {
        field1: String,
        field2: String,
        field3: u32,
    },

    /// Scan this partition and return formatted rows plus the live count
    Select {
        projection: Projection,
        predicate: Predicate,
    },

    /// Overwrite fields of matching records in this partition
    Update {
        predicate: Predicate,
        assignments: Assignments,
    },

    /// Tombstone matching records in this partition
    Delete { predicate: Predicate },

    /// Exit the receive loop and drop the store
    Terminate,
}

/// A worker's reply to one request
///
/// Insert and Terminate have no reply; the coordinator never waits on
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    /// Formatted result fragment and this partition's live-tuple count
    Select { buffer: String, live_count: u64 },

    /// Records touched and the before/after change log
    Update { count: u64, change_log: String },

    /// Records tombstoned and the deletion log
    Delete { count: u64, change_log: String },
}

impl Request {
    /// Serialize the request to bytes
    pub fn serialize(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize a request from bytes
    pub fn deserialize(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// Get the request kind name (for logging)
    pub fn type_name(&self) -> &'static str {
        match self {
            Request::Insert { .. } => "Insert",
            Request::Select { .. } => "Select",
            Request::Update { .. } => "Update",
            Request::Delete { .. } => "Delete",
            Request::Terminate => "Terminate",
        }
    }

    /// Whether the coordinator waits for a response to this request
    pub fn expects_response(&self) -> bool {
        !matches!(self, Request::Insert { .. } | Request::Terminate)
    }
}

impl Response {
    /// Get the response kind name (for logging)
    pub fn type_name(&self) -> &'static str {
        match self {
            Response::Select { .. } => "Select",
            Response::Update { .. } => "Update",
            Response::Delete { .. } => "Delete",
        }
    }
}

/// A request paired with its reply channel
///
/// Requests that expect no response carry no channel; the worker drops
/// the envelope after executing them.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: Option<oneshot::Sender<Response>>,
}

impl Envelope {
    /// Wrap a fire-and-forget request
    pub fn post(request: Request) -> Self {
        Self {
            request,
            reply: None,
        }
    }

    /// Wrap a request that expects a reply
    pub fn call(request: Request) -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                request,
                reply: Some(tx),
            },
            rx,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = Request::Select {
            projection: Projection::all(),
            predicate: Predicate {
                field1: "al*".into(),
                field2: String::new(),
                field3: Some(5),
            },
        };

        let bytes = request.serialize().unwrap();
        let restored = Request::deserialize(&bytes).unwrap();

        match restored {
            Request::Select { predicate, .. } => {
                assert_eq!(predicate.field1, "al*");
                assert_eq!(predicate.field3, Some(5));
            }
            _ => panic!("Wrong request kind"),
        }
    }

    #[test]
    fn test_expects_response() {
        let insert = Request::Insert {
            field1: "a".into(),
            field2: "b".into(),
            field3: 1,
        };
        assert!(!insert.expects_response());
        assert!(!Request::Terminate.expects_response());
        assert!(Request::Delete {
            predicate: Predicate::any()
        }
        .expects_response());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Request::Terminate.type_name(), "Terminate");
        assert_eq!(
            Response::Update {
                count: 0,
                change_log: String::new()
            }
            .type_name(),
            "Update"
        );
    }
}
