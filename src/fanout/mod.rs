//! Fan-out Module
//!
//! The coordinator/worker split and the protocol between them: inserts
//! route to one partition, scans and mutations broadcast to all, and
//! every round-trip is a single request matched by a single response.

pub mod protocol;
mod worker;
mod coordinator;

pub use protocol::{Envelope, Request, Response};
pub use worker::PartitionWorker;
pub use coordinator::{Coordinator, Outcome};
