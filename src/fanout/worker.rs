//! Partition Worker
//!
//! One worker owns one partition's record store. It runs as a single
//! task, blocks on its request channel between commands, executes each
//! request fully before looking at the next, and never shares its store
//! with anyone. Locking is unnecessary: the coordinator is its only
//! caller and waits for each reply before sending more work.

use tokio::sync::mpsc;

use crate::config::StoreConfig;
use crate::fanout::protocol::{Envelope, Request, Response};
use crate::store::RecordStore;

/// A single partition worker
pub struct PartitionWorker {
    /// Worker index, 1-based; partition `i` owns field3 values where
    /// `1 + (field3 mod N) == i`
    index: usize,
    /// Total partition count N
    partitions: usize,
    /// This partition's records
    store: RecordStore,
    /// Inbound requests from the coordinator
    rx: mpsc::Receiver<Envelope>,
}

impl PartitionWorker {
    /// Create a worker for partition `index` of `partitions`
    pub fn new(
        index: usize,
        partitions: usize,
        store_config: &StoreConfig,
        rx: mpsc::Receiver<Envelope>,
    ) -> Self {
        Self {
            index,
            partitions,
            store: RecordStore::new(store_config.capacity, store_config.max_result_bytes),
            rx,
        }
    }

    /// Whether this worker is the home partition for a field3 value
    ///
    /// Ownership is derived from the value, never signaled by the
    /// coordinator: any worker can receive any insert and decide for
    /// itself.
    pub fn owns(&self, field3: u32) -> bool {
        1 + (field3 as usize % self.partitions) == self.index
    }

    /// Receive loop: runs until a Terminate request arrives or the
    /// coordinator drops the channel
    pub async fn run(mut self) {
        tracing::debug!("Worker {} started", self.index);

        while let Some(envelope) = self.rx.recv().await {
            if matches!(envelope.request, Request::Terminate) {
                break;
            }

            let response = self.execute(envelope.request);
            if let (Some(reply), Some(response)) = (envelope.reply, response) {
                // A closed reply channel means the coordinator gave up on
                // this request; nothing useful to do with the result.
                let _ = reply.send(response);
            }
        }

        tracing::debug!(
            "Worker {} terminated with {} live records",
            self.index,
            self.store.count_live()
        );
    }

    /// Execute one request against the local store
    fn execute(&mut self, request: Request) -> Option<Response> {
        tracing::trace!("Worker {} executing {}", self.index, request.type_name());

        match request {
            Request::Insert {
                field1,
                field2,
                field3,
            } => {
                if !self.owns(field3) {
                    tracing::warn!(
                        "Worker {} received insert for field3={} it does not own",
                        self.index,
                        field3
                    );
                    return None;
                }

                if self.store.insert(&field1, &field2, field3) {
                    tracing::debug!(
                        "Worker {} inserted: {}, {}, {}",
                        self.index,
                        field1,
                        field2,
                        field3
                    );
                } else {
                    tracing::warn!(
                        "Worker {} dropped insert at capacity ({} slots)",
                        self.index,
                        self.store.len()
                    );
                }
                None
            }

            Request::Select {
                projection,
                predicate,
            } => Some(Response::Select {
                buffer: self.store.scan(&predicate, &projection),
                live_count: self.store.count_live(),
            }),

            Request::Update {
                predicate,
                assignments,
            } => {
                let (count, change_log) = self.store.update(&predicate, &assignments);
                Some(Response::Update { count, change_log })
            }

            Request::Delete { predicate } => {
                let (count, change_log) = self.store.delete(&predicate);
                Some(Response::Delete { count, change_log })
            }

            // Handled by the receive loop.
            Request::Terminate => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Predicate, Projection};

    fn worker(index: usize, partitions: usize) -> (PartitionWorker, mpsc::Sender<Envelope>) {
        let (tx, rx) = mpsc::channel(8);
        let worker = PartitionWorker::new(index, partitions, &StoreConfig::default(), rx);
        (worker, tx)
    }

    #[test]
    fn test_ownership_is_derived_from_field3() {
        let (worker, _tx) = worker(3, 3);
        assert!(worker.owns(5)); // 1 + (5 mod 3) == 3
        assert!(worker.owns(2));
        assert!(!worker.owns(4)); // 1 + (4 mod 3) == 2
    }

    #[test]
    fn test_foreign_insert_is_skipped() {
        let (mut worker, _tx) = worker(1, 3);
        worker.execute(Request::Insert {
            field1: "alice".into(),
            field2: "eng".into(),
            field3: 5, // belongs to worker 3
        });

        match worker.execute(Request::Select {
            projection: Projection::all(),
            predicate: Predicate::any(),
        }) {
            Some(Response::Select { buffer, live_count }) => {
                assert_eq!(buffer, "");
                assert_eq!(live_count, 0);
            }
            _ => panic!("expected select response"),
        }
    }

    #[tokio::test]
    async fn test_run_loop_roundtrip() {
        let (worker, tx) = worker(3, 3);
        let handle = tokio::spawn(worker.run());

        tx.send(Envelope::post(Request::Insert {
            field1: "alice".into(),
            field2: "eng".into(),
            field3: 5,
        }))
        .await
        .unwrap();

        let (envelope, rx) = Envelope::call(Request::Select {
            projection: Projection::all(),
            predicate: Predicate {
                field3: Some(5),
                ..Predicate::any()
            },
        });
        tx.send(envelope).await.unwrap();

        match rx.await.unwrap() {
            Response::Select { buffer, live_count } => {
                assert_eq!(buffer, "alice, eng, 5\n");
                assert_eq!(live_count, 1);
            }
            other => panic!("unexpected response: {}", other.type_name()),
        }

        tx.send(Envelope::post(Request::Terminate)).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_loop_exits_when_channel_drops() {
        let (worker, tx) = worker(1, 1);
        let handle = tokio::spawn(worker.run());
        drop(tx);
        handle.await.unwrap();
    }
}
