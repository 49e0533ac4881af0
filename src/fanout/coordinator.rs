//! Coordinator
//!
//! The single coordinating thread of control. The coordinator owns the
//! partitioning function, spawns the partition workers, routes each
//! command to the right worker set, and aggregates their responses. It
//! holds no record data itself, only routing state and the worker
//! channels.
//!
//! Fan-out is sequential: within one SELECT/UPDATE/DELETE each worker's
//! send/receive pair completes before the next worker is contacted, and
//! aggregation order is always worker-index order.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::command::{Assignments, Command, Predicate, Projection};
use crate::config::ShardStoreConfig;
use crate::error::{Error, Result};
use crate::fanout::protocol::{Envelope, Request, Response};
use crate::fanout::worker::PartitionWorker;
use crate::sinks::SinkSet;

/// The aggregated result of one executed command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Record routed to its home partition
    Inserted { target: usize },
    /// Concatenated row fragments (or fallback text) and the per-worker
    /// live-count vector, both in worker-index order
    Selected { text: String, live_counts: Vec<u64> },
    /// Total records touched and the worker-labeled change log
    Updated { count: u64, change_log: String },
    /// Total records tombstoned and the worker-labeled deletion log
    Deleted { count: u64, change_log: String },
}

/// Channel and task handle for one spawned worker
struct WorkerHandle {
    index: usize,
    tx: mpsc::Sender<Envelope>,
    task: JoinHandle<()>,
}

/// Coordinator over a fixed set of partition workers
pub struct Coordinator {
    workers: Vec<WorkerHandle>,
    sinks: SinkSet,
}

impl Coordinator {
    /// Spawn workers per the configuration, discarding all sink output
    pub fn new(config: &ShardStoreConfig) -> Self {
        Self::with_sinks(config, SinkSet::null())
    }

    /// Spawn workers per the configuration with injected output sinks
    pub fn with_sinks(config: &ShardStoreConfig, sinks: SinkSet) -> Self {
        let partitions = config.cluster.partitions;
        let mut workers = Vec::with_capacity(partitions);

        for index in 1..=partitions {
            let (tx, rx) = mpsc::channel(config.cluster.channel_depth);
            let worker = PartitionWorker::new(index, partitions, &config.store, rx);
            let task = tokio::spawn(worker.run());
            workers.push(WorkerHandle { index, tx, task });
        }

        tracing::info!("Coordinator started with {} partitions", partitions);
        Self { workers, sinks }
    }

    /// Number of partitions
    pub fn partitions(&self) -> usize {
        self.workers.len()
    }

    /// Home partition for a field3 value, in `[1, N]`
    ///
    /// Deterministic and stable: computed once at insert time, and a
    /// record never migrates afterwards.
    pub fn route(&self, field3: u32) -> usize {
        1 + (field3 as usize % self.workers.len())
    }

    /// Execute one command to completion and aggregate the responses
    pub async fn execute(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Insert {
                field1,
                field2,
                field3,
            } => self.insert(field1, field2, field3).await,
            Command::Select {
                projection,
                predicate,
            } => self.select(projection, predicate).await,
            Command::Update {
                predicate,
                assignments,
            } => self.update(predicate, assignments).await,
            Command::Delete { predicate } => self.delete(predicate).await,
        }
    }

    /// Route an insert to its one home partition; no response expected
    async fn insert(&mut self, field1: String, field2: String, field3: u32) -> Result<Outcome> {
        let target = self.route(field3);
        tracing::debug!("Routing insert field3={} to worker {}", field3, target);

        self.post(
            target,
            Request::Insert {
                field1,
                field2,
                field3,
            },
        )
        .await?;

        Ok(Outcome::Inserted { target })
    }

    /// Broadcast a select, gather fragments and live counts in index order
    async fn select(&mut self, projection: Projection, predicate: Predicate) -> Result<Outcome> {
        let mut text = String::new();
        let mut live_counts = Vec::with_capacity(self.workers.len());

        for index in 1..=self.workers.len() {
            let request = Request::Select {
                projection,
                predicate: predicate.clone(),
            };
            match self.call(index, request).await? {
                Response::Select { buffer, live_count } => {
                    text.push_str(&buffer);
                    live_counts.push(live_count);
                }
                other => {
                    return Err(Error::UnexpectedResponse {
                        index,
                        expected: "Select",
                        got: other.type_name(),
                    })
                }
            }
        }

        if text.is_empty() {
            text = no_records_message(&predicate);
        }

        self.sinks.results.record_result(&text)?;
        self.sinks.metrics.record_live_counts(&live_counts)?;

        Ok(Outcome::Selected { text, live_counts })
    }

    /// Broadcast an update, sum counts, concatenate labeled change logs
    async fn update(&mut self, predicate: Predicate, assignments: Assignments) -> Result<Outcome> {
        let mut total = 0u64;
        let mut change_log = String::new();

        for index in 1..=self.workers.len() {
            let request = Request::Update {
                predicate: predicate.clone(),
                assignments: assignments.clone(),
            };
            match self.call(index, request).await? {
                Response::Update { count, change_log: fragment } => {
                    total += count;
                    label_changes(&mut change_log, index, &fragment);
                }
                other => {
                    return Err(Error::UnexpectedResponse {
                        index,
                        expected: "Update",
                        got: other.type_name(),
                    })
                }
            }
        }

        if !change_log.is_empty() {
            self.sinks.changes.record_changes(&change_log)?;
        }

        Ok(Outcome::Updated {
            count: total,
            change_log,
        })
    }

    /// Broadcast a delete, sum counts, concatenate labeled deletion logs
    async fn delete(&mut self, predicate: Predicate) -> Result<Outcome> {
        let mut total = 0u64;
        let mut change_log = String::new();

        for index in 1..=self.workers.len() {
            let request = Request::Delete {
                predicate: predicate.clone(),
            };
            match self.call(index, request).await? {
                Response::Delete { count, change_log: fragment } => {
                    total += count;
                    label_changes(&mut change_log, index, &fragment);
                }
                other => {
                    return Err(Error::UnexpectedResponse {
                        index,
                        expected: "Delete",
                        got: other.type_name(),
                    })
                }
            }
        }

        if !change_log.is_empty() {
            self.sinks.changes.record_changes(&change_log)?;
        }

        Ok(Outcome::Deleted {
            count: total,
            change_log,
        })
    }

    /// Send a fire-and-forget request to one worker
    async fn post(&self, index: usize, request: Request) -> Result<()> {
        let handle = &self.workers[index - 1];
        handle
            .tx
            .send(Envelope::post(request))
            .await
            .map_err(|_| Error::WorkerUnavailable {
                index,
                reason: "request channel closed".into(),
            })
    }

    /// Send a request to one worker and block for its single response
    async fn call(&self, index: usize, request: Request) -> Result<Response> {
        let handle = &self.workers[index - 1];
        let kind = request.type_name();
        let (envelope, rx) = Envelope::call(request);

        handle
            .tx
            .send(envelope)
            .await
            .map_err(|_| Error::WorkerUnavailable {
                index,
                reason: format!("request channel closed sending {}", kind),
            })?;

        rx.await.map_err(|_| Error::WorkerUnavailable {
            index,
            reason: format!("worker dropped reply to {}", kind),
        })
    }

    /// Send one Terminate to every worker and join their tasks
    pub async fn shutdown(self) -> Result<()> {
        for handle in &self.workers {
            // A worker that already exited has closed its channel; that
            // is fine, it no longer needs the terminate.
            let _ = handle.tx.send(Envelope::post(Request::Terminate)).await;
        }

        for handle in self.workers {
            handle.task.await.map_err(|e| Error::WorkerUnavailable {
                index: handle.index,
                reason: e.to_string(),
            })?;
        }

        tracing::info!("Coordinator shut down");
        Ok(())
    }
}

/// Fallback text for a select that matched nothing, listing only the
/// conditions that were explicitly specified
fn no_records_message(predicate: &Predicate) -> String {
    match predicate.summary() {
        Some(attrs) => format!("no records found. Query attributes: {}", attrs),
        None => "no records found.".to_string(),
    }
}

/// Append a worker's change-log fragment, labeling every line
fn label_changes(log: &mut String, index: usize, fragment: &str) {
    for line in fragment.lines() {
        log.push_str(&format!("[worker {}] {}\n", index, line));
    }
}
