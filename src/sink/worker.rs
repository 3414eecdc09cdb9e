//! Bounded, fire-and-forget event submission.
//!
//! The read loop calls [`SinkHandle::submit`], which never waits: events go
//! into a bounded queue, and a full queue drops the event. A single worker
//! task drains the queue and runs each store as its own task, with at most
//! `max_in_flight` stores outstanding. Failures are logged and counted per
//! event.

use super::EventSink;
use crate::app::event::ChatEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};

/// Submission counters shared between the handle and the worker.
#[derive(Debug, Default)]
pub struct SinkStats {
    stored: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl SinkStats {
    pub fn stored(&self) -> u64 {
        self.stored.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Cheap, cloneable entry point used by the session.
#[derive(Clone)]
pub struct SinkHandle {
    tx: mpsc::Sender<ChatEvent>,
    stats: Arc<SinkStats>,
}

impl SinkHandle {
    /// Queue `event` for storage without blocking. Returns `false` if the
    /// event was dropped because the queue is full or the worker is gone.
    pub fn submit(&self, event: ChatEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    channel = %event.channel,
                    timestamp = %event.timestamp,
                    "sink queue full, dropping event"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::error!("sink worker stopped, dropping event");
                false
            }
        }
    }
}

pub struct SinkWorker {
    join: JoinHandle<()>,
    stats: Arc<SinkStats>,
}

impl SinkWorker {
    /// Wait for the worker to drain. Only returns once every [`SinkHandle`]
    /// clone has been dropped and all in-flight stores have finished.
    pub async fn finish(self) -> Arc<SinkStats> {
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "sink worker panicked");
        }
        self.stats
    }
}

/// Start the worker for `sink`.
pub fn spawn(
    sink: Arc<dyn EventSink>,
    queue_capacity: usize,
    max_in_flight: usize,
) -> (SinkHandle, SinkWorker) {
    let (tx, rx) = mpsc::channel(queue_capacity);
    let stats = Arc::new(SinkStats::default());
    let join = tokio::spawn(run(sink, rx, max_in_flight, stats.clone()));
    (
        SinkHandle {
            tx,
            stats: stats.clone(),
        },
        SinkWorker { join, stats },
    )
}

async fn run(
    sink: Arc<dyn EventSink>,
    mut rx: mpsc::Receiver<ChatEvent>,
    max_in_flight: usize,
    stats: Arc<SinkStats>,
) {
    let permits = Arc::new(Semaphore::new(max_in_flight));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let sink = sink.clone();
        let stats = stats.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            store_one(sink.as_ref(), &event, &stats).await;
        });
        // Reap finished stores so the set does not grow without bound.
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
}

async fn store_one(sink: &dyn EventSink, event: &ChatEvent, stats: &SinkStats) {
    match sink.store(event).await {
        Ok(()) => {
            stats.stored.fetch_add(1, Ordering::Relaxed);
            tracing::info!("{} | {}: {}", event.timestamp, event.username, event.message);
        }
        Err(e) => {
            stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                sink = sink.name(),
                channel = %event.channel,
                timestamp = %event.timestamp,
                error = %e,
                "failed to store event"
            );
        }
    }
}
