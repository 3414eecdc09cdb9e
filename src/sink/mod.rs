//! Event sinks: where recorded chat events end up.
//!
//! The session never calls a sink directly. Events go through
//! [`worker::SinkHandle`], which queues them for a background worker so a slow
//! or failing store cannot stall the IRC read loop.

pub mod http;
pub mod jsonl;
pub mod worker;

use crate::app::event::ChatEvent;
use crate::config::model::{SinkConfig, SinkKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected event with status {status}")]
    Rejected { status: u16 },
}

/// Durable destination for chat events. Failures are reported per event and
/// never affect later submissions.
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn store(&self, event: &ChatEvent) -> Result<(), SinkError>;
}

/// Accepts everything and only traces it. Useful for dry runs.
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn store(&self, event: &ChatEvent) -> Result<(), SinkError> {
        tracing::debug!(event = %serde_json::to_string(event)?, "event");
        Ok(())
    }
}

/// Build the sink selected by `[sink] kind`.
pub fn build(config: &SinkConfig) -> crate::error::Result<Arc<dyn EventSink>> {
    let sink: Arc<dyn EventSink> = match config.kind {
        SinkKind::Jsonl => Arc::new(jsonl::JsonlSink::new(&config.dir)),
        SinkKind::Http => {
            let url = config.url.clone().unwrap_or_default();
            let timeout = Duration::from_secs(config.timeout_secs);
            let sink = http::HttpSink::new(url, timeout)
                .map_err(|e| crate::error::Error::Config(format!("http sink: {}", e)))?;
            Arc::new(sink)
        }
        SinkKind::Log => Arc::new(LogSink),
    };
    Ok(sink)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every stored event in memory; rejects events whose message is
    /// exactly `"fail"`.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<ChatEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<ChatEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.events().into_iter().map(|e| e.message).collect()
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn store(&self, event: &ChatEvent) -> Result<(), SinkError> {
            if event.message == "fail" {
                return Err(SinkError::Rejected { status: 500 });
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }
}
