//! JSON-lines file sink.
//!
//! Appends one JSON object per event to `<dir>/<channel>_<date>.jsonl`, where
//! the date comes from the event timestamp. One open handle is cached per
//! channel and swapped when the date rolls over.

use super::{EventSink, SinkError};
use crate::app::event::ChatEvent;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct JsonlSink {
    dir: PathBuf,
    // channel -> (file name, handle)
    files: Mutex<HashMap<String, (String, File)>>,
}

impl JsonlSink {
    pub fn new(dir: &str) -> Self {
        Self {
            dir: expand_home(dir),
            files: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl EventSink for JsonlSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn store(&self, event: &ChatEvent) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let filename = file_name(event);
        // Held across the write so concurrent stores never interleave lines.
        let mut files = self.files.lock().await;
        let cached = files
            .remove(&event.channel)
            .filter(|(open_name, _)| *open_name == filename);
        let (filename, mut file) = match cached {
            Some(open) => open,
            None => {
                fs::create_dir_all(&self.dir).await?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.dir.join(&filename))
                    .await?;
                (filename, file)
            }
        };

        // A failed append may leave a partial line behind; only a handle that
        // wrote cleanly is cached, so the next store reopens the file.
        append(&mut file, &line).await?;
        files.insert(event.channel.clone(), (filename, file));
        Ok(())
    }
}

async fn append(file: &mut File, line: &[u8]) -> Result<(), SinkError> {
    file.write_all(line).await?;
    file.flush().await?;
    Ok(())
}

fn file_name(event: &ChatEvent) -> String {
    let safe_channel: String = event
        .channel
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let date = event.timestamp.get(..10).unwrap_or("undated");
    format!("{}_{}.jsonl", safe_channel, date)
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(dir)),
        None => PathBuf::from(dir),
    }
}
