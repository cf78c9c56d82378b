//! Background playlist parsing.
//!
//! The offload channel runs the playlist parser on the blocking pool in
//! line-count batches, streaming partial results back over a typed event
//! channel. Batch emission order matches input line order and the terminal
//! event fires strictly after the last batch. A pending record whose two
//! lines straddle a batch boundary is carried into the next batch, so the
//! batched output is identical to a single synchronous pass.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::playlist_parser::PlaylistParser;
use crate::errors::CatalogError;
use crate::models::ContentRecord;

/// Progress events are UI feedback only; correctness rests on the terminal
/// result returned by [`ParseHandle::join`].
#[derive(Debug, Clone)]
pub enum ParseEvent {
    Batch {
        records: Vec<ContentRecord>,
        percent: f64,
    },
    Finished {
        total: usize,
    },
}

/// Handle to an in-flight background parse: a stream of progress events plus
/// the terminal result-or-error.
pub struct ParseHandle {
    pub events: mpsc::Receiver<ParseEvent>,
    task: JoinHandle<Vec<ContentRecord>>,
}

impl ParseHandle {
    /// Wait for the complete ordered record sequence. Callers discard any
    /// partial batches they accumulated if this returns an error.
    pub async fn join(self) -> Result<Vec<ContentRecord>, CatalogError> {
        self.task
            .await
            .map_err(|e| CatalogError::offload(format!("background parse failed: {e}")))
    }
}

#[derive(Debug, Clone)]
pub struct OffloadChannel {
    parser: PlaylistParser,
    batch_size: usize,
}

impl OffloadChannel {
    pub fn new(parser: PlaylistParser, batch_size: usize) -> Self {
        Self {
            parser,
            batch_size: batch_size.max(1),
        }
    }

    /// Parse on the blocking pool, emitting one event per batch.
    pub fn parse(&self, content: String) -> ParseHandle {
        let parser = self.parser.clone();
        let batch_size = self.batch_size;
        let (tx, rx) = mpsc::channel(64);

        let task = tokio::task::spawn_blocking(move || {
            let lines: Vec<&str> = content.lines().collect();
            let total_lines = lines.len();
            info!(
                "Offload parse started: {} lines in batches of {}",
                total_lines, batch_size
            );

            let mut records = Vec::new();
            let mut carry = None;

            for (batch_index, chunk) in lines.chunks(batch_size).enumerate() {
                let (batch, next_carry) = parser.parse_batch(chunk.iter().copied(), carry);
                carry = next_carry;

                let processed = (batch_index + 1) * batch_size;
                let percent = (processed.min(total_lines) as f64
                    / total_lines.max(1) as f64)
                    * 100.0;
                debug!(
                    "Parsed batch {} ({} records, {:.1}%)",
                    batch_index,
                    batch.len(),
                    percent
                );

                // Receivers that only want the terminal result may hang up;
                // progress events are droppable.
                let _ = tx.blocking_send(ParseEvent::Batch {
                    records: batch.clone(),
                    percent,
                });
                records.extend(batch);
            }

            if carry.is_some() {
                debug!("Dropping trailing metadata line with no stream URL");
            }

            let _ = tx.blocking_send(ParseEvent::Finished {
                total: records.len(),
            });
            info!("Offload parse finished: {} records", records.len());
            records
        });

        ParseHandle { events: rx, task }
    }

    /// Synchronous fallback for when the offload path is unavailable.
    /// Observably equivalent to [`parse`](Self::parse): same records, no
    /// progress events.
    pub fn parse_sync(&self, content: &str) -> Vec<ContentRecord> {
        self.parser.parse(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classifier::Classifier;

    fn playlist(entries: usize) -> String {
        let mut out = String::from("#EXTM3U\n");
        for i in 0..entries {
            out.push_str(&format!(
                "#EXTINF:-1 tvg-id=\"{i}\" group-title=\"Abertos\",Canal {i}\nhttp://x/{i}.m3u8\n"
            ));
        }
        out
    }

    fn channel(batch_size: usize) -> OffloadChannel {
        OffloadChannel::new(
            PlaylistParser::new(Classifier::default(), None),
            batch_size,
        )
    }

    #[tokio::test]
    async fn test_batched_equals_sync() {
        let content = playlist(25);
        // Odd batch size forces entries to straddle batch boundaries
        let offload = channel(3);

        let sync_records = offload.parse_sync(&content);
        let handle = offload.parse(content);
        let batched_records = handle.join().await.unwrap();

        assert_eq!(sync_records.len(), 25);
        assert_eq!(batched_records.len(), sync_records.len());
        for (a, b) in batched_records.iter().zip(sync_records.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.stream_url, b.stream_url);
        }
    }

    #[tokio::test]
    async fn test_finished_fires_after_all_batches() {
        let content = playlist(10);
        let offload = channel(4);
        let mut handle = offload.parse(content);

        let mut streamed = 0;
        let mut finished_total = None;
        while let Some(event) = handle.events.recv().await {
            match event {
                ParseEvent::Batch { records, .. } => {
                    assert!(
                        finished_total.is_none(),
                        "batch emitted after terminal event"
                    );
                    streamed += records.len();
                }
                ParseEvent::Finished { total } => finished_total = Some(total),
            }
        }

        assert_eq!(finished_total, Some(10));
        assert_eq!(streamed, 10);
        assert_eq!(handle.join().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_events_receiver_may_hang_up() {
        let content = playlist(50);
        let offload = channel(7);
        let handle = offload.parse(content);
        drop_events_and_join(handle).await;
    }

    async fn drop_events_and_join(handle: ParseHandle) {
        let ParseHandle { events, task } = handle;
        drop(events);
        let records = task.await.unwrap();
        assert_eq!(records.len(), 50);
    }
}
