//! Playlist and schedule ingestion.
//!
//! The parser converts raw playlist text into content records; the offload
//! channel runs it off the interaction path in batches; the schedule
//! ingestor enriches live records with programme data. `IngestorService`
//! ties the pieces to the ingestion state manager.

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

pub mod offload;
pub mod playlist_parser;
pub mod schedule;
pub mod state_manager;

pub use offload::{OffloadChannel, ParseEvent, ParseHandle};
pub use playlist_parser::{PlaylistParser, StreamUrlBuilder};
pub use schedule::{Programme, ScheduleIngestor};
pub use state_manager::IngestionStateManager;

use crate::models::{ContentRecord, IngestionState, ProgressInfo};

pub struct IngestorService {
    offload: OffloadChannel,
    state_manager: IngestionStateManager,
    use_offload: bool,
    /// Emit a progress update at most once per this many parsed records.
    progress_interval: usize,
}

impl IngestorService {
    pub fn new(
        offload: OffloadChannel,
        state_manager: IngestionStateManager,
        use_offload: bool,
        progress_interval: usize,
    ) -> Self {
        Self {
            offload,
            state_manager,
            use_offload,
            progress_interval: progress_interval.max(1),
        }
    }

    pub fn state_manager(&self) -> &IngestionStateManager {
        &self.state_manager
    }

    /// Parse playlist text into the complete ordered record sequence,
    /// reporting batch progress through the state manager. Falls back to a
    /// synchronous single pass when offloading is disabled.
    pub async fn parse_playlist(
        &self,
        source_id: Uuid,
        content: String,
    ) -> Result<Vec<ContentRecord>> {
        self.state_manager
            .update_progress(
                source_id,
                IngestionState::Parsing,
                ProgressInfo::step("Parsing playlist", 60.0),
            )
            .await;

        if !self.use_offload {
            debug!("Offload disabled, parsing synchronously");
            let records = self.offload.parse_sync(&content);
            info!("Parsed {} records synchronously", records.len());
            return Ok(records);
        }

        let mut handle = self.offload.parse(content);
        let mut streamed = 0usize;
        let mut last_reported = 0usize;

        while let Some(event) = handle.events.recv().await {
            match event {
                ParseEvent::Batch { records, percent } => {
                    streamed += records.len();
                    if streamed - last_reported < self.progress_interval {
                        continue;
                    }
                    last_reported = streamed;
                    // Parsing occupies the 60-90% band of the overall run
                    let mut info =
                        ProgressInfo::step(format!("Parsed {} records", streamed), 60.0 + percent * 0.3);
                    info.records_parsed = Some(streamed);
                    self.state_manager
                        .update_progress(source_id, IngestionState::Parsing, info)
                        .await;
                }
                ParseEvent::Finished { total } => {
                    debug!("Parse finished signal: {} records", total);
                }
            }
        }

        let records = handle.join().await?;
        info!("Playlist parsed: {} records", records.len());
        Ok(records)
    }
}
