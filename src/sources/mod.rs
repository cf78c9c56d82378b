//! Content sources and the local-then-remote loading policy.
//!
//! A source hands back raw payloads (playlist text, optional schedule XML,
//! pre-built VOD records); parsing and enrichment happen in the ingestor.
//! `ContentService` tries sources in order and falls back when one yields
//! nothing, surfacing a single terminal error when all fail.

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

pub mod local;
pub mod remote;

pub use local::LocalContentSource;
pub use remote::RemoteContentSource;

use crate::errors::{CatalogError, SourceError};
use crate::ingestor::{IngestionStateManager, IngestorService, ScheduleIngestor};
use crate::models::{ContentRecord, IngestionState, ProgressInfo};

/// Raw material fetched from one source before parsing.
pub struct SourcePayload {
    pub playlist_text: String,
    pub schedule_xml: Option<String>,
    pub vod_records: Vec<ContentRecord>,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        state_manager: &IngestionStateManager,
        source_id: Uuid,
    ) -> Result<SourcePayload, SourceError>;
}

pub struct ContentService {
    sources: Vec<Box<dyn ContentSource>>,
    ingestor: IngestorService,
    schedule: ScheduleIngestor,
}

impl ContentService {
    pub fn new(
        sources: Vec<Box<dyn ContentSource>>,
        ingestor: IngestorService,
        schedule: ScheduleIngestor,
    ) -> Self {
        Self {
            sources,
            ingestor,
            schedule,
        }
    }

    /// Load the full dataset: first source that yields records wins. The
    /// consuming page acts only on this final merged result; progress events
    /// along the way are informational.
    pub async fn load_all_content(&self) -> Result<Vec<ContentRecord>, CatalogError> {
        let state_manager = self.ingestor.state_manager().clone();
        let mut last_error: Option<CatalogError> = None;

        for source in &self.sources {
            let source_id = Uuid::new_v4();
            state_manager.start_ingestion(source_id).await;

            match self.load_from(source.as_ref(), &state_manager, source_id).await {
                Ok(records) if !records.is_empty() => {
                    state_manager
                        .complete_ingestion(source_id, records.len())
                        .await;
                    info!(
                        "Loaded {} records from source '{}'",
                        records.len(),
                        source.name()
                    );
                    return Ok(records);
                }
                Ok(_) => {
                    warn!("Source '{}' yielded no records, falling back", source.name());
                    state_manager
                        .set_error(source_id, "source yielded no records".to_string())
                        .await;
                    last_error =
                        Some(SourceError::empty(source.name()).into());
                }
                Err(e) => {
                    warn!("Source '{}' failed: {}", source.name(), e);
                    state_manager.set_error(source_id, e.to_string()).await;
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CatalogError::internal("no content sources configured")))
    }

    async fn load_from(
        &self,
        source: &dyn ContentSource,
        state_manager: &IngestionStateManager,
        source_id: Uuid,
    ) -> Result<Vec<ContentRecord>, CatalogError> {
        let payload = source.fetch(state_manager, source_id).await?;

        let mut records = self
            .ingestor
            .parse_playlist(source_id, payload.playlist_text)
            .await
            .map_err(|e| CatalogError::offload(e.to_string()))?;

        if let Some(schedule_xml) = payload.schedule_xml {
            state_manager
                .update_progress(
                    source_id,
                    IngestionState::Enriching,
                    ProgressInfo::step("Enriching records with schedule data", 90.0),
                )
                .await;
            let programmes = self.schedule.parse_programmes(&schedule_xml);
            self.schedule
                .enrich_records(&mut records, &programmes, chrono::Utc::now());
        }

        records.extend(payload.vod_records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classifier::Classifier;
    use crate::ingestor::{IngestorService, OffloadChannel, PlaylistParser};

    struct FakeSource {
        name: &'static str,
        playlist: Option<&'static str>,
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(
            &self,
            _state_manager: &IngestionStateManager,
            _source_id: Uuid,
        ) -> Result<SourcePayload, SourceError> {
            match self.playlist {
                Some(text) => Ok(SourcePayload {
                    playlist_text: text.to_string(),
                    schedule_xml: None,
                    vod_records: Vec::new(),
                }),
                None => Err(SourceError::timeout("http://unreachable.example")),
            }
        }
    }

    const PLAYLIST: &str =
        "#EXTM3U\n#EXTINF:-1 tvg-id=\"globo\" group-title=\"Abertos\",Globo\nhttp://x/globo.m3u8\n";

    fn service(sources: Vec<Box<dyn ContentSource>>) -> ContentService {
        let parser = PlaylistParser::new(Classifier::default(), None);
        let offload = OffloadChannel::new(parser, 100);
        let ingestor = IngestorService::new(offload, IngestionStateManager::new(), false, 100);
        ContentService::new(sources, ingestor, ScheduleIngestor::new("UTC"))
    }

    #[tokio::test]
    async fn test_empty_source_falls_back_to_next() {
        let sources: Vec<Box<dyn ContentSource>> = vec![
            Box::new(FakeSource {
                name: "bundled",
                playlist: Some("#EXTM3U\n"),
            }),
            Box::new(FakeSource {
                name: "api",
                playlist: Some(PLAYLIST),
            }),
        ];

        let records = service(sources).load_all_content().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Globo");
    }

    #[tokio::test]
    async fn test_failed_source_falls_back_to_next() {
        let sources: Vec<Box<dyn ContentSource>> = vec![
            Box::new(FakeSource {
                name: "bundled",
                playlist: None,
            }),
            Box::new(FakeSource {
                name: "api",
                playlist: Some(PLAYLIST),
            }),
        ];

        let records = service(sources).load_all_content().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_all_sources_failing_surfaces_single_error() {
        let sources: Vec<Box<dyn ContentSource>> = vec![
            Box::new(FakeSource {
                name: "bundled",
                playlist: None,
            }),
            Box::new(FakeSource {
                name: "api",
                playlist: None,
            }),
        ];

        let err = service(sources).load_all_content().await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Source(SourceError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_sources_is_an_error() {
        let err = service(Vec::new()).load_all_content().await.unwrap_err();
        assert!(matches!(err, CatalogError::Internal { .. }));
    }
}
