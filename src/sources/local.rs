//! Bundled local content: a playlist file, a schedule XML and a VOD JSON
//! listing, loaded before any network fallback is attempted.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ContentSource, SourcePayload};
use crate::config::StorageConfig;
use crate::errors::SourceError;
use crate::ingestor::IngestionStateManager;
use crate::models::{
    ContentKind, ContentRecord, IngestionState, ProgressInfo, DEFAULT_LOGO_PATH,
};
use crate::utils::text::extract_year;

pub struct LocalContentSource {
    storage: StorageConfig,
}

impl LocalContentSource {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    async fn read_optional(path: &Path) -> Option<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Some(contents),
            Err(e) => {
                debug!("Local asset {} not readable: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl ContentSource for LocalContentSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(
        &self,
        state_manager: &IngestionStateManager,
        source_id: Uuid,
    ) -> Result<SourcePayload, SourceError> {
        state_manager
            .update_progress(
                source_id,
                IngestionState::Downloading,
                ProgressInfo::step("Reading bundled content", 20.0),
            )
            .await;

        let playlist_text = tokio::fs::read_to_string(&self.storage.playlist_path)
            .await
            .map_err(|e| {
                SourceError::local_asset(
                    self.storage.playlist_path.display().to_string(),
                    e.to_string(),
                )
            })?;

        let schedule_xml = Self::read_optional(&self.storage.schedule_path).await;
        let vod_records = match Self::read_optional(&self.storage.vod_path).await {
            Some(json) => parse_vod_listing(&json),
            None => Vec::new(),
        };

        Ok(SourcePayload {
            playlist_text,
            schedule_xml,
            vod_records,
        })
    }
}

/// Parse a VOD JSON listing into records. The listing structure varies
/// between provider exports: a top-level array, a `vods` or `movies` key, or
/// some other key holding the array. Invalid entries are skipped.
pub fn parse_vod_listing(json: &str) -> Vec<ContentRecord> {
    let data: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            warn!("VOD listing is not valid JSON: {}", e);
            return Vec::new();
        }
    };

    let entries = find_vod_array(&data);
    let Some(entries) = entries else {
        warn!("VOD listing has no array of entries");
        return Vec::new();
    };

    let mut records = Vec::new();
    for entry in entries {
        match parse_vod_entry(entry) {
            Some(record) => records.push(record),
            None => warn!("Skipping VOD entry without name or stream_url"),
        }
    }

    debug!("Parsed {} VOD records from listing", records.len());
    records
}

fn find_vod_array(data: &Value) -> Option<&Vec<Value>> {
    if let Some(array) = data.as_array() {
        return Some(array);
    }
    let object = data.as_object()?;
    for key in ["vods", "movies"] {
        if let Some(array) = object.get(key).and_then(Value::as_array) {
            return Some(array);
        }
    }
    object.values().find_map(Value::as_array)
}

fn parse_vod_entry(entry: &Value) -> Option<ContentRecord> {
    let name = entry.get("name")?.as_str()?.to_string();
    let stream_url = entry.get("stream_url")?.as_str()?.to_string();

    let group_label = entry
        .get("group-title")
        .and_then(Value::as_str)
        .unwrap_or("Filmes")
        .to_string();

    Some(ContentRecord {
        id: ContentRecord::synthetic_id(),
        name,
        logo_url: entry
            .get("logo_url")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LOGO_PATH)
            .to_string(),
        stream_url,
        kind: ContentKind::Vod,
        description: entry
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        rating: entry
            .get("rating")
            .and_then(Value::as_str)
            .map(str::to_string),
        release_date: extract_year(&group_label).map(str::to_string),
        group_label,
        schedule: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_level_array() {
        let json = r#"[
            {"name": "Filme A", "stream_url": "http://x/a.mp4", "group-title": "Filmes 2024"},
            {"name": "Filme B", "stream_url": "http://x/b.mp4", "logo_url": "b.png"}
        ]"#;
        let records = parse_vod_listing(json);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ContentKind::Vod);
        assert_eq!(records[0].release_date.as_deref(), Some("2024"));
        assert_eq!(records[1].group_label, "Filmes");
        assert_eq!(records[1].logo_url, "b.png");
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn test_parse_nested_keys() {
        let json = r#"{"vods": [{"name": "A", "stream_url": "http://x/a"}]}"#;
        assert_eq!(parse_vod_listing(json).len(), 1);

        let json = r#"{"movies": [{"name": "A", "stream_url": "http://x/a"}]}"#;
        assert_eq!(parse_vod_listing(json).len(), 1);

        // First array-valued key wins when no known key is present
        let json = r#"{"catalogo": [{"name": "A", "stream_url": "http://x/a"}]}"#;
        assert_eq!(parse_vod_listing(json).len(), 1);
    }

    #[test]
    fn test_invalid_entries_skipped() {
        let json = r#"[
            {"name": "Sem URL"},
            {"stream_url": "http://x/sem-nome"},
            {"name": "OK", "stream_url": "http://x/ok"}
        ]"#;
        let records = parse_vod_listing(json);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "OK");
    }

    #[test]
    fn test_garbage_input_yields_empty() {
        assert!(parse_vod_listing("not json").is_empty());
        assert!(parse_vod_listing("{\"a\": 1}").is_empty());
    }
}
