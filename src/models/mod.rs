use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default group label for entries whose metadata carries no `group-title`.
pub const DEFAULT_GROUP_LABEL: &str = "Outros";
/// Default display name for entries whose metadata carries no name.
pub const DEFAULT_RECORD_NAME: &str = "Sem nome";
/// Placeholder logo used when `tvg-logo` is absent.
pub const DEFAULT_LOGO_PATH: &str = "assets/images/default-channel.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Live,
    Vod,
}

/// One playable entry parsed out of a playlist or VOD listing.
///
/// Records are created once during parsing, enriched at most once with
/// schedule info, and never mutated after being placed in a group window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub name: String,
    pub logo_url: String,
    pub stream_url: String,
    /// Raw group label from the source metadata.
    pub group_label: String,
    pub kind: ContentKind,
    pub description: Option<String>,
    pub rating: Option<String>,
    pub release_date: Option<String>,
    pub schedule: Option<ScheduleInfo>,
}

impl ContentRecord {
    pub fn is_live(&self) -> bool {
        self.kind == ContentKind::Live
    }

    /// Synthesize a unique id for records whose source carries none.
    pub fn synthetic_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Current/next programme window attached to a live record from EPG data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub next_title: Option<String>,
}

/// The five top-level content buckets. `Special` is a rotating event feed
/// whose display name and keywords come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Live,
    Sports,
    Movies,
    Series,
    Special,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Live,
        Category::Sports,
        Category::Movies,
        Category::Series,
        Category::Special,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Live => "TV ao Vivo",
            Category::Sports => "Esportes",
            Category::Movies => "Filmes",
            Category::Series => "Séries",
            Category::Special => "Especial",
        }
    }

    /// Live-like categories hand playback off to the HLS path.
    pub fn is_live_like(&self) -> bool {
        matches!(self, Category::Live | Category::Sports | Category::Special)
    }
}

/// A named bucket of records within a category, carrying the currently
/// materialized prefix (`window`) of its full match set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentGroup {
    pub name: String,
    pub window: Vec<ContentRecord>,
    pub total_count: usize,
    /// Stable ordering key assigned when the group set is built.
    pub group_index: usize,
}

impl ContentGroup {
    pub fn has_more(&self) -> bool {
        self.window.len() < self.total_count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionProgress {
    pub source_id: Uuid,
    pub state: IngestionState,
    pub progress: ProgressInfo,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionState {
    Idle,
    Connecting,
    Downloading,
    Parsing,
    Enriching,
    Completed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub current_step: String,
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: Option<u64>,
    pub records_parsed: Option<usize>,
    pub percentage: Option<f64>,
}

impl ProgressInfo {
    pub fn step<S: Into<String>>(step: S, percentage: f64) -> Self {
        Self {
            current_step: step.into(),
            total_bytes: None,
            downloaded_bytes: None,
            records_parsed: None,
            percentage: Some(percentage),
        }
    }
}
