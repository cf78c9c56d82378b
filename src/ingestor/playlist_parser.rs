//! Playlist text parsing.
//!
//! Each playlist entry is a two-line unit: an `#EXTINF:` metadata line with
//! inline `key="value"` attributes and a trailing free-text name after the
//! final comma, followed by a stream URL line. Parsing is stateless per call
//! and restartable; per-line malformations degrade to documented defaults
//! instead of failing.

use tracing::debug;

use crate::catalog::classifier::Classifier;
use crate::models::{
    ContentKind, ContentRecord, DEFAULT_GROUP_LABEL, DEFAULT_LOGO_PATH, DEFAULT_RECORD_NAME,
};
use crate::utils::sanitize_base_url;

const EXTINF_PREFIX: &str = "#EXTINF:";

/// Builds canonical provider stream URLs from credentials. Live entries with
/// a tvg-id get a synthesized `.m3u8` URL so live URLs stay uniform no
/// matter what the playlist line carried.
#[derive(Debug, Clone)]
pub struct StreamUrlBuilder {
    base_url: String,
    username: String,
    password: String,
}

impl StreamUrlBuilder {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: sanitize_base_url(base_url),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn live_url(&self, channel_id: &str) -> String {
        format!(
            "{}/live/{}/{}/{}.m3u8",
            self.base_url, self.username, self.password, channel_id
        )
    }

    pub fn vod_url(&self, stream_id: &str) -> String {
        format!(
            "{}/movie/{}/{}/{}.mp4",
            self.base_url, self.username, self.password, stream_id
        )
    }

    pub fn playlist_url(&self) -> String {
        format!(
            "{}/get.php?username={}&password={}&type=m3u_plus&output=hls",
            self.base_url, self.username, self.password
        )
    }

    pub fn schedule_url(&self) -> String {
        format!(
            "{}/xmltv.php?username={}&password={}",
            self.base_url, self.username, self.password
        )
    }
}

/// A metadata line whose URL line has not been seen yet. Returned as the
/// carry of a batch parse so an entry straddling a batch boundary is
/// completed by the next batch instead of being dropped.
#[derive(Debug, Clone)]
pub struct PendingRecord {
    pub id: Option<String>,
    pub name: String,
    pub group_label: String,
    pub logo_url: String,
    pub kind: ContentKind,
}

#[derive(Debug, Clone)]
pub struct PlaylistParser {
    classifier: Classifier,
    url_builder: Option<StreamUrlBuilder>,
}

impl PlaylistParser {
    pub fn new(classifier: Classifier, url_builder: Option<StreamUrlBuilder>) -> Self {
        Self {
            classifier,
            url_builder,
        }
    }

    /// Parse a whole playlist in one pass. A trailing metadata line with no
    /// URL matches no record and is silently dropped.
    pub fn parse(&self, content: &str) -> Vec<ContentRecord> {
        let (records, carry) = self.parse_batch(content.lines(), None);
        if carry.is_some() {
            debug!("Dropping trailing metadata line with no stream URL");
        }
        records
    }

    /// Parse one batch of lines, threading the pending record across batch
    /// boundaries. Callers pass the returned carry into the next batch and
    /// drop it after the final one.
    pub fn parse_batch<'a, I>(
        &self,
        lines: I,
        carry: Option<PendingRecord>,
    ) -> (Vec<ContentRecord>, Option<PendingRecord>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut records = Vec::new();
        let mut pending = carry;

        for line in lines {
            let line = line.trim();

            if line.starts_with(EXTINF_PREFIX) {
                // A second metadata line before any URL replaces the first.
                pending = Some(self.open_record(line));
            } else if !line.is_empty() && !line.starts_with('#') {
                if let Some(open) = pending.take() {
                    records.push(self.emit_record(open, line));
                }
            }
        }

        (records, pending)
    }

    fn open_record(&self, extinf_line: &str) -> PendingRecord {
        let body = &extinf_line[EXTINF_PREFIX.len()..];

        // Display name is the free text after the last comma; the attribute
        // block precedes it. Missing pieces fall back to defaults.
        let (attributes_part, name) = match body.rfind(',') {
            Some(comma_pos) => {
                let name = body[comma_pos + 1..].trim();
                let name = if name.is_empty() {
                    DEFAULT_RECORD_NAME.to_string()
                } else {
                    name.to_string()
                };
                (&body[..comma_pos], name)
            }
            None => (body, DEFAULT_RECORD_NAME.to_string()),
        };

        let mut id = None;
        let mut logo = None;
        let mut group = None;

        for (key, value) in parse_attributes(attributes_part) {
            match key.as_str() {
                "tvg-id" => id = Some(value),
                "tvg-logo" => logo = Some(value),
                "group-title" => group = Some(value),
                _ => {}
            }
        }

        let group_label = group
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_GROUP_LABEL.to_string());
        let kind = self.classifier.kind_for_label(&group_label);

        PendingRecord {
            id: id.filter(|i| !i.is_empty()),
            name,
            group_label,
            logo_url: logo
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_LOGO_PATH.to_string()),
            kind,
        }
    }

    fn emit_record(&self, open: PendingRecord, url_line: &str) -> ContentRecord {
        // Live entries with an id get the canonical synthesized URL so all
        // live URLs share one shape; everything else keeps the scanned URL.
        let stream_url = match (&open.kind, &open.id, &self.url_builder) {
            (ContentKind::Live, Some(id), Some(builder)) => builder.live_url(id),
            _ => url_line.to_string(),
        };

        ContentRecord {
            id: open.id.unwrap_or_else(ContentRecord::synthetic_id),
            name: open.name,
            logo_url: open.logo_url,
            stream_url,
            group_label: open.group_label,
            kind: open.kind,
            description: None,
            rating: None,
            release_date: None,
            schedule: None,
        }
    }
}

/// Scan `key="value"` attribute pairs out of an EXTINF attribute block.
fn parse_attributes(attributes: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut current_key = String::new();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut in_value = false;
    let mut escape_next = false;

    for ch in attributes.chars() {
        if escape_next {
            if in_value {
                current_value.push(ch);
            } else {
                current_key.push(ch);
            }
            escape_next = false;
            continue;
        }

        match ch {
            '\\' => escape_next = true,
            '"' => {
                if in_value {
                    in_quotes = !in_quotes;
                }
            }
            '=' if !in_quotes && !in_value => {
                in_value = true;
            }
            ' ' | '\t' if !in_quotes => {
                if in_value && !current_value.is_empty() {
                    attrs.push((
                        current_key.trim().to_string(),
                        current_value.trim_matches('"').to_string(),
                    ));
                    current_key.clear();
                    current_value.clear();
                    in_value = false;
                } else if !in_value {
                    current_key.clear();
                }
            }
            _ => {
                if in_value {
                    current_value.push(ch);
                } else {
                    current_key.push(ch);
                }
            }
        }
    }

    if in_value && !current_value.is_empty() {
        attrs.push((
            current_key.trim().to_string(),
            current_value.trim_matches('"').to_string(),
        ));
    }

    attrs
}
