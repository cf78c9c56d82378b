//! Companion schedule-data (XMLTV) parsing and record enrichment.
//!
//! `programme` elements carry `channel`, `start` and `stop` attributes with
//! nested `title`/`desc` text. Timestamps are compact `YYYYMMDDHHMMSS`
//! strings, parsed field-by-field and interpreted in the source timezone
//! before conversion to UTC.

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::models::{ContentRecord, ScheduleInfo};

#[derive(Debug, Clone)]
pub struct Programme {
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct ScheduleIngestor {
    timezone: chrono_tz::Tz,
}

impl ScheduleIngestor {
    pub fn new(timezone_str: &str) -> Self {
        let timezone = match timezone_str.parse::<chrono_tz::Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!("Unknown timezone: {}, using UTC", timezone_str);
                chrono_tz::UTC
            }
        };
        Self { timezone }
    }

    /// Extract all programme entries from an XMLTV document. Malformed
    /// entries are skipped, never fatal.
    pub fn parse_programmes(&self, content: &str) -> Vec<Programme> {
        let section_re = match Regex::new(r"(?s)<programme\s+[^>]*>.*?</programme>") {
            Ok(re) => re,
            Err(e) => {
                warn!("Failed to compile programme section regex: {}", e);
                return Vec::new();
            }
        };

        let channel_re = Regex::new(r#"channel="([^"]+)""#).ok();
        let start_re = Regex::new(r#"start="([^"]+)""#).ok();
        let stop_re = Regex::new(r#"stop="([^"]+)""#).ok();
        let title_re = Regex::new(r"(?s)<title[^>]*>([^<]+)</title>").ok();
        let desc_re = Regex::new(r"(?s)<desc[^>]*>([^<]+)</desc>").ok();
        let (Some(channel_re), Some(start_re), Some(stop_re), Some(title_re), Some(desc_re)) =
            (channel_re, start_re, stop_re, title_re, desc_re)
        else {
            return Vec::new();
        };

        let mut programmes = Vec::new();
        for section in section_re.find_iter(content) {
            let xml = section.as_str();
            let Some(programme) = self.parse_programme_xml(
                xml,
                &channel_re,
                &start_re,
                &stop_re,
                &title_re,
                &desc_re,
            ) else {
                debug!("Skipping malformed programme section");
                continue;
            };
            programmes.push(programme);
        }

        info!("Parsed {} programmes from schedule data", programmes.len());
        programmes
    }

    fn parse_programme_xml(
        &self,
        xml: &str,
        channel_re: &Regex,
        start_re: &Regex,
        stop_re: &Regex,
        title_re: &Regex,
        desc_re: &Regex,
    ) -> Option<Programme> {
        let channel_id = channel_re.captures(xml)?.get(1)?.as_str().to_string();
        let start_str = start_re.captures(xml)?.get(1)?.as_str();
        let stop_str = stop_re.captures(xml)?.get(1)?.as_str();

        let start = self.parse_xmltv_datetime(start_str)?;
        let end = self.parse_xmltv_datetime(stop_str)?;

        let title = title_re
            .captures(xml)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| "Sem título".to_string());
        let description = desc_re
            .captures(xml)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        Some(Programme {
            channel_id,
            title,
            description,
            start,
            end,
        })
    }

    /// XMLTV datetime format: `YYYYMMDDHHMMSS [offset]`, e.g.
    /// `20240305123000 +0000`. Fixed-width field extraction; any offset
    /// suffix is dropped and the configured source timezone applies.
    fn parse_xmltv_datetime(&self, datetime_str: &str) -> Option<DateTime<Utc>> {
        let clean = datetime_str
            .split_whitespace()
            .next()
            .unwrap_or(datetime_str);

        if clean.len() < 14 || !clean.is_ascii() {
            return None;
        }

        let year: i32 = clean[0..4].parse().ok()?;
        let month: u32 = clean[4..6].parse().ok()?;
        let day: u32 = clean[6..8].parse().ok()?;
        let hour: u32 = clean[8..10].parse().ok()?;
        let minute: u32 = clean[10..12].parse().ok()?;
        let second: u32 = clean[12..14].parse().ok()?;

        let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, second)?;
        let local = self.timezone.from_local_datetime(&naive).single()?;
        Some(local.with_timezone(&Utc))
    }

    /// Attach the programme covering `now` (plus the following one on the
    /// same channel) to each live record. Records are enriched at most once.
    pub fn enrich_records(
        &self,
        records: &mut [ContentRecord],
        programmes: &[Programme],
        now: DateTime<Utc>,
    ) -> usize {
        let mut by_channel: HashMap<&str, Vec<&Programme>> = HashMap::new();
        for programme in programmes {
            by_channel
                .entry(programme.channel_id.as_str())
                .or_default()
                .push(programme);
        }
        for list in by_channel.values_mut() {
            list.sort_by_key(|p| p.start);
        }

        let mut enriched = 0;
        for record in records.iter_mut() {
            if !record.is_live() || record.schedule.is_some() {
                continue;
            }
            let Some(list) = by_channel.get(record.id.as_str()) else {
                continue;
            };
            let Some(pos) = list.iter().position(|p| p.start <= now && now <= p.end) else {
                continue;
            };

            let current = list[pos];
            let next_title = list.get(pos + 1).map(|p| p.title.clone());
            record.schedule = Some(ScheduleInfo {
                title: current.title.clone(),
                description: current.description.clone(),
                start: current.start,
                end: current.end,
                next_title,
            });
            enriched += 1;
        }

        debug!("Enriched {} records with schedule info", enriched);
        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentKind, DEFAULT_LOGO_PATH};
    use chrono::Timelike;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<tv>
  <programme channel="globo" start="20240305120000 +0000" stop="20240305130000 +0000">
    <title>Jornal</title>
    <desc>Noticiário</desc>
  </programme>
  <programme channel="globo" start="20240305130000 +0000" stop="20240305140000 +0000">
    <title>Novela</title>
  </programme>
  <programme channel="espn" start="20240305110000 +0000" stop="20240305150000 +0000">
    <title>Futebol</title>
  </programme>
</tv>"#;

    fn live_record(id: &str) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            name: id.to_string(),
            logo_url: DEFAULT_LOGO_PATH.to_string(),
            stream_url: format!("http://x/{id}.m3u8"),
            group_label: "Abertos".to_string(),
            kind: ContentKind::Live,
            description: None,
            rating: None,
            release_date: None,
            schedule: None,
        }
    }

    #[test]
    fn test_parse_programmes() {
        let ingestor = ScheduleIngestor::new("UTC");
        let programmes = ingestor.parse_programmes(SAMPLE);
        assert_eq!(programmes.len(), 3);
        assert_eq!(programmes[0].channel_id, "globo");
        assert_eq!(programmes[0].title, "Jornal");
        assert_eq!(programmes[0].description, "Noticiário");
        assert_eq!(programmes[0].start.hour(), 12);
    }

    #[test]
    fn test_datetime_in_source_timezone() {
        let ingestor = ScheduleIngestor::new("America/Sao_Paulo");
        let dt = ingestor.parse_xmltv_datetime("20240305120000").unwrap();
        // São Paulo is UTC-3 in March 2024
        assert_eq!(dt.hour(), 15);
    }

    #[test]
    fn test_malformed_timestamp_skipped() {
        let ingestor = ScheduleIngestor::new("UTC");
        let xml = r#"<tv><programme channel="c" start="notadate" stop="20240305130000">
            <title>X</title></programme></tv>"#;
        assert!(ingestor.parse_programmes(xml).is_empty());
    }

    #[test]
    fn test_enrich_attaches_current_and_next() {
        let ingestor = ScheduleIngestor::new("UTC");
        let programmes = ingestor.parse_programmes(SAMPLE);
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();

        let mut records = vec![live_record("globo"), live_record("record")];
        let enriched = ingestor.enrich_records(&mut records, &programmes, now);
        assert_eq!(enriched, 1);

        let schedule = records[0].schedule.as_ref().unwrap();
        assert_eq!(schedule.title, "Jornal");
        assert_eq!(schedule.next_title.as_deref(), Some("Novela"));
        assert!(records[1].schedule.is_none());
    }

    #[test]
    fn test_enrich_is_idempotent() {
        let ingestor = ScheduleIngestor::new("UTC");
        let programmes = ingestor.parse_programmes(SAMPLE);
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();

        let mut records = vec![live_record("globo")];
        assert_eq!(ingestor.enrich_records(&mut records, &programmes, now), 1);
        // Second pass must not touch already-enriched records
        assert_eq!(ingestor.enrich_records(&mut records, &programmes, now), 0);
    }
}
