//! Heuristic category and genre classification.
//!
//! Category membership is decided by case-insensitive substring matching of
//! keyword tables against a record's group label and name. Categories are
//! evaluated in a fixed priority order with `Live` last and keyword-free, so
//! a record lands in exactly one bucket by construction and extending one
//! category's keywords cannot leak into another.

use crate::models::{Category, ContentKind, ContentRecord};
use crate::utils::text::normalize_label;

/// Keyword tables driving category membership. Kept as data so the rules can
/// be unit-tested and extended without touching the dispatch logic.
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    pub special: Vec<String>,
    pub sports: Vec<String>,
    pub movies: Vec<String>,
    pub series: Vec<String>,
    /// Group-label keywords that mark an entry as VOD at parse time.
    pub vod: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            special: to_owned(&["bbb", "big brother"]),
            sports: to_owned(&[
                "esporte",
                "sports",
                "espn",
                "sportv",
                "premiere",
                "dazn",
                "paramount",
                "ppv",
                "ufc",
                "gols da rodada",
                "nba",
            ]),
            movies: to_owned(&["filme", "movie"]),
            series: to_owned(&["série", "series", "temporada", "episodio"]),
            vod: to_owned(&[
                "filme",
                "movie",
                "série",
                "series",
                "documentário",
                "documentarios",
                "diversos",
            ]),
        }
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Genre buckets for long-form content, matched against the normalized
/// (diacritics-stripped, lowercased) group label. Order is the tie-break.
const GENRE_TABLE: &[(&str, &[&str])] = &[
    ("Ação", &["acao", "action", "aventura"]),
    ("Comédia", &["comedia", "comedy"]),
    ("Drama", &["drama"]),
    ("Terror", &["terror", "horror"]),
    ("Documentário", &["documentario", "doc"]),
    ("Infantil", &["kids", "infantil", "animacao"]),
    ("Lançamentos", &["lancamento", "newest"]),
];

pub const DEFAULT_GENRE: &str = "Outros";

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: ClassifierRules,
}

impl Classifier {
    pub fn new(rules: ClassifierRules) -> Self {
        Self { rules }
    }

    /// Replace the event-feed keyword list (the feed rotates per season).
    pub fn with_special_keywords(mut self, keywords: Vec<String>) -> Self {
        self.rules.special = keywords;
        self
    }

    /// Assign the record's category. Priority order: Special, Sports,
    /// Movies, Series, then Live as the catch-all complement.
    pub fn classify(&self, record: &ContentRecord) -> Category {
        let haystack = format!(
            "{} {}",
            record.group_label.to_lowercase(),
            record.name.to_lowercase()
        );

        if matches_any(&haystack, &self.rules.special) {
            Category::Special
        } else if matches_any(&haystack, &self.rules.sports) {
            Category::Sports
        } else if matches_any(&haystack, &self.rules.movies) {
            Category::Movies
        } else if matches_any(&haystack, &self.rules.series) {
            Category::Series
        } else {
            Category::Live
        }
    }

    /// Pure membership predicate, deterministic and side-effect free.
    pub fn matches(&self, record: &ContentRecord, category: Category) -> bool {
        self.classify(record) == category
    }

    /// Live/VOD split used by the parser when it derives `kind` from the
    /// group label of a freshly scanned entry.
    pub fn kind_for_label(&self, group_label: &str) -> ContentKind {
        let label = group_label.to_lowercase();
        if matches_any(&label, &self.rules.vod) {
            ContentKind::Vod
        } else {
            ContentKind::Live
        }
    }

    /// Genre bucket for movies/series content, defaulting to "Outros".
    pub fn genre(&self, record: &ContentRecord) -> &'static str {
        let normalized = normalize_label(&record.group_label);
        for (genre, terms) in GENRE_TABLE {
            if terms.iter().any(|t| normalized.contains(t)) {
                return genre;
            }
        }
        DEFAULT_GENRE
    }
}

fn matches_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_GROUP_LABEL, DEFAULT_LOGO_PATH};

    fn record(name: &str, group: &str, kind: ContentKind) -> ContentRecord {
        ContentRecord {
            id: "1".to_string(),
            name: name.to_string(),
            logo_url: DEFAULT_LOGO_PATH.to_string(),
            stream_url: "http://x/1.m3u8".to_string(),
            group_label: group.to_string(),
            kind,
            description: None,
            rating: None,
            release_date: None,
            schedule: None,
        }
    }

    #[test]
    fn test_sports_beats_live() {
        let classifier = Classifier::default();
        let rec = record("ESPN", "ESPN Brasil", ContentKind::Live);
        assert_eq!(classifier.classify(&rec), Category::Sports);
        assert!(!classifier.matches(&rec, Category::Live));
    }

    #[test]
    fn test_exactly_one_category_accepts() {
        let classifier = Classifier::default();
        let samples = [
            record("ESPN", "Esportes", ContentKind::Live),
            record("Telecine", "Filmes 2024", ContentKind::Vod),
            record("Friends", "Séries", ContentKind::Vod),
            record("Câmera 1", "BBB 25", ContentKind::Live),
            record("Globo", "Abertos", ContentKind::Live),
        ];
        for rec in &samples {
            let accepting: Vec<Category> = Category::ALL
                .iter()
                .copied()
                .filter(|c| classifier.matches(rec, *c))
                .collect();
            assert_eq!(accepting.len(), 1, "record {:?}", rec.name);
        }
    }

    #[test]
    fn test_default_group_is_live() {
        let classifier = Classifier::default();
        let rec = record("Canal X", DEFAULT_GROUP_LABEL, ContentKind::Live);
        assert_eq!(classifier.classify(&rec), Category::Live);
    }

    #[test]
    fn test_kind_for_label() {
        let classifier = Classifier::default();
        assert_eq!(classifier.kind_for_label("Filmes 2024"), ContentKind::Vod);
        assert_eq!(classifier.kind_for_label("Séries"), ContentKind::Vod);
        assert_eq!(classifier.kind_for_label("Esportes"), ContentKind::Live);
        assert_eq!(classifier.kind_for_label("Outros"), ContentKind::Live);
    }

    #[test]
    fn test_genre_buckets() {
        let classifier = Classifier::default();
        let rec = record("Filme", "Filmes Comédia", ContentKind::Vod);
        assert_eq!(classifier.genre(&rec), "Comédia");

        let rec = record("Filme", "Filmes Ação", ContentKind::Vod);
        assert_eq!(classifier.genre(&rec), "Ação");

        let rec = record("Filme", "Filmes 2024", ContentKind::Vod);
        assert_eq!(classifier.genre(&rec), DEFAULT_GENRE);
    }

    #[test]
    fn test_special_keywords_configurable() {
        let classifier =
            Classifier::default().with_special_keywords(vec!["copa do mundo".to_string()]);
        let rec = record("Jogo 1", "Copa do Mundo 2026", ContentKind::Live);
        assert_eq!(classifier.classify(&rec), Category::Special);

        // The previous season's keywords no longer route to the feed
        let rec = record("Câmera 1", "BBB", ContentKind::Live);
        assert_eq!(classifier.classify(&rec), Category::Live);
    }
}
