//! End-to-end pipeline tests: playlist text through parsing, enrichment,
//! classification and windowed grouping.

use chrono::{TimeZone, Utc};

use m3u_catalog::catalog::{
    CategoryGrouper, CategoryNameMap, Classifier, GrouperSettings, WindowedLoader,
};
use m3u_catalog::ingestor::{
    IngestionStateManager, IngestorService, OffloadChannel, PlaylistParser, ScheduleIngestor,
    StreamUrlBuilder,
};
use m3u_catalog::models::{Category, ContentKind};

fn sample_playlist() -> String {
    let mut playlist = String::from("#EXTM3U\n");

    playlist.push_str(
        "#EXTINF:-1 tvg-id=\"espn1\" group-title=\"Esportes\" tvg-logo=\"espn.png\",ESPN\n\
         http://cdn.example/espn.ts\n",
    );
    playlist.push_str(
        "#EXTINF:-1 tvg-id=\"globo\" group-title=\"Abertos\",Globo\n\
         http://cdn.example/globo.ts\n",
    );
    // No group-title: defaults to "Outros" and lands in the live tab
    playlist.push_str("#EXTINF:-1 tvg-id=\"misc\",Canal Misterioso\nhttp://cdn.example/misc.ts\n");
    playlist.push_str(
        "#EXTINF:-1 group-title=\"BBB 25\",Câmera 1\nhttp://cdn.example/bbb.m3u8\n",
    );

    for i in 0..45 {
        playlist.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"m{i}\" group-title=\"Filmes 2024\",Filme {i:02}\n\
             http://cdn.example/movies/{i}.mp4\n"
        ));
    }

    playlist
}

fn pipeline(use_offload: bool) -> IngestorService {
    let classifier = Classifier::default();
    let url_builder = StreamUrlBuilder::new("http://host.example", "u1", "p1");
    let parser = PlaylistParser::new(classifier, Some(url_builder));
    let offload = OffloadChannel::new(parser, 7);
    IngestorService::new(offload, IngestionStateManager::new(), use_offload, 10)
}

fn grouper_with(records: Vec<m3u_catalog::models::ContentRecord>) -> CategoryGrouper {
    let mut grouper = CategoryGrouper::new(
        Classifier::default(),
        CategoryNameMap::empty(),
        GrouperSettings::default(),
    );
    grouper.set_records(records);
    grouper
}

#[tokio::test]
async fn test_playlist_to_categories() {
    let ingestor = pipeline(true);
    let source_id = uuid::Uuid::new_v4();
    let records = ingestor
        .parse_playlist(source_id, sample_playlist())
        .await
        .unwrap();
    assert_eq!(records.len(), 49);

    // Live URLs are synthesized from credentials; VOD URLs stay literal
    let espn = records.iter().find(|r| r.name == "ESPN").unwrap();
    assert_eq!(espn.kind, ContentKind::Live);
    assert_eq!(espn.stream_url, "http://host.example/live/u1/p1/espn1.m3u8");
    let movie = records.iter().find(|r| r.name == "Filme 00").unwrap();
    assert_eq!(movie.kind, ContentKind::Vod);
    assert_eq!(movie.stream_url, "http://cdn.example/movies/0.mp4");

    let mut grouper = grouper_with(records);

    // ESPN routes to Sports, never Live, even though it is a live channel
    grouper.select_category(Category::Sports);
    let groups = grouper.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Esportes");
    assert_eq!(groups[0].window[0].name, "ESPN");

    grouper.select_category(Category::Live);
    let groups = grouper.groups();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Abertos", "Outros"]);
    assert!(groups
        .iter()
        .all(|g| g.window.iter().all(|r| r.name != "ESPN")));

    grouper.select_category(Category::Special);
    let groups = grouper.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].window[0].name, "Câmera 1");
}

#[tokio::test]
async fn test_offloaded_parse_equals_synchronous() {
    let content = sample_playlist();

    let offloaded = pipeline(true)
        .parse_playlist(uuid::Uuid::new_v4(), content.clone())
        .await
        .unwrap();
    let synchronous = pipeline(false)
        .parse_playlist(uuid::Uuid::new_v4(), content)
        .await
        .unwrap();

    assert_eq!(offloaded.len(), synchronous.len());
    for (a, b) in offloaded.iter().zip(&synchronous) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.group_label, b.group_label);
        assert_eq!(a.stream_url, b.stream_url);
        assert_eq!(a.kind, b.kind);
    }
}

#[tokio::test]
async fn test_movie_windows_grow_and_reset() {
    let ingestor = pipeline(true);
    let records = ingestor
        .parse_playlist(uuid::Uuid::new_v4(), sample_playlist())
        .await
        .unwrap();
    let mut grouper = grouper_with(records);
    let mut loader = WindowedLoader::default();

    grouper.select_category(Category::Movies);
    let groups = grouper.groups();
    assert_eq!(groups.len(), 1);
    let group_name = groups[0].name.clone();
    assert_eq!(groups[0].window.len(), 30);
    assert_eq!(groups[0].total_count, 45);
    assert!(groups[0].has_more());

    let appended = loader.load_more(&mut grouper, &group_name);
    assert_eq!(appended.len(), 10);
    assert_eq!(grouper.groups()[0].window.len(), 40);

    let appended = loader.load_more(&mut grouper, &group_name);
    assert_eq!(appended.len(), 5);
    let groups = grouper.groups();
    assert_eq!(groups[0].window.len(), 45);
    assert!(!groups[0].has_more());
    assert!(loader.load_more(&mut grouper, &group_name).is_empty());

    // Leaving and re-entering the category rebuilds a fresh 30-wide window
    grouper.select_category(Category::Live);
    grouper.select_category(Category::Movies);
    let groups = grouper.groups();
    assert_eq!(groups[0].window.len(), 30);
}

#[tokio::test]
async fn test_schedule_enrichment_end_to_end() {
    let ingestor = pipeline(true);
    let mut records = ingestor
        .parse_playlist(uuid::Uuid::new_v4(), sample_playlist())
        .await
        .unwrap();

    let xml = r#"<?xml version="1.0"?>
<tv>
  <programme start="20260824120000" stop="20260824130000" channel="espn1">
    <title>SportsCenter</title>
    <desc>Resumo do dia</desc>
  </programme>
  <programme start="20260824130000" stop="20260824140000" channel="espn1">
    <title>Futebol ao Vivo</title>
  </programme>
</tv>"#;

    let schedule = ScheduleIngestor::new("UTC");
    let programmes = schedule.parse_programmes(xml);
    assert_eq!(programmes.len(), 2);

    let now = Utc.with_ymd_and_hms(2026, 8, 24, 12, 30, 0).unwrap();
    let enriched = schedule.enrich_records(&mut records, &programmes, now);
    assert_eq!(enriched, 1);

    let espn = records.iter().find(|r| r.name == "ESPN").unwrap();
    let info = espn.schedule.as_ref().unwrap();
    assert_eq!(info.title, "SportsCenter");
    assert_eq!(info.next_title.as_deref(), Some("Futebol ao Vivo"));

    // VOD records are never enriched
    let movie = records.iter().find(|r| r.name == "Filme 00").unwrap();
    assert!(movie.schedule.is_none());
}
