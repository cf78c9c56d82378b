use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_catalog::{
    catalog::{
        CategoryGrouper, CategoryNameMap, Classifier, GrouperSettings, LoaderSettings,
        WindowedLoader,
    },
    config::Config,
    ingestor::{
        IngestionStateManager, IngestorService, OffloadChannel, PlaylistParser, ScheduleIngestor,
        StreamUrlBuilder,
    },
    models::Category,
    sources::{ContentService, ContentSource, LocalContentSource, RemoteContentSource},
};

#[derive(Parser)]
#[command(name = "m3u-catalog")]
#[command(version = "0.1.0")]
#[command(about = "IPTV/VOD catalog engine with M3U ingestion and windowed browsing")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("m3u_catalog={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    std::env::set_var("CONFIG_FILE", &cli.config);
    let config = Config::load()?;
    info!("Configuration loaded from {}", cli.config);

    let classifier = Classifier::default()
        .with_special_keywords(config.catalog.special_keywords.clone());
    let url_builder = StreamUrlBuilder::new(
        &config.source.base_url,
        &config.source.username,
        &config.source.password,
    );

    let parser = PlaylistParser::new(classifier.clone(), Some(url_builder.clone()));
    let offload = OffloadChannel::new(parser, config.ingestion.batch_size);
    let state_manager = IngestionStateManager::new();
    let ingestor = IngestorService::new(
        offload,
        state_manager,
        config.ingestion.use_offload,
        config.ingestion.progress_update_interval,
    );
    let schedule = ScheduleIngestor::new(&config.source.timezone);

    // Bundled content first, the provider API as fallback
    let mut sources: Vec<Box<dyn ContentSource>> =
        vec![Box::new(LocalContentSource::new(config.storage.clone()))];
    match RemoteContentSource::new(url_builder) {
        Ok(remote) => sources.push(Box::new(remote)),
        Err(e) => tracing::warn!("Remote source unavailable: {}", e),
    }

    let service = ContentService::new(sources, ingestor, schedule);
    let records = service.load_all_content().await?;
    info!("Catalog loaded: {} records", records.len());

    let category_names = CategoryNameMap::load(&config.storage.category_names_path).await;
    let mut grouper = CategoryGrouper::new(
        classifier,
        category_names,
        GrouperSettings::from(&config.catalog),
    );
    grouper.set_records(records);
    let mut loader = WindowedLoader::new(LoaderSettings::from(&config.catalog));

    for category in Category::ALL {
        grouper.select_category(category);
        let groups = grouper.groups();
        let total: usize = groups.iter().map(|g| g.total_count).sum();
        let label = match category {
            Category::Special => config.catalog.special_name.as_str(),
            other => other.display_name(),
        };
        println!("{:<10} {:>3} groups, {:>6} records", label, groups.len(), total);
        for group in groups.iter().take(5) {
            println!(
                "  {:<40} {:>5} shown / {:>5} total",
                group.name,
                group.window.len(),
                group.total_count
            );
        }
        if let Some(group) = groups.iter().find(|g| g.has_more()) {
            let appended = loader.load_more(&mut grouper, &group.name);
            println!(
                "  '{}' grew by {} to {}",
                group.name,
                appended.len(),
                group.window.len() + appended.len()
            );
        }
    }

    Ok(())
}
