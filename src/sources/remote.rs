//! Remote provider source: playlist via `get.php`, schedule via
//! `xmltv.php`, downloaded with streaming progress reporting.

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::{ContentSource, SourcePayload};
use crate::errors::SourceError;
use crate::ingestor::{IngestionStateManager, StreamUrlBuilder};
use crate::models::{IngestionState, ProgressInfo};

pub struct RemoteContentSource {
    client: reqwest::Client,
    url_builder: StreamUrlBuilder,
}

impl RemoteContentSource {
    pub fn new(url_builder: StreamUrlBuilder) -> Result<Self, SourceError> {
        let playlist_url = url_builder.playlist_url();
        Url::parse(&playlist_url).map_err(|e| {
            SourceError::parse_error("remote", format!("invalid provider URL {playlist_url}: {e}"))
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            url_builder,
        })
    }

    /// Download a body while streaming progress into the state manager.
    /// The download occupies the 20-50% band of the overall run.
    async fn download_with_progress(
        &self,
        url: &str,
        state_manager: &IngestionStateManager,
        source_id: Uuid,
    ) -> Result<String, SourceError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::timeout(url)
            } else {
                SourceError::Http {
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    message: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(SourceError::Http {
                status: response.status().as_u16(),
                message: format!("fetching {url}"),
            });
        }

        let total_size = response.content_length();
        info!("Connected to {}, content length: {:?} bytes", url, total_size);

        let mut body: Vec<u8> = Vec::new();
        let mut downloaded = 0u64;
        let mut last_logged_percentage = 0.0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| SourceError::Http {
                status: 0,
                message: format!("download interrupted: {e}"),
            })?;

            body.extend_from_slice(&chunk);
            downloaded += chunk.len() as u64;

            if let Some(total) = total_size {
                let percentage = 20.0 + (downloaded as f64 / total as f64) * 30.0;

                if percentage - last_logged_percentage >= 10.0 {
                    debug!(
                        "Download progress: {:.1}% ({} / {} bytes)",
                        percentage, downloaded, total
                    );
                    last_logged_percentage = percentage;
                }

                let mut info = ProgressInfo::step(
                    format!("Downloaded {} / {} bytes", downloaded, total),
                    percentage,
                );
                info.total_bytes = Some(total);
                info.downloaded_bytes = Some(downloaded);
                state_manager
                    .update_progress(source_id, IngestionState::Downloading, info)
                    .await;
            } else if downloaded % 100_000 == 0 && downloaded > 0 {
                debug!("Downloaded {} bytes", downloaded);
            }
        }

        info!("Download completed: {} bytes", downloaded);
        Ok(decode_body(body))
    }
}

/// Decode the accumulated body in one pass. Network chunks can split a
/// multibyte character, so per-chunk decoding would mangle it; decoding the
/// whole buffer keeps labels like "Comédia" intact.
fn decode_body(body: Vec<u8>) -> String {
    String::from_utf8_lossy(&body).into_owned()
}

#[async_trait]
impl ContentSource for RemoteContentSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch(
        &self,
        state_manager: &IngestionStateManager,
        source_id: Uuid,
    ) -> Result<SourcePayload, SourceError> {
        state_manager
            .update_progress(
                source_id,
                IngestionState::Connecting,
                ProgressInfo::step("Connecting to provider", 10.0),
            )
            .await;

        let playlist_text = self
            .download_with_progress(&self.url_builder.playlist_url(), state_manager, source_id)
            .await?;

        if playlist_text.trim().is_empty() {
            return Err(SourceError::parse_error("remote", "empty playlist response"));
        }

        // Schedule data is best effort; a missing EPG never fails the load
        let schedule_xml = match self
            .download_with_progress(&self.url_builder.schedule_url(), state_manager, source_id)
            .await
        {
            Ok(xml) => Some(xml),
            Err(e) => {
                warn!("Schedule download failed, continuing without EPG: {}", e);
                None
            }
        };

        Ok(SourcePayload {
            playlist_text,
            schedule_xml,
            vod_records: Vec::new(),
        })
    }
}
