use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::{IngestionProgress, IngestionState, ProgressInfo};

pub type ProgressSender = broadcast::Sender<IngestionProgress>;
pub type ProgressReceiver = broadcast::Receiver<IngestionProgress>;

/// Tracks per-source ingestion progress and fans updates out to whoever is
/// listening. State lives behind an `RwLock`; senders never block on slow
/// receivers.
#[derive(Clone)]
pub struct IngestionStateManager {
    states: Arc<RwLock<HashMap<Uuid, IngestionProgress>>>,
    progress_tx: ProgressSender,
}

impl IngestionStateManager {
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(1000);
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
            progress_tx,
        }
    }

    pub fn subscribe(&self) -> ProgressReceiver {
        self.progress_tx.subscribe()
    }

    pub async fn start_ingestion(&self, source_id: Uuid) {
        let progress = IngestionProgress {
            source_id,
            state: IngestionState::Connecting,
            progress: ProgressInfo::step("Initializing connection", 0.0),
            started_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
            error: None,
        };

        {
            let mut states = self.states.write().await;
            states.insert(source_id, progress.clone());
        }

        let _ = self.progress_tx.send(progress);
    }

    pub async fn update_progress(
        &self,
        source_id: Uuid,
        state: IngestionState,
        progress_info: ProgressInfo,
    ) {
        let mut current_progress = {
            let states = self.states.read().await;
            states.get(&source_id).cloned()
        };

        if let Some(ref mut progress) = current_progress {
            progress.state = state.clone();
            progress.progress = progress_info;
            progress.updated_at = Utc::now();

            if matches!(state, IngestionState::Completed | IngestionState::Error) {
                progress.completed_at = Some(Utc::now());
            }

            {
                let mut states = self.states.write().await;
                states.insert(source_id, progress.clone());
            }

            let _ = self.progress_tx.send(progress.clone());
        }
    }

    pub async fn set_error(&self, source_id: Uuid, error: String) {
        let mut current_progress = {
            let states = self.states.read().await;
            states.get(&source_id).cloned()
        };

        if let Some(ref mut progress) = current_progress {
            progress.state = IngestionState::Error;
            progress.error = Some(error);
            progress.updated_at = Utc::now();
            progress.completed_at = Some(Utc::now());

            {
                let mut states = self.states.write().await;
                states.insert(source_id, progress.clone());
            }

            let _ = self.progress_tx.send(progress.clone());
        }
    }

    pub async fn complete_ingestion(&self, source_id: Uuid, records_parsed: usize) {
        let mut info = ProgressInfo::step(
            format!("Completed - {} records loaded", records_parsed),
            100.0,
        );
        info.records_parsed = Some(records_parsed);
        self.update_progress(source_id, IngestionState::Completed, info)
            .await;
    }

    pub async fn get_progress(&self, source_id: Uuid) -> Option<IngestionProgress> {
        let states = self.states.read().await;
        states.get(&source_id).cloned()
    }
}

impl Default for IngestionStateManager {
    fn default() -> Self {
        Self::new()
    }
}
