//! Command surface for a presentation shell
//!
//! Pairs one [`DerivationPipeline`] with a [`HistoryStore`]. The pipeline and
//! the history list are observed independently; store writes never touch the
//! pipeline state and vice versa.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::history::{HistoryRecord, HistoryStore};
use crate::image_loader::ImageRef;
use crate::pipeline::{DerivationPipeline, PipelineState};
use crate::Result;

pub struct QuerySession {
    pipeline: DerivationPipeline,
    history: Arc<dyn HistoryStore>,
}

impl QuerySession {
    pub fn new(pipeline: DerivationPipeline, history: Arc<dyn HistoryStore>) -> Self {
        Self { pipeline, history }
    }

    pub fn pipeline(&self) -> &DerivationPipeline {
        &self.pipeline
    }

    pub fn history_store(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Pipeline state updates
    pub fn state(&self) -> watch::Receiver<PipelineState> {
        self.pipeline.subscribe()
    }

    /// Live saved search list, newest first
    pub fn history(&self) -> watch::Receiver<Vec<HistoryRecord>> {
        self.history.observe_all()
    }

    pub async fn submit_photo(&self, image_ref: impl Into<ImageRef>) {
        self.pipeline.on_photo_captured(image_ref.into()).await;
    }

    /// Persist the displayed result
    ///
    /// Returns `Ok(None)` when there is nothing complete to save.
    pub async fn save_current(&self) -> Result<Option<HistoryRecord>> {
        let Some(result) = self.pipeline.current_result() else {
            debug!("Nothing to save: current result is incomplete");
            return Ok(None);
        };
        self.history.save(&result).await.map(Some)
    }

    pub async fn delete_history(&self, record: &HistoryRecord) -> Result<()> {
        self.history.delete(record.id).await
    }

    pub async fn load_history(&self, record: &HistoryRecord) {
        self.pipeline.load_history_record(record).await;
    }
}
