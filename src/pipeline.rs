//! Photo-to-query derivation pipeline
//!
//! One pipeline instance drives one displayed result:
//! `Idle` → `Processing` → `Ready`, and back to `Processing` for every new
//! photo. State is published on a `watch` channel so presentation code can
//! render the processing flag, the current result and the decoded photo.
//!
//! Only one run per instance may be in flight; the caller is expected to
//! disable re-triggering while `processing` is set. Runs are not queued or
//! cancelled.

use std::sync::Arc;

use image::RgbImage;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::category::{CategoryClassifier, LabelClassifier};
use crate::color::ColorExtractor;
use crate::config::PipelineConfig;
use crate::detection::SwatchExtractor;
use crate::history::HistoryRecord;
use crate::image_loader::{ImageDecoder, ImageRef};
use crate::DerivationResult;

/// Pipeline lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No photo processed yet
    #[default]
    Idle,
    /// Decode and classification in flight
    Processing,
    /// A result (possibly blank) is published
    Ready,
}

/// Observable pipeline state
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub phase: Phase,
    pub processing: bool,
    /// Currently displayed result; blank fields mean "nothing derived"
    pub result: DerivationResult,
    /// Decoded photo backing the displayed result, if any
    pub image: Option<Arc<RgbImage>>,
}

impl PipelineState {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Orchestrates decode, labeling, color naming and query composition
pub struct DerivationPipeline {
    decoder: Arc<dyn ImageDecoder>,
    labeler: Arc<dyn LabelClassifier>,
    colors: ColorExtractor,
    categories: CategoryClassifier,
    state: watch::Sender<PipelineState>,
}

impl DerivationPipeline {
    pub fn new(
        config: &PipelineConfig,
        decoder: Arc<dyn ImageDecoder>,
        labeler: Arc<dyn LabelClassifier>,
        swatches: Arc<dyn SwatchExtractor>,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::default());
        Self {
            decoder,
            labeler,
            colors: ColorExtractor::new(config.color_extraction.clone(), swatches),
            categories: CategoryClassifier::new(&config.category),
            state,
        }
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.state.borrow().processing
    }

    /// Derive and publish a result for a freshly captured or picked photo
    ///
    /// A photo that cannot be decoded publishes a blank result; this is not
    /// reported as an error.
    pub async fn on_photo_captured(&self, image_ref: ImageRef) {
        info!(image_ref = %image_ref, "Processing photo");
        self.state.send_modify(|s| {
            s.phase = Phase::Processing;
            s.processing = true;
        });

        let image = match self.decoder.decode(&image_ref).await {
            Ok(image) => image,
            Err(e) => {
                warn!(image_ref = %image_ref, error = %e, "Photo could not be decoded");
                self.state.send_modify(|s| {
                    s.phase = Phase::Ready;
                    s.processing = false;
                    s.result = DerivationResult::blank(Some(image_ref));
                    s.image = None;
                });
                return;
            }
        };

        let labels = self.labeler.classify_labels(&image).await;
        let category = self.categories.classify(&labels);
        let color_name = self.colors.extract(&image).await;
        let result = DerivationResult::new(Some(image_ref), category, color_name);

        info!(query = %result.query_text, labels = labels.len(), "Query derived");
        let image = Arc::new(image);
        self.state.send_modify(|s| {
            s.phase = Phase::Ready;
            s.processing = false;
            s.result = result;
            s.image = Some(image);
        });
    }

    /// The displayed result, if it is complete enough to save
    ///
    /// `None` whenever the category or the color name is blank.
    pub fn current_result(&self) -> Option<DerivationResult> {
        let state = self.state.borrow();
        state.result.is_complete().then(|| state.result.clone())
    }

    /// Display a saved search without re-running classification
    ///
    /// The stored photo is re-decoded best-effort; if that fails the text
    /// fields are still shown without an image.
    pub async fn load_history_record(&self, record: &HistoryRecord) {
        let image = match &record.image_ref {
            Some(image_ref) => match self.decoder.decode(image_ref).await {
                Ok(image) => Some(Arc::new(image)),
                Err(e) => {
                    debug!(image_ref = %image_ref, error = %e, "Saved photo unavailable");
                    None
                }
            },
            None => None,
        };

        debug!(id = record.id, query = %record.query_text, "Saved search loaded");
        let result = record.to_result();
        self.state.send_modify(|s| {
            s.phase = Phase::Ready;
            s.processing = false;
            s.result = result;
            s.image = image;
        });
    }
}
