//! # Garment Query
//!
//! A Rust crate for turning a photo of a clothing item into a marketplace
//! search query.
//!
//! This library derives the query by:
//! - Naming the garment's dominant color from a sampled center region
//! - Normalizing an external image labeler's guesses into one clothing category
//! - Composing "color category" query text
//! - Persisting and replaying past results as a live, newest-first history
//!
//! Decoding, labeling and dominant-swatch extraction are collaborators behind
//! traits ([`ImageDecoder`], [`LabelClassifier`], [`SwatchExtractor`]); stock
//! implementations are provided for the decoder and the swatch extractor.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use garment_query::{
//!     DerivationPipeline, FsImageDecoder, LabelClassifier, LabelGuess, MemoryHistoryStore,
//!     PipelineConfig, PopulationSwatchExtractor, QuerySession,
//! };
//! use image::RgbImage;
//!
//! struct MyLabeler;
//!
//! #[async_trait]
//! impl LabelClassifier for MyLabeler {
//!     async fn classify_labels(&self, _image: &RgbImage) -> Vec<LabelGuess> {
//!         vec![LabelGuess::new("Jeans", 0.9)]
//!     }
//! }
//!
//! # async fn run() -> garment_query::Result<()> {
//! let config = PipelineConfig::default();
//! let pipeline = DerivationPipeline::new(
//!     &config,
//!     Arc::new(FsImageDecoder::new()),
//!     Arc::new(MyLabeler),
//!     Arc::new(PopulationSwatchExtractor::from_config(&config.swatch)?),
//! );
//! let session = QuerySession::new(pipeline, Arc::new(MemoryHistoryStore::new()));
//!
//! session.submit_photo("photo.jpg").await;
//! println!("Query: {}", session.pipeline().state().result.query_text);
//! session.save_current().await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod category;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod history;
pub mod image_loader;
pub mod pipeline;
pub mod query;
pub mod session;

pub use category::{CategoryClassifier, LabelClassifier, LabelGuess};
pub use color::{ColorExtractor, NamedColorTable};
pub use config::{LabelPrecedence, PipelineConfig};
pub use detection::{PopulationSwatchExtractor, SwatchExtractor};
pub use error::{QueryError, Result};
pub use history::{HistoryRecord, HistoryStore, MemoryHistoryStore, SqliteHistoryStore};
pub use image_loader::{FsImageDecoder, ImageDecoder, ImageRef};
pub use pipeline::{DerivationPipeline, Phase, PipelineState};
pub use query::compose;
pub use session::QuerySession;

/// Outcome of one photo-to-query derivation
///
/// Transient until explicitly saved to a [`HistoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DerivationResult {
    pub image_ref: Option<ImageRef>,
    pub category: String,
    pub color_name: String,
    /// Always `compose(color_name, category)`
    pub query_text: String,
    pub created_at: DateTime<Utc>,
}

impl DerivationResult {
    /// Result stamped now, with the query composed from its parts
    pub fn new(
        image_ref: Option<ImageRef>,
        category: impl Into<String>,
        color_name: impl Into<String>,
    ) -> Self {
        let category = category.into();
        let color_name = color_name.into();
        Self {
            image_ref,
            query_text: compose(&color_name, &category),
            category,
            color_name,
            created_at: Utc::now(),
        }
    }

    /// Result with nothing derived
    pub fn blank(image_ref: Option<ImageRef>) -> Self {
        Self::new(image_ref, "", "")
    }

    /// Both category and color name are present
    pub fn is_complete(&self) -> bool {
        !self.category.trim().is_empty() && !self.color_name.trim().is_empty()
    }
}
