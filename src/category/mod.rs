//! Clothing category normalization module
//!
//! Turns the noisy output of an external multi-label image classifier into a
//! single clothing category usable as a search term.

pub mod classifier;

pub use classifier::{CategoryClassifier, CategoryMatch, CategoryRule, LabelClassifier, LabelGuess};
