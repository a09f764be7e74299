//! Pure extraction pipeline: segmentation, chunking, model calls, CSV
//! normalization, validation and review-form decoding.

pub mod chunk;
pub mod normalize;
pub mod orchestrator;
pub mod review;
pub mod segment;
pub mod summary;
pub mod validate;

pub use orchestrator::{ExtractionReport, Extractor};
