//! Stage orchestration: preprocessing, extraction and progress reporting

/// End-to-end extraction driver
pub mod pipeline;
/// Per-stage progress reporting
pub mod observer;
/// Decoded audio to analysis buffer
pub mod preprocess;

pub use observer::{AnalysisObserver, CollectingObserver, LogObserver, NoopObserver, StageReport};
pub use pipeline::PatternExtractor;
pub use preprocess::Preprocessor;
