use std::path::PathBuf;

use thiserror::Error;

use crate::quality::domain::psnr::ShapeMismatch;

/// Every way a sequence comparison can fail. None of these are retried and
/// none carry a partial average.
#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("could not open video {path}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },
    #[error("frame counts do not match: {reference} vs {candidate}")]
    FrameCountMismatch { reference: usize, candidate: usize },
    #[error("error at frame {index}: {source}")]
    ShapeMismatch {
        index: usize,
        #[source]
        source: ShapeMismatch,
    },
    #[error("no valid frames to compare")]
    EmptyComparison,
}
