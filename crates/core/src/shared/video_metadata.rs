use std::path::PathBuf;

/// Container-level facts reported by a frame source when it is opened.
///
/// `total_frames` comes from the container header and is best-effort:
/// some formats omit it (reported as 0) or disagree with the number of
/// frames that actually decode.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}
