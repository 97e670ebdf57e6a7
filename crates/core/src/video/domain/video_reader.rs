use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// A restartable-by-reopening source of decoded frames.
///
/// Implementations handle I/O details (codec, container format, etc.) and
/// tag every frame with the channel order it was decoded into. An `Err`
/// item or the end of the iterator both mean no further frames.
pub trait VideoReader {
    /// Opens the file and returns its metadata, including the reported frame count.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader. Must be idempotent.
    fn close(&mut self);
}
