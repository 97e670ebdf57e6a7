use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video as Picture;

use crate::shared::frame::{ChannelOrder, Frame};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Frame source backed by ffmpeg-next (libavformat + libavcodec).
///
/// Pictures are scaled into packed BGR24, the layout classic capture APIs
/// hand out, and tagged [`ChannelOrder::Bgr`]. Reading again from the first
/// frame requires `close` and a fresh `open`.
#[derive(Default)]
pub struct FfmpegReader {
    input: Option<OpenedInput>,
}

struct OpenedInput {
    ctx: Input,
    stream_index: usize,
    metadata: VideoMetadata,
}

impl FfmpegReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.input.as_ref().map(|input| &input.metadata)
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        let ctx = ffmpeg_next::format::input(path)?;

        let (stream_index, metadata) = {
            let stream = ctx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or("No video stream found")?;
            let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
                .decoder()
                .video()?;
            let rate = stream.rate();
            let fps = match rate.denominator() {
                0 => 0.0,
                den => f64::from(rate.numerator()) / f64::from(den),
            };
            let metadata = VideoMetadata {
                width: decoder.width(),
                height: decoder.height(),
                fps,
                // nb_frames is 0 (or negative) when the container doesn't record it
                total_frames: usize::try_from(stream.frames()).unwrap_or(0),
                codec: decoder.codec().map(|c| c.name().to_string()).unwrap_or_default(),
                source_path: Some(path.to_path_buf()),
            };
            (stream.index(), metadata)
        };

        log::debug!(
            "Opened {}: {}x{} {} @ {:.2} fps, {} frames reported",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.fps,
            metadata.total_frames,
        );

        self.input = Some(OpenedInput {
            ctx,
            stream_index,
            metadata: metadata.clone(),
        });
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(input) = self.input.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };

        match BgrFrames::new(&mut input.ctx, input.stream_index) {
            Ok(frames) => Box::new(frames),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn close(&mut self) {
        self.input = None;
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Demuxing,
    Draining,
    Finished,
}

/// Decodes one picture per `next()`. A packet the decoder rejects ends the
/// sequence with an error instead of silently shifting later frames.
struct BgrFrames<'a> {
    ctx: &'a mut Input,
    stream_index: usize,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    next_index: usize,
    state: DecodeState,
}

impl<'a> BgrFrames<'a> {
    fn new(ctx: &'a mut Input, stream_index: usize) -> Result<Self, Box<dyn std::error::Error>> {
        let parameters = ctx
            .stream(stream_index)
            .ok_or("FfmpegReader: video stream missing")?
            .parameters();
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)?
            .decoder()
            .video()?;
        let scaler = scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::BGR24,
            decoder.width(),
            decoder.height(),
            scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            ctx,
            stream_index,
            decoder,
            scaler,
            next_index: 0,
            state: DecodeState::Demuxing,
        })
    }

    fn receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = Picture::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut bgr = Picture::empty();
        self.scaler.run(&decoded, &mut bgr)?;
        let frame = Frame::new(packed_rows(&bgr, 3), bgr.width(), bgr.height(), 3, self.next_index)
            .with_channel_order(ChannelOrder::Bgr);
        self.next_index += 1;
        Ok(Some(frame))
    }

    /// Sends the next packet of our stream, or EOF once the demuxer is empty.
    fn feed(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        for (stream, packet) in self.ctx.packets() {
            if stream.index() != self.stream_index {
                continue;
            }
            self.decoder.send_packet(&packet).map_err(|e| {
                format!("decoder rejected packet after frame {}: {e}", self.next_index)
            })?;
            return Ok(());
        }

        let _ = self.decoder.send_eof();
        self.state = DecodeState::Draining;
        Ok(())
    }
}

impl Iterator for BgrFrames<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.state != DecodeState::Finished {
            let step = match self.receive() {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) if self.state == DecodeState::Draining => {
                    self.state = DecodeState::Finished;
                    return None;
                }
                Ok(None) => self.feed(),
                Err(e) => Err(e),
            };
            if let Err(e) = step {
                self.state = DecodeState::Finished;
                return Some(Err(e));
            }
        }
        None
    }
}

/// Copies plane 0 of a packed picture, dropping per-row stride padding.
fn packed_rows(picture: &Picture, channels: usize) -> Vec<u8> {
    let row_len = picture.width() as usize * channels;
    let stride = picture.stride(0);
    picture
        .data(0)
        .chunks(stride)
        .take(picture.height() as usize)
        .flat_map(|row| row[..row_len].iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_video::TestClip;

    #[test]
    fn test_open_reports_dimensions_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = TestClip::new(5).write(dir.path(), "reference");

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!((meta.width, meta.height), (160, 120));
        assert!(meta.fps > 0.0);
        assert_eq!(meta.source_path.as_deref(), Some(path.as_path()));
        assert_eq!(reader.metadata(), Some(&meta));
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let mut reader = FfmpegReader::new();
        assert!(reader.open(Path::new("/nonexistent/reference.mp4")).is_err());
        assert!(reader.metadata().is_none());
    }

    #[test]
    fn test_every_encoded_frame_decodes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = TestClip::new(5).write(dir.path(), "reference");

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let indices: Vec<usize> = reader.frames().map(|f| f.unwrap().index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_frames_are_tightly_packed_bgr() {
        let dir = tempfile::tempdir().unwrap();
        let path = TestClip::new(1).size(96, 64).write(dir.path(), "reference");

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(frame.channel_order(), ChannelOrder::Bgr);
        assert_eq!(frame.shape().sample_count(), 96 * 64 * 3);
        assert_eq!(frame.data().len(), 96 * 64 * 3);
    }

    #[test]
    fn test_iterator_stays_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let path = TestClip::new(2).write(dir.path(), "reference");

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let mut frames = reader.frames();
        assert!(frames.by_ref().take(2).all(|f| f.is_ok()));
        assert!(frames.next().is_none());
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_reopen_restarts_from_first_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = TestClip::new(3).write(dir.path(), "reference");

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let first = reader.frames().next().unwrap().unwrap();
        reader.close();

        reader.open(&path).unwrap();
        let again = reader.frames().next().unwrap().unwrap();
        assert_eq!(first.index(), again.index());
        assert_eq!(first.data(), again.data());
    }

    #[test]
    fn test_frames_before_open_is_an_error() {
        let mut reader = FfmpegReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_close_releases_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = TestClip::new(1).write(dir.path(), "reference");

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(reader.metadata().is_none());
        assert!(reader.frames().next().unwrap().is_err());
    }
}
