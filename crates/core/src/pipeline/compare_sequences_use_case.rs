use std::path::Path;
use std::time::Instant;

use crate::pipeline::comparison_error::ComparisonError;
use crate::pipeline::comparison_logger::{ComparisonLogger, NullComparisonLogger};
use crate::quality::domain::psnr::frame_psnr;
use crate::quality::domain::psnr_report::PsnrReport;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::color_normalizer::normalize_to_rgb;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompareOptions {
    /// Reject sources whose reported frame counts differ before decoding
    /// anything. Counts come from container metadata and may be wrong.
    pub check_frame_counts: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            check_frame_counts: true,
        }
    }
}

/// Average PSNR between two video files, both decoded with ffmpeg.
pub fn compare_sequences(
    reference_path: &Path,
    candidate_path: &Path,
) -> Result<PsnrReport, ComparisonError> {
    CompareSequencesUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegReader::new()),
        Box::new(NullComparisonLogger),
        CompareOptions::default(),
    )
    .execute(reference_path, candidate_path)
}

/// Lock-step comparison of a reference and a candidate frame sequence:
/// open → reconcile counts → iterate pairs → average.
pub struct CompareSequencesUseCase {
    reference: Box<dyn VideoReader>,
    candidate: Box<dyn VideoReader>,
    logger: Box<dyn ComparisonLogger>,
    options: CompareOptions,
}

impl CompareSequencesUseCase {
    pub fn new(
        reference: Box<dyn VideoReader>,
        candidate: Box<dyn VideoReader>,
        logger: Box<dyn ComparisonLogger>,
        options: CompareOptions,
    ) -> Self {
        Self {
            reference,
            candidate,
            logger,
            options,
        }
    }

    pub fn logger(&self) -> &dyn ComparisonLogger {
        self.logger.as_ref()
    }

    /// Both readers are closed on every return path, success or failure.
    pub fn execute(
        &mut self,
        reference_path: &Path,
        candidate_path: &Path,
    ) -> Result<PsnrReport, ComparisonError> {
        let mut reference = OpenSource::open(self.reference.as_mut(), reference_path)?;
        let mut candidate = OpenSource::open(self.candidate.as_mut(), candidate_path)?;

        let reference_count = reference.metadata.total_frames;
        let candidate_count = candidate.metadata.total_frames;
        if self.options.check_frame_counts && reference_count != candidate_count {
            return Err(ComparisonError::FrameCountMismatch {
                reference: reference_count,
                candidate: candidate_count,
            });
        }

        self.logger.info(&format!(
            "Comparing {} against {} ({reference_count} frames reported)",
            candidate_path.display(),
            reference_path.display(),
        ));

        let scores = compare_frames(&mut reference, &mut candidate, self.logger.as_mut())?;

        self.logger
            .info(&format!("Compared {} frame pairs", scores.len()));
        PsnrReport::from_scores(scores).ok_or(ComparisonError::EmptyComparison)
    }
}

/// An opened reader that closes itself when dropped.
struct OpenSource<'a> {
    reader: &'a mut dyn VideoReader,
    metadata: VideoMetadata,
}

impl<'a> OpenSource<'a> {
    fn open(reader: &'a mut dyn VideoReader, path: &Path) -> Result<Self, ComparisonError> {
        match reader.open(path) {
            Ok(metadata) => Ok(Self { reader, metadata }),
            Err(e) => {
                reader.close();
                Err(ComparisonError::SourceOpen {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl Drop for OpenSource<'_> {
    fn drop(&mut self) {
        self.reader.close();
    }
}

/// Pulls one frame from each source per step until either runs out.
fn compare_frames(
    reference: &mut OpenSource<'_>,
    candidate: &mut OpenSource<'_>,
    logger: &mut dyn ComparisonLogger,
) -> Result<Vec<f64>, ComparisonError> {
    let total = reference.metadata.total_frames;
    let mut reference_frames = reference.reader.frames();
    let mut candidate_frames = candidate.reader.frames();
    let mut scores = Vec::new();
    let mut index = 0;

    loop {
        let decode_start = Instant::now();
        let next_reference = next_frame(&mut reference_frames, "reference", index);
        let next_candidate = next_frame(&mut candidate_frames, "candidate", index);

        let (reference_frame, candidate_frame) = match (next_reference, next_candidate) {
            (Some(r), Some(c)) => (r, c),
            (None, None) => break,
            (Some(_), None) => {
                log::warn!("Candidate ended after {index} frames; reference has more");
                break;
            }
            (None, Some(_)) => {
                log::warn!("Reference ended after {index} frames; candidate has more");
                break;
            }
        };
        logger.timing("decode", elapsed_ms(decode_start));

        let psnr_start = Instant::now();
        let psnr = frame_psnr(
            &normalize_to_rgb(reference_frame),
            &normalize_to_rgb(candidate_frame),
        )
        .map_err(|source| ComparisonError::ShapeMismatch { index, source })?;
        logger.timing("psnr", elapsed_ms(psnr_start));

        logger.frame_score(index, psnr);
        scores.push(psnr);
        index += 1;
        logger.progress(index, total);
    }

    Ok(scores)
}

/// Decode failures end the sequence just like exhaustion does.
fn next_frame<I>(frames: &mut I, label: &str, index: usize) -> Option<Frame>
where
    I: Iterator<Item = Result<Frame, Box<dyn std::error::Error>>>,
{
    match frames.next()? {
        Ok(frame) => Some(frame),
        Err(e) => {
            log::warn!("Stopping at {label} frame {index}: {e}");
            None
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
