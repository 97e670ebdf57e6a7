use ndarray::Zip;
use thiserror::Error;

use crate::shared::constants::MAX_PIXEL_VALUE;
use crate::shared::frame::{Frame, FrameShape};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("frame shapes do not match: {reference} vs {candidate}")]
pub struct ShapeMismatch {
    pub reference: FrameShape,
    pub candidate: FrameShape,
}

/// Mean squared error over every sample of both frames, all channels
/// flattened with equal weight. Zero-sample frames have an MSE of 0.
pub fn mean_squared_error(reference: &Frame, candidate: &Frame) -> Result<f64, ShapeMismatch> {
    ensure_comparable(reference, candidate)?;

    let samples = reference.shape().sample_count();
    if samples == 0 {
        return Ok(0.0);
    }

    let sum_sq = Zip::from(reference.as_ndarray())
        .and(candidate.as_ndarray())
        .fold(0.0_f64, |acc, &a, &b| {
            let diff = f64::from(a) - f64::from(b);
            acc + diff * diff
        });

    Ok(sum_sq / samples as f64)
}

/// Peak signal-to-noise ratio between two comparable frames, in decibels.
///
/// Returns `f64::INFINITY` when the frames are sample-for-sample identical.
pub fn frame_psnr(reference: &Frame, candidate: &Frame) -> Result<f64, ShapeMismatch> {
    let mse = mean_squared_error(reference, candidate)?;
    Ok(psnr_from_mse(mse))
}

pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (MAX_PIXEL_VALUE * MAX_PIXEL_VALUE / mse).log10()
}

fn ensure_comparable(reference: &Frame, candidate: &Frame) -> Result<(), ShapeMismatch> {
    if reference.is_comparable(candidate) {
        Ok(())
    } else {
        Err(ShapeMismatch {
            reference: reference.shape(),
            candidate: candidate.shape(),
        })
    }
}
