/// Per-frame PSNR values of a finished comparison, in decode order.
///
/// Always holds at least one value; an empty comparison is an error upstream.
/// `+inf` entries (identical frames) are kept as-is, so a mean over them is
/// `+inf` as well.
#[derive(Clone, Debug, PartialEq)]
pub struct PsnrReport {
    frame_scores: Vec<f64>,
}

impl PsnrReport {
    /// Returns `None` when no frames were compared.
    pub fn from_scores(frame_scores: Vec<f64>) -> Option<Self> {
        if frame_scores.is_empty() {
            None
        } else {
            Some(Self { frame_scores })
        }
    }

    pub fn frame_scores(&self) -> &[f64] {
        &self.frame_scores
    }

    pub fn frames_compared(&self) -> usize {
        self.frame_scores.len()
    }

    /// Arithmetic mean of all frame scores.
    pub fn average(&self) -> f64 {
        self.frame_scores.iter().sum::<f64>() / self.frame_scores.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.frame_scores
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.frame_scores
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn identical_frames(&self) -> usize {
        self.frame_scores.iter().filter(|s| s.is_infinite()).count()
    }
}
