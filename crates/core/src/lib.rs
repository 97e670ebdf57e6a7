//! Peak signal-to-noise ratio between a reference video and a processed copy.
//!
//! [`pipeline::compare_sequences_use_case::compare_sequences`] is the main
//! entry point; [`quality::domain::psnr::frame_psnr`] scores a single pair.

pub mod pipeline;
pub mod quality;
pub mod shared;
pub mod video;
