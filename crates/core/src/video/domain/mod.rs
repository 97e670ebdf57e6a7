pub mod color_normalizer;
pub mod video_reader;
