use crate::shared::frame::{ChannelOrder, Frame};

/// Converts a frame into the canonical representation used for comparison.
///
/// BGR frames have their first and third channel swapped in place; RGB and
/// grayscale frames pass through untouched.
pub fn normalize_to_rgb(mut frame: Frame) -> Frame {
    if frame.channel_order() != ChannelOrder::Bgr {
        return frame;
    }

    let channels = frame.channels() as usize;
    if channels >= 3 {
        for pixel in frame.data_mut().chunks_exact_mut(channels) {
            pixel.swap(0, 2);
        }
    }
    frame.with_channel_order(ChannelOrder::Rgb)
}
