use std::fmt;

use ndarray::ArrayView3;

/// Interleaving of the samples inside each pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    Gray,
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Default order for a channel count: 1 is grayscale, anything else RGB.
    pub fn for_channels(channels: u8) -> Self {
        if channels == 1 {
            ChannelOrder::Gray
        } else {
            ChannelOrder::Rgb
        }
    }
}

/// Dimensions of a frame in `(height, width, channels)` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl FrameShape {
    pub fn sample_count(&self) -> usize {
        self.height * self.width * self.channels
    }
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.height, self.width, self.channels)
    }
}

/// A single decoded frame: contiguous 8-bit samples in row-major order.
///
/// Sources tag each frame with the [`ChannelOrder`] they decoded into;
/// comparison code normalizes before looking at pixel values.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    order: ChannelOrder,
    index: usize,
}

impl Frame {
    /// Panics when `data.len()` is not `width * height * channels`, in
    /// release builds too, so later views over the buffer can't fail.
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            order: ChannelOrder::for_channels(channels),
            index,
        }
    }

    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn shape(&self) -> FrameShape {
        FrameShape {
            height: self.height as usize,
            width: self.width as usize,
            channels: self.channels as usize,
        }
    }

    /// Two frames are comparable when dimensions and channel count agree.
    pub fn is_comparable(&self, other: &Frame) -> bool {
        self.shape() == other.shape()
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        let shape = self.shape();
        ArrayView3::from_shape((shape.height, shape.width, shape.channels), &self.data)
            .expect("length checked in Frame::new")
    }
}
