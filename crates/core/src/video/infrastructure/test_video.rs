//! Synthesizes small MPEG-4 clips for reader and comparator tests.

use std::path::{Path, PathBuf};

use ffmpeg_next::format::Pixel;
use ffmpeg_next::util::frame::video::Video as Picture;
use ffmpeg_next::Rational;

const FPS: i32 = 30;

/// Flat gray clip: frame `i` is filled with `base_value + 40 * i` (wrapping).
pub(crate) struct TestClip {
    frames: usize,
    width: u32,
    height: u32,
    base_value: u8,
}

impl TestClip {
    pub(crate) fn new(frames: usize) -> Self {
        Self {
            frames,
            width: 160,
            height: 120,
            base_value: 0,
        }
    }

    pub(crate) fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub(crate) fn base_value(mut self, base_value: u8) -> Self {
        self.base_value = base_value;
        self
    }

    fn fill_value(&self, index: usize) -> u8 {
        self.base_value.wrapping_add(((index * 40) % 256) as u8)
    }

    /// Encodes the clip to `<dir>/<name>.mp4` and returns the path.
    pub(crate) fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(format!("{name}.mp4"));
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(&path).unwrap();
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let needs_global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);
        let mut stream = octx.add_stream(Some(codec)).unwrap();

        let mut setup = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        setup.set_width(self.width);
        setup.set_height(self.height);
        setup.set_format(Pixel::YUV420P);
        setup.set_time_base(Rational(1, FPS));
        setup.set_frame_rate(Some(Rational(FPS, 1)));
        if needs_global_header {
            setup.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let mut encoder = setup.open_with(ffmpeg_next::Dictionary::new()).unwrap();
        stream.set_parameters(&encoder);

        octx.write_header().unwrap();
        let stream_time_base = octx.stream(0).unwrap().time_base();

        let mut to_yuv = ffmpeg_next::software::scaling::Context::get(
            Pixel::RGB24,
            self.width,
            self.height,
            Pixel::YUV420P,
            self.width,
            self.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        macro_rules! write_pending_packets {
            () => {
                let mut packet = ffmpeg_next::Packet::empty();
                while encoder.receive_packet(&mut packet).is_ok() {
                    packet.set_stream(0);
                    packet.rescale_ts(Rational(1, FPS), stream_time_base);
                    packet.write_interleaved(&mut octx).unwrap();
                }
            };
        }

        for index in 0..self.frames {
            let mut rgb = Picture::new(Pixel::RGB24, self.width, self.height);
            rgb.data_mut(0).fill(self.fill_value(index));

            let mut yuv = Picture::empty();
            to_yuv.run(&rgb, &mut yuv).unwrap();
            yuv.set_pts(Some(index as i64));

            encoder.send_frame(&yuv).unwrap();
            write_pending_packets!();
        }

        encoder.send_eof().unwrap();
        write_pending_packets!();

        octx.write_trailer().unwrap();
        path
    }
}
