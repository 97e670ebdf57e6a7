/// Peak sample value. PSNR always assumes 8-bit input regardless of source depth.
pub const MAX_PIXEL_VALUE: f64 = 255.0;

pub const PROGRESS_THROTTLE_FRAMES: usize = 25;
