pub mod psnr;
pub mod psnr_report;
