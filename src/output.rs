//! Writing frames out as PNG files.

use crate::composite::Frame;
use failure::{Error, ResultExt};
use image::ColorType;
use std::path::Path;

/// Encode row-major RGB bytes as a PNG.
pub fn write_rgb<P: AsRef<Path>>(
    path: P,
    rgb: &[u8],
    width: usize,
    height: usize,
) -> Result<(), Error> {
    let path = path.as_ref();
    image::save_buffer(path, rgb, width as u32, height as u32, ColorType::RGB(8))
        .with_context(|_| format!("cannot write {}", path.display()))?;
    Ok(())
}

/// Tone-map a frame and write it as a PNG.
pub fn write_png<P: AsRef<Path>>(path: P, frame: &Frame) -> Result<(), Error> {
    write_rgb(path, &frame.to_rgb(), frame.width, frame.height)
}

/// Drop the alpha channel and put the colors back in RGB order.
pub fn bgra_to_rgb(bgra: &[u8]) -> Vec<u8> {
    bgra.chunks(4)
        .flat_map(|pixel| vec![pixel[2], pixel[1], pixel[0]])
        .collect()
}
