//! Assemble all of the worker buffers into a single image.
//!
//! The buffers are summed, each pixel's color is scaled by the log of
//! its hit count over the count (so sparsely hit pixels aren't lost in
//! the dark), and the result is normalized against the brightest
//! channel anywhere in the image, gamma-encoded and quantized.

use crate::accumulate::{AccumulationBuffer, Histogram};
use num::clamp;

/// Sum every buffer into one histogram.  All buffers must have the
/// same dimensions.  No buffers at all gives an empty histogram.
pub fn merge(buffers: &[AccumulationBuffer]) -> Histogram {
    let mut merged = match buffers.first() {
        Some(first) => Histogram::new(first.width(), first.height()),
        None => Histogram::new(0, 0),
    };
    for buffer in buffers {
        merged.merge_buffer(buffer);
    }
    merged
}

/// The factor a pixel hit `count` times is scaled by: ln(1 + n) / n.
#[inline]
pub fn multiplier(count: u64) -> f64 {
    let n = count as f64;
    (1.0 + n).ln() / n
}

/// Linear-light channel values ready to be tone-mapped.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Red, per pixel.
    pub red: Vec<f64>,
    /// Green, per pixel.
    pub green: Vec<f64>,
    /// Blue, per pixel.
    pub blue: Vec<f64>,
}

fn scale(sums: &[u64], counts: &[u64]) -> Vec<f64> {
    sums.iter()
        .zip(counts.iter())
        .map(|(&sum, &count)| t!(count == 0, sum as f64, sum as f64 * multiplier(count)))
        .collect()
}

/// Scale every hit pixel's sums by `multiplier(count)`.  Pixels that
/// were never hit stay zero.
pub fn brighten_darks(histogram: &Histogram) -> Frame {
    Frame {
        width: histogram.width,
        height: histogram.height,
        red: scale(&histogram.red, &histogram.count),
        green: scale(&histogram.green, &histogram.count),
        blue: scale(&histogram.blue, &histogram.count),
    }
}

/// Merge the buffers and brighten the result.
pub fn composite(buffers: &[AccumulationBuffer]) -> Frame {
    brighten_darks(&merge(buffers))
}

impl Frame {
    /// The largest value of any channel of any pixel.
    pub fn max_value(&self) -> f64 {
        self.red
            .iter()
            .chain(self.green.iter())
            .chain(self.blue.iter())
            .cloned()
            .fold(0.0, f64::max)
    }

    fn quantized(&self) -> impl Iterator<Item = (u8, u8, u8)> + '_ {
        let max = self.max_value();
        let inv_max = t!(max > 0.0, 1.0 / max, 0.0);
        let encode =
            move |value: f64| clamp((255.0 * (value * inv_max).sqrt()).round(), 0.0, 255.0) as u8;
        self.red
            .iter()
            .zip(self.green.iter())
            .zip(self.blue.iter())
            .map(move |((&r, &g), &b)| (encode(r), encode(g), encode(b)))
    }

    /// Row-major RGB bytes, for writing to a file.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.red.len() * 3);
        for (r, g, b) in self.quantized() {
            pixels.extend_from_slice(&[r, g, b]);
        }
        pixels
    }

    /// Row-major BGRA bytes with opaque alpha, for a live display.
    pub fn to_bgra(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.red.len() * 4);
        for (r, g, b) in self.quantized() {
            pixels.extend_from_slice(&[b, g, r, 255]);
        }
        pixels
    }
}
