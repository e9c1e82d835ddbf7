//! Per-pixel sums of linear-light color and hit counts.
//!
//! An `AccumulationBuffer` belongs to exactly one worker, which is the
//! only thing that ever writes to it.  The compositor may read it at
//! any time, even while the worker is still running, so the cells are
//! relaxed atomics: a reader sees each cell either before or after an
//! increment, never a torn value.  Reading a whole buffer gives a
//! `Histogram`, a plain snapshot that can be merged and tone-mapped.

use itertools::izip;
use std::sync::atomic::{AtomicU64, Ordering};

fn zeroes(len: usize) -> Vec<AtomicU64> {
    (0..len).map(|_| AtomicU64::new(0)).collect()
}

fn load(cells: &[AtomicU64]) -> Vec<u64> {
    cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
}

#[inline]
fn bump(cell: &AtomicU64, amount: u64) {
    // Single writer, so a load and a store is enough.
    cell.store(cell.load(Ordering::Relaxed) + amount, Ordering::Relaxed);
}

/// A worker's running totals.
#[derive(Debug)]
pub struct AccumulationBuffer {
    width: usize,
    height: usize,
    red: Vec<AtomicU64>,
    green: Vec<AtomicU64>,
    blue: Vec<AtomicU64>,
    count: Vec<AtomicU64>,
}

impl AccumulationBuffer {
    /// An all-zero buffer.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        AccumulationBuffer {
            width,
            height,
            red: zeroes(len),
            green: zeroes(len),
            blue: zeroes(len),
            count: zeroes(len),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether (x, y) is a pixel of this buffer.
    #[inline]
    pub fn is_in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Add a color to the pixel and count the hit.  Must only be called
    /// by the owning worker.
    #[inline]
    pub fn touch(&self, x: usize, y: usize, (r, g, b): (u16, u16, u16)) {
        debug_assert!(self.is_in_bounds(x, y));
        let i = y * self.width + x;
        bump(&self.red[i], u64::from(r));
        bump(&self.green[i], u64::from(g));
        bump(&self.blue[i], u64::from(b));
        bump(&self.count[i], 1);
    }

    /// A copy of the current totals.
    pub fn snapshot(&self) -> Histogram {
        Histogram {
            width: self.width,
            height: self.height,
            red: load(&self.red),
            green: load(&self.green),
            blue: load(&self.blue),
            count: load(&self.count),
        }
    }
}

/// Plain per-pixel totals, indexed by `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Sum of linear red.
    pub red: Vec<u64>,
    /// Sum of linear green.
    pub green: Vec<u64>,
    /// Sum of linear blue.
    pub blue: Vec<u64>,
    /// Number of hits.
    pub count: Vec<u64>,
}

impl Histogram {
    /// An all-zero histogram, the identity for `merge`.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Histogram {
            width,
            height,
            red: vec![0; len],
            green: vec![0; len],
            blue: vec![0; len],
            count: vec![0; len],
        }
    }

    /// Total hits over every pixel.
    pub fn hits(&self) -> u64 {
        self.count.iter().sum()
    }

    /// Add another histogram's totals into this one.  Both must have the
    /// same dimensions.
    pub fn merge(&mut self, other: &Histogram) {
        assert!(
            self.width == other.width && self.height == other.height,
            "cannot merge a {}x{} buffer into a {}x{} buffer",
            other.width,
            other.height,
            self.width,
            self.height
        );
        for (mine, theirs) in izip!(
            &mut [&mut self.red, &mut self.green, &mut self.blue, &mut self.count],
            &[&other.red, &other.green, &other.blue, &other.count]
        ) {
            for (m, t) in mine.iter_mut().zip(theirs.iter()) {
                *m += t;
            }
        }
    }

    /// Add a live buffer's current totals into this one.
    pub fn merge_buffer(&mut self, buffer: &AccumulationBuffer) {
        assert!(
            self.width == buffer.width && self.height == buffer.height,
            "cannot merge a {}x{} buffer into a {}x{} buffer",
            buffer.width,
            buffer.height,
            self.width,
            self.height
        );
        for (mine, theirs) in izip!(
            &mut [&mut self.red, &mut self.green, &mut self.blue, &mut self.count],
            &[&buffer.red, &buffer.green, &buffer.blue, &buffer.count]
        ) {
            for (m, t) in mine.iter_mut().zip(theirs.iter()) {
                *m += t.load(Ordering::Relaxed);
            }
        }
    }
}
