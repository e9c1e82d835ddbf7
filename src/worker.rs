//! The chaos game itself.  A worker owns a random stream and a running
//! point, and plots every point the trajectory visits into its own
//! accumulation buffer.

use crate::accumulate::AccumulationBuffer;
use crate::config::Config;
use crate::planes::{Pixel, PlaneMapper};
use crate::transform::Point;
use num::clamp;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Iterations at the start of every trajectory that aren't plotted,
/// while the point settles onto the attractor.
pub const FUSE_LENGTH: u64 = 10_000;

/// A shared flag asking every worker to stop.  Workers check it once
/// per iteration and finish the iteration they're on.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token nobody has cancelled yet.
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Ask every holder of the token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether `cancel` has been called on any clone of this token.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One trajectory.  The config, the plane and the buffer are borrowed;
/// the random stream, the point and the running color are the worker's
/// own.
pub struct Worker<'a> {
    config: &'a Config,
    plane: &'a PlaneMapper,
    buffer: &'a AccumulationBuffer,
    rng: StdRng,
    point: Point,
    color_value: f64,
    iteration: u64,
}

impl<'a> Worker<'a> {
    /// Starts at the origin with color value 0.  The buffer must have the
    /// same dimensions as the plane.
    pub fn new(
        config: &'a Config,
        plane: &'a PlaneMapper,
        buffer: &'a AccumulationBuffer,
        seed: u64,
    ) -> Self {
        assert!(
            plane.integral_plane.0 == buffer.width() && plane.integral_plane.1 == buffer.height(),
            "the buffer doesn't match the plane"
        );
        Worker {
            config,
            plane,
            buffer,
            rng: StdRng::seed_from_u64(seed),
            point: Point::new(0.0, 0.0),
            color_value: 0.0,
            iteration: 0,
        }
    }

    /// The current point of the trajectory.
    pub fn point(&self) -> Point {
        self.point
    }

    /// The running color value, 0 to 1.
    pub fn color_value(&self) -> f64 {
        self.color_value
    }

    /// Iterations run so far, fuse included.
    pub fn iterations(&self) -> u64 {
        self.iteration
    }

    /// Run a single iteration: pick a transform, move the point, blend
    /// the color, and plot it if we're past the fuse.
    #[inline]
    pub fn step(&mut self) {
        let config = self.config;
        let transform = config.selector().choose(&mut self.rng);
        self.point = config.variations().transform(transform.transform(self.point));

        // Move half-way to the new color value.
        self.color_value = (self.color_value + transform.color_value()) / 2.0;

        if self.iteration >= FUSE_LENGTH {
            if let Some(Pixel(x, y)) = self.plane.point_to_pixel(self.point) {
                let index = clamp((self.color_value * 255.0).round(), 0.0, 255.0) as usize;
                self.buffer.touch(x, y, config.color_map().get(index));
            }
        }
        self.iteration += 1;
    }

    /// Run until the worker has done `limit` iterations in total, or
    /// forever if there is no limit, stopping early if the token is
    /// cancelled.  Returns the number of iterations this call ran.
    pub fn run(&mut self, limit: Option<u64>, cancel: &CancelToken) -> u64 {
        let start = self.iteration;
        while !cancel.is_cancelled() {
            if let Some(limit) = limit {
                if self.iteration >= limit {
                    break;
                }
            }
            self.step();
        }
        self.iteration - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::ColorMap;
    use crate::planes::BoundingBox;
    use crate::selector::WeightedSelector;
    use crate::transform::Transform;
    use crate::variations::VariationBlend;
    use std::sync::Arc;

    fn sierpinski() -> Config {
        Config::new(
            WeightedSelector::new(vec![
                Transform::average(0.2, 0.3).with_color_value(0.0),
                Transform::average(0.8, 0.6).with_color_value(1.0),
                Transform::average(0.4, 0.9).with_color_value(0.5),
            ]),
            VariationBlend::default(),
            Arc::new(ColorMap::grayscale()),
        )
    }

    fn plane(size: usize) -> PlaneMapper {
        PlaneMapper::new(
            size,
            size,
            BoundingBox::from_corners(Point::new(0.1, 0.2), Point::new(0.9, 1.0)),
        )
    }

    #[test]
    fn nothing_is_plotted_during_the_fuse() {
        let config = sierpinski();
        let plane = plane(32);
        let buffer = AccumulationBuffer::new(32, 32);
        let mut worker = Worker::new(&config, &plane, &buffer, 1);
        assert_eq!(worker.run(Some(FUSE_LENGTH), &CancelToken::new()), FUSE_LENGTH);
        assert_eq!(buffer.snapshot().hits(), 0);
        assert_eq!(worker.run(Some(FUSE_LENGTH + 500), &CancelToken::new()), 500);
        assert_eq!(buffer.snapshot().hits(), 500);
    }

    #[test]
    fn same_seed_same_buffer() {
        let config = sierpinski();
        let plane = plane(64);
        let render = |seed| {
            let buffer = AccumulationBuffer::new(64, 64);
            Worker::new(&config, &plane, &buffer, seed).run(Some(50_000), &CancelToken::new());
            buffer.snapshot()
        };
        let first = render(42);
        assert_eq!(first, render(42));
        assert_ne!(first, render(43));
    }

    #[test]
    fn cancelled_token_stops_before_the_first_iteration() {
        let config = sierpinski();
        let plane = plane(8);
        let buffer = AccumulationBuffer::new(8, 8);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(Worker::new(&config, &plane, &buffer, 1).run(None, &cancel), 0);
    }

    #[test]
    fn cancel_stops_an_unbounded_worker() {
        let config = sierpinski();
        let plane = plane(16);
        let buffer = AccumulationBuffer::new(16, 16);
        let cancel = CancelToken::new();
        crossbeam::scope(|spawner| {
            let handle = spawner.spawn(|_| Worker::new(&config, &plane, &buffer, 3).run(None, &cancel));
            while buffer.snapshot().hits() == 0 {
                std::thread::yield_now();
            }
            cancel.cancel();
            assert!(handle.join().unwrap() > FUSE_LENGTH);
        })
        .unwrap();
    }

    #[test]
    fn color_value_is_a_running_average() {
        let config = Config::new(
            WeightedSelector::new(vec![Transform::average(0.5, 0.5)
                .with_probability(1.0)
                .with_color_value(1.0)]),
            VariationBlend::default(),
            Arc::new(ColorMap::grayscale()),
        );
        let plane = plane(8);
        let buffer = AccumulationBuffer::new(8, 8);
        let mut worker = Worker::new(&config, &plane, &buffer, 1);
        worker.step();
        assert_eq!(worker.color_value(), 0.5);
        worker.step();
        assert_eq!(worker.color_value(), 0.75);
        worker.run(Some(FUSE_LENGTH + 10), &CancelToken::new());
        let h = buffer.snapshot();
        let white = u64::from(ColorMap::grayscale().get(255).0);
        let hit = h.count.iter().position(|&c| c > 0).unwrap();
        assert_eq!(h.count[hit], 10);
        assert_eq!(h.red[hit], 10 * white);
    }

    #[test]
    fn color_values_past_the_map_use_its_ends() {
        let config = Config::new(
            WeightedSelector::new(vec![
                Transform::average(0.3, 0.3).with_color_value(3.0),
                Transform::average(0.7, 0.7).with_color_value(-2.0),
            ]),
            VariationBlend::default(),
            Arc::new(ColorMap::grayscale()),
        );
        let plane = plane(8);
        let buffer = AccumulationBuffer::new(8, 8);
        let mut worker = Worker::new(&config, &plane, &buffer, 5);
        worker.run(Some(FUSE_LENGTH + 1000), &CancelToken::new());
        let h = buffer.snapshot();
        assert_eq!(h.hits(), 1000);
        let (black, white) = (ColorMap::grayscale().get(0).0, ColorMap::grayscale().get(255).0);
        for (&red, &count) in h.red.iter().zip(h.count.iter()) {
            assert!(red >= count * u64::from(black) && red <= count * u64::from(white));
        }
    }

    #[test]
    fn points_off_the_plane_are_dropped() {
        let config = Config::new(
            WeightedSelector::new(vec![Transform::average(5.0, 5.0).with_probability(1.0)]),
            VariationBlend::default(),
            Arc::new(ColorMap::grayscale()),
        );
        let plane = plane(8);
        let buffer = AccumulationBuffer::new(8, 8);
        Worker::new(&config, &plane, &buffer, 1).run(Some(FUSE_LENGTH + 100), &CancelToken::new());
        assert_eq!(buffer.snapshot().hits(), 0);
    }
}
