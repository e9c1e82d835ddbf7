//! Finding the window onto the attractor before the real render.
//!
//! A short single-threaded trajectory is run, the fuse discarded, and
//! the remaining points recorded.  Their strict bounding box is easy but
//! a single excursion can waste most of the image on empty space, so
//! the box used for rendering drops the outermost tenth of a percent of
//! the samples on each side of each axis.

use crate::config::Config;
use crate::error::RenderError;
use crate::planes::BoundingBox;
use crate::transform::Point;
use crate::worker::FUSE_LENGTH;
use rand::Rng;
use std::cmp::Ordering;

/// Points recorded after the fuse.
pub const SAMPLE_COUNT: usize = 10_000;

/// Percentage of samples dropped from each end of each axis.
pub const PERCENTILE: f64 = 0.1;

/// Fraction the boxes are grown by around their centers.
pub const MARGIN: f64 = 0.05;

/// The two boxes calibration produces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Calibration {
    /// Every sample, grown and squared.
    pub strict: BoundingBox,
    /// The samples minus the outliers, grown and squared.  This is the
    /// one to render with.
    pub percentile: BoundingBox,
}

fn finish(mut bbox: BoundingBox) -> BoundingBox {
    bbox.grow_by(MARGIN);
    bbox.make_square();
    bbox
}

fn is_finite(p: Point) -> bool {
    p.re.is_finite() && p.im.is_finite()
}

// Only ever called on finite samples, where partial_cmp is total.
fn sort(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Run the calibration trajectory from the origin, drawing from `rng`.
/// Fails if the trajectory leaves the finite plane, or the window
/// around it is too large to represent.
pub fn calibrate<R: Rng + ?Sized>(
    config: &Config,
    rng: &mut R,
) -> Result<Calibration, RenderError> {
    let mut point = Point::new(0.0, 0.0);
    let mut strict = BoundingBox::new();
    let mut xs = Vec::with_capacity(SAMPLE_COUNT);
    let mut ys = Vec::with_capacity(SAMPLE_COUNT);

    for i in 0..FUSE_LENGTH as usize + SAMPLE_COUNT {
        let transform = config.selector().choose(rng);
        point = config.variations().transform(transform.transform(point));
        if !is_finite(point) {
            return Err(RenderError::Unbounded(i + 1));
        }
        if i >= FUSE_LENGTH as usize {
            strict.grow(point);
            xs.push(point.re);
            ys.push(point.im);
        }
    }

    sort(&mut xs);
    sort(&mut ys);
    let skip = (PERCENTILE * SAMPLE_COUNT as f64 / 100.0).round() as usize;
    let last = SAMPLE_COUNT - skip - 1;
    let mut percentile = finish(BoundingBox::from_corners(
        Point::new(xs[skip], ys[skip]),
        Point::new(xs[last], ys[last]),
    ));

    let strict = finish(strict);
    if !is_finite(strict.min())
        || !is_finite(strict.max())
        || !percentile.width().is_finite()
    {
        return Err(RenderError::Unbounded(FUSE_LENGTH as usize + SAMPLE_COUNT));
    }

    // A single-point attractor leaves nothing to normalize against.
    if percentile.width() == 0.0 {
        warn!(
            "the attractor is a single point at {}; using a unit window around it",
            percentile.center()
        );
        let center = percentile.center();
        let half = Point::new(0.5, 0.5);
        percentile = BoundingBox::from_corners(center - half, center + half);
    }

    Ok(Calibration { strict, percentile })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::ColorMap;
    use crate::selector::WeightedSelector;
    use crate::transform::Transform;
    use crate::variations::VariationBlend;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn config(transforms: Vec<Transform>) -> Config {
        Config::new(
            WeightedSelector::new(transforms),
            VariationBlend::default(),
            Arc::new(ColorMap::grayscale()),
        )
    }

    fn sierpinski() -> Config {
        config(vec![
            Transform::average(0.2, 0.3),
            Transform::average(0.8, 0.6),
            Transform::average(0.4, 0.9),
        ])
    }

    #[test]
    fn percentile_box_stays_near_the_hull() {
        let mut hull = BoundingBox::new();
        for &(x, y) in &[(0.2, 0.3), (0.8, 0.6), (0.4, 0.9)] {
            hull.grow(Point::new(x, y));
        }
        hull.grow_by(MARGIN);

        for seed in 0..5 {
            let c = calibrate(&sierpinski(), &mut StdRng::seed_from_u64(seed)).unwrap();
            let b = c.percentile;
            assert!((b.width() - b.height()).abs() < 1e-12);
            let eps = 1e-9;
            assert!(b.min().re >= hull.min().re - eps && b.min().im >= hull.min().im - eps);
            assert!(b.max().re <= hull.max().re + eps && b.max().im <= hull.max().im + eps);
        }
    }

    #[test]
    fn percentile_box_sits_inside_strict_box() {
        let c = calibrate(&sierpinski(), &mut StdRng::seed_from_u64(9)).unwrap();
        assert!(c.strict.contains(c.percentile.min()));
        assert!(c.strict.contains(c.percentile.max()));
        assert!(c.percentile.width() <= c.strict.width());
    }

    #[test]
    fn rare_outliers_do_not_stretch_the_percentile_box() {
        // Two fixed points, and a jump far away on one slot in 1024.
        let scene = config(vec![
            Transform::affine([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).with_probability(0.4995),
            Transform::affine([0.0, 0.0, 0.0, 0.0, 1.0, 1.0]).with_probability(0.4995),
            Transform::affine([0.0, 0.0, 0.0, 0.0, 1000.0, 1000.0]).with_probability(0.001),
        ]);
        let skip = (PERCENTILE * SAMPLE_COUNT as f64 / 100.0).round() as usize;
        let far = &scene.selector().transforms()[2];

        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let jumps = (0..FUSE_LENGTH as usize + SAMPLE_COUNT)
                .filter(|&i| {
                    let t = scene.selector().choose(&mut rng);
                    i >= FUSE_LENGTH as usize && std::ptr::eq(t, far)
                })
                .count();

            let c = calibrate(&scene, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(c.strict.width() > 900.0, jumps > 0);
            if jumps <= skip {
                assert!((c.percentile.width() - 1.05).abs() < 1e-12);
            } else {
                assert!(c.percentile.width() > 900.0);
            }
        }
    }

    #[test]
    fn single_point_attractor_gets_a_unit_window() {
        let c = calibrate(
            &config(vec![Transform::average(1.0, 1.0).with_probability(1.0)]),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert_eq!(c.percentile.width(), 1.0);
        assert_eq!(c.percentile.center(), Point::new(1.0, 1.0));
    }

    #[test]
    fn same_seed_same_window() {
        let a = calibrate(&sierpinski(), &mut StdRng::seed_from_u64(11)).unwrap();
        let b = calibrate(&sierpinski(), &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn escaping_trajectory_is_an_error() {
        // Grows by 7% a step, so it overflows shortly after the fuse.
        let growth = Transform::affine([1.07, 0.0, 0.0, 1.07, 1.0, 1.0]).with_probability(1.0);
        let scene = config(vec![growth]);
        match calibrate(&scene, &mut StdRng::seed_from_u64(1)) {
            Err(RenderError::Unbounded(iteration)) => {
                assert!(iteration > FUSE_LENGTH as usize, "escaped at {}", iteration)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nan_trajectory_is_an_error() {
        let scene = Config::new(
            WeightedSelector::new(vec![Transform::average(0.5, 0.5).with_probability(1.0)]),
            VariationBlend::new([std::f64::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            Arc::new(ColorMap::grayscale()),
        );
        match calibrate(&scene, &mut StdRng::seed_from_u64(1)) {
            Err(RenderError::Unbounded(1)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
