//! Contains the BoundingBox, a rectangle on the real plane that grows
//! to fit the points it is shown, and the PlaneMapper, which describes
//! the relationship between that rectangle and an integral plane of
//! pixels with its origin at the upper left.
use crate::transform::Point;
use std::fmt;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0; all values are non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the column, row of a pixel in an integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A rectangle on the real plane.  A new box is unset; the first call
/// to `grow` sets it to that single point.  Asking an unset box for its
/// size, center or a normalized coordinate is a programming error and
/// panics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    min: Point,
    max: Point,
    set: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::new()
    }
}

impl BoundingBox {
    /// An unset box.
    pub fn new() -> Self {
        BoundingBox {
            min: Point::new(0.0, 0.0),
            max: Point::new(0.0, 0.0),
            set: false,
        }
    }

    /// A box spanning the two corners.
    pub fn from_corners(leftlower: Point, rightupper: Point) -> Self {
        BoundingBox {
            min: leftlower,
            max: rightupper,
            set: true,
        }
    }

    /// Whether `grow` has been called at least once.
    pub fn is_set(&self) -> bool {
        self.set
    }

    /// Grow the box to include the point.
    pub fn grow(&mut self, p: Point) {
        if !self.set {
            self.min = p;
            self.max = p;
            self.set = true;
        } else {
            self.min.re = self.min.re.min(p.re);
            self.min.im = self.min.im.min(p.im);
            self.max.re = self.max.re.max(p.re);
            self.max.im = self.max.im.max(p.im);
        }
    }

    fn assert_set(&self) {
        assert!(self.set, "The bounding box is not initialized");
    }

    /// The left-lower corner.
    pub fn min(&self) -> Point {
        self.assert_set();
        self.min
    }

    /// The right-upper corner.
    pub fn max(&self) -> Point {
        self.assert_set();
        self.max
    }

    /// The horizontal extent.
    pub fn width(&self) -> f64 {
        self.assert_set();
        self.max.re - self.min.re
    }

    /// The vertical extent.
    pub fn height(&self) -> f64 {
        self.assert_set();
        self.max.im - self.min.im
    }

    /// The point half-way between the corners.
    pub fn center(&self) -> Point {
        self.assert_set();
        (self.min + self.max) / 2.0
    }

    /// Where `x` falls horizontally in the box, 0 at the left edge and 1
    /// at the right.
    pub fn normalize_x(&self, x: f64) -> f64 {
        (x - self.min.re) / self.width()
    }

    /// Where `y` falls vertically in the box, 0 at the bottom edge and 1
    /// at the top.
    pub fn normalize_y(&self, y: f64) -> f64 {
        (y - self.min.im) / self.height()
    }

    /// Whether the point lies inside or on the edge of the box.
    pub fn contains(&self, p: Point) -> bool {
        self.assert_set();
        p.re >= self.min.re && p.re <= self.max.re && p.im >= self.min.im && p.im <= self.max.im
    }

    /// Grow the box by the fraction around its center.  Negative
    /// fractions shrink it.
    pub fn grow_by(&mut self, fraction: f64) {
        let center = self.center();
        let half = Point::new(self.width(), self.height()) * (1.0 + fraction) / 2.0;
        self.min = center - half;
        self.max = center + half;
    }

    /// Make the box square by growing the narrower dimension around the
    /// center.
    pub fn make_square(&mut self) {
        let center = self.center();
        let (width, height) = (self.width(), self.height());
        if width > height {
            self.min.im = center.im - width / 2.0;
            self.max.im = center.im + width / 2.0;
        } else {
            self.min.re = center.re - height / 2.0;
            self.max.re = center.re + height / 2.0;
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.set {
            write!(f, "not set")
        } else {
            write!(
                f,
                "({}, {})-({}, {})",
                self.min.re, self.min.im, self.max.re, self.max.im
            )
        }
    }
}

/// Maps points inside a bounding box onto an integral plane.  Y is
/// inverted: increasing y on the real plane moves up, while increasing
/// rows on the integral plane move down.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The size of the integral plane.
    pub integral_plane: IntegralPlane,
    /// The window on the real plane.
    pub bounds: BoundingBox,
    // The largest column and row, as floats.
    extents: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  The box must be set.
    pub fn new(width: usize, height: usize, bounds: BoundingBox) -> PlaneMapper {
        assert!(bounds.is_set(), "The bounding box is not initialized");
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            bounds,
            extents: (
                (width.max(1) - 1) as f64,
                (height.max(1) - 1) as f64,
            ),
        }
    }

    /// Map the point to the nearest pixel, or None if it lands outside
    /// the integral plane (or isn't a number at all).
    #[inline]
    pub fn point_to_pixel(&self, point: Point) -> Option<Pixel> {
        let left = (self.bounds.normalize_x(point.re) * self.extents.0).round();
        let top = ((1.0 - self.bounds.normalize_y(point.im)) * self.extents.1).round();
        if left >= 0.0
            && top >= 0.0
            && left < self.integral_plane.0 as f64
            && top < self.integral_plane.1 as f64
        {
            Some(Pixel(left as usize, top as usize))
        } else {
            None
        }
    }
}
