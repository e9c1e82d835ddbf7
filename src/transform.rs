//! The maps of an iterated function system.  Each one carries a
//! selection weight and a position in the color map alongside its
//! coefficients.
//!
//! We don't need a separate point type:
//! a single Complex number is a point, with the real part as x and the
//! imaginary part as y.

use crate::error::ConfigError;
use num::Complex;

/// A point on the real plane.
pub type Point = Complex<f64>;

/// The closed set of coordinate maps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Kind {
    /// Move half-way toward a fixed target.
    Average {
        /// The target the point is pulled toward.
        target: Point,
    },
    /// Treat the point as a complex number and compute S·z + (1−S)·A,
    /// a spiral contraction toward A when |S| < 1.
    Complex {
        /// The scale and rotation.
        s: Complex<f64>,
        /// The fixed point.
        a: Complex<f64>,
    },
    /// The matrix `| a b e |` over `| c d f |`, multiplied with `| x y 1 |`.
    Affine {
        /// The six coefficients, in the order a, b, c, d, e, f.
        coefficients: [f64; 6],
        /// When set, the result is divided by its squared magnitude
        /// plus 1e-6.
        inverse: bool,
    },
}

impl Kind {
    /// Apply the map to a point.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        match *self {
            Kind::Average { target } => (p + target) / 2.0,
            Kind::Complex { s, a } => s * p + (Complex::new(1.0, 0.0) - s) * a,
            Kind::Affine {
                coefficients: [a, b, c, d, e, f],
                inverse,
            } => {
                let q = Complex::new(a * p.re + b * p.im + e, c * p.re + d * p.im + f);
                if inverse {
                    q / (q.norm_sqr() + 1e-6)
                } else {
                    q
                }
            }
        }
    }
}

/// One map plus its probability of being chosen and its value (0 to 1)
/// in the color map.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    kind: Kind,
    probability: f64,
    color_value: f64,
}

impl Transform {
    /// A transform with no probability yet and color value 0.
    pub fn new(kind: Kind) -> Self {
        Transform {
            kind,
            probability: 0.0,
            color_value: 0.0,
        }
    }

    /// Shorthand for an Average transform toward (tx, ty).
    pub fn average(tx: f64, ty: f64) -> Self {
        Transform::new(Kind::Average {
            target: Complex::new(tx, ty),
        })
    }

    /// Shorthand for a Complex transform with S = (sr, si) and A = (ar, ai).
    pub fn complex(sr: f64, si: f64, ar: f64, ai: f64) -> Self {
        Transform::new(Kind::Complex {
            s: Complex::new(sr, si),
            a: Complex::new(ar, ai),
        })
    }

    /// Shorthand for a plain Affine transform.
    pub fn affine(coefficients: [f64; 6]) -> Self {
        Transform::new(Kind::Affine {
            coefficients,
            inverse: false,
        })
    }

    /// Shorthand for the Affine transform that divides by the squared
    /// magnitude of its result.
    pub fn affine_inverse(coefficients: [f64; 6]) -> Self {
        Transform::new(Kind::Affine {
            coefficients,
            inverse: true,
        })
    }

    /// Builder-style setter for the selection weight.
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Builder-style setter for the color map value.
    pub fn with_color_value(mut self, color_value: f64) -> Self {
        self.color_value = color_value;
        self
    }

    pub(crate) fn set_probability(&mut self, probability: f64) {
        self.probability = probability;
    }

    /// The selection weight.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// The position in the color map, 0 to 1.
    pub fn color_value(&self) -> f64 {
        self.color_value
    }

    /// The underlying map.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Apply the map to a point.
    #[inline]
    pub fn transform(&self, p: Point) -> Point {
        self.kind.apply(p)
    }
}

type Constructor = fn(&[f64]) -> Transform;

fn build_average(c: &[f64]) -> Transform {
    Transform::average(c[0], c[1])
}

fn build_complex(c: &[f64]) -> Transform {
    Transform::complex(c[0], c[1], c[2], c[3])
}

fn build_affine(c: &[f64]) -> Transform {
    Transform::affine([c[0], c[1], c[2], c[3], c[4], c[5]])
}

fn build_affine_inverse(c: &[f64]) -> Transform {
    Transform::affine_inverse([c[0], c[1], c[2], c[3], c[4], c[5]])
}

/// Name, coefficient count and constructor for every transform kind a
/// scene file may name.
pub const KINDS: &[(&str, usize, Constructor)] = &[
    ("average", 2, build_average),
    ("complex", 4, build_complex),
    ("affine", 6, build_affine),
    ("affine-inverse", 6, build_affine_inverse),
];

/// Look the kind name up in the dispatch table and build a transform
/// from its coefficients.
pub fn from_name(name: &str, coefficients: &[f64]) -> Result<Transform, ConfigError> {
    let &(_, count, constructor) = KINDS
        .iter()
        .find(|(kind, _, _)| *kind == name)
        .ok_or_else(|| ConfigError::UnknownTransform(name.to_string()))?;
    if coefficients.len() != count {
        return Err(ConfigError::CoefficientCount {
            kind: name.to_string(),
            expected: count,
            found: coefficients.len(),
        });
    }
    Ok(constructor(coefficients))
}
