//! A blend of nonlinear variations applied after every transform.

use crate::transform::Point;
use std::f64::consts::PI;

const EPS: f64 = 1e-10;

/// The seven blend weights, in the order identity, sinusoidal,
/// inversion, swirl, horseshoe, polar and bent.  A basis contributes
/// only when its weight is strictly positive; this isn't a normalized
/// blend.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VariationBlend {
    weights: [f64; 7],
}

impl Default for VariationBlend {
    /// The identity: only the linear basis, at full weight.
    fn default() -> Self {
        VariationBlend::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }
}

/// atan2(x, y), or 0 when the point is too close to the origin for the
/// angle to mean anything.
#[inline]
fn angle(x: f64, y: f64) -> f64 {
    if x < -EPS || x > EPS || y < -EPS || y > EPS {
        x.atan2(y)
    } else {
        0.0
    }
}

#[inline]
fn rotate(x: f64, y: f64, theta: f64) -> (f64, f64) {
    let (s, c) = theta.sin_cos();
    (s * x - c * y, c * x + s * y)
}

impl VariationBlend {
    /// Constructor.
    pub fn new(weights: [f64; 7]) -> Self {
        VariationBlend { weights }
    }

    /// The weights, in basis order.
    pub fn weights(&self) -> &[f64; 7] {
        &self.weights
    }

    /// Replace the point with the weighted sum of every enabled basis.
    pub fn transform(&self, p: Point) -> Point {
        let [a, b, c, d, e, f, g] = self.weights;
        let (tx, ty) = (p.re, p.im);
        let (mut x, mut y) = (0.0, 0.0);

        if a > 0.0 {
            x += a * tx;
            y += a * ty;
        }

        if b > 0.0 {
            x += b * tx.sin();
            y += b * ty.sin();
        }

        if c > 0.0 {
            let r2 = tx * tx + ty * ty + 1e-6;
            x += c * tx / r2;
            y += c * ty / r2;
        }

        if d > 0.0 {
            let (nx, ny) = rotate(tx, ty, tx * tx + ty * ty);
            x += d * nx;
            y += d * ny;
        }

        if e > 0.0 {
            let (nx, ny) = rotate(tx, ty, angle(tx, ty));
            x += e * nx;
            y += e * ny;
        }

        if f > 0.0 {
            x += f * angle(tx, ty) / PI;
            y += f * ((tx * tx + ty * ty).sqrt() - 1.0);
        }

        if g > 0.0 {
            x += g * t!(tx < 0.0, tx * 2.0, tx);
            y += g * t!(ty < 0.0, ty / 2.0, ty);
        }

        Point::new(x, y)
    }
}
