#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Chaos game renderer
//!
//! An iterated function system is a handful of contracting maps of the
//! plane.  Their attractor is the one set that the union of the maps
//! carries onto itself, and it is usually a fractal: Sierpinski's
//! triangle, Barnsley's fern, and so on.
//!
//! The chaos game draws the attractor by starting anywhere, picking one
//! of the maps at random (weighted by a probability), applying it, and
//! repeating.  After a few thousand iterations the point is on the
//! attractor to within floating-point precision, and every point it
//! visits from then on is plotted.  Each map also carries a color
//! value; the point's color is a running average of the values of the
//! maps that brought it there, so the picture shows which map "owns"
//! each part of the attractor.
//!
//! Every worker thread plays its own game into its own buffer.  The
//! buffers are summed, brightened on a log scale so that sparsely hit
//! regions still show, and gamma-encoded into an image.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;
extern crate rand;

macro_rules! t {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition {
            $_true
        } else {
            $_false
        }
    };
}

pub mod accumulate;
pub mod calibrate;
pub mod colormap;
pub mod composite;
pub mod config;
pub mod error;
pub mod output;
pub mod planes;
pub mod presets;
pub mod render;
pub mod selector;
pub mod transform;
pub mod variations;
pub mod worker;

pub use colormap::{ColorMap, ColorMaps};
pub use composite::Frame;
pub use config::Config;
pub use error::{ConfigError, RenderError};
pub use render::{DisplaySink, RenderSettings, Renderer};
pub use transform::{Point, Transform};
pub use worker::CancelToken;
