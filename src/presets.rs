//! Built-in scenes, so there's something to look at without writing a
//! scene file first.  They're kept as scene text and go through the same
//! parser as anything read from disk.

use crate::colormap::ColorMaps;
use crate::config::Config;
use crate::error::ConfigError;

const FERN: &str = "
# Barnsley's fern.
variations 1 0 0 0 0 0 0
affine 0.10 0.1  0.00  0.00  0.00 0.16 0 0.00
affine 0.08 0.3  0.20 -0.26  0.23 0.22 0 1.60
affine 0.08 0.6 -0.15  0.28  0.26 0.24 0 0.44
affine 0.74 0.9  0.75  0.04 -0.04 0.85 0 1.60
";

const SIERPINSKI: &str = "
# Sierpinski's triangle, averaging toward three corners.
variations 1 0 0 0 0 0 0
average 0.3333333 0.0 0.2 0.3
average 0.3333333 1.0 0.8 0.6
average 0.3333334 0.5 0.4 0.9
";

const LEAF: &str = "
# Four corners of a diamond, bent by the horseshoe.
variations 0 0 0 0 1 0 0
average 0.25 0.1  0.0  0.9
average 0.25 0.3  0.3  0.3
average 0.25 0.6 -0.3 -0.3
average 0.25 0.9  0.0 -0.9
";

const SCENES: &[(&str, &str)] = &[("fern", FERN), ("sierpinski", SIERPINSKI), ("leaf", LEAF)];

/// The names of every preset.
pub fn names() -> Vec<&'static str> {
    SCENES.iter().map(|(name, _)| *name).collect()
}

/// The scene text of a preset, to start a scene file from.
pub fn scene(name: &str) -> Option<&'static str> {
    SCENES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, text)| *text)
}

/// Build a preset.  Presets use the default `grayscale` map, which every
/// registry carries.
pub fn config(name: &str, maps: &ColorMaps) -> Result<Config, ConfigError> {
    match scene(name) {
        Some(text) => Config::parse(text, maps),
        None => Err(ConfigError::UnknownPreset(name.to_string())),
    }
}
