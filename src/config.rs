//! The scene: which transforms to iterate, the variation blend applied
//! after each one, and the color map to paint with.
//!
//! Scenes are read from a line-oriented text file.  Everything after a
//! `#` is a comment.  Each remaining line starts with a keyword:
//!
//! ```text
//! colormap NAME
//! variations a b c d e f g
//! average P C tx ty
//! complex P C sr si ar ai
//! affine P C a b c d e f
//! affine-inverse P C a b c d e f
//! ```
//!
//! where `P` is the probability of the transform and `C` its value in
//! the color map.  If any probability is zero, all transforms are made
//! equally likely; otherwise the probabilities must sum to one.

use crate::colormap::{ColorMap, ColorMaps, GRAYSCALE};
use crate::error::ConfigError;
use crate::selector::WeightedSelector;
use crate::transform::{self, KINDS};
use crate::variations::VariationBlend;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// How far the probabilities may stray from summing to exactly one.
const SUM_TOLERANCE: f64 = 1e-6;

/// Everything a render needs to know about the fractal.  Built once,
/// then shared read-only by every worker.
#[derive(Clone, Debug)]
pub struct Config {
    selector: WeightedSelector,
    variations: VariationBlend,
    color_map: Arc<ColorMap>,
}

fn numbers(fields: &[&str], line: usize) -> Result<Vec<f64>, ConfigError> {
    fields
        .iter()
        .map(|text| match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(ConfigError::BadNumber {
                line,
                text: text.to_string(),
            }),
        })
        .collect()
}

impl Config {
    /// Constructor.
    pub fn new(
        selector: WeightedSelector,
        variations: VariationBlend,
        color_map: Arc<ColorMap>,
    ) -> Self {
        Config {
            selector,
            variations,
            color_map,
        }
    }

    /// Read and parse a scene file.
    pub fn read<P: AsRef<Path>>(path: P, maps: &ColorMaps) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|cause| ConfigError::Io {
            path: path.display().to_string(),
            cause,
        })?;
        Config::parse(&text, maps)
    }

    /// Parse a scene, looking its color map up in `maps`.
    pub fn parse(text: &str, maps: &ColorMaps) -> Result<Self, ConfigError> {
        let mut transforms = Vec::new();
        let mut variations = None;
        let mut color_map = None;

        for (number, raw) in text.lines().enumerate() {
            let line = number + 1;
            let content = match raw.find('#') {
                Some(index) => &raw[..index],
                None => raw,
            }
            .trim();
            let fields: Vec<&str> = content.split_whitespace().collect();
            let (keyword, args) = match fields.split_first() {
                Some((keyword, args)) => (*keyword, args),
                None => continue,
            };

            match keyword {
                "colormap" => {
                    let name = content[keyword.len()..].trim();
                    if name.is_empty() {
                        return Err(ConfigError::Malformed {
                            line,
                            reason: "colormap needs a name".to_string(),
                        });
                    }
                    color_map = Some(name.to_string());
                }
                "variations" => {
                    let weights = numbers(args, line)?;
                    if weights.len() != 7 {
                        return Err(ConfigError::Malformed {
                            line,
                            reason: format!("variations takes 7 weights, found {}", weights.len()),
                        });
                    }
                    let mut blend = [0.0; 7];
                    blend.copy_from_slice(&weights);
                    variations = Some(VariationBlend::new(blend));
                }
                kind if KINDS.iter().any(|(name, _, _)| *name == kind) => {
                    let values = numbers(args, line)?;
                    if values.len() < 2 {
                        return Err(ConfigError::Malformed {
                            line,
                            reason: format!("{} needs a probability and a color value", kind),
                        });
                    }
                    let (probability, color_value) = (values[0], values[1]);
                    if probability < 0.0 {
                        return Err(ConfigError::NegativeProbability(probability));
                    }
                    if color_value < 0.0 || color_value > 1.0 {
                        return Err(ConfigError::ColorValue(color_value));
                    }
                    transforms.push(
                        transform::from_name(kind, &values[2..])?
                            .with_probability(probability)
                            .with_color_value(color_value),
                    );
                }
                _ => {
                    return Err(ConfigError::UnknownKeyword {
                        line,
                        keyword: keyword.to_string(),
                    });
                }
            }
        }

        if transforms.is_empty() {
            return Err(ConfigError::NoTransforms);
        }
        if transforms.iter().all(|t| t.probability() > 0.0) {
            let sum: f64 = transforms.iter().map(|t| t.probability()).sum();
            if (sum - 1.0).abs() > SUM_TOLERANCE {
                return Err(ConfigError::ProbabilitySum(sum));
            }
        }

        let variations = variations.unwrap_or_else(|| {
            warn!("no variations given; using the identity");
            VariationBlend::default()
        });
        let color_map = maps.get(color_map.as_ref().map_or(GRAYSCALE, |name| name.as_str()))?;
        info!(
            "scene has {} transforms, color map '{}'",
            transforms.len(),
            color_map.title()
        );

        Ok(Config::new(
            WeightedSelector::new(transforms),
            variations,
            color_map,
        ))
    }

    /// The transforms and their lookup table.
    pub fn selector(&self) -> &WeightedSelector {
        &self.selector
    }

    /// The blend applied after every transform.
    pub fn variations(&self) -> &VariationBlend {
        &self.variations
    }

    /// The color map.
    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }
}
