//! Color maps: 256 gamma-encoded RGB entries, converted to 16-bit
//! linear light when loaded so that workers can add colors together.
//!
//! A color map file holds any number of maps, each a title line
//! followed by 256 lines of `red green blue` bytes, with a single blank
//! line between maps.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Entries in every color map.
pub const ENTRY_COUNT: usize = 256;

/// Name of the color map that is always present.
pub const GRAYSCALE: &str = "grayscale";

/// Convert a gamma-encoded byte to 16-bit linear light.
#[inline]
pub fn to_linear(gamma: u8) -> u16 {
    let fraction = (f64::from(gamma) + 0.5) / 256.0;
    (65535.99 * fraction * fraction).round() as u16
}

/// An immutable table of linear-light colors.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    title: String,
    linear: Vec<(u16, u16, u16)>,
}

impl ColorMap {
    /// Builds the map from exactly 256 gamma-encoded triples.
    pub fn new(title: &str, gamma: &[(u8, u8, u8)]) -> Result<Self, ConfigError> {
        if gamma.len() != ENTRY_COUNT {
            return Err(ConfigError::ColorMap {
                title: title.to_string(),
                line: 0,
                reason: format!("expected {} entries, found {}", ENTRY_COUNT, gamma.len()),
            });
        }
        Ok(ColorMap {
            title: title.to_string(),
            linear: gamma
                .iter()
                .map(|&(r, g, b)| (to_linear(r), to_linear(g), to_linear(b)))
                .collect(),
        })
    }

    /// Black to white.
    pub fn grayscale() -> Self {
        ColorMap {
            title: GRAYSCALE.to_string(),
            linear: (0..ENTRY_COUNT)
                .map(|i| {
                    let v = to_linear(i as u8);
                    (v, v, v)
                })
                .collect(),
        }
    }

    /// The title line.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The linear-light color at `index`, 0 to 255.
    #[inline]
    pub fn get(&self, index: usize) -> (u16, u16, u16) {
        self.linear[index]
    }
}

/// An immutable registry of color maps by title.  The grayscale map is
/// always present.
#[derive(Clone, Debug)]
pub struct ColorMaps {
    maps: HashMap<String, Arc<ColorMap>>,
}

impl Default for ColorMaps {
    fn default() -> Self {
        let mut maps = HashMap::new();
        maps.insert(GRAYSCALE.to_string(), Arc::new(ColorMap::grayscale()));
        ColorMaps { maps }
    }
}

fn parse_triple(line: &str) -> Option<(u8, u8, u8)> {
    let mut fields = line.split_whitespace().map(|f| f.parse::<u8>());
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Some((r, g, b)),
        _ => None,
    }
}

impl ColorMaps {
    /// Read every map in the file, on top of the built-in ones.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|cause| ConfigError::Io {
            path: path.display().to_string(),
            cause,
        })?;
        ColorMaps::parse(&text)
    }

    /// Parse every map in the text, on top of the built-in ones.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut registry = ColorMaps::default();
        let mut lines = text.lines().enumerate().peekable();

        while let Some((number, title)) = lines.next() {
            let title = title.trim();
            if title.is_empty() {
                return Err(ConfigError::ColorMap {
                    title: String::new(),
                    line: number + 1,
                    reason: "expected a title".to_string(),
                });
            }

            let mut gamma = Vec::with_capacity(ENTRY_COUNT);
            for _ in 0..ENTRY_COUNT {
                let (number, line) = lines.next().ok_or_else(|| ConfigError::ColorMap {
                    title: title.to_string(),
                    line: number + 1 + gamma.len(),
                    reason: "unexpected end of file".to_string(),
                })?;
                let triple = parse_triple(line).ok_or_else(|| ConfigError::ColorMap {
                    title: title.to_string(),
                    line: number + 1,
                    reason: format!("expected 'red green blue', found '{}'", line),
                })?;
                gamma.push(triple);
            }

            match lines.next() {
                None => {}
                Some((_, blank)) if blank.trim().is_empty() => {}
                Some((number, line)) => {
                    return Err(ConfigError::ColorMap {
                        title: title.to_string(),
                        line: number + 1,
                        reason: format!("line should have been blank: '{}'", line),
                    });
                }
            }

            let map = ColorMap::new(title, &gamma)?;
            debug!("loaded color map '{}'", title);
            registry.maps.insert(title.to_string(), Arc::new(map));

            // Trailing blank lines at the end of the file.
            while let Some((_, line)) = lines.peek() {
                if line.trim().is_empty() {
                    lines.next();
                } else {
                    break;
                }
            }
        }

        Ok(registry)
    }

    /// The map with this title.
    pub fn get(&self, name: &str) -> Result<Arc<ColorMap>, ConfigError> {
        self.maps
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownColorMap(name.to_string()))
    }

    /// Titles of every loaded map, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.maps.keys().map(|k| k.as_str()).collect();
        names.sort();
        names
    }
}
