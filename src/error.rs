//! Errors surfaced at the boundary: a bad scene or color map file, or
//! render settings that can't produce an image.  Programming faults
//! (an unset bounding box, merging buffers of different sizes) panic
//! instead.

use failure::Fail;

/// Anything that prevents a Config from being built.  None of these
/// are recoverable; the scene must be fixed.
#[derive(Debug, Fail)]
pub enum ConfigError {
    /// The file couldn't be read.
    #[fail(display = "cannot read {}: {}", path, cause)]
    Io {
        /// The file that failed.
        path: String,
        /// What the operating system said.
        #[cause]
        cause: std::io::Error,
    },

    /// A scene line started with a word we don't know.
    #[fail(display = "line {}: unknown keyword '{}'", line, keyword)]
    UnknownKeyword {
        /// One-based line number.
        line: usize,
        /// The offending word.
        keyword: String,
    },

    /// A transform kind missing from the dispatch table.
    #[fail(display = "unknown transform kind '{}'", _0)]
    UnknownTransform(String),

    /// A transform was given the wrong number of coefficients.
    #[fail(
        display = "transform '{}' takes {} coefficients, found {}",
        kind, expected, found
    )]
    CoefficientCount {
        /// The transform kind.
        kind: String,
        /// How many it takes.
        expected: usize,
        /// How many it got.
        found: usize,
    },

    /// A field that should have been a number.
    #[fail(display = "line {}: cannot parse '{}' as a number", line, text)]
    BadNumber {
        /// One-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },

    /// A line with the wrong number of fields.
    #[fail(display = "line {}: {}", line, reason)]
    Malformed {
        /// One-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Color values index the color map and must lie in [0, 1].
    #[fail(display = "color value {} is outside [0, 1]", _0)]
    ColorValue(f64),

    /// Probabilities are weights and can't be negative.
    #[fail(display = "probability {} is negative", _0)]
    NegativeProbability(f64),

    /// Explicit probabilities have to add up to one.
    #[fail(display = "probabilities sum to {}, not 1", _0)]
    ProbabilitySum(f64),

    /// A scene with nothing to iterate.
    #[fail(display = "no transforms defined")]
    NoTransforms,

    /// The scene named a color map that was never loaded.
    #[fail(display = "no color map named '{}'", _0)]
    UnknownColorMap(String),

    /// No built-in scene by that name.
    #[fail(display = "no preset named '{}'", _0)]
    UnknownPreset(String),

    /// A color map block was cut short or had a bad line.
    #[fail(display = "color map '{}', line {}: {}", title, line, reason)]
    ColorMap {
        /// The title of the block being read.
        title: String,
        /// One-based line number in the file.
        line: usize,
        /// What was wrong.
        reason: String,
    },
}

/// Anything that prevents a render from starting or finishing.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// Width, height or thread count out of range.
    #[fail(display = "invalid render settings: {}", _0)]
    Settings(String),

    /// A worker thread or the display sink panicked; the buffers can't
    /// be trusted.
    #[fail(display = "a render thread panicked")]
    Panicked,

    /// The calibration trajectory left the finite plane, so there is no
    /// window to render.
    #[fail(
        display = "the trajectory escaped to infinity after {} iterations; the scene has no bounded attractor",
        _0
    )]
    Unbounded(usize),
}
