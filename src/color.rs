//! Hex colour parsing, step interpolation and the clamped linear colour scale.

use crate::domain::ColorDomain;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("malformed colour {input:?}: expected six hex digits like #e4fffb")]
    Format { input: String },
    #[error("invalid colour configuration: {0}")]
    Configuration(String),
}

/// 8-bit RGB triple. Displays as CSS `rgb(r,g,b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channel-wise blend at `t` in `[0, 1]`.
    fn mix(self, other: Rgb, t: f64) -> Rgb {
        let [r, g, b] = [0, 1, 2].map(|i| blend(self.channels()[i], other.channels()[i], t));
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ColorError::Format { input: s.to_string() };
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| malformed());
        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

// Halves round towards +inf, so -0.5 becomes 0 rather than -1.
fn blend(start: u8, end: u8, t: f64) -> u8 {
    let start = f64::from(start);
    let value = start + (f64::from(end) - start) * t;
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Produces `steps + 1` colours from `color1` to `color2` inclusive.
pub fn interpolate_color(color1: &str, color2: &str, steps: usize) -> Result<Vec<Rgb>, ColorError> {
    if steps == 0 {
        return Err(ColorError::Configuration(
            "interpolation needs at least one step".to_string(),
        ));
    }
    let start: Rgb = color1.parse()?;
    let end: Rgb = color2.parse()?;

    Ok((0..=steps)
        .map(|i| start.mix(end, i as f64 / steps as f64))
        .collect())
}

/// Linear scale from `[min(domain), max(domain)]` onto `[color1, color2]`.
/// Values outside the domain clamp to the range endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    low: f64,
    high: f64,
    start: Rgb,
    end: Rgb,
}

impl ColorScale {
    pub fn new(domain: &ColorDomain, color1: &str, color2: &str) -> Result<Self, ColorError> {
        Ok(Self {
            low: domain.min(),
            high: domain.max(),
            start: color1.parse()?,
            end: color2.parse()?,
        })
    }

    pub fn color(&self, value: f64) -> Rgb {
        if !value.is_finite() {
            return self.start;
        }
        let t = ((value - self.low) / (self.high - self.low)).clamp(0.0, 1.0);
        self.start.mix(self.end, t)
    }
}
