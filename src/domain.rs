use crate::color::ColorError;
use std::fmt;

/// Upper bound on generated thresholds; a legend cannot show more bands.
pub const MAX_THRESHOLDS: usize = 1024;

/// Strictly increasing percentage thresholds. `len() - 1` legend bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDomain {
    thresholds: Vec<f64>,
}

impl ColorDomain {
    pub fn new(thresholds: Vec<f64>) -> Result<Self, ColorError> {
        if thresholds.len() < 2 {
            return Err(ColorError::Configuration(format!(
                "colour domain needs at least two thresholds, got {}",
                thresholds.len()
            )));
        }
        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(ColorError::Configuration(
                "colour domain thresholds must be finite".to_string(),
            ));
        }
        if let Some(pair) = thresholds.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ColorError::Configuration(format!(
                "colour domain must be strictly increasing ({} is followed by {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self { thresholds })
    }

    /// `ceil(limit / step)` thresholds `start, start + step, ...`.
    ///
    /// With the defaults (3, 9, 72) this yields `3, 12, ..., 66`.
    pub fn stepped(start: f64, step: f64, limit: f64) -> Result<Self, ColorError> {
        if !(step > 0.0) {
            return Err(ColorError::Configuration(format!(
                "domain step must be positive, got {step}"
            )));
        }
        let count = (limit / step).ceil();
        if !(count.is_finite() && count >= 0.0) {
            return Err(ColorError::Configuration(format!(
                "domain limit {limit} does not give a usable threshold count"
            )));
        }
        if count > MAX_THRESHOLDS as f64 {
            return Err(ColorError::Configuration(format!(
                "domain limit {limit} with step {step} gives {count} thresholds, at most {MAX_THRESHOLDS} are allowed"
            )));
        }
        Self::new((0..count as usize).map(|i| i as f64 * step + start).collect())
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn min(&self) -> f64 {
        self.thresholds[0]
    }

    pub fn max(&self) -> f64 {
        self.thresholds[self.thresholds.len() - 1]
    }

    pub fn band_count(&self) -> usize {
        self.thresholds.len() - 1
    }
}

impl fmt::Display for ColorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.thresholds.iter().map(|t| format!("{t}%")).collect();
        write!(f, "[{}]", labels.join(", "))
    }
}
