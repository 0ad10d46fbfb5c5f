use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds used in place of exact floating-point equality.
/// Omitted fields deserialize to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Near-zero / near-equal threshold for exact-value checks.
    pub exact: f64,
    /// Half-width, in degrees, of the band around 90° that counts as a right angle.
    pub right_angle_degrees: f64,
    /// Threshold for side-ratio checks on special triangles.
    pub ratio: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            exact: 1e-10,
            right_angle_degrees: 1.0,
            ratio: 1e-3,
        }
    }
}

impl Tolerances {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("exact", self.exact),
            ("right_angle_degrees", self.right_angle_degrees),
            ("ratio", self.ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::InvalidSettings(format!(
                    "tolerance {name} must be positive and finite (got {value})"
                )));
            }
        }
        Ok(())
    }

    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() < self.exact
    }

    pub fn near(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.exact
    }
}

/// Domain window and sample budget requested by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub samples: usize,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            y_min: -10.0,
            y_max: 10.0,
            samples: 400,
        }
    }
}

impl SampleWindow {
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.x_min, self.x_max, self.y_min, self.y_max];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidSettings(
                "window bounds must be finite".to_string(),
            ));
        }
        if self.x_min >= self.x_max {
            return Err(AnalysisError::InvalidSettings(format!(
                "x_min ({}) must be less than x_max ({})",
                self.x_min, self.x_max
            )));
        }
        if self.y_min >= self.y_max {
            return Err(AnalysisError::InvalidSettings(format!(
                "y_min ({}) must be less than y_max ({})",
                self.y_min, self.y_max
            )));
        }
        if self.samples < 2 {
            return Err(AnalysisError::InvalidSettings(
                "at least two samples are required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.y_min && y <= self.y_max
    }

    /// Spacing between consecutive sample abscissae.
    pub fn step(&self) -> f64 {
        (self.x_max - self.x_min) / (self.samples - 1) as f64
    }
}
