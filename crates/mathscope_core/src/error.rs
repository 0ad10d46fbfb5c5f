use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structurally valid input that is mathematically singular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    #[error("points are collinear; no triangle can be formed")]
    CollinearPoints,
    #[error("matrix is singular (no inverse)")]
    SingularMatrix,
    #[error("vector has zero magnitude")]
    ZeroMagnitude,
}

/// A point or property that lies outside the domain of the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum DomainViolation {
    #[error("logarithm argument is not positive")]
    LogarithmArgument,
    #[error("square root radicand is negative")]
    NegativeRadicand,
    #[error("tangent is undefined at its pole")]
    TangentPole,
    #[error("inverse trigonometric argument is outside [-1, 1]")]
    InverseTrigArgument,
    #[error("denominator is zero")]
    DivisionByZero,
    #[error("value is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("input not recognized: {input}")]
    Unrecognized { input: String },
    #[error(transparent)]
    Degenerate(#[from] Degeneracy),
    #[error(transparent)]
    Domain(#[from] DomainViolation),
    #[error("vector operations need operands of matching dimension")]
    DimensionMismatch,
    #[error("expression could not be compiled: {0}")]
    Expression(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl AnalysisError {
    pub fn unrecognized(input: &str) -> Self {
        Self::Unrecognized {
            input: input.to_string(),
        }
    }

    /// `true` only for rejected tolerances or sample windows, i.e. bad arguments
    /// from the caller rather than a property of the analyzed input.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidSettings(_))
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        Self::Expression(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
