//! Tagged parameter records produced by the extractor.
//!
//! Records are plain data: immutable once built, numeric fields plus a
//! discriminant. Every analyzer is a pure function of one record.

use crate::matrix::Matrix;
use crate::vector::{Point2, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum QuadraticForm {
    /// `a(x-h)**2+k`
    Vertex { h: f64, k: f64 },
    /// `ax**2+bx+c`
    Standard { b: f64, c: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticParams {
    pub a: f64,
    #[serde(flatten)]
    pub form: QuadraticForm,
}

impl QuadraticParams {
    /// Vertex `(h, k)`; derived as `h = -b/2a`, `k = c - b²/4a` for the standard form.
    pub fn vertex(&self) -> (f64, f64) {
        match self.form {
            QuadraticForm::Vertex { h, k } => (h, k),
            QuadraticForm::Standard { b, c } => (-b / (2.0 * self.a), c - b * b / (4.0 * self.a)),
        }
    }

    /// Standard-form coefficients `(a, b, c)`.
    pub fn standard(&self) -> (f64, f64, f64) {
        match self.form {
            QuadraticForm::Vertex { h, k } => (self.a, -2.0 * self.a * h, self.a * h * h + k),
            QuadraticForm::Standard { b, c } => (self.a, b, c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicParams {
    pub fn value_at(&self, x: f64) -> f64 {
        ((self.a * x + self.b) * x + self.c) * x + self.d
    }
}

/// `coeff · base^(exp_coeff·x + exp_shift) + shift`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialParams {
    pub coeff: f64,
    pub base: f64,
    pub exp_coeff: f64,
    pub exp_shift: f64,
    pub shift: f64,
}

/// `coeff · log_base(x_coeff·x + x_shift) + shift`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogarithmicParams {
    pub coeff: f64,
    pub base: f64,
    pub x_coeff: f64,
    pub x_shift: f64,
    pub shift: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrigFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

impl TrigFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            _ => return None,
        })
    }

    pub fn is_inverse(self) -> bool {
        matches!(self, Self::Asin | Self::Acos | Self::Atan)
    }
}

/// `amplitude · f(frequency·x + phase) + shift`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrigonometricParams {
    pub function: TrigFunction,
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub shift: f64,
}

/// `coeff · f(x_coeff·x + x_shift) + shift`, shared by absolute value and square root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    pub coeff: f64,
    pub x_coeff: f64,
    pub x_shift: f64,
    pub shift: f64,
}

impl TransformParams {
    /// Where the inner linear expression vanishes.
    pub fn inner_root(&self) -> f64 {
        -self.x_shift / self.x_coeff
    }

    pub fn inner(&self, x: f64) -> f64 {
        self.x_coeff * x + self.x_shift
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationalParams {
    pub numerator: String,
    pub denominator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFunction {
    Floor,
    Ceil,
    Sign,
    Max,
    Min,
}

impl SpecialFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "sign" => Self::Sign,
            "max" => Self::Max,
            "min" => Self::Min,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialParams {
    pub function: SpecialFunction,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    pub position: Vector,
}

impl LabeledPoint {
    pub fn new(label: Option<&str>, position: Vector) -> Self {
        Self {
            label: label.map(str::to_string),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorInput {
    /// Displacement from `start` to `end`.
    Displacement { start: LabeledPoint, end: LabeledPoint },
    /// Three points joined by two consecutive displacement vectors.
    Chain { points: [LabeledPoint; 3] },
    /// Raw components anchored at the origin.
    Components { vector: Vector },
}

impl VectorInput {
    pub fn is_3d(&self) -> bool {
        match self {
            Self::Displacement { start, .. } => start.position.is_3d(),
            Self::Chain { points } => points[0].position.is_3d(),
            Self::Components { vector } => vector.is_3d(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixInput {
    pub values: Matrix,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleInput {
    pub a: Point2,
    pub b: Point2,
    pub c: Point2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Linear,
    Quadratic,
    Cubic,
    Exponential,
    Logarithmic,
    Trigonometric,
    AbsoluteValue,
    SquareRoot,
    Rational,
    Special,
    Vector,
    Matrix,
    Triangle,
}

impl Family {
    pub fn is_function(self) -> bool {
        !matches!(self, Self::Vector | Self::Matrix | Self::Triangle)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "Linear",
            Self::Quadratic => "Quadratic",
            Self::Cubic => "Cubic",
            Self::Exponential => "Exponential",
            Self::Logarithmic => "Logarithmic",
            Self::Trigonometric => "Trigonometric",
            Self::AbsoluteValue => "Absolute value",
            Self::SquareRoot => "Square root",
            Self::Rational => "Rational",
            Self::Special => "Special",
            Self::Vector => "Vector",
            Self::Matrix => "Matrix",
            Self::Triangle => "Triangle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ParameterRecord {
    Linear(LinearParams),
    Quadratic(QuadraticParams),
    Cubic(CubicParams),
    Exponential(ExponentialParams),
    Logarithmic(LogarithmicParams),
    Trigonometric(TrigonometricParams),
    AbsoluteValue(TransformParams),
    SquareRoot(TransformParams),
    Rational(RationalParams),
    Special(SpecialParams),
    Vector(VectorInput),
    Matrix(MatrixInput),
    Triangle(TriangleInput),
}

impl ParameterRecord {
    pub fn family(&self) -> Family {
        match self {
            Self::Linear(_) => Family::Linear,
            Self::Quadratic(_) => Family::Quadratic,
            Self::Cubic(_) => Family::Cubic,
            Self::Exponential(_) => Family::Exponential,
            Self::Logarithmic(_) => Family::Logarithmic,
            Self::Trigonometric(_) => Family::Trigonometric,
            Self::AbsoluteValue(_) => Family::AbsoluteValue,
            Self::SquareRoot(_) => Family::SquareRoot,
            Self::Rational(_) => Family::Rational,
            Self::Special(_) => Family::Special,
            Self::Vector(_) => Family::Vector,
            Self::Matrix(_) => Family::Matrix,
            Self::Triangle(_) => Family::Triangle,
        }
    }
}
