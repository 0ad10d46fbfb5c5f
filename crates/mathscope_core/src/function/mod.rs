//! Closed-form analysis of single-variable function families.
//!
//! Each family module turns one parameter record into a [`FunctionAnalysis`]:
//! intercepts, characteristic points, domain and range, asymptotes, a short
//! classification string, family-specific details and a handful of probe
//! points. Every family also provides a [`Curve`] used for sampling.

pub mod polynomial;
pub mod rational;
pub mod transcendental;
pub mod transformed;

use crate::error::Result;
use crate::record::{Family, ParameterRecord};
use crate::settings::Tolerances;
use crate::traits::Curve;
use crate::vector::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use polynomial::{CubicDetails, LinearDetails, QuadraticDetails};
pub use rational::{ExpressionCurve, RationalCurve, RationalDetails, SpecialDetails};
pub use transcendental::{
    ExponentialDetails, LogarithmicDetails, TrigonometricCurve, TrigonometricDetails,
};
pub use transformed::{AbsoluteValueCurve, AbsoluteValueDetails, SquareRootCurve, SquareRootDetails};

/// A set of reals, used for domains, ranges and discontinuity sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span {
    All,
    Above { bound: f64, inclusive: bool },
    Below { bound: f64, inclusive: bool },
    Between { min: f64, max: f64, inclusive: bool },
    Constant { value: f64 },
    AllExcept { values: Vec<f64> },
    /// Every real except `offset + n·period` for integer `n`.
    AllExceptPeriodic { offset: f64, period: f64 },
    Values { values: Vec<f64> },
    Integers,
    /// Not derivable in closed form; consumers fall back to the samples.
    Undetermined,
}

impl Span {
    pub fn contains(&self, value: f64, tol: &Tolerances) -> bool {
        match self {
            Span::All => true,
            Span::Above { bound, inclusive } => value > *bound || (*inclusive && tol.near(value, *bound)),
            Span::Below { bound, inclusive } => value < *bound || (*inclusive && tol.near(value, *bound)),
            Span::Between { min, max, inclusive } => {
                (value > *min && value < *max)
                    || (*inclusive && (tol.near(value, *min) || tol.near(value, *max)))
            }
            Span::Constant { value: c } => tol.near(value, *c),
            Span::AllExcept { values } => !values.iter().any(|v| tol.near(value, *v)),
            Span::AllExceptPeriodic { offset, period } => {
                let phase = ((value - offset) / period).rem_euclid(1.0);
                !(tol.is_zero(phase) || tol.near(phase, 1.0))
            }
            Span::Values { values } => values.iter().any(|v| tol.near(value, *v)),
            Span::Integers => tol.near(value, value.round()),
            Span::Undetermined => true,
        }
    }

    /// Human-readable form over the variable `var`, e.g. `y ≥ 5`.
    pub fn describe(&self, var: &str) -> String {
        let list = |values: &[f64]| {
            values
                .iter()
                .map(|v| format!("{v}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Span::All => "all real numbers".to_string(),
            Span::Above { bound, inclusive } => {
                format!("{var} {} {bound}", if *inclusive { "≥" } else { ">" })
            }
            Span::Below { bound, inclusive } => {
                format!("{var} {} {bound}", if *inclusive { "≤" } else { "<" })
            }
            Span::Between { min, max, inclusive: true } => format!("[{min}, {max}]"),
            Span::Between { min, max, inclusive: false } => format!("({min}, {max})"),
            Span::Constant { value } => format!("{var} = {value}"),
            Span::AllExcept { values } if values.is_empty() => "all real numbers".to_string(),
            Span::AllExcept { values } => format!("{var} ≠ {}", list(values)),
            Span::AllExceptPeriodic { offset, period } => {
                format!("{var} ≠ {offset} + n·{period}")
            }
            Span::Values { values } if values.is_empty() => "none".to_string(),
            Span::Values { values } => format!("{{{}}}", list(values)),
            Span::Integers => "integers".to_string(),
            Span::Undetermined => "not determined analytically".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asymptote {
    Vertical { x: f64 },
    Horizontal { y: f64 },
    Oblique { slope: f64, intercept: f64 },
    /// Vertical asymptotes at `offset + n·period`.
    VerticalPeriodic { offset: f64, period: f64 },
}

impl fmt::Display for Asymptote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asymptote::Vertical { x } => write!(f, "x = {x}"),
            Asymptote::Horizontal { y } => write!(f, "y = {y}"),
            Asymptote::Oblique { slope, intercept } => write!(f, "y = {slope}x + {intercept}"),
            Asymptote::VerticalPeriodic { offset, period } => {
                write!(f, "x = {offset} + n·{period}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Vertex,
    Inflection,
    LocalMaximum,
    LocalMinimum,
    Stationary,
    StartPoint,
    Hole,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub kind: FeatureKind,
    pub point: Point2,
}

impl Feature {
    pub fn new(kind: FeatureKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            point: Point2::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intercepts {
    /// Ascending.
    pub x: Vec<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub fn of(value: f64, tol: &Tolerances) -> Self {
        if tol.is_zero(value) {
            Sign::Zero
        } else if value > 0.0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionDetails {
    Linear(LinearDetails),
    Quadratic(QuadraticDetails),
    Cubic(CubicDetails),
    Exponential(ExponentialDetails),
    Logarithmic(LogarithmicDetails),
    Trigonometric(TrigonometricDetails),
    AbsoluteValue(AbsoluteValueDetails),
    SquareRoot(SquareRootDetails),
    Rational(RationalDetails),
    Special(SpecialDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionAnalysis {
    pub family: Family,
    pub classification: String,
    pub intercepts: Intercepts,
    pub characteristic_points: Vec<Feature>,
    pub domain: Span,
    pub range: Span,
    pub asymptotes: Vec<Asymptote>,
    pub details: FunctionDetails,
    /// Finite, in-domain probe points near the interesting part of the graph.
    pub key_points: Vec<Point2>,
}

impl FunctionAnalysis {
    pub fn feature(&self, kind: FeatureKind) -> Option<Point2> {
        self.characteristic_points
            .iter()
            .find(|f| f.kind == kind)
            .map(|f| f.point)
    }
}

/// Evaluates `curve` at each probe abscissa, keeping finite in-domain values.
pub(crate) fn probe<C: Curve + ?Sized>(curve: &C, xs: impl IntoIterator<Item = f64>) -> Vec<Point2> {
    xs.into_iter()
        .filter_map(|x| match curve.evaluate(x) {
            Ok(y) if y.is_finite() => Some(Point2::new(x, y)),
            _ => None,
        })
        .collect()
}

/// Real roots of `c2·x² + c1·x + c0`, ascending, a repeated root listed once.
/// Falls back to the linear root when `c2` vanishes.
pub(crate) fn quadratic_roots(c0: f64, c1: f64, c2: f64, tol: &Tolerances) -> Vec<f64> {
    if tol.is_zero(c2) {
        if tol.is_zero(c1) {
            return Vec::new();
        }
        return vec![-c0 / c1];
    }
    let discriminant = c1 * c1 - 4.0 * c2 * c0;
    match Sign::of(discriminant, tol) {
        Sign::Negative => Vec::new(),
        Sign::Zero => vec![-c1 / (2.0 * c2)],
        Sign::Positive => {
            let root = discriminant.sqrt();
            let mut roots = vec![(-c1 - root) / (2.0 * c2), (-c1 + root) / (2.0 * c2)];
            roots.sort_by(f64::total_cmp);
            roots
        }
    }
}

/// Analyzes a function record; `None` for vectors, matrices and triangles.
pub fn analyze(record: &ParameterRecord, tol: &Tolerances) -> Option<Result<FunctionAnalysis>> {
    Some(match record {
        ParameterRecord::Linear(p) => Ok(polynomial::analyze_linear(p, tol)),
        ParameterRecord::Quadratic(p) => Ok(polynomial::analyze_quadratic(p, tol)),
        ParameterRecord::Cubic(p) => Ok(polynomial::analyze_cubic(p, tol)),
        ParameterRecord::Exponential(p) => Ok(transcendental::analyze_exponential(p, tol)),
        ParameterRecord::Logarithmic(p) => Ok(transcendental::analyze_logarithmic(p, tol)),
        ParameterRecord::Trigonometric(p) => Ok(transcendental::analyze_trigonometric(p, tol)),
        ParameterRecord::AbsoluteValue(p) => Ok(transformed::analyze_absolute_value(p, tol)),
        ParameterRecord::SquareRoot(p) => Ok(transformed::analyze_square_root(p, tol)),
        ParameterRecord::Rational(p) => rational::analyze_rational(p, tol),
        ParameterRecord::Special(p) => rational::analyze_special(p, tol),
        ParameterRecord::Vector(_) | ParameterRecord::Matrix(_) | ParameterRecord::Triangle(_) => {
            return None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_describe_and_test_membership() {
        let tol = Tolerances::default();
        let above = Span::Above {
            bound: 5.0,
            inclusive: true,
        };
        assert_eq!(above.describe("y"), "y ≥ 5");
        assert!(above.contains(5.0, &tol));
        assert!(!above.contains(4.9, &tol));

        let open = Span::Between {
            min: -1.0,
            max: 1.0,
            inclusive: false,
        };
        assert!(!open.contains(1.0, &tol));
        assert_eq!(open.describe("y"), "(-1, 1)");

        let periodic = Span::AllExceptPeriodic {
            offset: std::f64::consts::FRAC_PI_2,
            period: std::f64::consts::PI,
        };
        assert!(!periodic.contains(-std::f64::consts::FRAC_PI_2, &tol));
        assert!(periodic.contains(0.0, &tol));

        assert!(Span::Integers.contains(-3.0, &tol));
        assert!(!Span::Integers.contains(0.5, &tol));
    }

    #[test]
    fn quadratic_roots_cover_each_discriminant_sign() {
        let tol = Tolerances::default();
        assert_eq!(quadratic_roots(-4.0, 0.0, 1.0, &tol), vec![-2.0, 2.0]);
        assert_eq!(quadratic_roots(1.0, 2.0, 1.0, &tol), vec![-1.0]);
        assert!(quadratic_roots(1.0, 0.0, 1.0, &tol).is_empty());
        assert_eq!(quadratic_roots(-3.0, 1.5, 0.0, &tol), vec![2.0]);
    }

    #[test]
    fn shapes_are_not_functions() {
        let record = ParameterRecord::Triangle(crate::record::TriangleInput {
            a: Point2::new(0.0, 0.0),
            b: Point2::new(1.0, 0.0),
            c: Point2::new(0.0, 1.0),
        });
        assert!(analyze(&record, &Tolerances::default()).is_none());
    }
}
