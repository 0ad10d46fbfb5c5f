//! Absolute value and square root: an outer function applied to a linear
//! inner expression, `coeff · f(x_coeff·x + x_shift) + shift`.

use super::{probe, Feature, FeatureKind, FunctionAnalysis, FunctionDetails, Intercepts, Sign, Span};
use crate::error::DomainViolation;
use crate::record::{Family, TransformParams};
use crate::settings::Tolerances;
use crate::traits::Curve;
use crate::vector::Point2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct AbsoluteValueCurve(pub TransformParams);

impl Curve for AbsoluteValueCurve {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        let p = &self.0;
        Ok(p.coeff * p.inner(x).abs() + p.shift)
    }
}

/// Square root record plus the slack allowed for a radicand that rounds
/// just below zero at the start point.
#[derive(Debug, Clone, Copy)]
pub struct SquareRootCurve {
    pub params: TransformParams,
    pub tolerance: f64,
}

impl Curve for SquareRootCurve {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        let p = &self.params;
        let radicand = p.inner(x);
        if radicand < -self.tolerance {
            return Err(DomainViolation::NegativeRadicand);
        }
        Ok(p.coeff * radicand.max(0.0).sqrt() + p.shift)
    }
}

/// Span on the side of `bound` selected by the sign of `direction`.
fn side(bound: f64, direction: f64, tol: &Tolerances) -> Span {
    match Sign::of(direction, tol) {
        Sign::Positive => Span::Above {
            bound,
            inclusive: true,
        },
        Sign::Negative => Span::Below {
            bound,
            inclusive: true,
        },
        Sign::Zero => Span::Constant { value: bound },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteValueDetails {
    pub vertex: Point2,
    pub left_slope: f64,
    pub right_slope: f64,
    pub opens_upward: bool,
}

pub fn analyze_absolute_value(p: &TransformParams, tol: &Tolerances) -> FunctionAnalysis {
    let curve = AbsoluteValueCurve(*p);
    let vertex = Point2::new(p.inner_root(), p.shift);
    let right_slope = p.coeff * p.x_coeff.abs();

    // |inner| = -shift/coeff
    let mut x_intercepts = match p.coeff {
        c if tol.is_zero(c) => Vec::new(),
        c => {
            let magnitude = -p.shift / c;
            match Sign::of(magnitude, tol) {
                Sign::Negative => Vec::new(),
                Sign::Zero => vec![vertex.x],
                Sign::Positive => vec![
                    (-magnitude - p.x_shift) / p.x_coeff,
                    (magnitude - p.x_shift) / p.x_coeff,
                ],
            }
        }
    };
    x_intercepts.sort_by(f64::total_cmp);

    let opens = if p.coeff > 0.0 { "upward" } else { "downward" };

    FunctionAnalysis {
        family: Family::AbsoluteValue,
        classification: format!("V-shaped graph opening {opens}"),
        intercepts: Intercepts {
            x: x_intercepts,
            y: curve.evaluate(0.0).ok(),
        },
        characteristic_points: vec![Feature {
            kind: FeatureKind::Vertex,
            point: vertex,
        }],
        domain: Span::All,
        range: side(p.shift, p.coeff, tol),
        asymptotes: Vec::new(),
        details: FunctionDetails::AbsoluteValue(AbsoluteValueDetails {
            vertex,
            left_slope: -right_slope,
            right_slope,
            opens_upward: p.coeff > 0.0,
        }),
        key_points: probe(&curve, (-2..=2).map(|offset| vertex.x + f64::from(offset))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquareRootDetails {
    pub start: Point2,
    /// `true` when the domain extends to the right of the start point.
    pub extends_right: bool,
    pub rises: bool,
}

pub fn analyze_square_root(p: &TransformParams, tol: &Tolerances) -> FunctionAnalysis {
    let curve = SquareRootCurve {
        params: *p,
        tolerance: tol.exact,
    };
    let start = Point2::new(p.inner_root(), p.shift);
    let direction = p.x_coeff.signum();

    // sqrt(inner) = -shift/coeff needs a non-negative right-hand side.
    let x_intercepts = if tol.is_zero(p.coeff) {
        Vec::new()
    } else {
        let root = -p.shift / p.coeff;
        if root >= 0.0 || tol.is_zero(root) {
            vec![(root * root - p.x_shift) / p.x_coeff]
        } else {
            Vec::new()
        }
    };

    let extends_right = p.x_coeff > 0.0;
    let rises = p.coeff > 0.0;
    let classification = format!(
        "Square root curve starting at ({}, {}), extending {} and {}",
        start.x,
        start.y,
        if extends_right { "right" } else { "left" },
        if rises { "rising" } else { "falling" },
    );

    FunctionAnalysis {
        family: Family::SquareRoot,
        classification,
        intercepts: Intercepts {
            x: x_intercepts,
            y: curve.evaluate(0.0).ok(),
        },
        characteristic_points: vec![Feature {
            kind: FeatureKind::StartPoint,
            point: start,
        }],
        domain: side(start.x, p.x_coeff, tol),
        range: side(p.shift, p.coeff, tol),
        asymptotes: Vec::new(),
        details: FunctionDetails::SquareRoot(SquareRootDetails {
            start,
            extends_right,
            rises,
        }),
        key_points: probe(
            &curve,
            [0.0, 1.0, 4.0, 9.0, 16.0]
                .map(|offset| start.x + direction * offset / p.x_coeff.abs()),
        ),
    }
}
