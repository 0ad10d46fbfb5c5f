//! Expression-backed families: rational functions and the special (step)
//! functions. Both compile their text with the equation engine.

use super::{
    probe, quadratic_roots, Asymptote, Feature, FeatureKind, FunctionAnalysis, FunctionDetails,
    Intercepts, Span,
};
use crate::equation_engine::{compile_expression, Expr, Program};
use crate::error::{DomainViolation, Result};
use crate::record::{Family, RationalParams, SpecialFunction, SpecialParams};
use crate::settings::Tolerances;
use crate::traits::Curve;
use crate::vector::Point2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A compiled expression in `x`.
#[derive(Debug, Clone)]
pub struct ExpressionCurve(pub Program);

impl Curve for ExpressionCurve {
    fn evaluate(&self, x: f64) -> std::result::Result<f64, DomainViolation> {
        let y = self.0.evaluate(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(DomainViolation::NonFinite)
        }
    }
}

/// Quotient of two compiled expressions.
#[derive(Debug, Clone)]
pub struct RationalCurve {
    pub numerator: Program,
    pub denominator: Program,
    pub tolerance: f64,
}

impl RationalCurve {
    pub fn compile(p: &RationalParams, tol: &Tolerances) -> Result<Self> {
        Ok(Self {
            numerator: compile_expression(&p.numerator)?,
            denominator: compile_expression(&p.denominator)?,
            tolerance: tol.exact,
        })
    }
}

impl Curve for RationalCurve {
    fn evaluate(&self, x: f64) -> std::result::Result<f64, DomainViolation> {
        let denominator = self.denominator.evaluate(x);
        if denominator.abs() < self.tolerance {
            return Err(DomainViolation::DivisionByZero);
        }
        let y = self.numerator.evaluate(x) / denominator;
        if y.is_finite() {
            Ok(y)
        } else {
            Err(DomainViolation::NonFinite)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RationalDetails {
    pub numerator: String,
    pub denominator: String,
    /// Polynomial degrees after dropping vanishing leading terms; `None` when
    /// the side is not a polynomial.
    pub numerator_degree: Option<usize>,
    pub denominator_degree: Option<usize>,
    /// Removable discontinuities, with the limit value as `y`.
    pub holes: Vec<Point2>,
}

/// Polynomial coefficients with vanishing leading terms removed.
fn trimmed_coefficients(program: &Program, tol: &Tolerances) -> Option<Vec<f64>> {
    let mut coefficients = program.polynomial_coefficients()?;
    while coefficients.len() > 1 && coefficients.last().is_some_and(|c| tol.is_zero(*c)) {
        coefficients.pop();
    }
    Some(coefficients)
}

/// Real roots of a polynomial of degree at most two; `None` above that.
fn low_degree_roots(coefficients: &[f64], tol: &Tolerances) -> Option<Vec<f64>> {
    match *coefficients {
        [_] => Some(Vec::new()),
        [c0, c1] => Some(quadratic_roots(c0, c1, 0.0, tol)),
        [c0, c1, c2] => Some(quadratic_roots(c0, c1, c2, tol)),
        _ => None,
    }
}

/// End behaviour from the degree rule: horizontal when the numerator degree
/// does not exceed the denominator's, oblique when it exceeds it by one.
fn end_asymptote(numerator: &[f64], denominator: &[f64]) -> Option<Asymptote> {
    let n = numerator.len() - 1;
    let d = denominator.len() - 1;
    let lead_n = numerator[n];
    let lead_d = denominator[d];
    if n < d {
        Some(Asymptote::Horizontal { y: 0.0 })
    } else if n == d {
        Some(Asymptote::Horizontal { y: lead_n / lead_d })
    } else if n == d + 1 {
        // First two quotient terms of the long division.
        let slope = lead_n / lead_d;
        let next_d = if d >= 1 { denominator[d - 1] } else { 0.0 };
        let intercept = (numerator[n - 1] - slope * next_d) / lead_d;
        Some(Asymptote::Oblique { slope, intercept })
    } else {
        None
    }
}

pub fn analyze_rational(p: &RationalParams, tol: &Tolerances) -> Result<FunctionAnalysis> {
    let curve = RationalCurve::compile(p, tol)?;
    let numerator = trimmed_coefficients(&curve.numerator, tol);
    let denominator = trimmed_coefficients(&curve.denominator, tol);

    let mut asymptotes = Vec::new();
    let mut holes = Vec::new();
    let mut excluded = Vec::new();
    let mut characteristic_points = Vec::new();

    let pole_candidates = denominator
        .as_deref()
        .and_then(|coefficients| low_degree_roots(coefficients, tol));
    if let Some(roots) = &pole_candidates {
        for &root in roots {
            excluded.push(root);
            if tol.is_zero(curve.numerator.evaluate(root)) {
                // 0/0: the limit from both sides is the hole height.
                let h = 1e-6;
                let limit = match (curve.evaluate(root - h), curve.evaluate(root + h)) {
                    (Ok(left), Ok(right)) => (left + right) / 2.0,
                    _ => f64::NAN,
                };
                if limit.is_finite() {
                    holes.push(Point2::new(root, limit));
                    characteristic_points.push(Feature::new(FeatureKind::Hole, root, limit));
                    continue;
                }
            }
            asymptotes.push(Asymptote::Vertical { x: root });
        }
    } else {
        debug!(denominator = %p.denominator, "denominator roots not derived");
    }

    if let (Some(n), Some(d)) = (&numerator, &denominator) {
        if d.len() > 1 || !tol.is_zero(d[0]) {
            asymptotes.extend(end_asymptote(n, d));
        }
    }

    let x_intercepts = numerator
        .as_deref()
        .and_then(|coefficients| low_degree_roots(coefficients, tol))
        .map(|roots| {
            roots
                .into_iter()
                .filter(|root| curve.evaluate(*root).is_ok())
                .collect()
        })
        .unwrap_or_default();

    let domain = match &pole_candidates {
        Some(_) if excluded.is_empty() => Span::All,
        Some(_) => Span::AllExcept {
            values: excluded,
        },
        None => Span::Undetermined,
    };

    let numerator_degree = numerator.as_ref().map(|c| c.len() - 1);
    let denominator_degree = denominator.as_ref().map(|c| c.len() - 1);
    let classification = match (numerator_degree, denominator_degree) {
        (Some(n), Some(d)) => format!("Rational function (degree {n} over degree {d})"),
        _ => "Rational function".to_string(),
    };

    Ok(FunctionAnalysis {
        family: Family::Rational,
        classification,
        intercepts: Intercepts {
            x: x_intercepts,
            y: curve.evaluate(0.0).ok(),
        },
        characteristic_points,
        domain,
        range: Span::Undetermined,
        asymptotes,
        key_points: probe(&curve, [-3.0, -2.0, -1.0, -0.5, 0.5, 1.0, 2.0, 3.0]),
        details: FunctionDetails::Rational(RationalDetails {
            numerator: p.numerator.clone(),
            denominator: p.denominator.clone(),
            numerator_degree,
            denominator_degree,
            holes,
        }),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialDetails {
    pub function: SpecialFunction,
    pub expression: String,
    pub description: String,
    /// Points where the graph jumps; an empty `Values` set means continuous.
    pub discontinuities: Span,
}

fn describe(function: SpecialFunction) -> &'static str {
    match function {
        SpecialFunction::Floor => "Step function (greatest integer ≤ x)",
        SpecialFunction::Ceil => "Ceiling function (least integer ≥ x)",
        SpecialFunction::Sign => "Sign function (-1, 0, or 1)",
        SpecialFunction::Max => "Maximum of the given values",
        SpecialFunction::Min => "Minimum of the given values",
    }
}

/// `true` when the expression is exactly `name(x)`.
fn is_plain_call(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Call(called, args)
        if called == name && matches!(args.as_slice(), [Expr::Variable(v)] if v == "x"))
}

/// `true` for `name(..)` whose arguments are all polynomials in `x`, so the
/// pointwise max/min has no jumps.
fn is_polynomial_call(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Call(called, args)
        if called == name && args.iter().all(|arg| arg.polynomial_degree().is_some()))
}

pub fn analyze_special(p: &SpecialParams, _tol: &Tolerances) -> Result<FunctionAnalysis> {
    let program = compile_expression(&p.expression)?;
    let name = match p.function {
        SpecialFunction::Floor => "floor",
        SpecialFunction::Ceil => "ceil",
        SpecialFunction::Sign => "sign",
        SpecialFunction::Max => "max",
        SpecialFunction::Min => "min",
    };
    let plain = is_plain_call(&program.expr, name);

    let (discontinuities, range) = match p.function {
        SpecialFunction::Floor | SpecialFunction::Ceil if plain => (Span::Integers, Span::Integers),
        SpecialFunction::Sign if plain => (
            Span::Values { values: vec![0.0] },
            Span::Values {
                values: vec![-1.0, 0.0, 1.0],
            },
        ),
        SpecialFunction::Max | SpecialFunction::Min if is_polynomial_call(&program.expr, name) => (
            Span::Values { values: Vec::new() },
            Span::Undetermined,
        ),
        _ => (Span::Undetermined, Span::Undetermined),
    };

    let curve = ExpressionCurve(program);
    let x_intercepts = match p.function {
        SpecialFunction::Sign if plain => vec![0.0],
        _ => Vec::new(),
    };
    let y_intercept = curve.evaluate(0.0).ok();
    let key_points = probe(
        &curve,
        [-2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0],
    );

    Ok(FunctionAnalysis {
        family: Family::Special,
        classification: describe(p.function).to_string(),
        intercepts: Intercepts {
            x: x_intercepts,
            y: y_intercept,
        },
        characteristic_points: Vec::new(),
        domain: Span::All,
        range,
        asymptotes: Vec::new(),
        details: FunctionDetails::Special(SpecialDetails {
            function: p.function,
            expression: p.expression.clone(),
            description: describe(p.function).to_string(),
            discontinuities,
        }),
        key_points,
    })
}
