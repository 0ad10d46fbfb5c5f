use super::{
    probe, Feature, FeatureKind, FunctionAnalysis, FunctionDetails, Intercepts, Sign, Span,
};
use crate::error::DomainViolation;
use crate::record::{CubicParams, Family, LinearParams, QuadraticForm, QuadraticParams};
use crate::settings::Tolerances;
use crate::traits::Curve;
use crate::vector::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

impl Curve for LinearParams {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        Ok(self.slope * x + self.intercept)
    }
}

impl Curve for QuadraticParams {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        let (h, k) = self.vertex();
        Ok(self.a * (x - h) * (x - h) + k)
    }
}

impl Curve for CubicParams {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        Ok(self.value_at(x))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Horizontal,
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearDetails {
    pub slope: f64,
    pub intercept: f64,
    pub trend: Trend,
    pub x_intercept: Option<f64>,
}

pub fn analyze_linear(p: &LinearParams, tol: &Tolerances) -> FunctionAnalysis {
    let trend = match Sign::of(p.slope, tol) {
        Sign::Zero => Trend::Horizontal,
        Sign::Positive => Trend::Increasing,
        Sign::Negative => Trend::Decreasing,
    };
    let x_intercept = (trend != Trend::Horizontal).then(|| -p.intercept / p.slope);
    let classification = match trend {
        Trend::Horizontal => "Horizontal line",
        Trend::Increasing => "Increasing line",
        Trend::Decreasing => "Decreasing line",
    };

    FunctionAnalysis {
        family: Family::Linear,
        classification: classification.to_string(),
        intercepts: Intercepts {
            x: x_intercept.into_iter().collect(),
            y: Some(p.intercept),
        },
        characteristic_points: Vec::new(),
        domain: Span::All,
        range: match trend {
            Trend::Horizontal => Span::Constant { value: p.intercept },
            _ => Span::All,
        },
        asymptotes: Vec::new(),
        details: FunctionDetails::Linear(LinearDetails {
            slope: p.slope,
            intercept: p.intercept,
            trend,
            x_intercept,
        }),
        key_points: probe(p, (-3..=3).map(f64::from)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opening {
    Upward,
    Downward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadraticDetails {
    /// `true` when the record was written in vertex form.
    pub vertex_form: bool,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub vertex: Point2,
    pub axis_of_symmetry: f64,
    pub opening: Opening,
    /// `b² - 4ac`, equal to `-4ak`.
    pub discriminant: f64,
    pub discriminant_sign: Sign,
    /// Real roots, ascending; a tangent root is listed once.
    pub roots: Vec<f64>,
}

pub fn analyze_quadratic(p: &QuadraticParams, tol: &Tolerances) -> FunctionAnalysis {
    let (h, k) = p.vertex();
    let (a, b, c) = p.standard();
    let discriminant = -4.0 * a * k;
    let discriminant_sign = Sign::of(discriminant, tol);
    let roots = match discriminant_sign {
        Sign::Negative => Vec::new(),
        Sign::Zero => vec![h],
        Sign::Positive => {
            let offset = (-k / a).sqrt();
            vec![h - offset, h + offset]
        }
    };
    let opening = if a > 0.0 {
        Opening::Upward
    } else {
        Opening::Downward
    };
    let crossing = match discriminant_sign {
        Sign::Negative => "no real roots",
        Sign::Zero => "touches the x-axis once",
        Sign::Positive => "two real roots",
    };
    let classification = match opening {
        Opening::Upward => format!("Parabola opening upward, {crossing}"),
        Opening::Downward => format!("Parabola opening downward, {crossing}"),
    };

    FunctionAnalysis {
        family: Family::Quadratic,
        classification,
        intercepts: Intercepts {
            x: roots.clone(),
            y: Some(c),
        },
        characteristic_points: vec![Feature::new(FeatureKind::Vertex, h, k)],
        domain: Span::All,
        range: match opening {
            Opening::Upward => Span::Above {
                bound: k,
                inclusive: true,
            },
            Opening::Downward => Span::Below {
                bound: k,
                inclusive: true,
            },
        },
        asymptotes: Vec::new(),
        details: FunctionDetails::Quadratic(QuadraticDetails {
            vertex_form: matches!(p.form, QuadraticForm::Vertex { .. }),
            a,
            b,
            c,
            vertex: Point2::new(h, k),
            axis_of_symmetry: h,
            opening,
            discriminant,
            discriminant_sign,
            roots,
        }),
        key_points: probe(p, (-2..=2).map(|offset| h + f64::from(offset))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndBehaviour {
    RisesToRight,
    FallsToRight,
}

/// Roots of `f'(x) = 3ax² + 2bx + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CriticalPoints {
    None,
    /// A single stationary point, which is also the inflection point.
    Stationary { point: Point2 },
    Extrema { maximum: Point2, minimum: Point2 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicDetails {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub end_behaviour: EndBehaviour,
    /// `4b² - 12ac`.
    pub derivative_discriminant: f64,
    pub critical_points: CriticalPoints,
    pub inflection: Point2,
    /// Real roots, ascending.
    pub roots: Vec<f64>,
}

/// Real roots of `ax³ + bx² + cx + d` through the depressed cubic
/// `t³ + pt + q` with `x = t - b/3a`.
pub fn cubic_roots(p: &CubicParams, tol: &Tolerances) -> Vec<f64> {
    let CubicParams { a, b, c, d } = *p;
    let shift = -b / (3.0 * a);
    let dp = (3.0 * a * c - b * b) / (3.0 * a * a);
    let dq = (2.0 * b * b * b - 9.0 * a * b * c + 27.0 * a * a * d) / (27.0 * a * a * a);
    let discriminant = (dq / 2.0).powi(2) + (dp / 3.0).powi(3);
    // Both discriminant terms are cubic in the coefficients, so the zero band scales with them.
    let scale = (dq / 2.0).powi(2).max((dp / 3.0).abs().powi(3));

    let mut roots = if tol.is_zero(dp) {
        vec![(-dq).cbrt()]
    } else if discriminant.abs() <= tol.exact * scale {
        vec![3.0 * dq / dp, -3.0 * dq / (2.0 * dp)]
    } else if discriminant > 0.0 {
        let root = discriminant.sqrt();
        vec![(-dq / 2.0 + root).cbrt() + (-dq / 2.0 - root).cbrt()]
    } else {
        let radius = 2.0 * (-dp / 3.0).sqrt();
        let angle = ((3.0 * dq / (2.0 * dp)) * (-3.0 / dp).sqrt())
            .clamp(-1.0, 1.0)
            .acos()
            / 3.0;
        (0..3)
            .map(|k| radius * (angle - 2.0 * PI * f64::from(k) / 3.0).cos())
            .collect()
    };

    for root in roots.iter_mut() {
        *root += shift;
    }
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|x, y| tol.near(*x, *y));
    roots
}

pub fn analyze_cubic(p: &CubicParams, tol: &Tolerances) -> FunctionAnalysis {
    let CubicParams { a, b, c, d } = *p;
    let end_behaviour = if a > 0.0 {
        EndBehaviour::RisesToRight
    } else {
        EndBehaviour::FallsToRight
    };
    let inflection_x = -b / (3.0 * a);
    let inflection = Point2::new(inflection_x, p.value_at(inflection_x));

    let derivative_discriminant = 4.0 * b * b - 12.0 * a * c;
    let critical_points = match Sign::of(derivative_discriminant, tol) {
        Sign::Negative => CriticalPoints::None,
        Sign::Zero => CriticalPoints::Stationary { point: inflection },
        Sign::Positive => {
            let root = derivative_discriminant.sqrt();
            let mut maximum = (-2.0 * b + root) / (6.0 * a);
            let mut minimum = (-2.0 * b - root) / (6.0 * a);
            // f'' = 6ax + 2b is negative at a maximum.
            if 6.0 * a * maximum + 2.0 * b > 0.0 {
                std::mem::swap(&mut maximum, &mut minimum);
            }
            CriticalPoints::Extrema {
                maximum: Point2::new(maximum, p.value_at(maximum)),
                minimum: Point2::new(minimum, p.value_at(minimum)),
            }
        }
    };

    let mut characteristic_points = vec![Feature {
        kind: FeatureKind::Inflection,
        point: inflection,
    }];
    match critical_points {
        CriticalPoints::None => {}
        CriticalPoints::Stationary { point } => characteristic_points.push(Feature {
            kind: FeatureKind::Stationary,
            point,
        }),
        CriticalPoints::Extrema { maximum, minimum } => {
            characteristic_points.push(Feature {
                kind: FeatureKind::LocalMaximum,
                point: maximum,
            });
            characteristic_points.push(Feature {
                kind: FeatureKind::LocalMinimum,
                point: minimum,
            });
        }
    }

    let roots = cubic_roots(p, tol);
    let classification = match (end_behaviour, critical_points) {
        (EndBehaviour::RisesToRight, CriticalPoints::Extrema { .. }) => {
            "Cubic rising to the right with a local maximum and minimum"
        }
        (EndBehaviour::FallsToRight, CriticalPoints::Extrema { .. }) => {
            "Cubic falling to the right with a local maximum and minimum"
        }
        (EndBehaviour::RisesToRight, _) => "Monotonic cubic rising to the right",
        (EndBehaviour::FallsToRight, _) => "Monotonic cubic falling to the right",
    };

    FunctionAnalysis {
        family: Family::Cubic,
        classification: classification.to_string(),
        intercepts: Intercepts {
            x: roots.clone(),
            y: Some(d),
        },
        characteristic_points,
        domain: Span::All,
        range: Span::All,
        asymptotes: Vec::new(),
        details: FunctionDetails::Cubic(CubicDetails {
            a,
            b,
            c,
            d,
            end_behaviour,
            derivative_discriminant,
            critical_points,
            inflection,
            roots,
        }),
        key_points: probe(p, (-2..=2).map(f64::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    fn details<T>(analysis: &FunctionAnalysis, pick: impl Fn(&FunctionDetails) -> Option<&T>) -> &T {
        pick(&analysis.details).expect("family details")
    }

    #[test]
    fn linear_reports_trend_and_intercepts() {
        let analysis = analyze_linear(
            &LinearParams {
                slope: 2.0,
                intercept: -4.0,
            },
            &tol(),
        );
        assert_eq!(analysis.classification, "Increasing line");
        assert_eq!(analysis.intercepts.x, vec![2.0]);
        assert_eq!(analysis.intercepts.y, Some(-4.0));
        assert_eq!(analysis.key_points.len(), 7);

        let flat = analyze_linear(
            &LinearParams {
                slope: 0.0,
                intercept: 3.0,
            },
            &tol(),
        );
        assert_eq!(flat.range, Span::Constant { value: 3.0 });
        assert!(flat.intercepts.x.is_empty());
    }

    #[test]
    fn vertex_form_round_trips_vertex_and_range() {
        let analysis = analyze_quadratic(
            &QuadraticParams {
                a: 2.0,
                form: QuadraticForm::Vertex { h: 3.0, k: 5.0 },
            },
            &tol(),
        );
        assert_eq!(analysis.feature(FeatureKind::Vertex), Some(Point2::new(3.0, 5.0)));
        assert_eq!(
            analysis.range,
            Span::Above {
                bound: 5.0,
                inclusive: true
            }
        );
        assert_eq!(analysis.range.describe("y"), "y ≥ 5");
        let quadratic = details(&analysis, |d| match d {
            FunctionDetails::Quadratic(q) => Some(q),
            _ => None,
        });
        assert_eq!(quadratic.opening, Opening::Upward);
        assert_eq!(quadratic.discriminant_sign, Sign::Negative);
        assert!(quadratic.roots.is_empty());
    }

    #[test]
    fn perfect_square_touches_axis_once() {
        let analysis = analyze_quadratic(
            &QuadraticParams {
                a: 1.0,
                form: QuadraticForm::Standard { b: 2.0, c: 1.0 },
            },
            &tol(),
        );
        assert_eq!(analysis.feature(FeatureKind::Vertex), Some(Point2::new(-1.0, 0.0)));
        assert_eq!(analysis.intercepts.x, vec![-1.0]);
        assert!(analysis.classification.contains("touches the x-axis once"));
    }

    #[test]
    fn downward_parabola_has_two_roots() {
        let analysis = analyze_quadratic(
            &QuadraticParams {
                a: -1.0,
                form: QuadraticForm::Standard { b: 0.0, c: 4.0 },
            },
            &tol(),
        );
        assert_eq!(analysis.intercepts.x, vec![-2.0, 2.0]);
        assert!(matches!(analysis.range, Span::Below { bound, .. } if bound == 4.0));
    }

    #[test]
    fn cubic_with_two_extrema() {
        let p = CubicParams {
            a: 1.0,
            b: 0.0,
            c: -1.0,
            d: 0.0,
        };
        let analysis = analyze_cubic(&p, &tol());
        let cubic = details(&analysis, |d| match d {
            FunctionDetails::Cubic(c) => Some(c),
            _ => None,
        });
        match cubic.critical_points {
            CriticalPoints::Extrema { maximum, minimum } => {
                let x = 1.0 / 3f64.sqrt();
                assert!((maximum.x + x).abs() < 1e-12);
                assert!((minimum.x - x).abs() < 1e-12);
                assert!(maximum.y > minimum.y);
            }
            other => panic!("expected extrema, got {other:?}"),
        }
        assert_eq!(cubic.roots.len(), 3);
        for (root, expected) in cubic.roots.iter().zip([-1.0, 0.0, 1.0]) {
            assert!((root - expected).abs() < 1e-9, "{:?}", cubic.roots);
        }
        assert_eq!(cubic.end_behaviour, EndBehaviour::RisesToRight);
    }

    #[test]
    fn cubic_stationary_and_monotonic_cases() {
        let stationary = analyze_cubic(
            &CubicParams {
                a: 1.0,
                b: 0.0,
                c: 0.0,
                d: 0.0,
            },
            &tol(),
        );
        assert_eq!(
            stationary.feature(FeatureKind::Stationary),
            Some(Point2::new(0.0, 0.0))
        );
        assert_eq!(stationary.intercepts.x, vec![0.0]);

        let monotonic = analyze_cubic(
            &CubicParams {
                a: -1.0,
                b: 0.0,
                c: -3.0,
                d: 2.0,
            },
            &tol(),
        );
        assert_eq!(monotonic.classification, "Monotonic cubic falling to the right");
        assert_eq!(monotonic.intercepts.x.len(), 1);
        let root = monotonic.intercepts.x[0];
        assert!(
            (-root * root * root - 3.0 * root + 2.0).abs() < 1e-9,
            "root {root} is not a zero"
        );
    }

    #[test]
    fn cubic_with_double_root() {
        // (x - 1)²(x + 2) = x³ - 3x + 2
        let roots = cubic_roots(
            &CubicParams {
                a: 1.0,
                b: 0.0,
                c: -3.0,
                d: 2.0,
            },
            &tol(),
        );
        assert_eq!(roots.len(), 2);
        assert!((roots[0] + 2.0).abs() < 1e-9);
        assert!((roots[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cubic_with_vanishing_linear_term_keeps_finite_root() {
        // x³ + 0.00001
        let roots = cubic_roots(
            &CubicParams {
                a: 1.0,
                b: 0.0,
                c: 0.0,
                d: 0.00001,
            },
            &tol(),
        );
        assert_eq!(roots.len(), 1);
        assert!((roots[0] + 0.00001f64.cbrt()).abs() < 1e-12, "{roots:?}");
    }

    #[test]
    fn small_coefficients_keep_three_roots() {
        // x³ - 0.001x has roots 0 and ±√0.001
        let analysis = analyze_cubic(
            &CubicParams {
                a: 1.0,
                b: 0.0,
                c: -0.001,
                d: 0.0,
            },
            &tol(),
        );
        let roots = &analysis.intercepts.x;
        assert_eq!(roots.len(), 3, "{roots:?}");
        let edge = 0.001f64.sqrt();
        for (root, expected) in roots.iter().zip([-edge, 0.0, edge]) {
            assert!((root - expected).abs() < 1e-12, "{roots:?}");
        }
        assert!(roots.iter().all(|r| r.is_finite()));
    }
}
