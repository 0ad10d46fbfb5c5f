use super::{probe, Asymptote, Feature, FeatureKind, FunctionAnalysis, FunctionDetails, Intercepts, Span};
use crate::error::DomainViolation;
use crate::record::{
    ExponentialParams, Family, LogarithmicParams, TrigFunction, TrigonometricParams,
};
use crate::settings::Tolerances;
use crate::traits::Curve;
use serde::{Deserialize, Serialize};
use std::f64::consts::{E, FRAC_PI_2, PI};

impl Curve for ExponentialParams {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        let y = self.coeff * self.base.powf(self.exp_coeff * x + self.exp_shift) + self.shift;
        if y.is_finite() {
            Ok(y)
        } else {
            Err(DomainViolation::NonFinite)
        }
    }
}

impl Curve for LogarithmicParams {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        let argument = self.x_coeff * x + self.x_shift;
        if argument <= 0.0 {
            return Err(DomainViolation::LogarithmArgument);
        }
        Ok(self.coeff * argument.ln() / self.base.ln() + self.shift)
    }
}

/// Trigonometric record plus the pole threshold for tangent.
#[derive(Debug, Clone, Copy)]
pub struct TrigonometricCurve {
    pub params: TrigonometricParams,
    pub pole_tolerance: f64,
}

impl Curve for TrigonometricCurve {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        let p = &self.params;
        let argument = p.frequency * x + p.phase;
        let value = match p.function {
            TrigFunction::Sin => argument.sin(),
            TrigFunction::Cos => argument.cos(),
            TrigFunction::Tan => {
                if argument.cos().abs() < self.pole_tolerance {
                    return Err(DomainViolation::TangentPole);
                }
                argument.tan()
            }
            TrigFunction::Asin | TrigFunction::Acos if argument.abs() > 1.0 => {
                return Err(DomainViolation::InverseTrigArgument)
            }
            TrigFunction::Asin => argument.asin(),
            TrigFunction::Acos => argument.acos(),
            TrigFunction::Atan => argument.atan(),
        };
        Ok(p.amplitude * value + p.shift)
    }
}

fn is_natural(base: f64) -> bool {
    (base - E).abs() < 1e-12
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    Growth,
    Decay,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialDetails {
    pub coeff: f64,
    pub base: f64,
    pub natural: bool,
    pub exp_coeff: f64,
    pub exp_shift: f64,
    pub shift: f64,
    pub growth: Growth,
    pub increasing: bool,
    pub y_intercept: f64,
    pub horizontal_asymptote: f64,
}

pub fn analyze_exponential(p: &ExponentialParams, tol: &Tolerances) -> FunctionAnalysis {
    let rate = p.exp_coeff * p.base.ln();
    let growth = if rate > 0.0 {
        Growth::Growth
    } else {
        Growth::Decay
    };
    let increasing = p.coeff * rate > 0.0;
    let y_intercept = p.coeff * p.base.powf(p.exp_shift) + p.shift;

    // coeff·base^u = -shift has a solution only when the ratio is positive.
    let ratio = -p.shift / p.coeff;
    let x_intercepts = if ratio > 0.0 && !tol.is_zero(p.coeff) {
        let u = ratio.ln() / p.base.ln();
        vec![(u - p.exp_shift) / p.exp_coeff]
    } else {
        Vec::new()
    };

    let range = if tol.is_zero(p.coeff) {
        Span::Constant { value: p.shift }
    } else if p.coeff > 0.0 {
        Span::Above {
            bound: p.shift,
            inclusive: false,
        }
    } else {
        Span::Below {
            bound: p.shift,
            inclusive: false,
        }
    };

    FunctionAnalysis {
        family: Family::Exponential,
        classification: match growth {
            Growth::Growth => "Exponential growth".to_string(),
            Growth::Decay => "Exponential decay".to_string(),
        },
        intercepts: Intercepts {
            x: x_intercepts,
            y: Some(y_intercept),
        },
        characteristic_points: Vec::new(),
        domain: Span::All,
        range,
        asymptotes: vec![Asymptote::Horizontal { y: p.shift }],
        details: FunctionDetails::Exponential(ExponentialDetails {
            coeff: p.coeff,
            base: p.base,
            natural: is_natural(p.base),
            exp_coeff: p.exp_coeff,
            exp_shift: p.exp_shift,
            shift: p.shift,
            growth,
            increasing,
            y_intercept,
            horizontal_asymptote: p.shift,
        }),
        key_points: probe(p, (-2..=2).map(f64::from)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogarithmicDetails {
    pub coeff: f64,
    pub base: f64,
    pub natural: bool,
    pub x_coeff: f64,
    pub x_shift: f64,
    pub shift: f64,
    pub vertical_asymptote: f64,
    pub increasing: bool,
}

pub fn analyze_logarithmic(p: &LogarithmicParams, tol: &Tolerances) -> FunctionAnalysis {
    let asymptote = -p.x_shift / p.x_coeff;
    let direction = p.x_coeff.signum();
    let increasing = p.coeff * p.x_coeff / p.base.ln() > 0.0;

    let x_intercepts = if tol.is_zero(p.coeff) {
        Vec::new()
    } else {
        let argument = p.base.powf(-p.shift / p.coeff);
        vec![(argument - p.x_shift) / p.x_coeff]
    };

    let domain = if p.x_coeff > 0.0 {
        Span::Above {
            bound: asymptote,
            inclusive: false,
        }
    } else {
        Span::Below {
            bound: asymptote,
            inclusive: false,
        }
    };

    let classification = if is_natural(p.base) {
        "Natural logarithm".to_string()
    } else {
        format!("Logarithm base {}", p.base)
    };

    FunctionAnalysis {
        family: Family::Logarithmic,
        classification,
        intercepts: Intercepts {
            x: x_intercepts,
            y: p.evaluate(0.0).ok(),
        },
        characteristic_points: Vec::new(),
        domain,
        range: if tol.is_zero(p.coeff) {
            Span::Constant { value: p.shift }
        } else {
            Span::All
        },
        asymptotes: vec![Asymptote::Vertical { x: asymptote }],
        details: FunctionDetails::Logarithmic(LogarithmicDetails {
            coeff: p.coeff,
            base: p.base,
            natural: is_natural(p.base),
            x_coeff: p.x_coeff,
            x_shift: p.x_shift,
            shift: p.shift,
            vertical_asymptote: asymptote,
            increasing,
        }),
        key_points: probe(
            p,
            [0.1, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0].map(|offset| asymptote + direction * offset),
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrigonometricDetails {
    pub function: TrigFunction,
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub shift: f64,
    /// `None` for the inverse functions.
    pub period: Option<f64>,
    /// Horizontal offset of the graph, `-phase/frequency`.
    pub phase_shift: f64,
}

/// Abscissa where the argument `frequency·x + phase` equals `argument`.
fn at_argument(p: &TrigonometricParams, argument: f64) -> f64 {
    (argument - p.phase) / p.frequency
}

pub fn analyze_trigonometric(p: &TrigonometricParams, tol: &Tolerances) -> FunctionAnalysis {
    let curve = TrigonometricCurve {
        params: *p,
        pole_tolerance: tol.exact,
    };
    let amplitude = p.amplitude.abs();
    let period = (!p.function.is_inverse()).then(|| match p.function {
        TrigFunction::Tan => PI / p.frequency.abs(),
        _ => 2.0 * PI / p.frequency.abs(),
    });
    let phase_shift = -p.phase / p.frequency;

    let range = match p.function {
        _ if tol.is_zero(p.amplitude) => Span::Constant { value: p.shift },
        TrigFunction::Sin | TrigFunction::Cos => Span::Between {
            min: p.shift - amplitude,
            max: p.shift + amplitude,
            inclusive: true,
        },
        TrigFunction::Tan => Span::All,
        TrigFunction::Asin => Span::Between {
            min: p.shift - amplitude * FRAC_PI_2,
            max: p.shift + amplitude * FRAC_PI_2,
            inclusive: true,
        },
        TrigFunction::Acos => {
            let end = p.shift + p.amplitude * PI;
            Span::Between {
                min: p.shift.min(end),
                max: p.shift.max(end),
                inclusive: true,
            }
        }
        TrigFunction::Atan => Span::Between {
            min: p.shift - amplitude * FRAC_PI_2,
            max: p.shift + amplitude * FRAC_PI_2,
            inclusive: false,
        },
    };

    let mut asymptotes = Vec::new();
    let domain = match p.function {
        TrigFunction::Tan => {
            let offset = at_argument(p, FRAC_PI_2);
            let period = PI / p.frequency.abs();
            asymptotes.push(Asymptote::VerticalPeriodic { offset, period });
            Span::AllExceptPeriodic { offset, period }
        }
        TrigFunction::Asin | TrigFunction::Acos => {
            let (lo, hi) = (at_argument(p, -1.0), at_argument(p, 1.0));
            Span::Between {
                min: lo.min(hi),
                max: lo.max(hi),
                inclusive: true,
            }
        }
        TrigFunction::Atan => {
            if !tol.is_zero(p.amplitude) {
                asymptotes.push(Asymptote::Horizontal {
                    y: p.shift - amplitude * FRAC_PI_2,
                });
                asymptotes.push(Asymptote::Horizontal {
                    y: p.shift + amplitude * FRAC_PI_2,
                });
            }
            Span::All
        }
        TrigFunction::Sin | TrigFunction::Cos => Span::All,
    };

    // Peak and trough within the first period, or the centre of symmetry.
    let (high_kind, low_kind) = if p.amplitude > 0.0 {
        (FeatureKind::LocalMaximum, FeatureKind::LocalMinimum)
    } else {
        (FeatureKind::LocalMinimum, FeatureKind::LocalMaximum)
    };
    let characteristic_args: Vec<(FeatureKind, f64)> = match p.function {
        TrigFunction::Sin => vec![(high_kind, FRAC_PI_2), (low_kind, 3.0 * FRAC_PI_2)],
        TrigFunction::Cos => vec![(high_kind, 0.0), (low_kind, PI)],
        _ => vec![(FeatureKind::Inflection, 0.0)],
    };
    let characteristic_points = if tol.is_zero(p.amplitude) {
        Vec::new()
    } else {
        characteristic_args
            .into_iter()
            .filter_map(|(kind, argument)| {
                let x = at_argument(p, argument);
                curve.evaluate(x).ok().map(|y| Feature::new(kind, x, y))
            })
            .collect()
    };

    let key_points = match period {
        Some(period) => probe(
            &curve,
            (0..=5).map(|i| f64::from(i) * period / 5.0 + phase_shift),
        ),
        None => probe(
            &curve,
            [-1.0, -0.5, 0.0, 0.5, 1.0].map(|argument| at_argument(p, argument)),
        ),
    };

    let classification = match p.function {
        TrigFunction::Sin => "Sine wave",
        TrigFunction::Cos => "Cosine wave",
        TrigFunction::Tan => "Tangent curve",
        TrigFunction::Asin => "Inverse sine",
        TrigFunction::Acos => "Inverse cosine",
        TrigFunction::Atan => "Inverse tangent",
    };

    FunctionAnalysis {
        family: Family::Trigonometric,
        classification: classification.to_string(),
        intercepts: Intercepts {
            x: Vec::new(),
            y: curve.evaluate(0.0).ok(),
        },
        characteristic_points,
        domain,
        range,
        asymptotes,
        details: FunctionDetails::Trigonometric(TrigonometricDetails {
            function: p.function,
            amplitude: p.amplitude,
            frequency: p.frequency,
            phase: p.phase,
            shift: p.shift,
            period,
            phase_shift,
        }),
        key_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    fn trig(function: TrigFunction, amplitude: f64, frequency: f64, phase: f64, shift: f64) -> TrigonometricParams {
        TrigonometricParams {
            function,
            amplitude,
            frequency,
            phase,
            shift,
        }
    }

    #[test]
    fn exponential_growth_with_shift() {
        let p = ExponentialParams {
            coeff: 2.0,
            base: E,
            exp_coeff: 1.0,
            exp_shift: 0.0,
            shift: -2.0,
        };
        let analysis = analyze_exponential(&p, &tol());
        assert_eq!(analysis.classification, "Exponential growth");
        assert_eq!(analysis.asymptotes, vec![Asymptote::Horizontal { y: -2.0 }]);
        assert_eq!(analysis.intercepts.y, Some(0.0));
        assert_eq!(analysis.intercepts.x.len(), 1);
        assert!(analysis.intercepts.x[0].abs() < 1e-12);
        assert_eq!(
            analysis.range,
            Span::Above {
                bound: -2.0,
                inclusive: false
            }
        );
        assert_eq!(analysis.key_points.len(), 5);
    }

    #[test]
    fn exponential_decay_from_fractional_base() {
        let p = ExponentialParams {
            coeff: 3.0,
            base: 0.5,
            exp_coeff: 1.0,
            exp_shift: 0.0,
            shift: 0.0,
        };
        let analysis = analyze_exponential(&p, &tol());
        assert_eq!(analysis.classification, "Exponential decay");
        assert!(analysis.intercepts.x.is_empty());
        match analysis.details {
            FunctionDetails::Exponential(details) => {
                assert!(!details.increasing);
                assert!(!details.natural);
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn logarithm_domain_follows_inner_sign() {
        let p = LogarithmicParams {
            coeff: 1.0,
            base: E,
            x_coeff: 2.0,
            x_shift: -4.0,
            shift: 0.0,
        };
        let analysis = analyze_logarithmic(&p, &tol());
        assert_eq!(analysis.asymptotes, vec![Asymptote::Vertical { x: 2.0 }]);
        assert_eq!(
            analysis.domain,
            Span::Above {
                bound: 2.0,
                inclusive: false
            }
        );
        assert_eq!(analysis.intercepts.x, vec![2.5]);
        assert_eq!(analysis.intercepts.y, None);
        assert_eq!(p.evaluate(1.0), Err(DomainViolation::LogarithmArgument));
        assert!(analysis.key_points.iter().all(|pt| pt.x > 2.0));

        let mirrored = LogarithmicParams {
            x_coeff: -1.0,
            x_shift: 0.0,
            base: 10.0,
            ..p
        };
        let analysis = analyze_logarithmic(&mirrored, &tol());
        assert!(matches!(analysis.domain, Span::Below { bound, .. } if bound == 0.0));
        assert_eq!(analysis.classification, "Logarithm base 10");
        assert!(analysis.key_points.iter().all(|pt| pt.x < 0.0));
    }

    #[test]
    fn sine_period_range_and_extrema() {
        let p = trig(TrigFunction::Sin, 2.0, 2.0, 0.0, 1.0);
        let analysis = analyze_trigonometric(&p, &tol());
        match analysis.details {
            FunctionDetails::Trigonometric(details) => {
                assert!((details.period.expect("periodic") - PI).abs() < 1e-12);
            }
            other => panic!("unexpected details {other:?}"),
        }
        assert_eq!(
            analysis.range,
            Span::Between {
                min: -1.0,
                max: 3.0,
                inclusive: true
            }
        );
        let maximum = analysis.feature(FeatureKind::LocalMaximum).expect("peak");
        assert!((maximum.x - PI / 4.0).abs() < 1e-12);
        assert!((maximum.y - 3.0).abs() < 1e-12);
        assert_eq!(analysis.key_points.len(), 6);
    }

    #[test]
    fn tangent_excludes_poles() {
        let p = trig(TrigFunction::Tan, 1.0, 1.0, 0.0, 0.0);
        let analysis = analyze_trigonometric(&p, &tol());
        assert_eq!(
            analysis.asymptotes,
            vec![Asymptote::VerticalPeriodic {
                offset: FRAC_PI_2,
                period: PI
            }]
        );
        let curve = TrigonometricCurve {
            params: p,
            pole_tolerance: 1e-10,
        };
        assert_eq!(curve.evaluate(FRAC_PI_2), Err(DomainViolation::TangentPole));
        assert!(curve.evaluate(0.5).is_ok());
        assert_eq!(analysis.range, Span::All);
    }

    #[test]
    fn inverse_sine_restricts_domain() {
        let p = trig(TrigFunction::Asin, 1.0, 2.0, 0.0, 0.0);
        let analysis = analyze_trigonometric(&p, &tol());
        assert_eq!(
            analysis.domain,
            Span::Between {
                min: -0.5,
                max: 0.5,
                inclusive: true
            }
        );
        let curve = TrigonometricCurve {
            params: p,
            pole_tolerance: 1e-10,
        };
        assert_eq!(curve.evaluate(1.0), Err(DomainViolation::InverseTrigArgument));
        assert_eq!(analysis.key_points.len(), 5);
        assert_eq!(
            analysis.feature(FeatureKind::Inflection).map(|pt| pt.y),
            Some(0.0)
        );
    }

    #[test]
    fn arctangent_has_two_horizontal_asymptotes() {
        let p = trig(TrigFunction::Atan, 1.0, 1.0, 0.0, 0.0);
        let analysis = analyze_trigonometric(&p, &tol());
        assert_eq!(
            analysis.asymptotes,
            vec![
                Asymptote::Horizontal { y: -FRAC_PI_2 },
                Asymptote::Horizontal { y: FRAC_PI_2 }
            ]
        );
        assert!(!analysis.range.contains(FRAC_PI_2, &tol()));
    }
}
