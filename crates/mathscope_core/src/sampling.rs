//! Plot samples over a caller-supplied window.

use crate::error::Result;
use crate::function::{
    AbsoluteValueCurve, ExpressionCurve, RationalCurve, SquareRootCurve, TrigonometricCurve,
};
use crate::equation_engine::compile_expression;
use crate::record::ParameterRecord;
use crate::settings::{SampleWindow, Tolerances};
use crate::traits::Curve;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

impl ParameterRecord {
    /// The sampled curve for a function record; `None` for shapes.
    pub fn curve(&self, tol: &Tolerances) -> Result<Option<Box<dyn Curve>>> {
        let curve: Box<dyn Curve> = match self {
            ParameterRecord::Linear(p) => Box::new(*p),
            ParameterRecord::Quadratic(p) => Box::new(*p),
            ParameterRecord::Cubic(p) => Box::new(*p),
            ParameterRecord::Exponential(p) => Box::new(*p),
            ParameterRecord::Logarithmic(p) => Box::new(*p),
            ParameterRecord::Trigonometric(p) => Box::new(TrigonometricCurve {
                params: *p,
                pole_tolerance: tol.exact,
            }),
            ParameterRecord::AbsoluteValue(p) => Box::new(AbsoluteValueCurve(*p)),
            ParameterRecord::SquareRoot(p) => Box::new(SquareRootCurve {
                params: *p,
                tolerance: tol.exact,
            }),
            ParameterRecord::Rational(p) => Box::new(RationalCurve::compile(p, tol)?),
            ParameterRecord::Special(p) => {
                Box::new(ExpressionCurve(compile_expression(&p.expression)?))
            }
            ParameterRecord::Vector(_) | ParameterRecord::Matrix(_) | ParameterRecord::Triangle(_) => {
                return Ok(None)
            }
        };
        Ok(Some(curve))
    }
}

/// Lazy, restartable sample sequence. Cloning restarts from the clone point.
#[derive(Clone)]
pub struct Samples<'a> {
    curve: &'a dyn Curve,
    window: SampleWindow,
    index: usize,
}

impl<'a> Samples<'a> {
    fn abscissa(&self, index: usize) -> f64 {
        if index + 1 == self.window.samples {
            self.window.x_max
        } else {
            self.window.x_min + index as f64 * self.window.step()
        }
    }
}

impl<'a> Iterator for Samples<'a> {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<SamplePoint> {
        while self.index < self.window.samples {
            let x = self.abscissa(self.index);
            self.index += 1;
            match self.curve.evaluate(x) {
                Ok(y) if y.is_finite() && self.window.contains_y(y) => {
                    return Some(SamplePoint { x, y });
                }
                Ok(y) => trace!(x, y, "sample outside window"),
                Err(violation) => trace!(x, %violation, "sample skipped"),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.window.samples.saturating_sub(self.index)))
    }
}

/// Samples `curve` uniformly over `[x_min, x_max]`, at most `window.samples`
/// points, silently skipping points that are undefined or outside the window.
pub fn sample<'a>(curve: &'a dyn Curve, window: &SampleWindow) -> Result<Samples<'a>> {
    window.validate()?;
    Ok(Samples {
        curve,
        window: *window,
        index: 0,
    })
}

/// Collects the samples of a record. Shapes have no curve and yield nothing.
pub fn sample_record(
    record: &ParameterRecord,
    window: &SampleWindow,
    tol: &Tolerances,
) -> Result<Vec<SamplePoint>> {
    window.validate()?;
    match record.curve(tol)? {
        Some(curve) => Ok(sample(curve.as_ref(), window)?.collect()),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::record::{
        LinearParams, LogarithmicParams, RationalParams, TrigFunction, TrigonometricParams,
        TriangleInput,
    };
    use crate::vector::Point2;

    fn window(x_min: f64, x_max: f64, samples: usize) -> SampleWindow {
        SampleWindow {
            x_min,
            x_max,
            samples,
            ..SampleWindow::default()
        }
    }

    #[test]
    fn samples_span_the_window_inclusively() {
        let line = LinearParams {
            slope: 1.0,
            intercept: 0.0,
        };
        let points: Vec<_> = sample(&line, &window(-2.0, 2.0, 5)).expect("valid").collect();
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn points_outside_the_window_are_skipped() {
        let steep = LinearParams {
            slope: 10.0,
            intercept: 0.0,
        };
        let points: Vec<_> = sample(&steep, &window(-10.0, 10.0, 21)).expect("valid").collect();
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.y.abs() <= 10.0));
    }

    #[test]
    fn domain_violations_are_omitted_not_nan() {
        let log = LogarithmicParams {
            coeff: 1.0,
            base: std::f64::consts::E,
            x_coeff: 1.0,
            x_shift: 0.0,
            shift: 0.0,
        };
        let points: Vec<_> = sample(&log, &window(-5.0, 5.0, 11)).expect("valid").collect();
        assert!(points.iter().all(|p| p.x > 0.0 && p.y.is_finite()));
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn tangent_samples_skip_the_pole() {
        let record = ParameterRecord::Trigonometric(TrigonometricParams {
            function: TrigFunction::Tan,
            amplitude: 1.0,
            frequency: 1.0,
            phase: 0.0,
            shift: 0.0,
        });
        let tol = Tolerances::default();
        let w = SampleWindow {
            x_min: 0.0,
            x_max: std::f64::consts::PI,
            y_min: -1e20,
            y_max: 1e20,
            samples: 3,
        };
        let points = sample_record(&record, &w, &tol).expect("valid");
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.x != std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn clones_restart_independently() {
        let line = LinearParams {
            slope: 0.5,
            intercept: 1.0,
        };
        let mut samples = sample(&line, &window(0.0, 4.0, 5)).expect("valid");
        let first = samples.next();
        let replay = samples.clone();
        assert_eq!(first.map(|p| p.x), Some(0.0));
        assert_eq!(samples.count(), 4);
        assert_eq!(replay.count(), 4);
    }

    #[test]
    fn invalid_window_is_rejected() {
        let line = LinearParams {
            slope: 1.0,
            intercept: 0.0,
        };
        let err = sample(&line, &window(1.0, 1.0, 10)).err().expect("empty range");
        assert!(matches!(err, AnalysisError::InvalidSettings(_)));
    }

    #[test]
    fn rational_record_samples_around_its_pole() {
        let record = ParameterRecord::Rational(RationalParams {
            numerator: "1".to_string(),
            denominator: "x".to_string(),
        });
        let points =
            sample_record(&record, &window(-1.0, 1.0, 3), &Tolerances::default()).expect("valid");
        assert_eq!(
            points,
            vec![SamplePoint { x: -1.0, y: -1.0 }, SamplePoint { x: 1.0, y: 1.0 }]
        );
    }

    #[test]
    fn shapes_have_no_samples() {
        let record = ParameterRecord::Triangle(TriangleInput {
            a: Point2::new(0.0, 0.0),
            b: Point2::new(1.0, 0.0),
            c: Point2::new(0.0, 1.0),
        });
        let points =
            sample_record(&record, &SampleWindow::default(), &Tolerances::default()).expect("valid");
        assert!(points.is_empty());
    }
}
