//! Dispatch from a parameter record to the analyzer for its family.

use crate::error::{AnalysisError, Result};
use crate::extract::classify;
use crate::function::{self, FunctionAnalysis};
use crate::matrix::{self, MatrixAnalysis};
use crate::record::{Family, ParameterRecord};
use crate::settings::Tolerances;
use crate::triangle::{self, TriangleAnalysis};
use crate::vector::{self, VectorAnalysis};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    Function(FunctionAnalysis),
    Vector(VectorAnalysis),
    Matrix(MatrixAnalysis),
    Triangle(TriangleAnalysis),
}

impl Analysis {
    /// Short human-readable label for the analyzed object.
    pub fn classification(&self) -> String {
        match self {
            Analysis::Function(f) => f.classification.clone(),
            Analysis::Vector(v) => {
                let dimension = if v.is_3d { "3D" } else { "2D" };
                match v.vectors.len() {
                    1 => format!("{dimension} vector"),
                    n => format!("{n} {dimension} vectors"),
                }
            }
            Analysis::Matrix(m) => match m.classification_labels() {
                labels if labels.is_empty() => format!("{0}×{0} matrix", m.size),
                labels => labels.join(", "),
            },
            Analysis::Triangle(t) => t.classification.clone(),
        }
    }
}

/// A recognized input together with its analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub family: Family,
    pub record: ParameterRecord,
    pub analysis: Analysis,
}

/// Runs the analyzer matching the record's family.
pub fn analyze(record: &ParameterRecord, tol: &Tolerances) -> Result<Analysis> {
    tol.validate()?;
    let analysis = match record {
        ParameterRecord::Vector(input) => Analysis::Vector(vector::analyze(input, tol)?),
        ParameterRecord::Matrix(input) => Analysis::Matrix(matrix::analyze(input, tol)),
        ParameterRecord::Triangle(input) => Analysis::Triangle(triangle::analyze(input, tol)?),
        _ => match function::analyze(record, tol) {
            Some(result) => Analysis::Function(result?),
            None => return Err(AnalysisError::unrecognized(&record.family().to_string())),
        },
    };
    Ok(analysis)
}

/// Classifies free text and analyzes the resulting record.
pub fn analyze_input(input: &str, tol: &Tolerances) -> Result<Report> {
    let record = classify(input)?;
    let analysis = analyze(&record, tol).inspect_err(|err| {
        debug!(family = %record.family(), %err, "analysis failed");
    })?;
    Ok(Report {
        family: record.family(),
        record,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Degeneracy;
    use crate::function::polynomial::Opening;
    use crate::function::{FeatureKind, FunctionDetails, Span};
    use crate::matrix::Eigenvalues;
    use crate::triangle::SpecialProperty;
    use crate::vector::{Direction, Quadrant, Vector};

    fn report(input: &str) -> Report {
        analyze_input(input, &Tolerances::default())
            .unwrap_or_else(|err| panic!("{input}: {err}"))
    }

    #[test]
    fn vertex_form_round_trips_its_vertex() {
        let Analysis::Function(f) = report("y=2(x-3)**2+5").analysis else {
            panic!("expected a function analysis");
        };
        assert_eq!(f.feature(FeatureKind::Vertex).map(|p| (p.x, p.y)), Some((3.0, 5.0)));
        assert_eq!(
            f.range,
            Span::Above {
                bound: 5.0,
                inclusive: true
            }
        );
        assert_eq!(f.range.describe("y"), "y ≥ 5");
        match f.details {
            FunctionDetails::Quadratic(q) => assert_eq!(q.opening, Opening::Upward),
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn perfect_square_touches_axis_once() {
        let Analysis::Function(f) = report("y=x**2+2x+1").analysis else {
            panic!("expected a function analysis");
        };
        assert_eq!(f.characteristic_points.len(), 1);
        let vertex = f.feature(FeatureKind::Vertex).expect("vertex");
        assert!((vertex.x + 1.0).abs() < 1e-12 && vertex.y.abs() < 1e-12);
        assert_eq!(f.intercepts.x.len(), 1);
        assert!(f.classification.contains("touches the x-axis once"));
    }

    #[test]
    fn right_scalene_triangle() {
        let Analysis::Triangle(t) = report("triangle A(0,0) B(4,0) C(0,3)").analysis else {
            panic!("expected a triangle analysis");
        };
        assert_eq!(t.sides.sorted(), [3.0, 4.0, 5.0]);
        assert_eq!(t.classification, "Right Scalene");
        assert!(t
            .special
            .iter()
            .any(|s| matches!(s, SpecialProperty::Pythagorean { .. })));
    }

    #[test]
    fn quarter_turn_matrix() {
        let report = report("matrix [[0,-1],[1,0]]");
        let classification = report.analysis.classification();
        let Analysis::Matrix(m) = report.analysis else {
            panic!("expected a matrix analysis");
        };
        assert_eq!(m.determinant, 1.0);
        assert!(m
            .classification_labels()
            .contains(&"Rotation (90.0°)".to_string()));
        assert!(classification.contains("Rotation (90.0°)"));
        let planar = m.planar.expect("2x2 matrices have a planar section");
        assert_eq!(planar.eigenvalues, Eigenvalues::ComplexPair { re: 0.0, im: 1.0 });
    }

    #[test]
    fn displacement_vector_scenario() {
        let Analysis::Vector(v) = report("vector A(1,2) B(5,4)").analysis else {
            panic!("expected a vector analysis");
        };
        let first = &v.vectors[0];
        assert_eq!(first.components, Vector::planar(4.0, 2.0));
        assert!((first.magnitude - 4.472).abs() < 1e-3);
        match &first.direction {
            Ok(Direction::Planar { quadrant, .. }) => assert_eq!(*quadrant, Quadrant::I),
            other => panic!("unexpected direction {other:?}"),
        }
    }

    #[test]
    fn degenerate_inputs_surface_as_errors() {
        let err = analyze_input("triangle (0,0) (1,1) (2,2)", &Tolerances::default())
            .expect_err("collinear");
        assert_eq!(err, AnalysisError::Degenerate(Degeneracy::CollinearPoints));

        let Analysis::Vector(v) = report("vector <0,0>").analysis else {
            panic!("expected a vector analysis");
        };
        assert_eq!(v.vectors[0].unit_vector, Err(Degeneracy::ZeroMagnitude));
    }

    #[test]
    fn invalid_tolerances_are_rejected() {
        let tol = Tolerances {
            exact: -1.0,
            ..Tolerances::default()
        };
        let err = analyze_input("y = x", &tol).expect_err("negative tolerance");
        assert!(err.is_caller_error());
    }

    #[test]
    fn reports_serialize_with_tags() {
        let json = serde_json::to_value(report("y = 2x + 1")).expect("serializes");
        assert_eq!(json["family"], "linear");
        assert_eq!(json["record"]["family"], "linear");
        assert_eq!(json["analysis"]["kind"], "function");
    }
}
