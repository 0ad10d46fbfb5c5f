//! Vector algebra for 2D and 3D displacement and component vectors.

use crate::error::{AnalysisError, Degeneracy, Result};
use crate::record::{LabeledPoint, VectorInput};
use crate::settings::Tolerances;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A 2D or 3D vector. Serialized as `{x, y}` or `{x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vector {
    Spatial { x: f64, y: f64, z: f64 },
    Planar { x: f64, y: f64 },
}

/// The cross product is a scalar for planar operands and a vector in space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cross {
    Scalar(f64),
    Vector(Vector),
}

impl Cross {
    pub fn magnitude(&self) -> f64 {
        match self {
            Cross::Scalar(value) => value.abs(),
            Cross::Vector(v) => v.magnitude(),
        }
    }
}

impl Vector {
    pub fn planar(x: f64, y: f64) -> Self {
        Self::Planar { x, y }
    }

    pub fn spatial(x: f64, y: f64, z: f64) -> Self {
        Self::Spatial { x, y, z }
    }

    pub fn is_3d(&self) -> bool {
        matches!(self, Self::Spatial { .. })
    }

    pub fn x(&self) -> f64 {
        match *self {
            Self::Planar { x, .. } | Self::Spatial { x, .. } => x,
        }
    }

    pub fn y(&self) -> f64 {
        match *self {
            Self::Planar { y, .. } | Self::Spatial { y, .. } => y,
        }
    }

    pub fn z(&self) -> Option<f64> {
        match *self {
            Self::Planar { .. } => None,
            Self::Spatial { z, .. } => Some(z),
        }
    }

    fn as_na(&self) -> Vector3<f64> {
        Vector3::new(self.x(), self.y(), self.z().unwrap_or(0.0))
    }

    fn from_na(v: Vector3<f64>, spatial: bool) -> Self {
        if spatial {
            Self::spatial(v.x, v.y, v.z)
        } else {
            Self::planar(v.x, v.y)
        }
    }

    fn same_dimension(&self, other: &Vector) -> Result<()> {
        if self.is_3d() == other.is_3d() {
            Ok(())
        } else {
            Err(AnalysisError::DimensionMismatch)
        }
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        self.as_na().norm()
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        self.same_dimension(other)?;
        Ok(Self::from_na(self.as_na() + other.as_na(), self.is_3d()))
    }

    pub fn subtract(&self, other: &Vector) -> Result<Vector> {
        self.same_dimension(other)?;
        Ok(Self::from_na(self.as_na() - other.as_na(), self.is_3d()))
    }

    pub fn scale(&self, factor: f64) -> Vector {
        Self::from_na(self.as_na() * factor, self.is_3d())
    }

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.same_dimension(other)?;
        Ok(self.as_na().dot(&other.as_na()))
    }

    pub fn cross(&self, other: &Vector) -> Result<Cross> {
        self.same_dimension(other)?;
        if self.is_3d() {
            Ok(Cross::Vector(Self::from_na(
                self.as_na().cross(&other.as_na()),
                true,
            )))
        } else {
            Ok(Cross::Scalar(self.x() * other.y() - self.y() * other.x()))
        }
    }

    /// Component / magnitude; undefined for a zero vector.
    pub fn unit(&self, tol: &Tolerances) -> std::result::Result<Vector, Degeneracy> {
        let magnitude = self.magnitude();
        if tol.is_zero(magnitude) {
            return Err(Degeneracy::ZeroMagnitude);
        }
        Ok(self.scale(1.0 / magnitude))
    }

    pub fn direction(&self, tol: &Tolerances) -> std::result::Result<Direction, Degeneracy> {
        let magnitude = self.magnitude();
        if tol.is_zero(magnitude) {
            return Err(Degeneracy::ZeroMagnitude);
        }
        match *self {
            Self::Planar { x, y } => Ok(Direction::Planar {
                angle_degrees: y.atan2(x).to_degrees(),
                quadrant: Quadrant::of(x, y),
                bearing: Bearing::of(x, y),
            }),
            Self::Spatial { x, y, z } => {
                let cosines = [x / magnitude, y / magnitude, z / magnitude];
                let angles_degrees = cosines.map(|c| c.clamp(-1.0, 1.0).acos().to_degrees());
                Ok(Direction::Spatial {
                    cosines,
                    angles_degrees,
                })
            }
        }
    }

    /// Angle between two vectors, in degrees.
    pub fn angle_between(&self, other: &Vector, tol: &Tolerances) -> Result<f64> {
        let dot = self.dot(other)?;
        let denom = self.magnitude() * other.magnitude();
        if tol.is_zero(denom) {
            return Err(Degeneracy::ZeroMagnitude.into());
        }
        Ok((dot / denom).clamp(-1.0, 1.0).acos().to_degrees())
    }

    pub fn orthogonal(&self, other: &Vector, tol: &Tolerances) -> Result<bool> {
        Ok(tol.is_zero(self.dot(other)?))
    }

    pub fn parallel(&self, other: &Vector, tol: &Tolerances) -> Result<bool> {
        Ok(tol.is_zero(self.cross(other)?.magnitude()))
    }
}

impl From<Point2> for Vector {
    fn from(p: Point2) -> Self {
        Vector::planar(p.x, p.y)
    }
}

/// Component-wise difference `end - start`.
pub fn displacement(start: &Vector, end: &Vector) -> Result<Vector> {
    end.subtract(start)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    I,
    II,
    III,
    IV,
}

impl Quadrant {
    /// Zero components count as positive.
    pub fn of(x: f64, y: f64) -> Self {
        match (x >= 0.0, y >= 0.0) {
            (true, true) => Quadrant::I,
            (false, true) => Quadrant::II,
            (false, false) => Quadrant::III,
            (true, false) => Quadrant::IV,
        }
    }
}

/// Navigation bearing, clockwise from north.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bearing {
    pub degrees: f64,
    pub compass: String,
}

impl Bearing {
    pub fn of(x: f64, y: f64) -> Self {
        let mut degrees = x.atan2(y).to_degrees();
        if degrees < 0.0 {
            degrees += 360.0;
        }
        if degrees >= 360.0 {
            degrees -= 360.0;
        }
        let offset = degrees % 90.0;
        let compass = match (degrees / 90.0).floor() as u8 {
            0 => format!("N{:.1}°E", offset),
            1 => format!("S{:.1}°E", 90.0 - offset),
            2 => format!("S{:.1}°W", offset),
            _ => format!("N{:.1}°W", 90.0 - offset),
        };
        Self { degrees, compass }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Direction {
    Planar {
        angle_degrees: f64,
        quadrant: Quadrant,
        bearing: Bearing,
    },
    Spatial {
        /// Direction cosines (alpha, beta, gamma).
        cosines: [f64; 3],
        angles_degrees: [f64; 3],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorReport {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start: Option<LabeledPoint>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end: Option<LabeledPoint>,
    pub components: Vector,
    pub magnitude: f64,
    pub unit_vector: std::result::Result<Vector, Degeneracy>,
    pub direction: std::result::Result<Direction, Degeneracy>,
}

impl VectorReport {
    pub fn new(
        start: Option<LabeledPoint>,
        end: Option<LabeledPoint>,
        components: Vector,
        tol: &Tolerances,
    ) -> Self {
        Self {
            start,
            end,
            components,
            magnitude: components.magnitude(),
            unit_vector: components.unit(tol),
            direction: components.direction(tol),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairwise {
    pub sum: Vector,
    pub difference: Vector,
    pub dot: f64,
    pub cross: Cross,
    pub angle_between: std::result::Result<f64, Degeneracy>,
    pub orthogonal: bool,
    pub parallel: bool,
}

impl Pairwise {
    pub fn between(v1: &Vector, v2: &Vector, tol: &Tolerances) -> Result<Self> {
        let angle_between = match v1.angle_between(v2, tol) {
            Ok(angle) => Ok(angle),
            Err(AnalysisError::Degenerate(degeneracy)) => Err(degeneracy),
            Err(other) => return Err(other),
        };
        Ok(Self {
            sum: v1.add(v2)?,
            difference: v1.subtract(v2)?,
            dot: v1.dot(v2)?,
            cross: v1.cross(v2)?,
            angle_between,
            orthogonal: v1.orthogonal(v2, tol)?,
            parallel: v1.parallel(v2, tol)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorAnalysis {
    pub is_3d: bool,
    pub vectors: Vec<VectorReport>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pairwise: Option<Pairwise>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resultant: Option<Vector>,
}

pub fn analyze(input: &VectorInput, tol: &Tolerances) -> Result<VectorAnalysis> {
    let vectors = match input {
        VectorInput::Displacement { start, end } => {
            let components = displacement(&start.position, &end.position)?;
            vec![VectorReport::new(
                Some(start.clone()),
                Some(end.clone()),
                components,
                tol,
            )]
        }
        VectorInput::Components { vector } => {
            vec![VectorReport::new(None, None, *vector, tol)]
        }
        VectorInput::Chain { points } => points
            .windows(2)
            .map(|pair| {
                let components = displacement(&pair[0].position, &pair[1].position)?;
                Ok(VectorReport::new(
                    Some(pair[0].clone()),
                    Some(pair[1].clone()),
                    components,
                    tol,
                ))
            })
            .collect::<Result<Vec<_>>>()?,
    };

    let (pairwise, resultant) = match vectors.as_slice() {
        [first, second, ..] => {
            let pairwise = Pairwise::between(&first.components, &second.components, tol)?;
            let resultant = pairwise.sum;
            (Some(pairwise), Some(resultant))
        }
        _ => (None, None),
    };

    for report in &vectors {
        if let Err(degeneracy) = report.unit_vector {
            debug!(%degeneracy, "vector has no unit direction");
        }
    }

    Ok(VectorAnalysis {
        is_3d: input.is_3d(),
        vectors,
        pairwise,
        resultant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    fn point(label: &str, x: f64, y: f64) -> LabeledPoint {
        LabeledPoint::new(Some(label), Vector::planar(x, y))
    }

    #[test]
    fn displacement_between_two_points() {
        let input = VectorInput::Displacement {
            start: point("A", 1.0, 2.0),
            end: point("B", 5.0, 4.0),
        };
        let analysis = analyze(&input, &tol()).expect("analysis");
        let report = &analysis.vectors[0];
        assert_eq!(report.components, Vector::planar(4.0, 2.0));
        assert!((report.magnitude - 4.472).abs() < 1e-3);
        match report.direction.as_ref().expect("direction") {
            Direction::Planar {
                quadrant,
                angle_degrees,
                bearing,
            } => {
                assert_eq!(*quadrant, Quadrant::I);
                assert!((angle_degrees - 26.565).abs() < 1e-3);
                assert_eq!(bearing.compass, "N63.4°E");
            }
            other => panic!("unexpected direction {other:?}"),
        }
        assert!(analysis.pairwise.is_none());
    }

    #[test]
    fn magnitude_is_invariant_under_negation_and_matches_dot() {
        let samples = [
            Vector::planar(3.0, -4.0),
            Vector::planar(0.0, 0.0),
            Vector::spatial(1.5, -2.0, 7.25),
            Vector::spatial(-1e3, 2e-3, 0.5),
        ];
        for v in samples {
            let negated = v.scale(-1.0);
            assert!((v.magnitude() - negated.magnitude()).abs() < 1e-12);
            let dot = v.dot(&v).expect("same dimension");
            assert!((dot - v.magnitude().powi(2)).abs() < 1e-9 * dot.max(1.0));
        }
    }

    #[test]
    fn cross_product_depends_on_dimension() {
        let planar = Vector::planar(1.0, 0.0)
            .cross(&Vector::planar(0.0, 1.0))
            .expect("planar");
        assert_eq!(planar, Cross::Scalar(1.0));

        let spatial = Vector::spatial(1.0, 0.0, 0.0)
            .cross(&Vector::spatial(0.0, 1.0, 0.0))
            .expect("spatial");
        assert_eq!(spatial, Cross::Vector(Vector::spatial(0.0, 0.0, 1.0)));
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let err = Vector::planar(1.0, 2.0)
            .dot(&Vector::spatial(1.0, 2.0, 3.0))
            .expect_err("mismatch");
        assert_eq!(err, AnalysisError::DimensionMismatch);
    }

    #[test]
    fn orthogonality_and_parallelism_use_tolerance() {
        let t = tol();
        let a = Vector::planar(1.0, 1.0);
        let b = Vector::planar(-1.0, 1.0 + 1e-12);
        assert!(a.orthogonal(&b, &t).expect("same dim"));
        assert!(!a.parallel(&b, &t).expect("same dim"));
        let c = Vector::planar(2.0, 2.0);
        assert!(a.parallel(&c, &t).expect("same dim"));
        assert!((a.angle_between(&b, &t).expect("angle") - 90.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_has_no_unit_or_direction() {
        let report = VectorReport::new(None, None, Vector::planar(0.0, 0.0), &tol());
        assert_eq!(report.unit_vector, Err(Degeneracy::ZeroMagnitude));
        assert_eq!(report.direction, Err(Degeneracy::ZeroMagnitude));
        assert_eq!(report.magnitude, 0.0);
    }

    #[test]
    fn spatial_direction_cosines() {
        let direction = Vector::spatial(0.0, 0.0, 2.0)
            .direction(&tol())
            .expect("direction");
        match direction {
            Direction::Spatial {
                cosines,
                angles_degrees,
            } => {
                assert_eq!(cosines, [0.0, 0.0, 1.0]);
                assert!((angles_degrees[0] - 90.0).abs() < 1e-9);
                assert!(angles_degrees[2].abs() < 1e-9);
            }
            other => panic!("unexpected direction {other:?}"),
        }
    }

    #[test]
    fn bearings_cover_all_compass_quadrants() {
        assert_eq!(Bearing::of(1.0, -1.0).compass, "S45.0°E");
        assert_eq!(Bearing::of(-1.0, -1.0).compass, "S45.0°W");
        assert_eq!(Bearing::of(-1.0, 1.0).compass, "N45.0°W");
        assert_eq!(Bearing::of(0.0, 1.0).compass, "N0.0°E");
        assert_eq!(Quadrant::of(-2.0, 0.0), Quadrant::II);
        assert_eq!(Quadrant::of(0.0, -3.0), Quadrant::IV);
    }

    #[test]
    fn chain_produces_pairwise_operations_and_resultant() {
        let input = VectorInput::Chain {
            points: [
                point("A", 0.0, 0.0),
                point("B", 3.0, 0.0),
                point("C", 3.0, 4.0),
            ],
        };
        let analysis = analyze(&input, &tol()).expect("analysis");
        assert_eq!(analysis.vectors.len(), 2);
        let pairwise = analysis.pairwise.expect("pairwise");
        assert_eq!(pairwise.sum, Vector::planar(3.0, 4.0));
        assert_eq!(pairwise.difference, Vector::planar(3.0, -4.0));
        assert_eq!(pairwise.dot, 0.0);
        assert_eq!(pairwise.cross, Cross::Scalar(12.0));
        assert!(pairwise.orthogonal);
        assert!(!pairwise.parallel);
        assert_eq!(analysis.resultant, Some(Vector::planar(3.0, 4.0)));
    }
}
