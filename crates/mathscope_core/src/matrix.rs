//! Linear-map analysis for 2×2 and 3×3 matrices.
//!
//! Every matrix gets its determinant, trace and transpose. Only 2×2 matrices
//! get the planar section: closed-form inverse, eigenvalues, the
//! classification checklist and the images used for visualization.

use crate::error::Degeneracy;
use crate::record::MatrixInput;
use crate::settings::Tolerances;
use crate::vector::Point2;
use nalgebra::{Matrix2, Matrix3, Vector2};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Row-major square matrix. Serialized as nested row arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Matrix {
    Square2([[f64; 2]; 2]),
    Square3([[f64; 3]; 3]),
}

impl Matrix {
    pub fn identity2() -> Self {
        Matrix::Square2([[1.0, 0.0], [0.0, 1.0]])
    }

    pub fn size(&self) -> usize {
        match self {
            Matrix::Square2(_) => 2,
            Matrix::Square3(_) => 3,
        }
    }

    pub fn determinant(&self) -> f64 {
        match self {
            Matrix::Square2([[a, b], [c, d]]) => a * d - b * c,
            Matrix::Square3(m) => {
                m[0][0] * m[1][1] * m[2][2]
                    + m[0][1] * m[1][2] * m[2][0]
                    + m[0][2] * m[1][0] * m[2][1]
                    - m[0][2] * m[1][1] * m[2][0]
                    - m[0][0] * m[1][2] * m[2][1]
                    - m[0][1] * m[1][0] * m[2][2]
            }
        }
    }

    pub fn trace(&self) -> f64 {
        match self {
            Matrix::Square2(m) => m[0][0] + m[1][1],
            Matrix::Square3(m) => m[0][0] + m[1][1] + m[2][2],
        }
    }

    pub fn transpose(&self) -> Matrix {
        match self {
            Matrix::Square2(m) => Matrix::Square2([[m[0][0], m[1][0]], [m[0][1], m[1][1]]]),
            Matrix::Square3(m) => {
                let mut t = [[0.0; 3]; 3];
                for (i, row) in m.iter().enumerate() {
                    for (j, value) in row.iter().enumerate() {
                        t[j][i] = *value;
                    }
                }
                Matrix::Square3(t)
            }
        }
    }

    /// Adjugate over determinant. Only defined for 2×2 matrices.
    pub fn inverse(&self, tol: &Tolerances) -> Option<Result<Matrix, Degeneracy>> {
        let Matrix::Square2([[a, b], [c, d]]) = *self else {
            return None;
        };
        let det = self.determinant();
        if tol.is_zero(det) {
            return Some(Err(Degeneracy::SingularMatrix));
        }
        Some(Ok(Matrix::Square2([
            [d / det, -b / det],
            [-c / det, a / det],
        ])))
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Matrix::Square2(m) => m.iter().flatten().all(|v| v.is_finite()),
            Matrix::Square3(m) => m.iter().flatten().all(|v| v.is_finite()),
        }
    }

    fn to_na2(self) -> Option<Matrix2<f64>> {
        match self {
            Matrix::Square2([[a, b], [c, d]]) => Some(Matrix2::new(a, b, c, d)),
            Matrix::Square3(_) => None,
        }
    }

    fn to_na3(self) -> Option<Matrix3<f64>> {
        match self {
            Matrix::Square3(m) => Some(Matrix3::from_fn(|i, j| m[i][j])),
            Matrix::Square2(_) => None,
        }
    }
}

/// Matrix product `a · b`; `None` when the sizes differ.
pub fn multiply(a: &Matrix, b: &Matrix) -> Option<Matrix> {
    match (a, b) {
        (Matrix::Square2(_), Matrix::Square2(_)) => {
            let p = a.to_na2()? * b.to_na2()?;
            Some(Matrix::Square2([[p[(0, 0)], p[(0, 1)]], [p[(1, 0)], p[(1, 1)]]]))
        }
        (Matrix::Square3(_), Matrix::Square3(_)) => {
            let p = a.to_na3()? * b.to_na3()?;
            let mut out = [[0.0; 3]; 3];
            for (i, row) in out.iter_mut().enumerate() {
                for (j, value) in row.iter_mut().enumerate() {
                    *value = p[(i, j)];
                }
            }
            Some(Matrix::Square3(out))
        }
        _ => None,
    }
}

/// Image of a planar point; 3×3 matrices leave the point unchanged.
pub fn transform_point(m: &Matrix, p: Point2) -> Point2 {
    match m.to_na2() {
        Some(m) => {
            let image = m * Vector2::new(p.x, p.y);
            Point2::new(image.x, image.y)
        }
        None => p,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Eigenvalues {
    /// `lambda1 >= lambda2`.
    Real { lambda1: f64, lambda2: f64 },
    /// The conjugate pair `re ± im·i`, with `im > 0`.
    ComplexPair { re: f64, im: f64 },
}

impl Eigenvalues {
    /// Roots of `λ² - trace·λ + det = 0`.
    pub fn from_characteristic(trace: f64, det: f64) -> Self {
        let discriminant = trace * trace - 4.0 * det;
        let root = Complex::new(discriminant, 0.0).sqrt();
        let half_trace = Complex::new(trace / 2.0, 0.0);
        let first = half_trace + root / 2.0;
        if discriminant >= 0.0 {
            let second = half_trace - root / 2.0;
            Eigenvalues::Real {
                lambda1: first.re,
                lambda2: second.re,
            }
        } else {
            Eigenvalues::ComplexPair {
                re: first.re,
                im: first.im.abs(),
            }
        }
    }

    pub fn values(&self) -> [ComplexNumber; 2] {
        match *self {
            Eigenvalues::Real { lambda1, lambda2 } => [
                Complex::new(lambda1, 0.0).into(),
                Complex::new(lambda2, 0.0).into(),
            ],
            Eigenvalues::ComplexPair { re, im } => {
                let lambda = Complex::new(re, im);
                [lambda.into(), lambda.conj().into()]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformKind {
    Identity,
    Rotation { degrees: f64 },
    Reflection,
    Scaling { x: f64, y: f64 },
    Shear,
    Singular,
    OrientationReversing,
    OrientationPreserving,
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Identity => f.write_str("Identity"),
            TransformKind::Rotation { degrees } => write!(f, "Rotation ({degrees:.1}°)"),
            TransformKind::Reflection => f.write_str("Reflection"),
            TransformKind::Scaling { x, y } => write!(f, "Scaling ({x:.2}, {y:.2})"),
            TransformKind::Shear => f.write_str("Shear"),
            TransformKind::Singular => f.write_str("Singular (no inverse)"),
            TransformKind::OrientationReversing => f.write_str("Orientation-reversing"),
            TransformKind::OrientationPreserving => f.write_str("Orientation-preserving"),
        }
    }
}

/// Priority-ordered checklist; a matrix may collect several tags. The
/// determinant tag is always last.
pub fn classify(m: [[f64; 2]; 2], tol: &Tolerances) -> Vec<TransformKind> {
    let [[a, b], [c, d]] = m;
    let det = a * d - b * c;
    let mut kinds = Vec::new();

    if tol.near(a, 1.0) && tol.near(d, 1.0) && tol.is_zero(b) && tol.is_zero(c) {
        kinds.push(TransformKind::Identity);
    }
    if tol.near(det, 1.0) && tol.near(a, d) && tol.is_zero(b + c) {
        kinds.push(TransformKind::Rotation {
            degrees: c.atan2(a).to_degrees(),
        });
    }
    if tol.near(det, -1.0) {
        kinds.push(TransformKind::Reflection);
    }
    if tol.is_zero(b) && tol.is_zero(c) {
        kinds.push(TransformKind::Scaling { x: a, y: d });
    }
    if tol.near(det, 1.0) && (!tol.is_zero(b) || !tol.is_zero(c)) {
        kinds.push(TransformKind::Shear);
    }

    kinds.push(if tol.is_zero(det) {
        TransformKind::Singular
    } else if det < 0.0 {
        TransformKind::OrientationReversing
    } else {
        TransformKind::OrientationPreserving
    });
    kinds
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridImage {
    pub source: Point2,
    pub image: Point2,
}

pub const GRID_EXTENT: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarTransform {
    pub inverse: Result<Matrix, Degeneracy>,
    pub eigenvalues: Eigenvalues,
    pub classification: Vec<TransformKind>,
    /// Images of `(1,0)` and `(0,1)`.
    pub basis_images: [Point2; 2],
    /// Images of the unit square corners, counter-clockwise from the origin.
    pub unit_square: [Point2; 4],
    pub grid: Vec<GridImage>,
    /// Factor by which the map scales areas, `|det|`.
    pub area_scale: f64,
}

impl PlanarTransform {
    fn new(matrix: &Matrix, values: [[f64; 2]; 2], tol: &Tolerances) -> Option<Self> {
        let inverse = matrix.inverse(tol)?;
        let det = matrix.determinant();
        let image = |x: f64, y: f64| transform_point(matrix, Point2::new(x, y));

        let grid = (-GRID_EXTENT..=GRID_EXTENT)
            .flat_map(|i| (-GRID_EXTENT..=GRID_EXTENT).map(move |j| (i as f64, j as f64)))
            .map(|(x, y)| GridImage {
                source: Point2::new(x, y),
                image: image(x, y),
            })
            .collect();

        Some(Self {
            inverse,
            eigenvalues: Eigenvalues::from_characteristic(matrix.trace(), det),
            classification: classify(values, tol),
            basis_images: [image(1.0, 0.0), image(0.0, 1.0)],
            unit_square: [
                image(0.0, 0.0),
                image(1.0, 0.0),
                image(1.0, 1.0),
                image(0.0, 1.0),
            ],
            grid,
            area_scale: det.abs(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixAnalysis {
    pub matrix: Matrix,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    pub size: usize,
    pub determinant: f64,
    pub trace: f64,
    pub transpose: Matrix,
    /// Only present for 2×2 matrices.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub planar: Option<PlanarTransform>,
}

impl MatrixAnalysis {
    /// Human-readable classification tags, in checklist order.
    pub fn classification_labels(&self) -> Vec<String> {
        self.planar
            .as_ref()
            .map(|p| p.classification.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}

pub fn analyze(input: &MatrixInput, tol: &Tolerances) -> MatrixAnalysis {
    let matrix = input.values;
    let planar = match matrix {
        Matrix::Square2(values) => PlanarTransform::new(&matrix, values, tol),
        Matrix::Square3(_) => {
            debug!("3x3 matrix: planar analysis unavailable");
            None
        }
    };
    if let Some(Err(degeneracy)) = planar.as_ref().map(|p| &p.inverse) {
        debug!(%degeneracy, "matrix has no inverse");
    }

    MatrixAnalysis {
        matrix,
        label: input.label.clone(),
        size: matrix.size(),
        determinant: matrix.determinant(),
        trace: matrix.trace(),
        transpose: matrix.transpose(),
        planar,
    }
}
