//! Extraction rules for the keyword commands: matrices, triangles, vectors.

use super::coefficient::{number_at, number_list};
use crate::matrix::Matrix;
use crate::record::{LabeledPoint, MatrixInput, ParameterRecord, TriangleInput, VectorInput};
use crate::vector::{Point2, Vector};
use regex::Captures;

fn matrix(values: Matrix, label: Option<String>) -> Option<ParameterRecord> {
    values
        .is_finite()
        .then_some(ParameterRecord::Matrix(MatrixInput { values, label }))
}

fn square(values: &[f64]) -> Option<Matrix> {
    match *values {
        [a, b, c, d] => Some(Matrix::Square2([[a, b], [c, d]])),
        [a, b, c, d, e, f, g, h, i] => Some(Matrix::Square3([[a, b, c], [d, e, f], [g, h, i]])),
        _ => None,
    }
}

pub(super) fn matrix_nested(caps: &Captures) -> Option<ParameterRecord> {
    let inner = caps
        .get(1)?
        .as_str()
        .strip_prefix("[[")?
        .strip_suffix("]]")?;
    let rows = inner
        .split("],[")
        .map(number_list)
        .collect::<Option<Vec<_>>>()?;
    if rows.iter().any(|row| row.len() != rows.len()) {
        return None;
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    matrix(square(&flat)?, None)
}

pub(super) fn matrix_flat(caps: &Captures) -> Option<ParameterRecord> {
    let values = number_list(caps.get(1)?.as_str())?;
    matrix(square(&values)?, None)
}

pub(super) fn matrix_spaced(caps: &Captures) -> Option<ParameterRecord> {
    let values = (1..=4)
        .map(|i| number_at(caps, i))
        .collect::<Option<Vec<_>>>()?;
    matrix(square(&values)?, None)
}

pub(super) fn matrix_rotation(caps: &Captures) -> Option<ParameterRecord> {
    let degrees = number_at(caps, 1)?;
    let (sin, cos) = degrees.to_radians().sin_cos();
    matrix(
        Matrix::Square2([[cos, -sin], [sin, cos]]),
        Some(format!("Rotation by {degrees}°")),
    )
}

pub(super) fn matrix_scale(caps: &Captures) -> Option<ParameterRecord> {
    let (sx, sy) = (number_at(caps, 1)?, number_at(caps, 2)?);
    matrix(
        Matrix::Square2([[sx, 0.0], [0.0, sy]]),
        Some(format!("Scale by ({sx}, {sy})")),
    )
}

pub(super) fn matrix_reflection(caps: &Captures) -> Option<ParameterRecord> {
    let (values, axis) = match caps.get(1)?.as_str() {
        "x" => ([[1.0, 0.0], [0.0, -1.0]], "x"),
        "y" => ([[-1.0, 0.0], [0.0, 1.0]], "y"),
        _ => return None,
    };
    matrix(
        Matrix::Square2(values),
        Some(format!("Reflection across {axis}-axis")),
    )
}

pub(super) fn matrix_shear(caps: &Captures) -> Option<ParameterRecord> {
    let (kx, ky) = (number_at(caps, 1)?, number_at(caps, 2)?);
    matrix(
        Matrix::Square2([[1.0, kx], [ky, 1.0]]),
        Some(format!("Shear by ({kx}, {ky})")),
    )
}

pub(super) fn triangle(caps: &Captures) -> Option<ParameterRecord> {
    let point = |i| Some(Point2::new(number_at(caps, i)?, number_at(caps, i + 1)?));
    Some(ParameterRecord::Triangle(TriangleInput {
        a: point(1)?,
        b: point(3)?,
        c: point(5)?,
    }))
}

/// Reads `(x, y[, z])` from three consecutive groups starting at `first`.
fn coordinates(caps: &Captures, first: usize) -> Option<Vector> {
    let (x, y) = (number_at(caps, first)?, number_at(caps, first + 1)?);
    match caps.get(first + 2) {
        Some(_) => Some(Vector::spatial(x, y, number_at(caps, first + 2)?)),
        None => Some(Vector::planar(x, y)),
    }
}

/// Points `(x,y[,z])` in consecutive group triples; all must share a dimension.
fn points<const N: usize>(caps: &Captures, labels: [Option<&str>; N]) -> Option<[LabeledPoint; N]> {
    let mut positions = Vec::with_capacity(N);
    for index in 0..N {
        positions.push(coordinates(caps, 1 + 3 * index)?);
    }
    let dimension = positions[0].is_3d();
    if positions.iter().any(|p| p.is_3d() != dimension) {
        return None;
    }
    let points: Vec<LabeledPoint> = positions
        .into_iter()
        .zip(labels)
        .map(|(position, label)| LabeledPoint::new(label, position))
        .collect();
    points.try_into().ok()
}

pub(super) fn vector_chain(caps: &Captures) -> Option<ParameterRecord> {
    let points = points(caps, [Some("A"), Some("B"), Some("C")])?;
    Some(ParameterRecord::Vector(VectorInput::Chain { points }))
}

pub(super) fn vector_labeled(caps: &Captures) -> Option<ParameterRecord> {
    let [start, end] = points(caps, [Some("A"), Some("B")])?;
    Some(ParameterRecord::Vector(VectorInput::Displacement { start, end }))
}

pub(super) fn vector_plain(caps: &Captures) -> Option<ParameterRecord> {
    let [start, end] = points(caps, [None, None])?;
    Some(ParameterRecord::Vector(VectorInput::Displacement { start, end }))
}

pub(super) fn vector_components(caps: &Captures) -> Option<ParameterRecord> {
    Some(ParameterRecord::Vector(VectorInput::Components {
        vector: coordinates(caps, 1)?,
    }))
}
