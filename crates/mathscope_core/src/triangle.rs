use crate::error::{Degeneracy, Result};
use crate::record::TriangleInput;
use crate::settings::Tolerances;
use crate::vector::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideClass {
    Equilateral,
    Isosceles,
    Scalene,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleClass {
    Right,
    Acute,
    Obtuse,
}

impl fmt::Display for SideClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for AngleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialProperty {
    /// `a² + b² = c²` on the sorted sides.
    Pythagorean { a: f64, b: f64, c: f64 },
    FortyFiveNinety,
    ThirtySixtyNinety,
    /// Every angle is 60° and every side is equal.
    Equilateral,
    /// The repeated angle of an isosceles triangle.
    IsoscelesBase { angle: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertices {
    pub a: Point2,
    pub b: Point2,
    pub c: Point2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sides {
    pub ab: f64,
    pub bc: f64,
    pub ca: f64,
}

impl Sides {
    pub fn sorted(&self) -> [f64; 3] {
        let mut sides = [self.ab, self.bc, self.ca];
        sides.sort_by(f64::total_cmp);
        sides
    }
}

/// Interior angles in degrees, each named for the vertex it sits at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angles {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Angles {
    pub fn as_array(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    pub fn sum(&self) -> f64 {
        self.a + self.b + self.c
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleAnalysis {
    pub vertices: Vertices,
    pub sides: Sides,
    pub angles: Angles,
    pub area: f64,
    pub perimeter: f64,
    pub by_sides: SideClass,
    pub by_angles: AngleClass,
    /// e.g. "Right Scalene".
    pub classification: String,
    pub special: Vec<SpecialProperty>,
}

/// Twice the signed area of `ABC`.
fn cross(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

pub fn are_collinear(a: Point2, b: Point2, c: Point2, tol: &Tolerances) -> bool {
    tol.is_zero(cross(a, b, c))
}

/// Shoelace area.
pub fn area(a: Point2, b: Point2, c: Point2) -> f64 {
    cross(a, b, c).abs() / 2.0
}

/// Angle opposite side `opposite`, from the law of cosines.
pub fn law_of_cosines(adjacent1: f64, adjacent2: f64, opposite: f64) -> f64 {
    let cos = (adjacent1 * adjacent1 + adjacent2 * adjacent2 - opposite * opposite)
        / (2.0 * adjacent1 * adjacent2);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

pub fn classify_by_sides(sides: &Sides, tol: &Tolerances) -> SideClass {
    let [s0, s1, s2] = sides.sorted();
    let first_pair = tol.near(s0, s1);
    let second_pair = tol.near(s1, s2);
    if first_pair && second_pair {
        SideClass::Equilateral
    } else if first_pair || second_pair || tol.near(s0, s2) {
        SideClass::Isosceles
    } else {
        SideClass::Scalene
    }
}

pub fn classify_by_angles(angles: &Angles, tol: &Tolerances) -> AngleClass {
    let angles = angles.as_array();
    if angles
        .iter()
        .any(|angle| (angle - 90.0).abs() < tol.right_angle_degrees)
    {
        AngleClass::Right
    } else if angles.iter().all(|angle| *angle < 90.0) {
        AngleClass::Acute
    } else {
        AngleClass::Obtuse
    }
}

fn special_properties(
    sides: &Sides,
    angles: &Angles,
    by_sides: SideClass,
    by_angles: AngleClass,
    tol: &Tolerances,
) -> Vec<SpecialProperty> {
    let mut special = Vec::new();

    if by_angles == AngleClass::Right {
        let [a, b, c] = sides.sorted();
        if (c * c - (a * a + b * b)).abs() < tol.ratio {
            special.push(SpecialProperty::Pythagorean { a, b, c });
        }
        if (a - b).abs() < tol.ratio && (c - a * std::f64::consts::SQRT_2).abs() < tol.ratio {
            special.push(SpecialProperty::FortyFiveNinety);
        }
        if (c / a - 2.0).abs() < tol.ratio && (b / a - 3f64.sqrt()).abs() < tol.ratio {
            special.push(SpecialProperty::ThirtySixtyNinety);
        }
    }

    match by_sides {
        SideClass::Equilateral => special.push(SpecialProperty::Equilateral),
        SideClass::Isosceles => {
            let values = angles.as_array();
            let repeated = values.iter().enumerate().find_map(|(i, angle)| {
                values[i + 1..]
                    .iter()
                    .any(|other| (other - angle).abs() < tol.ratio)
                    .then_some(*angle)
            });
            if let Some(angle) = repeated {
                special.push(SpecialProperty::IsoscelesBase { angle });
            }
        }
        SideClass::Scalene => {}
    }

    special
}

pub fn analyze(input: &TriangleInput, tol: &Tolerances) -> Result<TriangleAnalysis> {
    let TriangleInput { a, b, c } = *input;
    if are_collinear(a, b, c, tol) {
        debug!(?a, ?b, ?c, "collinear triangle vertices");
        return Err(Degeneracy::CollinearPoints.into());
    }

    let sides = Sides {
        ab: a.distance(&b),
        bc: b.distance(&c),
        ca: c.distance(&a),
    };
    let angles = Angles {
        a: law_of_cosines(sides.ab, sides.ca, sides.bc),
        b: law_of_cosines(sides.ab, sides.bc, sides.ca),
        c: law_of_cosines(sides.bc, sides.ca, sides.ab),
    };
    let by_sides = classify_by_sides(&sides, tol);
    let by_angles = classify_by_angles(&angles, tol);

    Ok(TriangleAnalysis {
        vertices: Vertices { a, b, c },
        sides,
        angles,
        area: area(a, b, c),
        perimeter: sides.ab + sides.bc + sides.ca,
        by_sides,
        by_angles,
        classification: format!("{by_angles} {by_sides}"),
        special: special_properties(&sides, &angles, by_sides, by_angles, tol),
    })
}
