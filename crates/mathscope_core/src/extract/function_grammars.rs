//! Extraction rules for single-variable function bodies.

use super::coefficient::{coefficient_at, number_at, offset_at, term_at};
use crate::equation_engine::{compile_expression, parse, Expr};
use crate::record::{
    CubicParams, ExponentialParams, LinearParams, LogarithmicParams, ParameterRecord,
    QuadraticForm, QuadraticParams, RationalParams, SpecialFunction, SpecialParams,
    TransformParams, TrigFunction, TrigonometricParams,
};
use crate::settings::Tolerances;
use regex::Captures;
use std::f64::consts::E;

fn nonzero(value: f64) -> Option<f64> {
    (!Tolerances::default().is_zero(value)).then_some(value)
}

/// Positive and away from 1, so `ln(base)` is a usable divisor.
fn valid_base(base: f64) -> Option<f64> {
    let tol = Tolerances::default();
    (base > 0.0 && !tol.is_zero(base) && !tol.near(base, 1.0)).then_some(base)
}

pub(super) fn linear(caps: &Captures) -> Option<ParameterRecord> {
    Some(ParameterRecord::Linear(LinearParams {
        slope: coefficient_at(caps, 1)?,
        intercept: offset_at(caps, 2)?,
    }))
}

pub(super) fn constant(caps: &Captures) -> Option<ParameterRecord> {
    Some(ParameterRecord::Linear(LinearParams {
        slope: 0.0,
        intercept: number_at(caps, 1)?,
    }))
}

pub(super) fn quadratic_vertex(caps: &Captures) -> Option<ParameterRecord> {
    let a = nonzero(coefficient_at(caps, 1)?)?;
    // `(x - h)` carries h with the opposite sign.
    let h = 0.0 - offset_at(caps, 2)?;
    let k = offset_at(caps, 3)?;
    Some(ParameterRecord::Quadratic(QuadraticParams {
        a,
        form: QuadraticForm::Vertex { h, k },
    }))
}

pub(super) fn quadratic_standard(caps: &Captures) -> Option<ParameterRecord> {
    Some(ParameterRecord::Quadratic(QuadraticParams {
        a: nonzero(coefficient_at(caps, 1)?)?,
        form: QuadraticForm::Standard {
            b: term_at(caps, 2)?,
            c: offset_at(caps, 3)?,
        },
    }))
}

pub(super) fn cubic(caps: &Captures) -> Option<ParameterRecord> {
    Some(ParameterRecord::Cubic(CubicParams {
        a: nonzero(coefficient_at(caps, 1)?)?,
        b: term_at(caps, 2)?,
        c: term_at(caps, 3)?,
        d: offset_at(caps, 4)?,
    }))
}

pub(super) fn exponential_natural(caps: &Captures) -> Option<ParameterRecord> {
    Some(ParameterRecord::Exponential(ExponentialParams {
        coeff: coefficient_at(caps, 1)?,
        base: E,
        exp_coeff: nonzero(coefficient_at(caps, 2)?)?,
        exp_shift: offset_at(caps, 3)?,
        shift: offset_at(caps, 4)?,
    }))
}

pub(super) fn exponential_base(caps: &Captures) -> Option<ParameterRecord> {
    let coeff = match (caps.get(1), caps.get(2)) {
        (Some(_), _) => number_at(caps, 1)?,
        (None, sign) => super::parse_coefficient(sign.map(|m| m.as_str()))?,
    };
    Some(ParameterRecord::Exponential(ExponentialParams {
        coeff,
        base: valid_base(number_at(caps, 3)?)?,
        exp_coeff: nonzero(coefficient_at(caps, 4)?)?,
        exp_shift: offset_at(caps, 5)?,
        shift: offset_at(caps, 6)?,
    }))
}

pub(super) fn logarithmic(caps: &Captures) -> Option<ParameterRecord> {
    let base = match caps.get(4) {
        Some(_) => valid_base(number_at(caps, 4)?)?,
        None => E,
    };
    Some(ParameterRecord::Logarithmic(LogarithmicParams {
        coeff: coefficient_at(caps, 1)?,
        base,
        x_coeff: nonzero(coefficient_at(caps, 2)?)?,
        x_shift: offset_at(caps, 3)?,
        shift: offset_at(caps, 5)?,
    }))
}

pub(super) fn trigonometric(caps: &Captures) -> Option<ParameterRecord> {
    Some(ParameterRecord::Trigonometric(TrigonometricParams {
        function: TrigFunction::from_name(caps.get(2)?.as_str())?,
        amplitude: coefficient_at(caps, 1)?,
        frequency: nonzero(coefficient_at(caps, 3)?)?,
        phase: offset_at(caps, 4)?,
        shift: offset_at(caps, 5)?,
    }))
}

fn transform(caps: &Captures) -> Option<TransformParams> {
    Some(TransformParams {
        coeff: coefficient_at(caps, 1)?,
        x_coeff: nonzero(coefficient_at(caps, 2)?)?,
        x_shift: offset_at(caps, 3)?,
        shift: offset_at(caps, 4)?,
    })
}

pub(super) fn absolute_value(caps: &Captures) -> Option<ParameterRecord> {
    transform(caps).map(ParameterRecord::AbsoluteValue)
}

pub(super) fn square_root(caps: &Captures) -> Option<ParameterRecord> {
    transform(caps).map(ParameterRecord::SquareRoot)
}

/// Drops one pair of parentheses when it wraps the whole text.
fn strip_outer_parens(text: &str) -> &str {
    let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
        return text;
    };
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return text;
        }
    }
    if depth == 0 {
        inner
    } else {
        text
    }
}

pub(super) fn rational(caps: &Captures) -> Option<ParameterRecord> {
    // `x/2+1` is a sum; only a body whose outermost operation is the division qualifies.
    let Expr::Binary(left, '/', right) = parse(caps.get(0)?.as_str()).ok()? else {
        return None;
    };
    let numerator = strip_outer_parens(caps.get(1)?.as_str());
    let denominator = strip_outer_parens(caps.get(2)?.as_str());
    if parse(numerator).ok()? != *left || parse(denominator).ok()? != *right {
        return None;
    }
    compile_expression(numerator).ok()?;
    compile_expression(denominator).ok()?;
    Some(ParameterRecord::Rational(RationalParams {
        numerator: numerator.to_string(),
        denominator: denominator.to_string(),
    }))
}

pub(super) fn special(caps: &Captures) -> Option<ParameterRecord> {
    let expression = caps.get(0)?.as_str();
    compile_expression(expression).ok()?;
    Some(ParameterRecord::Special(SpecialParams {
        function: SpecialFunction::from_name(caps.get(1)?.as_str())?,
        expression: expression.to_string(),
    }))
}
