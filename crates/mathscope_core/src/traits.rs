use crate::error::DomainViolation;

/// A single-variable real function that can be sampled for plotting.
pub trait Curve {
    /// Evaluates the function at `x`.
    /// Returns a `DomainViolation` when `x` is outside the function's domain
    /// (or close enough to a pole that the value is meaningless).
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation>;
}

impl<C: Curve + ?Sized> Curve for Box<C> {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        (**self).evaluate(x)
    }
}

impl<C: Curve + ?Sized> Curve for &C {
    fn evaluate(&self, x: f64) -> Result<f64, DomainViolation> {
        (**self).evaluate(x)
    }
}
