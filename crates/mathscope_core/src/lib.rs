//! The `mathscope_core` crate classifies short textual descriptions of
//! mathematical objects and computes their closed-form properties.
//!
//! Key components:
//! - **Extract**: normalization plus an ordered catalogue of grammars that
//!   turns free text into a tagged [`ParameterRecord`].
//! - **Function**: intercepts, extrema, asymptotes, domain and range for each
//!   single-variable family.
//! - **Vector / Matrix / Triangle**: vector algebra, linear-map classification
//!   and triangle geometry.
//! - **Sampling**: plot points over a caller-supplied window.
//! - **Equation Engine**: a small bytecode VM for rational and step-function
//!   bodies.
//!
//! Every analyzer is a pure function of its record; nothing is cached between
//! calls.
pub mod analysis;
pub mod equation_engine;
pub mod error;
pub mod extract;
pub mod function;
pub mod matrix;
pub mod record;
pub mod sampling;
pub mod settings;
pub mod traits;
pub mod triangle;
pub mod vector;

pub use analysis::{analyze, analyze_input, Analysis, Report};
pub use error::{AnalysisError, Degeneracy, DomainViolation, Result};
pub use extract::classify;
pub use record::{Family, ParameterRecord};
pub use sampling::{sample, sample_record, SamplePoint};
pub use settings::{SampleWindow, Tolerances};
