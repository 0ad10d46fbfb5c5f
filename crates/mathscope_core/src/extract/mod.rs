//! Free-text classification.
//!
//! An input string is normalized once, then tried against [`GRAMMARS`] in
//! order. The first grammar whose pattern matches and whose extraction
//! succeeds decides the record. Ordering runs from most to least specific:
//! vertex-form quadratics come before lines, rationals before the generic
//! special-function catch-all.

mod coefficient;
mod function_grammars;
mod shape_grammars;

pub use coefficient::{parse_coefficient, parse_number, parse_offset};

use crate::error::{AnalysisError, Result};
use crate::record::{Family, ParameterRecord};
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

use function_grammars as fg;
use shape_grammars as sg;

/// Which view of the normalized input a grammar matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// Keyword commands (`matrix ...`, `vector ...`, `triangle ...`),
    /// matched against the normalized text.
    Command,
    /// Function bodies, matched with spaces removed and any `y=` stripped.
    Equation,
}

/// Input after synonym folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub body: String,
}

impl Normalized {
    pub fn new(input: &str) -> Self {
        let text = normalize(input);
        let compact: String = text.chars().filter(|c| *c != ' ').collect();
        let body = compact
            .strip_prefix("y=")
            .map(str::to_string)
            .unwrap_or(compact);
        Self { text, body }
    }

    fn view(&self, subject: Subject) -> &str {
        match subject {
            Subject::Command => &self.text,
            Subject::Equation => &self.body,
        }
    }
}

fn absolute_bars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\|([^|]+)\|").unwrap())
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn padded_punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ?(->|[,()\[\]<>]) ?").unwrap())
}

fn function_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^f\(x\) ?=").unwrap())
}

/// Folds case, operator synonyms and spacing into one canonical spelling.
pub fn normalize(input: &str) -> String {
    let mut folded = String::with_capacity(input.len());
    for c in input.trim().to_lowercase().chars() {
        match c {
            '\u{2212}' | '\u{2013}' | '\u{2014}' => folded.push('-'),
            '\u{00d7}' | '\u{00b7}' | '\u{22c5}' => folded.push('*'),
            '\u{27e8}' | '\u{2329}' | '\u{3008}' => folded.push('<'),
            '\u{27e9}' | '\u{232a}' | '\u{3009}' => folded.push('>'),
            '\u{2192}' => folded.push_str("->"),
            '^' => folded.push_str("**"),
            _ => folded.push(c),
        }
    }
    let folded = folded
        .replace("=>", "->")
        .replace("\u{221a}(", "sqrt(")
        .replace("ln(", "log(");
    let folded = absolute_bars().replace_all(&folded, "abs($1)");
    let folded = whitespace_runs().replace_all(&folded, " ");
    let folded = padded_punctuation().replace_all(&folded, "$1");
    function_prefix().replace(&folded, "y=").into_owned()
}

/// Signed literal, optional coefficient, signed coefficient, signed offset.
const PLACEHOLDERS: [(&str, &str); 4] = [
    ("{N}", r"[+-]?(?:\d+\.?\d*|\.\d+)"),
    ("{C}", r"[+-]?(?:\d+\.?\d*|\.\d+)?"),
    ("{S}", r"[+-](?:\d+\.?\d*|\.\d+)?"),
    ("{O}", r"[+-](?:\d+\.?\d*|\.\d+)"),
];

fn expand(pattern: &str) -> String {
    PLACEHOLDERS
        .iter()
        .fold(pattern.to_string(), |acc, (key, fragment)| acc.replace(key, fragment))
}

type Extract = fn(&Captures<'_>) -> Option<ParameterRecord>;

/// One entry of the catalogue: a pattern plus the rule that turns its
/// captures into a record. Extraction returning `None` fails the match.
pub struct Grammar {
    pub name: &'static str,
    pub family: Family,
    pub subject: Subject,
    pattern: &'static str,
    regex: OnceLock<Regex>,
    extract: Extract,
}

impl Grammar {
    const fn new(
        name: &'static str,
        family: Family,
        subject: Subject,
        pattern: &'static str,
        extract: Extract,
    ) -> Self {
        Self {
            name,
            family,
            subject,
            pattern,
            regex: OnceLock::new(),
            extract,
        }
    }

    pub fn regex(&self) -> &Regex {
        self.regex
            .get_or_init(|| Regex::new(&expand(self.pattern)).unwrap())
    }

    /// Normalizes `input` and tries this grammar alone.
    pub fn apply(&self, input: &str) -> Option<ParameterRecord> {
        self.apply_normalized(&Normalized::new(input))
    }

    fn apply_normalized(&self, input: &Normalized) -> Option<ParameterRecord> {
        let caps = self.regex().captures(input.view(self.subject))?;
        (self.extract)(&caps)
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("subject", &self.subject)
            .field("pattern", &self.pattern)
            .finish()
    }
}

use Subject::{Command, Equation};

/// Catalogue in priority order.
pub static GRAMMARS: [Grammar; 27] = [
    Grammar::new(
        "matrix_nested",
        Family::Matrix,
        Command,
        r"^matrix ?(\[\[[^\[\]]*\](?:,\[[^\[\]]*\])+\])$",
        sg::matrix_nested,
    ),
    Grammar::new(
        "matrix_flat",
        Family::Matrix,
        Command,
        r"^matrix ?\[([^\[\]]+)\]$",
        sg::matrix_flat,
    ),
    Grammar::new(
        "matrix_rotation",
        Family::Matrix,
        Command,
        r"^matrix rotation ?({N}) ?(?:°|deg|degrees)?$",
        sg::matrix_rotation,
    ),
    Grammar::new(
        "matrix_scale",
        Family::Matrix,
        Command,
        r"^matrix scale ?({N})(?: |,)({N})$",
        sg::matrix_scale,
    ),
    Grammar::new(
        "matrix_reflection",
        Family::Matrix,
        Command,
        r"^matrix reflection ?(?:across )?(x|y)(?:-? ?axis)?$",
        sg::matrix_reflection,
    ),
    Grammar::new(
        "matrix_shear",
        Family::Matrix,
        Command,
        r"^matrix shear ?({N})(?: |,)({N})$",
        sg::matrix_shear,
    ),
    Grammar::new(
        "matrix_spaced",
        Family::Matrix,
        Command,
        r"^matrix ({N}) ({N}) ({N}) ({N})$",
        sg::matrix_spaced,
    ),
    Grammar::new(
        "triangle_labeled",
        Family::Triangle,
        Command,
        r"^triangle ?a\(({N}),({N})\) ?b\(({N}),({N})\) ?c\(({N}),({N})\)$",
        sg::triangle,
    ),
    Grammar::new(
        "triangle_plain",
        Family::Triangle,
        Command,
        r"^triangle ?\(({N}),({N})\) ?\(({N}),({N})\) ?\(({N}),({N})\)$",
        sg::triangle,
    ),
    Grammar::new(
        "triangle_list",
        Family::Triangle,
        Command,
        r"^triangle ({N}),({N}) ({N}),({N}) ({N}),({N})$",
        sg::triangle,
    ),
    Grammar::new(
        "vector_chain",
        Family::Vector,
        Command,
        r"^vectors? ?a\(({N}),({N})(?:,({N}))?\) ?(?:->)? ?b\(({N}),({N})(?:,({N}))?\) ?(?:->)? ?c\(({N}),({N})(?:,({N}))?\)$",
        sg::vector_chain,
    ),
    Grammar::new(
        "vector_labeled",
        Family::Vector,
        Command,
        r"^vector ?a\(({N}),({N})(?:,({N}))?\) ?(?:->)? ?b\(({N}),({N})(?:,({N}))?\)$",
        sg::vector_labeled,
    ),
    Grammar::new(
        "vector_plain",
        Family::Vector,
        Command,
        r"^vector ?\(({N}),({N})(?:,({N}))?\) ?(?:->)? ?\(({N}),({N})(?:,({N}))?\)$",
        sg::vector_plain,
    ),
    Grammar::new(
        "vector_components",
        Family::Vector,
        Command,
        r"^vector ?<({N}),({N})(?:,({N}))?>$",
        sg::vector_components,
    ),
    Grammar::new(
        "quadratic_vertex",
        Family::Quadratic,
        Equation,
        r"^({C})\*?\(x({O})?\)\*\*2({O})?$",
        fg::quadratic_vertex,
    ),
    Grammar::new(
        "quadratic_standard",
        Family::Quadratic,
        Equation,
        r"^({C})\*?x\*\*2(?:({S})\*?x)?({O})?$",
        fg::quadratic_standard,
    ),
    Grammar::new(
        "cubic",
        Family::Cubic,
        Equation,
        r"^({C})\*?x\*\*3(?:({S})\*?x\*\*2)?(?:({S})\*?x)?({O})?$",
        fg::cubic,
    ),
    Grammar::new(
        "linear",
        Family::Linear,
        Equation,
        r"^({C})\*?x({O})?$",
        fg::linear,
    ),
    Grammar::new(
        "constant",
        Family::Linear,
        Equation,
        r"^({N})$",
        fg::constant,
    ),
    Grammar::new(
        "exponential_natural",
        Family::Exponential,
        Equation,
        r"^({C})\*?e\*\*(?:x|\(({C})\*?x({O})?\))({O})?$",
        fg::exponential_natural,
    ),
    Grammar::new(
        "exponential_base",
        Family::Exponential,
        Equation,
        r"^(?:({N})\*|([+-]))?(\d+\.?\d*|\.\d+)\*\*(?:x|\(({C})\*?x({O})?\))({O})?$",
        fg::exponential_base,
    ),
    Grammar::new(
        "logarithmic",
        Family::Logarithmic,
        Equation,
        r"^({C})\*?log\(({C})\*?x({O})?(?:,({N}))?\)({O})?$",
        fg::logarithmic,
    ),
    Grammar::new(
        "trigonometric",
        Family::Trigonometric,
        Equation,
        r"^({C})\*?(asin|acos|atan|sin|cos|tan)\(({C})\*?x({O})?\)({O})?$",
        fg::trigonometric,
    ),
    Grammar::new(
        "absolute_value",
        Family::AbsoluteValue,
        Equation,
        r"^({C})\*?abs\(({C})\*?x({O})?\)({O})?$",
        fg::absolute_value,
    ),
    Grammar::new(
        "square_root",
        Family::SquareRoot,
        Equation,
        r"^({C})\*?sqrt\(({C})\*?x({O})?\)({O})?$",
        fg::square_root,
    ),
    Grammar::new(
        "rational",
        Family::Rational,
        Equation,
        r"^([^/]+)/([^/]+)$",
        fg::rational,
    ),
    Grammar::new(
        "special",
        Family::Special,
        Equation,
        r"^(?:.*?[^a-z])?(floor|ceil|sign|max|min)\(.*$",
        fg::special,
    ),
];

/// Looks a grammar up by name.
pub fn grammar(name: &str) -> Option<&'static Grammar> {
    GRAMMARS.iter().find(|g| g.name == name)
}

/// Tags `input` with the first grammar that accepts it.
pub fn classify(input: &str) -> Result<ParameterRecord> {
    let normalized = Normalized::new(input);
    for grammar in GRAMMARS.iter() {
        if let Some(record) = grammar.apply_normalized(&normalized) {
            debug!(grammar = grammar.name, family = %grammar.family, "input classified");
            return Ok(record);
        }
    }
    debug!(input = %normalized.text, "no grammar matched");
    Err(AnalysisError::unrecognized(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LinearParams, QuadraticForm, QuadraticParams};

    #[test]
    fn every_pattern_compiles_and_names_are_unique() {
        for (index, grammar) in GRAMMARS.iter().enumerate() {
            let _ = grammar.regex();
            assert!(
                GRAMMARS[..index].iter().all(|g| g.name != grammar.name),
                "duplicate grammar {}",
                grammar.name
            );
        }
    }

    #[test]
    fn normalization_folds_synonyms() {
        assert_eq!(normalize("  Y = 2X^2 − 3 "), "y = 2x**2 - 3");
        assert_eq!(normalize("f(x) = |x - 2|"), "y= abs(x - 2)");
        assert_eq!(normalize("Vector  A(1, 2) → B(5, 4)"), "vector a(1,2)->b(5,4)");
        assert_eq!(normalize("vector ⟨3, 4⟩"), "vector<3,4>");
        assert_eq!(normalize("y = 2×ln(x)"), "y = 2*log(x)");
        assert_eq!(normalize("y=√(x)"), "y=sqrt(x)");
        assert_eq!(normalize("vector (0,0) => (1,1)"), "vector(0,0)->(1,1)");
    }

    #[test]
    fn body_strips_spaces_and_assignment() {
        let normalized = Normalized::new("y = 2 (x - 3)^2 + 5");
        assert_eq!(normalized.body, "2(x-3)**2+5");
        assert_eq!(Normalized::new("f(x) = x").body, "x");
    }

    #[test]
    fn vertex_form_wins_over_later_grammars() {
        let record = classify("y=2(x-3)**2+5").expect("recognized");
        assert_eq!(
            record,
            ParameterRecord::Quadratic(QuadraticParams {
                a: 2.0,
                form: QuadraticForm::Vertex { h: 3.0, k: 5.0 },
            })
        );
    }

    #[test]
    fn grammars_apply_individually() {
        let linear = grammar("linear").expect("exists");
        assert_eq!(
            linear.apply("y = -x + 4"),
            Some(ParameterRecord::Linear(LinearParams {
                slope: -1.0,
                intercept: 4.0
            }))
        );
        assert_eq!(linear.apply("y = x**2"), None);
        assert!(grammar("nonexistent").is_none());
    }

    #[test]
    fn catalogue_order_is_fixed() {
        let names: Vec<_> = GRAMMARS.iter().map(|g| g.name).collect();
        assert_eq!(names.first(), Some(&"matrix_nested"));
        assert_eq!(names.last(), Some(&"special"));
        let position = |name: &str| names.iter().position(|n| *n == name);
        assert!(position("quadratic_vertex") < position("linear"));
        assert!(position("rational") < position("special"));
        assert!(position("vector_chain") < position("vector_labeled"));
    }

    #[test]
    fn unrecognized_input_is_an_error_value() {
        for input in ["", "hello world", "y = x +", "matrix [1,2,3]", "triangle (0,0) (1,1)"] {
            let err = classify(input).expect_err(input);
            assert!(matches!(err, AnalysisError::Unrecognized { .. }), "{input}: {err:?}");
        }
    }

    #[test]
    fn families_route_to_the_expected_grammar() {
        let cases = [
            ("matrix [[1,2],[3,4]]", Family::Matrix),
            ("vector <3,4>", Family::Vector),
            ("triangle 0,0 4,0 0,3", Family::Triangle),
            ("y = x^3 - x", Family::Cubic),
            ("y = 3", Family::Linear),
            ("y = 2*e^x", Family::Exponential),
            ("y = 2^x", Family::Exponential),
            ("y = ln(x)", Family::Logarithmic),
            ("y = 3sin(2x) + 1", Family::Trigonometric),
            ("y = |x|", Family::AbsoluteValue),
            ("y = √(x - 1)", Family::SquareRoot),
            ("y = (x+1)/(x-1)", Family::Rational),
            ("y = floor(x)", Family::Special),
        ];
        for (input, family) in cases {
            let record = classify(input).unwrap_or_else(|err| panic!("{input}: {err}"));
            assert_eq!(record.family(), family, "{input}");
        }
    }
}
