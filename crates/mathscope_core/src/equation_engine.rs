use anyhow::{anyhow, bail, Result};
use std::f64::consts::{E, PI};

/// Single-argument functions understood by the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Sign,
}

/// Two-argument functions understood by the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin2 {
    Max,
    Min,
    /// `log(value, base)`
    LogBase,
}

/// OpCodes for the stack-based virtual machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant onto the stack.
    LoadConst(f64),
    /// Pushes the value of the independent variable `x`.
    LoadVar,
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b).
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    /// Pops top value (a), pushes f(a).
    Call(Builtin),
    /// Pops top two values (b, a), pushes f(a, b).
    Call2(Builtin2),
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

/// Stack-based virtual machine for evaluating expressions of one variable.
///
/// The VM is stateless; `execute` receives the bytecode, the value of `x`
/// and a scratch stack. Returns `None` only for malformed bytecode.
pub struct VM;

impl VM {
    pub fn execute(bytecode: &Bytecode, x: f64, stack: &mut Vec<f64>) -> Option<f64> {
        stack.clear();

        for op in &bytecode.ops {
            match *op {
                OpCode::LoadConst(val) => stack.push(val),
                OpCode::LoadVar => stack.push(x),
                OpCode::Neg => {
                    let a = stack.pop()?;
                    stack.push(-a);
                }
                OpCode::Call(func) => {
                    let a = stack.pop()?;
                    stack.push(apply_builtin(func, a));
                }
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Pow => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(match op {
                        OpCode::Add => a + b,
                        OpCode::Sub => a - b,
                        OpCode::Mul => a * b,
                        OpCode::Div => a / b,
                        _ => a.powf(b),
                    });
                }
                OpCode::Call2(func) => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(match func {
                        Builtin2::Max => a.max(b),
                        Builtin2::Min => a.min(b),
                        Builtin2::LogBase => a.ln() / b.ln(),
                    });
                }
            }
        }

        let result = stack.pop()?;
        stack.is_empty().then_some(result)
    }
}

fn apply_builtin(func: Builtin, a: f64) -> f64 {
    match func {
        Builtin::Sin => a.sin(),
        Builtin::Cos => a.cos(),
        Builtin::Tan => a.tan(),
        Builtin::Asin => a.asin(),
        Builtin::Acos => a.acos(),
        Builtin::Atan => a.atan(),
        Builtin::Exp => a.exp(),
        Builtin::Log => a.ln(),
        Builtin::Sqrt => a.sqrt(),
        Builtin::Abs => a.abs(),
        Builtin::Floor => a.floor(),
        Builtin::Ceil => a.ceil(),
        // f64::signum maps 0 to 1; the step function maps 0 to 0.
        Builtin::Sign => {
            if a == 0.0 {
                0.0
            } else {
                a.signum()
            }
        }
    }
}

// --- AST & Parser ---

/// Abstract Syntax Tree nodes for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Binary(Box<Expr>, char, Box<Expr>), // char is operator +, -, *, /, ^
    Unary(char, Box<Expr>),
    Call(String, Vec<Expr>),
}

/// Highest degree treated as a polynomial; larger products read as non-polynomial.
pub const MAX_POLYNOMIAL_DEGREE: u32 = 64;

impl Expr {
    /// Degree of the expression as a polynomial in `x`, or `None` when it is not a polynomial.
    /// The degree is syntactic: `x**2 - x**2` reports 2.
    pub fn polynomial_degree(&self) -> Option<u32> {
        match self {
            Expr::Number(_) => Some(0),
            Expr::Variable(name) => Some(if name == "x" { 1 } else { 0 }),
            Expr::Unary(_, operand) => operand.polynomial_degree(),
            Expr::Call(_, args) => {
                let mut all_constant = true;
                for arg in args {
                    all_constant &= arg.polynomial_degree()? == 0;
                }
                all_constant.then_some(0)
            }
            Expr::Binary(left, op, right) => {
                let l = left.polynomial_degree();
                let r = right.polynomial_degree();
                match op {
                    '+' | '-' => Some(l?.max(r?)),
                    '*' => l?
                        .checked_add(r?)
                        .filter(|degree| *degree <= MAX_POLYNOMIAL_DEGREE),
                    '/' => match (l?, r?) {
                        (deg, 0) => Some(deg),
                        _ => None,
                    },
                    '^' => {
                        let base = l?;
                        if base == 0 && r? == 0 {
                            return Some(0);
                        }
                        match right.as_ref() {
                            Expr::Number(n)
                                if *n >= 0.0
                                    && n.fract() == 0.0
                                    && *n <= f64::from(MAX_POLYNOMIAL_DEGREE) =>
                            {
                                base.checked_mul(*n as u32)
                                    .filter(|degree| *degree <= MAX_POLYNOMIAL_DEGREE)
                            }
                            _ => None,
                        }
                    }
                    _ => None,
                }
            }
        }
    }
}

fn is_function_name(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "asin" | "acos" | "atan" | "exp" | "log" | "sqrt" | "abs"
            | "floor" | "ceil" | "sign" | "max" | "min"
    )
}

/// Compiles an AST (`Expr`) into `Bytecode`.
/// The only free variable is `x`; `e` and `pi` are constants.
pub struct Compiler;

impl Compiler {
    pub fn compile(expr: &Expr) -> Result<Bytecode> {
        let mut ops = Vec::new();
        Self::compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive(expr: &Expr, ops: &mut Vec<OpCode>) -> Result<()> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Variable(name) => match name.as_str() {
                "x" => ops.push(OpCode::LoadVar),
                "e" => ops.push(OpCode::LoadConst(E)),
                "pi" => ops.push(OpCode::LoadConst(PI)),
                _ => bail!("Unknown identifier '{}'", name),
            },
            Expr::Binary(left, op, right) => {
                Self::compile_recursive(left, ops)?;
                Self::compile_recursive(right, ops)?;
                ops.push(match op {
                    '+' => OpCode::Add,
                    '-' => OpCode::Sub,
                    '*' => OpCode::Mul,
                    '/' => OpCode::Div,
                    '^' => OpCode::Pow,
                    _ => bail!("Unknown binary operator '{}'", op),
                });
            }
            Expr::Unary(op, operand) => {
                Self::compile_recursive(operand, ops)?;
                match op {
                    '-' => ops.push(OpCode::Neg),
                    '+' => {}
                    _ => bail!("Unknown unary operator '{}'", op),
                }
            }
            Expr::Call(func, args) => {
                for arg in args {
                    Self::compile_recursive(arg, ops)?;
                }
                ops.push(match (func.as_str(), args.len()) {
                    ("sin", 1) => OpCode::Call(Builtin::Sin),
                    ("cos", 1) => OpCode::Call(Builtin::Cos),
                    ("tan", 1) => OpCode::Call(Builtin::Tan),
                    ("asin", 1) => OpCode::Call(Builtin::Asin),
                    ("acos", 1) => OpCode::Call(Builtin::Acos),
                    ("atan", 1) => OpCode::Call(Builtin::Atan),
                    ("exp", 1) => OpCode::Call(Builtin::Exp),
                    ("log", 1) => OpCode::Call(Builtin::Log),
                    ("sqrt", 1) => OpCode::Call(Builtin::Sqrt),
                    ("abs", 1) => OpCode::Call(Builtin::Abs),
                    ("floor", 1) => OpCode::Call(Builtin::Floor),
                    ("ceil", 1) => OpCode::Call(Builtin::Ceil),
                    ("sign", 1) => OpCode::Call(Builtin::Sign),
                    ("max", 2) => OpCode::Call2(Builtin2::Max),
                    ("min", 2) => OpCode::Call2(Builtin2::Min),
                    ("log", 2) => OpCode::Call2(Builtin2::LogBase),
                    (name, arity) => bail!("Unknown function '{}' with {} argument(s)", name, arity),
                });
            }
        }
        Ok(())
    }
}

/// A parsed and compiled single-variable expression.
#[derive(Debug, Clone)]
pub struct Program {
    pub expr: Expr,
    pub bytecode: Bytecode,
}

impl Program {
    pub fn evaluate(&self, x: f64) -> f64 {
        let mut stack = Vec::with_capacity(16);
        VM::execute(&self.bytecode, x, &mut stack).unwrap_or(f64::NAN)
    }

    pub fn degree(&self) -> Option<u32> {
        self.expr.polynomial_degree()
    }

    /// Monomial coefficients `[c0, c1, ..]` of a polynomial expression, read
    /// from Newton forward differences at `x = 0, 1, .., degree`. Exact for
    /// polynomials up to round-off; `None` when the expression is not one.
    pub fn polynomial_coefficients(&self) -> Option<Vec<f64>> {
        let n = self.degree()? as usize;
        let mut diffs: Vec<f64> = (0..=n).map(|k| self.evaluate(k as f64)).collect();
        let mut coefficients = vec![0.0; n + 1];
        // Newton basis polynomial x(x-1)..(x-k+1), lowest power first.
        let mut basis = vec![1.0];
        let mut factorial = 1.0;
        for k in 0..=n {
            if k > 0 {
                factorial *= k as f64;
            }
            let weight = diffs[0] / factorial;
            for (c, b) in coefficients.iter_mut().zip(&basis) {
                *c += weight * b;
            }
            for i in 0..diffs.len() - 1 {
                diffs[i] = diffs[i + 1] - diffs[i];
            }
            diffs.pop();
            let mut next = vec![0.0; basis.len() + 1];
            for (i, b) in basis.iter().enumerate() {
                next[i + 1] += b;
                next[i] -= k as f64 * b;
            }
            basis = next;
        }
        coefficients
            .iter()
            .all(|c| c.is_finite())
            .then_some(coefficients)
    }
}

/// Parses and compiles an expression in `x`.
pub fn compile_expression(expression: &str) -> Result<Program> {
    let expr = parse(expression).map_err(|err| anyhow!("{}: {}", expression, err))?;
    let bytecode = Compiler::compile(&expr)?;
    Ok(Program { expr, bytecode })
}

// --- Simple Parser ---

/// Parses a string expression into an AST.
pub fn parse(input: &str) -> std::result::Result<Expr, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("Unexpected trailing input at token {}", parser.pos));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Comma,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num_str.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = num_str
                .parse()
                .map_err(|_| format!("Malformed number '{}'", num_str))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            chars.next();
            match c {
                '+' => tokens.push(Token::Plus),
                '-' => tokens.push(Token::Minus),
                '*' => {
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        tokens.push(Token::Caret);
                    } else {
                        tokens.push(Token::Star);
                    }
                }
                '/' => tokens.push(Token::Slash),
                '^' => tokens.push(Token::Caret),
                ',' => tokens.push(Token::Comma),
                '(' => tokens.push(Token::LParen),
                ')' => tokens.push(Token::RParen),
                other => return Err(format!("Unexpected character '{}'", other)),
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expression(&mut self) -> std::result::Result<Expr, String> {
        let mut left = self.parse_term()?;

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Plus => '+',
                Token::Minus => '-',
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> std::result::Result<Expr, String> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Star | Token::Slash => {
                    let op = if *token == Token::Star { '*' } else { '/' };
                    self.consume();
                    let right = self.parse_unary()?;
                    left = Expr::Binary(Box::new(left), op, Box::new(right));
                }
                // Implicit multiplication: `2x`, `3(x+1)`, `2sin(x)`.
                Token::Number(_) | Token::Identifier(_) | Token::LParen => {
                    let right = self.parse_power()?;
                    left = Expr::Binary(Box::new(left), '*', Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> std::result::Result<Expr, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary('-', Box::new(expr)))
            }
            Some(Token::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> std::result::Result<Expr, String> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            // Right-associative; the exponent may carry its own sign.
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(Box::new(base), '^', Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> std::result::Result<Expr, String> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Identifier(name)) => {
                if is_function_name(&name) && self.peek() == Some(&Token::LParen) {
                    self.consume(); // eat '('
                    let mut args = vec![self.parse_expression()?];
                    while self.peek() == Some(&Token::Comma) {
                        self.consume();
                        args.push(self.parse_expression()?);
                    }
                    match self.consume() {
                        Some(Token::RParen) => Ok(Expr::Call(name, args)),
                        _ => Err("Expected ')'".to_string()),
                    }
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err("Expected ')'".to_string()),
                }
            }
            _ => Err("Unexpected token".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str, x: f64) -> f64 {
        compile_expression(text).expect("expression compiles").evaluate(x)
    }

    #[test]
    fn respects_precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("2 ** 3 ** 2", 0.0), 512.0);
        assert_eq!(eval("-x^2", 3.0), -9.0);
        assert_eq!(eval("(x + 1) / (x - 1)", 3.0), 2.0);
    }

    #[test]
    fn supports_implicit_multiplication() {
        assert_eq!(eval("2x+1", 3.0), 7.0);
        assert_eq!(eval("3(x+1)", 1.0), 6.0);
        assert!((eval("2sin(x)", std::f64::consts::FRAC_PI_2) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn evaluates_builtins_and_constants() {
        assert!((eval("log(e)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval("log(8, 2)", 0.0) - 3.0).abs() < 1e-12);
        assert_eq!(eval("max(0, x)", -2.0), 0.0);
        assert_eq!(eval("min(0, x)", -2.0), -2.0);
        assert_eq!(eval("floor(x)", 2.7), 2.0);
        assert_eq!(eval("ceil(x)", 2.2), 3.0);
        assert_eq!(eval("sign(x)", 0.0), 0.0);
        assert_eq!(eval("sign(x)", -4.0), -1.0);
        assert!((eval("cos(pi)", 0.0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_identifiers_and_garbage() {
        let err = compile_expression("x + q").expect_err("unknown identifier");
        assert!(err.to_string().contains("Unknown identifier"), "{err}");
        assert!(compile_expression("x $ 2").is_err());
        assert!(compile_expression("1.2.3 + x").is_err());
        assert!(compile_expression("(x + 1").is_err());
        assert!(compile_expression("foo(x)").is_err());
    }

    #[test]
    fn reports_polynomial_degree() {
        let degree = |text: &str| parse(text).expect("parses").polynomial_degree();
        assert_eq!(degree("3"), Some(0));
        assert_eq!(degree("x+1"), Some(1));
        assert_eq!(degree("x**2+1"), Some(2));
        assert_eq!(degree("(x+1)(x-2)"), Some(2));
        assert_eq!(degree("2x**3/4"), Some(3));
        assert_eq!(degree("1/x"), None);
        assert_eq!(degree("sin(x)"), None);
        assert_eq!(degree("sqrt(2)*x"), Some(1));
    }

    #[test]
    fn oversized_degrees_are_not_polynomials() {
        let degree = |text: &str| parse(text).expect("parses").polynomial_degree();
        assert_eq!(degree("x^64"), Some(64));
        assert_eq!(degree("(x^8)^8"), Some(64));
        assert_eq!(degree("x^64*x"), None);
        assert_eq!(degree("((((((x^64)^64)^64)^64)^64)^64)"), None);
        let program = compile_expression("(x^40)(x^40)").expect("compiles");
        assert_eq!(program.polynomial_coefficients(), None);
    }

    #[test]
    fn extracts_polynomial_coefficients() {
        let program = compile_expression("3x**2 - 2x + 5").expect("compiles");
        let coefficients = program.polynomial_coefficients().expect("polynomial");
        assert_eq!(coefficients.len(), 3);
        assert!((coefficients[0] - 5.0).abs() < 1e-12);
        assert!((coefficients[1] + 2.0).abs() < 1e-12);
        assert!((coefficients[2] - 3.0).abs() < 1e-12);

        let cubic = compile_expression("-4x**3 + x").expect("compiles");
        let coefficients = cubic.polynomial_coefficients().expect("polynomial");
        assert!((coefficients[3] + 4.0).abs() < 1e-9);
        assert!((coefficients[1] - 1.0).abs() < 1e-9);

        let not_polynomial = compile_expression("1/x").expect("compiles");
        assert!(not_polynomial.polynomial_coefficients().is_none());
    }

    #[test]
    fn vm_returns_none_for_unbalanced_bytecode() {
        let bytecode = Bytecode {
            ops: vec![OpCode::LoadConst(1.0), OpCode::LoadConst(2.0)],
        };
        let mut stack = Vec::new();
        assert_eq!(VM::execute(&bytecode, 0.0, &mut stack), None);
        let underflow = Bytecode {
            ops: vec![OpCode::Add],
        };
        assert_eq!(VM::execute(&underflow, 0.0, &mut stack), None);
    }
}
