//! Expression trees and the symbolic engine.
//!
//! This module defines the owned expression tree built from a postfix
//! sequence and the two symbolic operations on it:
//!
//! - `simplify`: one bottom-up pass of local algebraic rewrite rules
//!   (constant folding and the identity/annihilator rules)
//! - `derivative`: rule-based symbolic differentiation, which re-simplifies
//!   every subtree it constructs so derivatives come back in reduced form
//!
//! The tree is built recursively with `Box<Expr>`; arity is enforced by the
//! enum itself (binary operators always have two children, function calls
//! one), so a malformed tree is unrepresentable rather than a runtime
//! condition. `simplify` replaces whole subtrees with newly built nodes and
//! never mutates a node's own value; ownership of the old subtree simply
//! ends.
//!
//! The `Display` implementation renders infix text, parenthesizing a child
//! only when it is a binary operator of strictly lower precedence than its
//! parent, mirroring the converter's precedence table and its
//! left-associativity.

use std::fmt;

use crate::errors::{DerivativeError, EvalError};
use crate::lexer::Token;
use crate::operators::{BinaryOp, Function};
use crate::rpn::{literal_value, RpnSequence};

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Num(f64),
    /// A free variable.
    Var(String),
    /// A binary operation on two subtrees.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A unary function applied to one subtree.
    Call(Function, Box<Expr>),
}

impl Expr {
    /// Builds a tree from a postfix sequence: the same stack walk as the
    /// evaluator, pushing nodes instead of values.
    pub fn from_rpn(rpn: &RpnSequence) -> Result<Box<Expr>, EvalError> {
        let mut stack: Vec<Box<Expr>> = Vec::new();
        for tok in rpn.iter() {
            match tok {
                Token::Number(text) => stack.push(Box::new(Expr::Num(literal_value(text)))),
                Token::Op(op) => {
                    let rhs = stack.pop().ok_or(EvalError::MissingOperand)?;
                    let lhs = stack.pop().ok_or(EvalError::MissingOperand)?;
                    stack.push(Box::new(Expr::Binary(*op, lhs, rhs)));
                }
                Token::Ident(name) => match Function::from_name(name) {
                    Some(func) => {
                        let arg = stack.pop().ok_or(EvalError::MissingOperand)?;
                        stack.push(Box::new(Expr::Call(func, arg)));
                    }
                    None => stack.push(Box::new(Expr::Var(name.clone()))),
                },
                Token::LeftParen | Token::RightParen => return Err(EvalError::StrayParenthesis),
            }
        }
        let root = stack.pop().ok_or(EvalError::MissingOperand)?;
        if stack.is_empty() {
            Ok(root)
        } else {
            Err(EvalError::UnconsumedOperands(stack.len()))
        }
    }

    /// Whether the subtree references the named variable anywhere.
    pub fn contains(&self, variable: &str) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Var(name) => name == variable,
            Expr::Binary(_, lhs, rhs) => lhs.contains(variable) || rhs.contains(variable),
            Expr::Call(_, arg) => arg.contains(variable),
        }
    }

    /// Simplifies the tree with one bottom-up pass of local rules.
    ///
    /// Children are simplified before the parent is inspected. The rules:
    ///
    /// - constant folding: an operator/function whose children are all
    ///   literals is replaced by the folded literal
    /// - `a + 0 → a`, `0 + a → a`
    /// - `a - 0 → a`, `0 - a → (-1) * a`
    /// - `a * 0 → 0`, `0 * a → 0`, `a * 1 → a`, `1 * a → a`
    /// - `a ^ 1 → a`, `a ^ 0 → 1`
    /// - `0 / a → 0`
    ///
    /// The rules are applied once per call; `derivative` re-invokes
    /// `simplify` at every construction step, which reaches a stable form
    /// for this rule set. The multiply rule does not inspect denominators
    /// inside the discarded operand.
    pub fn simplify(&self) -> Box<Expr> {
        match self {
            Expr::Num(_) | Expr::Var(_) => Box::new(self.clone()),

            Expr::Call(func, arg) => {
                let arg = arg.simplify();
                match &*arg {
                    // Fold constants: cos(0) -> 1
                    Expr::Num(x) => Box::new(Expr::Num(func.apply_real(*x))),
                    _ => Box::new(Expr::Call(*func, arg)),
                }
            }

            Expr::Binary(op, left, right) => {
                let l = left.simplify();
                let r = right.simplify();
                match (*op, &*l, &*r) {
                    // Fold constants: 2 + 3 -> 5
                    (_, Expr::Num(a), Expr::Num(b)) => Box::new(Expr::Num(op.apply_real(*a, *b))),
                    // Identity: a + 0 -> a, 0 + a -> a
                    (BinaryOp::Add, Expr::Num(0.0), other)
                    | (BinaryOp::Add, other, Expr::Num(0.0)) => Box::new(other.clone()),
                    // Identity: a - 0 -> a
                    (BinaryOp::Sub, other, Expr::Num(0.0)) => Box::new(other.clone()),
                    // Negation: 0 - a -> (-1) * a
                    (BinaryOp::Sub, Expr::Num(0.0), other) => Box::new(Expr::Binary(
                        BinaryOp::Mul,
                        Box::new(Expr::Num(-1.0)),
                        Box::new(other.clone()),
                    )),
                    // Annihilator: a * 0 -> 0, 0 * a -> 0
                    (BinaryOp::Mul, Expr::Num(0.0), _) | (BinaryOp::Mul, _, Expr::Num(0.0)) => {
                        Box::new(Expr::Num(0.0))
                    }
                    // Identity: a * 1 -> a, 1 * a -> a
                    (BinaryOp::Mul, Expr::Num(1.0), other)
                    | (BinaryOp::Mul, other, Expr::Num(1.0)) => Box::new(other.clone()),
                    // Identity: a ^ 1 -> a
                    (BinaryOp::Pow, other, Expr::Num(1.0)) => Box::new(other.clone()),
                    // a ^ 0 -> 1
                    (BinaryOp::Pow, _, Expr::Num(0.0)) => Box::new(Expr::Num(1.0)),
                    // Zero numerator: 0 / a -> 0
                    (BinaryOp::Div, Expr::Num(0.0), _) => Box::new(Expr::Num(0.0)),
                    _ => Box::new(Expr::Binary(*op, l, r)),
                }
            }
        }
    }

    /// Computes the symbolic derivative with respect to a variable.
    ///
    /// The input is simplified first, and every constructed subtree is
    /// passed back through [`Expr::simplify`], so derivatives come back in
    /// reduced form. The rules:
    ///
    /// - a subtree that does not reference the variable has derivative 0
    /// - sum/difference: the derivative distributes
    /// - product rule: `d(uv) = du*v + u*dv`
    /// - quotient rule, expressed with `+ - * ^` only:
    ///   `d(u/v) = du/v − v^(−2) * (u*dv)`
    /// - power rule for integer literal exponents:
    ///   `d(u^n) = n * u^(n−1) * du`
    /// - `d sin = cos(u)*du`, `d cos = (−1*sin(u))*du`, `d exp = exp(u)*du`,
    ///   `d log = (1/u)*du`, `d tan = (1 + tan(u)^2)*du`
    ///
    /// # Errors
    /// The hyperbolic functions, `abs` and `step` have no derivative rule,
    /// and the power rule does not cover non-integer or non-literal
    /// exponents; both cases are reported as a [`DerivativeError`] rather
    /// than silently differentiated wrong.
    pub fn derivative(&self, with_respect_to: &str) -> Result<Box<Expr>, DerivativeError> {
        let expr = self.simplify();
        if !expr.contains(with_respect_to) {
            return Ok(Box::new(Expr::Num(0.0)));
        }
        match &*expr {
            // d/dx(u ± v) = du ± dv
            Expr::Binary(op @ (BinaryOp::Add | BinaryOp::Sub), lhs, rhs) => {
                let dl = lhs.derivative(with_respect_to)?;
                let dr = rhs.derivative(with_respect_to)?;
                Ok(Expr::Binary(*op, dl, dr).simplify())
            }

            // d/dx(u * v) = du*v + u*dv
            Expr::Binary(BinaryOp::Mul, lhs, rhs) => {
                let dl = lhs.derivative(with_respect_to)?;
                let dr = rhs.derivative(with_respect_to)?;
                let left_term = Expr::Binary(BinaryOp::Mul, dl, rhs.clone());
                let right_term = Expr::Binary(BinaryOp::Mul, lhs.clone(), dr);
                Ok(
                    Expr::Binary(BinaryOp::Add, Box::new(left_term), Box::new(right_term))
                        .simplify(),
                )
            }

            // d/dx(u ^ n) = n * u^(n-1) * du, n an integer literal
            Expr::Binary(BinaryOp::Pow, base, exponent) => match &**exponent {
                Expr::Num(n) if n.fract() == 0.0 => {
                    let du = base.derivative(with_respect_to)?;
                    let power =
                        Expr::Binary(BinaryOp::Pow, base.clone(), Box::new(Expr::Num(n - 1.0)));
                    let scaled =
                        Expr::Binary(BinaryOp::Mul, Box::new(Expr::Num(*n)), Box::new(power));
                    Ok(Expr::Binary(BinaryOp::Mul, Box::new(scaled), du).simplify())
                }
                _ => Err(DerivativeError::UnsupportedExponent),
            },

            // d/dx(u / v) = du/v - v^(-2) * (u*dv)
            Expr::Binary(BinaryOp::Div, num, den) => {
                let dnum = num.derivative(with_respect_to)?;
                let dden = den.derivative(with_respect_to)?;
                let left = Expr::Binary(BinaryOp::Div, dnum, den.clone());
                let den_inv_sq =
                    Expr::Binary(BinaryOp::Pow, den.clone(), Box::new(Expr::Num(-2.0)));
                let right = Expr::Binary(
                    BinaryOp::Mul,
                    Box::new(den_inv_sq),
                    Box::new(Expr::Binary(BinaryOp::Mul, num.clone(), dden)),
                );
                Ok(
                    Expr::Binary(BinaryOp::Sub, Box::new(left), Box::new(right))
                        .simplify(),
                )
            }

            // Chain rule through the supported unary functions.
            Expr::Call(func, arg) => {
                let darg = arg.derivative(with_respect_to)?;
                let outer = match func {
                    Function::Sin => Expr::Call(Function::Cos, arg.clone()),
                    Function::Cos => Expr::Binary(
                        BinaryOp::Mul,
                        Box::new(Expr::Num(-1.0)),
                        Box::new(Expr::Call(Function::Sin, arg.clone())),
                    ),
                    Function::Exp => Expr::Call(Function::Exp, arg.clone()),
                    Function::Log => Expr::Binary(
                        BinaryOp::Div,
                        Box::new(Expr::Num(1.0)),
                        arg.clone(),
                    ),
                    Function::Tan => {
                        let tan_sq = Expr::Binary(
                            BinaryOp::Pow,
                            Box::new(Expr::Call(Function::Tan, arg.clone())),
                            Box::new(Expr::Num(2.0)),
                        );
                        Expr::Binary(BinaryOp::Add, Box::new(Expr::Num(1.0)), Box::new(tan_sq))
                    }
                    Function::Abs
                    | Function::Sinh
                    | Function::Cosh
                    | Function::Tanh
                    | Function::Step => {
                        return Err(DerivativeError::UnsupportedFunction(*func))
                    }
                };
                Ok(Expr::Binary(BinaryOp::Mul, Box::new(outer), darg).simplify())
            }

            // contains() already established that this leaf is the variable.
            Expr::Var(_) => Ok(Box::new(Expr::Num(1.0))),
            Expr::Num(_) => Ok(Box::new(Expr::Num(0.0))),
        }
    }

    /// Renders one operand, parenthesizing only a binary child of strictly
    /// lower precedence.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: BinaryOp) -> fmt::Result {
        match self {
            Expr::Binary(op, _, _) if op.precedence() < parent.precedence() => {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(value) => write!(f, "{value}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Call(func, arg) => write!(f, "{}({arg})", func.name()),
            Expr::Binary(op, lhs, rhs) => {
                lhs.fmt_operand(f, *op)?;
                write!(f, "{}", op.symbol())?;
                rhs.fmt_operand(f, *op)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Numeric;
    use crate::rpn::{evaluate, parse};
    use std::collections::HashMap;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.to_string()))
    }

    fn num(value: f64) -> Box<Expr> {
        Box::new(Expr::Num(value))
    }

    fn tree(source: &str) -> Box<Expr> {
        Expr::from_rpn(&parse(source).unwrap()).unwrap()
    }

    /// Direct real-valued walk of a tree, for checking derivatives whose
    /// rendered form is not re-parseable (negative literal factors).
    fn eval_node(expr: &Expr, bindings: &[(&str, f64)]) -> f64 {
        match expr {
            Expr::Num(value) => *value,
            Expr::Var(name) => {
                let (_, value) = bindings
                    .iter()
                    .find(|(n, _)| *n == name.as_str())
                    .unwrap_or_else(|| panic!("unbound test variable {name}"));
                *value
            }
            Expr::Binary(op, lhs, rhs) => {
                op.apply_real(eval_node(lhs, bindings), eval_node(rhs, bindings))
            }
            Expr::Call(func, arg) => func.apply_real(eval_node(arg, bindings)),
        }
    }

    /// Renders a tree back to infix text and evaluates it through the
    /// ordinary pipeline.
    fn eval_tree(expr: &Expr, bindings: &[(&str, f64)]) -> f64 {
        let rendered = expr.to_string();
        let rpn = parse(&rendered).unwrap();
        let bindings: HashMap<String, Numeric> = bindings
            .iter()
            .map(|(name, value)| (name.to_string(), Numeric::Real(*value)))
            .collect();
        match evaluate(&rpn, &bindings).unwrap() {
            Numeric::Real(x) => x,
            Numeric::Complex(z) => panic!("expected a real result, got {z}"),
        }
    }

    #[test]
    fn test_from_rpn() {
        assert_eq!(
            *tree("x^2 + 1"),
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Binary(BinaryOp::Pow, var("x"), num(2.0))),
                num(1.0),
            )
        );
        assert_eq!(
            *tree("sin(x)"),
            Expr::Call(Function::Sin, var("x"))
        );
    }

    #[test]
    fn test_contains() {
        let t = tree("a*x*x + exp(exp(-b*x + c))");
        assert!(t.contains("x"));
        assert!(t.contains("c"));
        assert!(!t.contains("exp"));
        assert!(!t.contains("y"));
    }

    #[test]
    fn test_simplify_rules() {
        // Constant folding
        assert_eq!(
            *Expr::Binary(BinaryOp::Add, num(2.0), num(3.0)).simplify(),
            Expr::Num(5.0)
        );
        assert_eq!(*Expr::Call(Function::Cos, num(0.0)).simplify(), Expr::Num(1.0));

        // a + 0 -> a, 0 + a -> a
        assert_eq!(*Expr::Binary(BinaryOp::Add, var("x"), num(0.0)).simplify(), *var("x"));
        assert_eq!(*Expr::Binary(BinaryOp::Add, num(0.0), var("x")).simplify(), *var("x"));

        // a - 0 -> a, 0 - a -> (-1) * a
        assert_eq!(*Expr::Binary(BinaryOp::Sub, var("x"), num(0.0)).simplify(), *var("x"));
        assert_eq!(
            *Expr::Binary(BinaryOp::Sub, num(0.0), var("x")).simplify(),
            Expr::Binary(BinaryOp::Mul, num(-1.0), var("x"))
        );

        // a * 0 -> 0, a * 1 -> a
        assert_eq!(
            *Expr::Binary(BinaryOp::Mul, var("x"), num(0.0)).simplify(),
            Expr::Num(0.0)
        );
        assert_eq!(
            *Expr::Binary(BinaryOp::Mul, num(0.0), var("x")).simplify(),
            Expr::Num(0.0)
        );
        assert_eq!(*Expr::Binary(BinaryOp::Mul, var("x"), num(1.0)).simplify(), *var("x"));
        assert_eq!(*Expr::Binary(BinaryOp::Mul, num(1.0), var("x")).simplify(), *var("x"));

        // a ^ 1 -> a, a ^ 0 -> 1
        assert_eq!(*Expr::Binary(BinaryOp::Pow, var("x"), num(1.0)).simplify(), *var("x"));
        assert_eq!(
            *Expr::Binary(BinaryOp::Pow, var("x"), num(0.0)).simplify(),
            Expr::Num(1.0)
        );

        // 0 / a -> 0
        assert_eq!(
            *Expr::Binary(BinaryOp::Div, num(0.0), var("x")).simplify(),
            Expr::Num(0.0)
        );
    }

    #[test]
    fn test_simplify_is_bottom_up() {
        // (x + 0) * (0 + 1) collapses to x in a single pass.
        let t = Expr::Binary(
            BinaryOp::Mul,
            Box::new(Expr::Binary(BinaryOp::Add, var("x"), num(0.0))),
            Box::new(Expr::Binary(BinaryOp::Add, num(0.0), num(1.0))),
        );
        assert_eq!(*t.simplify(), *var("x"));
    }

    #[test]
    fn test_simplify_idempotence() {
        let trees = [
            tree("a*x*x + exp(exp(-b*x + c))"),
            tree("cos(exp(-a*x^2))"),
            tree("3 - 4*6/12 + 21"),
            tree("x^1 + 0*y"),
        ];
        for t in trees {
            let once = t.simplify();
            let twice = once.simplify();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_derivative_of_square() {
        let d = tree("x^2").derivative("x").unwrap();
        assert_eq!(
            *d,
            Expr::Binary(BinaryOp::Mul, num(2.0), var("x"))
        );
        assert_eq!(d.to_string(), "2*x");
    }

    #[test]
    fn test_derivative_ignores_other_variables() {
        let d = tree("y^3 + 7").derivative("x").unwrap();
        assert_eq!(*d, Expr::Num(0.0));
    }

    #[test]
    fn test_product_rule() {
        // d/dx(sin(x)*x) = cos(x)*x + sin(x); zero at x = 0.
        let d = tree("sin(x)*x").derivative("x").unwrap();
        assert_eq!(
            *d,
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Binary(
                    BinaryOp::Mul,
                    Box::new(Expr::Call(Function::Cos, var("x"))),
                    var("x"),
                )),
                Box::new(Expr::Call(Function::Sin, var("x"))),
            )
        );
        assert!((eval_tree(&d, &[("x", 0.0)])).abs() < 1e-12);
    }

    #[test]
    fn test_quotient_rule() {
        // d/dx(x/y) with y constant reduces to 1/y.
        let d = tree("x/y").derivative("x").unwrap();
        assert_eq!(
            *d,
            Expr::Binary(BinaryOp::Div, num(1.0), var("y"))
        );
    }

    #[test]
    fn test_chain_rule_through_exp() {
        let d = tree("exp(x^2)").derivative("x").unwrap();
        assert_eq!(d.to_string(), "exp(x^2)*2*x");
        let x = 0.75;
        let expected = f64::exp(x * x) * 2.0 * x;
        assert!((eval_tree(&d, &[("x", x)]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_of_sketch_expression() {
        // cos(exp(-a*x^2)) differentiates to sin(exp(-a*x^2))*exp(-a*x^2)*2a*x
        // up to sign bookkeeping; compare numerically against the closed form.
        let d = tree("cos(exp(-a*x^2))").derivative("x").unwrap();
        let (a, x) = (0.5, 1.2);
        let inner = f64::exp(-a * x * x);
        let expected = inner.sin() * inner * 2.0 * a * x;
        assert!((eval_node(&d, &[("a", a), ("x", x)]) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_derivative_gaps_are_explicit() {
        assert_eq!(
            tree("sinh(x)").derivative("x"),
            Err(DerivativeError::UnsupportedFunction(Function::Sinh))
        );
        assert_eq!(
            tree("abs(x)").derivative("x"),
            Err(DerivativeError::UnsupportedFunction(Function::Abs))
        );
        assert_eq!(
            tree("x^y").derivative("x"),
            Err(DerivativeError::UnsupportedExponent)
        );
        assert_eq!(
            tree("x^2.5").derivative("x"),
            Err(DerivativeError::UnsupportedExponent)
        );
    }

    #[test]
    fn test_display_parenthesization() {
        assert_eq!(tree("(a+b)*c").to_string(), "(a+b)*c");
        assert_eq!(tree("a+b*c").to_string(), "a+b*c");
        assert_eq!(tree("a/(b+c)").to_string(), "a/(b+c)");
        assert_eq!(tree("8-3-2").to_string(), "8-3-2");
        assert_eq!(tree("x^2").to_string(), "x^2");
        assert_eq!(tree("sin(x)*cos(y)").to_string(), "sin(x)*cos(y)");
    }

    #[test]
    fn test_roundtrip_preserves_value() {
        // parse -> tree -> simplify -> infix -> parse must agree with
        // direct evaluation of the original source.
        let sources = [
            "a*x*x + exp(exp(-b*x + c))",
            "cos(exp(-a*x^2))",
            "step(x) + tanh(a*x)",
        ];
        let bindings = [("a", 1.0), ("b", 2.0), ("c", -10.0), ("x", 10.0)];
        for source in sources {
            let map: HashMap<String, Numeric> = bindings
                .iter()
                .map(|(name, value)| (name.to_string(), Numeric::Real(*value)))
                .collect();
            let direct = match evaluate(&parse(source).unwrap(), &map).unwrap() {
                Numeric::Real(x) => x,
                Numeric::Complex(z) => panic!("expected a real result, got {z}"),
            };
            let simplified = tree(source).simplify();
            let roundtripped = eval_tree(&simplified, &bindings);
            assert!(
                (direct - roundtripped).abs() < 1e-9,
                "{source}: {direct} != {roundtripped}"
            );
        }
    }
}
