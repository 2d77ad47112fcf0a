//! Cross-compilation of a postfix sequence into target-language source.
//!
//! This is the second consumer of an [`RpnSequence`]: the same single-pass
//! stack walk as the evaluator, but building nested call-expression text
//! instead of values. It exists so a user-typed expression can be spliced
//! into shader (or other host-language) source that links against a small
//! complex-arithmetic preamble.
//!
//! [`NamingConvention`] is the mapping table a downstream backend must
//! agree with by name: one entry per operator and per supported function,
//! plus the wrapper applied to numeric literals. [`GLSL_COMPLEX`] is the
//! dialect for the domain-coloring fragment shaders, where every value is a
//! `complex` (a `vec2`) and literals are lifted with `r2C`.

use crate::errors::EvalError;
use crate::lexer::Token;
use crate::operators::{BinaryOp, Function};
use crate::rpn::{literal_value, RpnSequence};

/// Fixed operator/function naming table for one target dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConvention {
    /// Call wrapped around every numeric literal.
    pub literal: &'static str,
    pub add: &'static str,
    pub sub: &'static str,
    pub mul: &'static str,
    pub div: &'static str,
    pub pow: &'static str,
    pub abs: &'static str,
    pub exp: &'static str,
    pub sin: &'static str,
    pub cos: &'static str,
    pub tan: &'static str,
    pub sinh: &'static str,
    pub cosh: &'static str,
    pub tanh: &'static str,
    pub log: &'static str,
    pub step: &'static str,
}

/// The complex-arithmetic GLSL preamble used by the domain-coloring
/// shaders: binary operators keep their plain names except `powC`, and
/// every function name carries a `C` suffix.
pub const GLSL_COMPLEX: NamingConvention = NamingConvention {
    literal: "r2C",
    add: "add",
    sub: "sub",
    mul: "mul",
    div: "div",
    pow: "powC",
    abs: "absC",
    exp: "expC",
    sin: "sinC",
    cos: "cosC",
    tan: "tanC",
    sinh: "sinhC",
    cosh: "coshC",
    tanh: "tanhC",
    log: "logC",
    step: "stepC",
};

impl NamingConvention {
    pub fn operator(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Add => self.add,
            BinaryOp::Sub => self.sub,
            BinaryOp::Mul => self.mul,
            BinaryOp::Div => self.div,
            BinaryOp::Pow => self.pow,
        }
    }

    pub fn function(&self, func: Function) -> &'static str {
        match func {
            Function::Abs => self.abs,
            Function::Exp => self.exp,
            Function::Sin => self.sin,
            Function::Cos => self.cos,
            Function::Tan => self.tan,
            Function::Sinh => self.sinh,
            Function::Cosh => self.cosh,
            Function::Tanh => self.tanh,
            Function::Log => self.log,
            Function::Step => self.step,
        }
    }
}

/// Renders a postfix sequence as nested calls in the given dialect.
///
/// Literals are rendered in scientific notation inside the dialect's
/// literal wrapper; free variables pass through as bare names (they become
/// uniforms or locals on the target side), so no binding is required here.
///
/// # Example
/// ```
/// use zexpr::{parse, to_source_string, GLSL_COMPLEX};
///
/// let rpn = parse("x^2 + sin(y)").unwrap();
/// assert_eq!(
///     to_source_string(&rpn, &GLSL_COMPLEX).unwrap(),
///     "add(powC(x, r2C(2e0)), sinC(y))"
/// );
/// ```
pub fn to_source_string(
    rpn: &RpnSequence,
    dialect: &NamingConvention,
) -> Result<String, EvalError> {
    let mut stack: Vec<String> = Vec::new();
    for tok in rpn.iter() {
        match tok {
            Token::Number(text) => {
                stack.push(format!("{}({:e})", dialect.literal, literal_value(text)));
            }
            Token::Op(op) => {
                let rhs = stack.pop().ok_or(EvalError::MissingOperand)?;
                let lhs = stack.pop().ok_or(EvalError::MissingOperand)?;
                stack.push(format!("{}({}, {})", dialect.operator(*op), lhs, rhs));
            }
            Token::Ident(name) => match Function::from_name(name) {
                Some(func) => {
                    let arg = stack.pop().ok_or(EvalError::MissingOperand)?;
                    stack.push(format!("{}({})", dialect.function(func), arg));
                }
                None => stack.push(name.clone()),
            },
            Token::LeftParen | Token::RightParen => return Err(EvalError::StrayParenthesis),
        }
    }
    let result = stack.pop().ok_or(EvalError::MissingOperand)?;
    if stack.is_empty() {
        Ok(result)
    } else {
        Err(EvalError::UnconsumedOperands(stack.len()))
    }
}
