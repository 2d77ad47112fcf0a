//! Fixed operator and function vocabulary.
//!
//! This module is the single precedence/dispatch table shared by the
//! shunting-yard converter, the evaluator, the code generator and the
//! symbolic engine. It is pure data, constructed at compile time; nothing
//! here is mutated at runtime, so the tables can be consulted from parallel
//! evaluations without locking.

use std::fmt;

use crate::numeric::Numeric;

/// Precedence rank of function application. Higher than every binary
/// operator, so a function always binds its single following argument.
pub const FUNCTION_PRECEDENCE: u8 = 3;

/// The five binary operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Pow,
    Div,
    Mul,
    Add,
    Sub,
}

impl BinaryOp {
    pub fn from_char(c: char) -> Option<BinaryOp> {
        match c {
            '^' => Some(BinaryOp::Pow),
            '/' => Some(BinaryOp::Div),
            '*' => Some(BinaryOp::Mul),
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Pow => '^',
            BinaryOp::Div => '/',
            BinaryOp::Mul => '*',
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
        }
    }

    /// Precedence rank: `+ -` = 0, `* /` = 1, `^` = 2. Same-rank operators
    /// are treated as left-associative by the converter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 0,
            BinaryOp::Mul | BinaryOp::Div => 1,
            BinaryOp::Pow => 2,
        }
    }

    /// Applies the operator through the polymorphic dispatch layer.
    pub fn apply(self, lhs: Numeric, rhs: Numeric) -> Numeric {
        match self {
            BinaryOp::Pow => lhs.pow(rhs),
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
        }
    }

    /// Real-only application, used for constant folding in expression
    /// trees, whose literals are plain `f64`.
    pub fn apply_real(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Pow => lhs.powf(rhs),
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The supported unary functions. Identifiers are checked against this
/// table downstream of tokenization; everything else is a free variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Exp,
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Log,
    Step,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::Abs,
        Function::Exp,
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Sinh,
        Function::Cosh,
        Function::Tanh,
        Function::Log,
        Function::Step,
    ];

    pub fn from_name(name: &str) -> Option<Function> {
        match name {
            "abs" => Some(Function::Abs),
            "exp" => Some(Function::Exp),
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "sinh" => Some(Function::Sinh),
            "cosh" => Some(Function::Cosh),
            "tanh" => Some(Function::Tanh),
            "log" => Some(Function::Log),
            "step" => Some(Function::Step),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Exp => "exp",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Log => "log",
            Function::Step => "step",
        }
    }

    /// Applies the function through the polymorphic dispatch layer.
    pub fn apply(self, z: Numeric) -> Numeric {
        match self {
            Function::Abs => z.abs(),
            Function::Exp => z.exp(),
            Function::Sin => z.sin(),
            Function::Cos => z.cos(),
            Function::Tan => z.tan(),
            Function::Sinh => z.sinh(),
            Function::Cosh => z.cosh(),
            Function::Tanh => z.tanh(),
            Function::Log => z.log(),
            Function::Step => z.step(),
        }
    }

    /// Real-only application, used for constant folding in expression trees.
    pub fn apply_real(self, x: f64) -> f64 {
        match self {
            Function::Abs => x.abs(),
            Function::Exp => x.exp(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Sinh => x.sinh(),
            Function::Cosh => x.cosh(),
            Function::Tanh => x.tanh(),
            Function::Log => x.ln(),
            Function::Step => {
                if x >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
