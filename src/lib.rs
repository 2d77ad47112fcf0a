//! Math-expression engine with complex arithmetic and symbolic derivatives.
//!
//! This crate is the expression core behind complex-function visualization
//! sketches: it turns a user-typed string into a postfix instruction
//! sequence (shunting-yard), evaluates that sequence over real or complex
//! variable bindings, cross-compiles it into shader-language source, and
//! builds an expression tree that supports simplification and rule-based
//! symbolic differentiation.
//!
//! Rendering, GPU state and UI wiring are callers of this engine and live
//! elsewhere; the engine itself is synchronous, allocation-light and free
//! of shared mutable state, so independent expressions can be processed in
//! parallel.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use zexpr::{Equation, Numeric, GLSL_COMPLEX};
//!
//! // Parse once, evaluate with bindings.
//! let eq = Equation::new("3 - 4*6/12 + 21").unwrap();
//! assert_eq!(eq.eval(&HashMap::new()).unwrap(), Numeric::Real(22.0));
//!
//! // A complex binding anywhere promotes the whole computation.
//! let eq = Equation::new("(-1)^0.5").unwrap();
//! let z = eq.eval(&HashMap::new()).unwrap();
//! assert!(z.re().abs() < 1e-12 && (z.im() - 1.0).abs() < 1e-12);
//!
//! // Symbolic differentiation comes back simplified.
//! let eq = Equation::new("x^2").unwrap();
//! assert_eq!(eq.derivative("x").unwrap().to_string(), "2*x");
//!
//! // Cross-compile to the GLSL complex-arithmetic dialect.
//! let eq = Equation::new("sin(z)").unwrap();
//! assert_eq!(eq.to_source_string(&GLSL_COMPLEX).unwrap(), "sinC(z)");
//! ```

pub use codegen::{to_source_string, NamingConvention, GLSL_COMPLEX};
pub use complex::Complex;
pub use equation::Equation;
pub use expr::Expr;
pub use numeric::Numeric;
pub use operators::{BinaryOp, Function};
pub use rpn::{evaluate, free_variables, parse, RpnSequence};

pub mod prelude {
    pub use crate::codegen::{to_source_string, NamingConvention, GLSL_COMPLEX};
    pub use crate::complex::Complex;
    pub use crate::equation::Equation;
    pub use crate::errors::{DerivativeError, EquationError, EvalError, ParseError};
    pub use crate::expr::Expr;
    pub use crate::numeric::Numeric;
    pub use crate::rpn::{evaluate, free_variables, parse, RpnSequence};
}

/// Cross-compilation of postfix sequences into target-language source
pub mod codegen;
/// Complex number type
pub mod complex;
/// High-level equation handling
pub mod equation;
/// Error types for the various failure modes
pub mod errors;
/// Expression tree representation and symbolic differentiation
pub mod expr;
/// Tokenizer
pub mod lexer;
/// Polymorphic real/complex dispatch
pub mod numeric;
/// Fixed operator and function vocabulary
pub mod operators;
/// Shunting-yard conversion and the postfix stack machine
pub mod rpn;
