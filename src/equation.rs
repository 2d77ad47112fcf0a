//! High-level equation handling.
//!
//! `Equation` ties the pipeline together: it parses a source string once,
//! discovers the free variables, and then exposes evaluation (by name or by
//! position), symbolic differentiation, and target-language code generation
//! over the same immutable postfix sequence.
//!
//! # Example
//!
//! ```rust
//! use zexpr::{Equation, Numeric};
//!
//! let eq = Equation::new("2*x + y^2").unwrap();
//!
//! // Variables are discovered and sorted alphabetically.
//! assert_eq!(eq.variables(), ["x", "y"]);
//!
//! // Evaluate at x=1, y=2.
//! let result = eq.eval_at(&[Numeric::Real(1.0), Numeric::Real(2.0)]).unwrap();
//! assert_eq!(result, Numeric::Real(6.0));
//!
//! // Differentiate symbolically.
//! let dx = eq.derivative("x").unwrap();
//! assert_eq!(dx.to_string(), "2");
//! ```
//!
//! Evaluation is a pure walk over immutable data, so a single `Equation`
//! can be shared across threads; [`Equation::eval_batch`] uses that to
//! sweep a variable over many sample points in parallel, which is how the
//! domain-coloring callers fill a grid.

use std::collections::{HashMap, HashSet};

use colored::Colorize;
use itertools::Itertools;
use rayon::prelude::*;

use crate::codegen::{to_source_string, NamingConvention};
use crate::errors::{EquationError, ParseError};
use crate::expr::Expr;
use crate::numeric::Numeric;
use crate::rpn::{evaluate, free_variables, parse, RpnSequence};

/// A parsed expression with its discovered variables.
///
/// The postfix sequence is parsed once at construction and replayed for
/// every evaluation. Variable names are sorted alphabetically; positional
/// input to [`Equation::eval_at`] follows that order.
#[derive(Clone, PartialEq)]
pub struct Equation {
    source: String,
    rpn: RpnSequence,
    variables: Vec<String>,
}

impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{\n")?;
        writeln!(f, "    {}: {}\n", "Equation".cyan(), self.source)?;
        writeln!(f, "    {}: {}\n", "Postfix".cyan(), self.rpn)?;
        writeln!(f, "    {}: {:?}\n", "Variables".cyan(), self.variables)?;
        writeln!(f, "}}")?;
        Ok(())
    }
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Equation {
    /// Parses a source string into an `Equation`.
    ///
    /// Free variables are extracted from the parsed sequence and sorted
    /// alphabetically.
    ///
    /// # Errors
    /// Any [`ParseError`] from tokenization or conversion; no partial
    /// equation is produced.
    pub fn new(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let rpn = parse(&source)?;
        let variables = free_variables(&rpn).into_iter().sorted().collect();
        Ok(Self {
            source,
            rpn,
            variables,
        })
    }

    /// The original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed postfix sequence.
    pub fn rpn(&self) -> &RpnSequence {
        &self.rpn
    }

    /// Free variables in alphabetical order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Free variables as a set, for callers that only need membership.
    pub fn free_variables(&self) -> HashSet<String> {
        self.variables.iter().cloned().collect()
    }

    /// Evaluates the equation against named bindings.
    ///
    /// Every variable of the equation must be bound; the first missing one
    /// is reported. Extra bindings are ignored.
    ///
    /// # Example
    /// ```
    /// # use std::collections::HashMap;
    /// # use zexpr::{Equation, Numeric};
    /// let eq = Equation::new("-12 + x").unwrap();
    /// let bindings = HashMap::from([("x".to_string(), Numeric::Real(5.0))]);
    /// assert_eq!(eq.eval(&bindings).unwrap(), Numeric::Real(-7.0));
    /// ```
    pub fn eval(&self, bindings: &HashMap<String, Numeric>) -> Result<Numeric, EquationError> {
        for variable in &self.variables {
            if !bindings.contains_key(variable) {
                return Err(EquationError::VariableNotFound(variable.clone()));
            }
        }
        Ok(evaluate(&self.rpn, bindings)?)
    }

    /// Evaluates with positional values following [`Equation::variables`].
    ///
    /// # Errors
    /// [`EquationError::InvalidInputLength`] when the slice length does not
    /// match the variable count.
    pub fn eval_at(&self, values: &[Numeric]) -> Result<Numeric, EquationError> {
        if values.len() != self.variables.len() {
            return Err(EquationError::InvalidInputLength {
                expected: self.variables.len(),
                got: values.len(),
            });
        }
        let bindings: HashMap<String, Numeric> = self
            .variables
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        Ok(evaluate(&self.rpn, &bindings)?)
    }

    /// Sweeps one variable over `samples` in parallel, the remaining
    /// variables held at `fixed`. Results follow the sample order.
    ///
    /// This is the batched entry point used to fill visualization grids:
    /// evaluation shares only the immutable sequence, so the samples are
    /// processed with rayon without any locking.
    pub fn eval_batch(
        &self,
        variable: &str,
        samples: &[Numeric],
        fixed: &HashMap<String, Numeric>,
    ) -> Result<Vec<Numeric>, EquationError> {
        if !self.variables.iter().any(|v| v == variable) {
            return Err(EquationError::VariableNotFound(variable.to_string()));
        }
        samples
            .par_iter()
            .map(|&sample| {
                let mut bindings = fixed.clone();
                bindings.insert(variable.to_string(), sample);
                evaluate(&self.rpn, &bindings).map_err(EquationError::from)
            })
            .collect()
    }

    /// Builds the expression tree for the parsed sequence.
    pub fn tree(&self) -> Result<Box<Expr>, EquationError> {
        Ok(Expr::from_rpn(&self.rpn)?)
    }

    /// Computes the simplified symbolic derivative with respect to a
    /// variable of the equation.
    ///
    /// # Errors
    /// [`EquationError::VariableNotFound`] when the variable does not occur
    /// in the equation, and [`EquationError::Derivative`] when a node has
    /// no derivative rule.
    ///
    /// # Example
    /// ```
    /// # use zexpr::Equation;
    /// let eq = Equation::new("x^2 + x").unwrap();
    /// assert_eq!(eq.derivative("x").unwrap().to_string(), "2*x+1");
    /// ```
    pub fn derivative(&self, variable: &str) -> Result<Box<Expr>, EquationError> {
        if !self.variables.iter().any(|v| v == variable) {
            return Err(EquationError::VariableNotFound(variable.to_string()));
        }
        let tree = Expr::from_rpn(&self.rpn)?;
        Ok(tree.derivative(variable)?)
    }

    /// Renders the equation as target-language source in the given dialect.
    pub fn to_source_string(
        &self,
        dialect: &NamingConvention,
    ) -> Result<String, EquationError> {
        Ok(to_source_string(&self.rpn, dialect)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GLSL_COMPLEX;
    use crate::complex::Complex;
    use crate::errors::EvalError;

    #[test]
    fn test_constant_equation() {
        let eq = Equation::new("3 - 4*6/12 + 21").unwrap();
        assert!(eq.variables().is_empty());
        assert_eq!(eq.eval(&HashMap::new()).unwrap(), Numeric::Real(22.0));
    }

    #[test]
    fn test_variables_are_sorted() {
        let eq = Equation::new("a*x*x + exp(exp(-b*x + c))").unwrap();
        assert_eq!(eq.variables(), ["a", "b", "c", "x"]);
    }

    #[test]
    fn test_eval_at_positional() {
        let eq = Equation::new("2*x + y^2").unwrap();
        let result = eq
            .eval_at(&[Numeric::Real(1.0), Numeric::Real(2.0)])
            .unwrap();
        assert_eq!(result, Numeric::Real(6.0));
    }

    #[test]
    fn test_eval_at_wrong_length() {
        let eq = Equation::new("2*x + y^2").unwrap();
        assert_eq!(
            eq.eval_at(&[Numeric::Real(1.0)]),
            Err(EquationError::InvalidInputLength {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_missing_binding_is_reported_by_name() {
        let eq = Equation::new("x + y").unwrap();
        let bindings = HashMap::from([("x".to_string(), Numeric::Real(1.0))]);
        assert_eq!(
            eq.eval(&bindings),
            Err(EquationError::VariableNotFound("y".to_string()))
        );
    }

    #[test]
    fn test_complex_binding_promotes_result() {
        let eq = Equation::new("z^2 + 1").unwrap();
        let bindings = HashMap::from([(
            "z".to_string(),
            Numeric::Complex(Complex::new(0.0, 1.0)),
        )]);
        match eq.eval(&bindings).unwrap() {
            Numeric::Complex(w) => {
                // i^2 + 1 = 0
                assert!(w.re.abs() < 1e-12);
                assert!(w.im.abs() < 1e-12);
            }
            Numeric::Real(_) => panic!("complex binding must produce a complex result"),
        }
    }

    #[test]
    fn test_eval_batch_matches_pointwise() {
        let eq = Equation::new("a*x*x").unwrap();
        let fixed = HashMap::from([("a".to_string(), Numeric::Real(2.0))]);
        let samples: Vec<Numeric> = (0..64).map(|i| Numeric::Real(i as f64 * 0.25)).collect();
        let batch = eq.eval_batch("x", &samples, &fixed).unwrap();
        assert_eq!(batch.len(), samples.len());
        for (sample, value) in samples.iter().zip(&batch) {
            let mut bindings = fixed.clone();
            bindings.insert("x".to_string(), *sample);
            assert_eq!(*value, eq.eval(&bindings).unwrap());
        }
    }

    #[test]
    fn test_eval_batch_unknown_variable() {
        let eq = Equation::new("x + 1").unwrap();
        assert_eq!(
            eq.eval_batch("y", &[Numeric::Real(0.0)], &HashMap::new()),
            Err(EquationError::VariableNotFound("y".to_string()))
        );
    }

    #[test]
    fn test_derivative() {
        let eq = Equation::new("x^2").unwrap();
        assert_eq!(eq.derivative("x").unwrap().to_string(), "2*x");
        assert_eq!(
            eq.derivative("y"),
            Err(EquationError::VariableNotFound("y".to_string()))
        );
    }

    #[test]
    fn test_to_source_string() {
        let eq = Equation::new("x^2 + sin(y)").unwrap();
        assert_eq!(
            eq.to_source_string(&GLSL_COMPLEX).unwrap(),
            "add(powC(x, r2C(2e0)), sinC(y))"
        );
    }

    #[test]
    fn test_parse_failure_yields_no_equation() {
        assert_eq!(
            Equation::new("(x + 1"),
            Err(ParseError::UnbalancedParentheses)
        );
        assert!(Equation::new("1e").is_err());
    }

    #[test]
    fn test_unbound_eval_error_passthrough() {
        // A binding map may satisfy the variable check and still be probed
        // through the low-level evaluator path.
        let eq = Equation::new("x").unwrap();
        let err = evaluate(&eq.rpn, &HashMap::new());
        assert_eq!(err, Err(EvalError::UnboundVariable("x".to_string())));
    }
}
