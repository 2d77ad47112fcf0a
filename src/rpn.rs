//! Infix-to-postfix conversion and the postfix stack machine.
//!
//! [`parse`] is the front door of the engine: it tokenizes the source,
//! rewrites unary signs, and runs the shunting-yard algorithm to produce an
//! [`RpnSequence`]. The sequence is immutable and consumers walk it by
//! reference, so a single parse can be evaluated many times with different
//! variable bindings.
//!
//! Unary `-`/`+` handling is a textual rewrite, not a dedicated operator: a
//! sign at the start of the expression or directly after `(` gets an
//! explicit `0` inserted in front of it. A consequence worth knowing is
//! that `-x^2` parses as `0 - x^2`, not `(-x)^2`.

use std::collections::{HashMap, HashSet};

use crate::errors::{EvalError, ParseError};
use crate::lexer::{tokenize, Token};
use crate::numeric::Numeric;
use crate::operators::{BinaryOp, Function, FUNCTION_PRECEDENCE};

/// A token sequence in postfix order, produced by [`parse`].
///
/// Stateless and replayable: the evaluator, the stringifier and the tree
/// builder all iterate over it without consuming it.
#[derive(Debug, Clone, PartialEq)]
pub struct RpnSequence {
    tokens: Vec<Token>,
}

impl RpnSequence {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl std::fmt::Display for RpnSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, tok) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match tok {
                Token::Number(text) => write!(f, "{text}")?,
                Token::Ident(name) => write!(f, "{name}")?,
                Token::Op(op) => write!(f, "{op}")?,
                Token::LeftParen => write!(f, "(")?,
                Token::RightParen => write!(f, ")")?,
            }
        }
        Ok(())
    }
}

/// Parses a source string into a postfix sequence.
///
/// Tokenization (including the parenthesis balance pre-pass), the unary
/// sign rewrite and the shunting-yard conversion run in order; any failure
/// aborts the whole parse with no partial result.
///
/// # Example
/// ```
/// use zexpr::parse;
///
/// let rpn = parse("2 + 3 * 4").unwrap();
/// assert_eq!(rpn.to_string(), "2 3 4 * +");
/// ```
pub fn parse(source: &str) -> Result<RpnSequence, ParseError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    Ok(shunting_yard(insert_unary_zeros(tokens)))
}

/// Rewrites unary `-`/`+` by inserting an explicit `0` operand before a
/// sign that opens the expression or follows a left parenthesis.
fn insert_unary_zeros(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() + 1);
    let mut at_boundary = true;
    for tok in tokens {
        if at_boundary && matches!(tok, Token::Op(BinaryOp::Add | BinaryOp::Sub)) {
            out.push(Token::Number("0".to_string()));
        }
        at_boundary = matches!(tok, Token::LeftParen);
        out.push(tok);
    }
    out
}

/// Precedence of a token sitting on the operator stack. Only operators and
/// function names are ever pushed there.
fn stack_precedence(tok: &Token) -> u8 {
    match tok {
        Token::Op(op) => op.precedence(),
        Token::Ident(_) => FUNCTION_PRECEDENCE,
        Token::Number(_) | Token::LeftParen | Token::RightParen => 0,
    }
}

/// Pops stacked operators of greater-or-equal precedence into the output
/// (left associativity), stopping at a left parenthesis, then pushes the
/// incoming operator.
fn push_operator(tok: Token, stack: &mut Vec<Token>, output: &mut Vec<Token>) {
    let prec = stack_precedence(&tok);
    loop {
        match stack.last() {
            None | Some(Token::LeftParen) => break,
            Some(top) if stack_precedence(top) < prec => break,
            Some(_) => {
                if let Some(top) = stack.pop() {
                    output.push(top);
                }
            }
        }
    }
    stack.push(tok);
}

/// Standard shunting-yard over a balanced token sequence. Function names
/// are handled exactly like operators on the stack (with the highest
/// precedence rank) and emitted as postfix apply tokens.
fn shunting_yard(tokens: Vec<Token>) -> RpnSequence {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();
    for tok in tokens {
        match tok {
            Token::Number(_) => output.push(tok),
            Token::LeftParen => stack.push(tok),
            Token::RightParen => {
                while let Some(top) = stack.pop() {
                    if matches!(top, Token::LeftParen) {
                        break;
                    }
                    output.push(top);
                }
            }
            Token::Op(_) => push_operator(tok, &mut stack, &mut output),
            Token::Ident(ref name) => {
                if Function::from_name(name).is_some() {
                    push_operator(tok, &mut stack, &mut output);
                } else {
                    output.push(tok);
                }
            }
        }
    }
    while let Some(top) = stack.pop() {
        output.push(top);
    }
    RpnSequence { tokens: output }
}

/// Parses a scanned literal. The tokenizer guarantees the text is a valid
/// `f64` rendering, so this mirrors the forgiving semantics of the stack
/// machine rather than surfacing an error path that cannot trigger.
pub(crate) fn literal_value(text: &str) -> f64 {
    text.parse().unwrap_or(f64::NAN)
}

/// Evaluates a postfix sequence against a variable binding.
///
/// Literals push reals; operators pop two operands, functions pop one, and
/// both go through the polymorphic dispatch layer, so any complex operand
/// anywhere promotes the rest of the computation. An identifier that is
/// neither a known function nor bound in `bindings` fails fast.
///
/// # Errors
/// [`EvalError::UnboundVariable`] for a missing binding, and the malformed
/// family when the sequence does not reduce to exactly one value.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use zexpr::{evaluate, parse, Numeric};
///
/// let rpn = parse("-12 + x").unwrap();
/// let bindings = HashMap::from([("x".to_string(), Numeric::Real(5.0))]);
/// assert_eq!(evaluate(&rpn, &bindings).unwrap(), Numeric::Real(-7.0));
/// ```
pub fn evaluate(
    rpn: &RpnSequence,
    bindings: &HashMap<String, Numeric>,
) -> Result<Numeric, EvalError> {
    let mut stack: Vec<Numeric> = Vec::new();
    for tok in rpn.iter() {
        match tok {
            Token::Number(text) => stack.push(Numeric::Real(literal_value(text))),
            Token::Op(op) => {
                let rhs = stack.pop().ok_or(EvalError::MissingOperand)?;
                let lhs = stack.pop().ok_or(EvalError::MissingOperand)?;
                stack.push(op.apply(lhs, rhs));
            }
            Token::Ident(name) => match Function::from_name(name) {
                Some(func) => {
                    let arg = stack.pop().ok_or(EvalError::MissingOperand)?;
                    stack.push(func.apply(arg));
                }
                None => {
                    let value = bindings
                        .get(name)
                        .copied()
                        .ok_or_else(|| EvalError::UnboundVariable(name.clone()))?;
                    stack.push(value);
                }
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

/// Collects every identifier in the sequence that is not a known function
/// name. Order is not significant; only uniqueness is preserved.
pub fn free_variables(rpn: &RpnSequence) -> HashSet<String> {
    rpn.iter()
        .filter_map(|tok| match tok {
            Token::Ident(name) if Function::from_name(name).is_none() => Some(name.clone()),
            _ => None,
        })
        .collect()
}
