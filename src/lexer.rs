//! Tokenizer: raw source text to a flat token sequence.
//!
//! The recognized character classes are digits, ASCII letters, the operator
//! set `^ / * + -`, parentheses, the decimal point and space (ignored).
//! Anything else fails the whole parse; there is no partial token list.
//!
//! Identifiers are scanned as letter/digit runs and *not* classified here;
//! whether a name is a supported function or a free variable is decided
//! downstream against [`crate::operators::Function`].
//!
//! Parenthesis balance is verified by a pre-pass before any token is
//! produced, so the converter never sees an unmatched parenthesis.

use crate::errors::ParseError;
use crate::operators::BinaryOp;

/// A single lexical atom, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal, kept as text until a consumer parses it.
    Number(String),
    /// Function or free-variable name; classification is deferred.
    Ident(String),
    Op(BinaryOp),
    LeftParen,
    RightParen,
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Characters that may directly follow a complete numeric literal.
fn terminates_number(c: char) -> bool {
    BinaryOp::from_char(c).is_some() || c == ')' || c == ' '
}

fn check_balanced(source: &str) -> Result<(), ParseError> {
    let mut depth: usize = 0;
    for c in source.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Err(ParseError::UnbalancedParentheses);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(ParseError::UnbalancedParentheses)
    }
}

/// Greedily consumes a digit run starting at `start`.
fn scan_integer(chars: &[char], start: usize) -> (String, usize) {
    let mut j = start;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    (chars[start..j].iter().collect(), j)
}

/// Scans the `[+-]?digits` suffix after an `e` marker. `start` points just
/// past the `e`; an exhausted input or a missing digit run is malformed.
fn scan_exponent(
    chars: &[char],
    mantissa: String,
    start: usize,
    token_start: usize,
) -> Result<(String, usize), ParseError> {
    let mut text = mantissa;
    text.push('e');
    let mut j = start;
    if j == chars.len() {
        return Err(ParseError::MalformedNumber { pos: token_start });
    }
    if chars[j] == '+' || chars[j] == '-' {
        text.push(chars[j]);
        j += 1;
        if j == chars.len() {
            return Err(ParseError::MalformedNumber { pos: token_start });
        }
    }
    if !chars[j].is_ascii_digit() {
        return Err(ParseError::MalformedNumber { pos: token_start });
    }
    let (digits, k) = scan_integer(chars, j);
    text.push_str(&digits);
    if k < chars.len() && !terminates_number(chars[k]) {
        return Err(ParseError::MalformedNumber { pos: token_start });
    }
    Ok((text, k))
}

/// Scans the fractional part after a decimal point. The point itself is
/// only kept when digits follow, so the emitted text always parses as an
/// `f64` (`1.` becomes `1`, `1.e5` becomes `1e5`).
fn scan_fraction(
    chars: &[char],
    whole: String,
    start: usize,
    token_start: usize,
) -> Result<(String, usize), ParseError> {
    let mut text = whole;
    let (digits, j) = scan_integer(chars, start);
    if !digits.is_empty() {
        text.push('.');
        text.push_str(&digits);
    }
    if j == chars.len() || terminates_number(chars[j]) {
        return Ok((text, j));
    }
    if chars[j] == 'e' {
        return scan_exponent(chars, text, j + 1, token_start);
    }
    Err(ParseError::MalformedNumber { pos: token_start })
}

/// Scans one numeric literal starting at a digit. A literal is terminated
/// by end-of-input, an operator, a right parenthesis or a space; any other
/// follower fails the token. A leading sign is never part of a literal;
/// unary `-`/`+` are rewritten structurally by the converter.
fn scan_number(chars: &[char], start: usize) -> Result<(String, usize), ParseError> {
    let (text, j) = scan_integer(chars, start);
    if j == chars.len() {
        return Ok((text, j));
    }
    match chars[j] {
        c if terminates_number(c) => Ok((text, j)),
        'e' => scan_exponent(chars, text, j + 1, start),
        '.' => scan_fraction(chars, text, j + 1, start),
        _ => Err(ParseError::MalformedNumber { pos: start }),
    }
}

/// Tokenizes a source string, verifying parenthesis balance first.
///
/// # Errors
/// Returns a [`ParseError`] on the first unrecognized character or
/// malformed literal; no partial token sequence is produced.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    check_balanced(source)?;
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            let (text, end) = scan_number(&chars, i)?;
            tokens.push(Token::Number(text));
            i = end;
        } else if is_letter(c) {
            let mut j = i;
            while j < chars.len() && (is_letter(chars[j]) || chars[j].is_ascii_digit()) {
                j += 1;
            }
            tokens.push(Token::Ident(chars[i..j].iter().collect()));
            i = j;
        } else if let Some(op) = BinaryOp::from_char(c) {
            tokens.push(Token::Op(op));
            i += 1;
        } else if c == '(' {
            tokens.push(Token::LeftParen);
            i += 1;
        } else if c == ')' {
            tokens.push(Token::RightParen);
            i += 1;
        } else if c == ' ' {
            i += 1;
        } else {
            return Err(ParseError::UnexpectedCharacter { ch: c, pos: i });
        }
    }
    Ok(tokens)
}
