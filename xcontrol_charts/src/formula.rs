// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Formula annotation expressions.
//!
//! A formula is an arithmetic expression in one variable `x`, optionally written as `y = ...`.
//! Supported syntax: numbers, `x`, `+ - * / % ^`, parentheses, unary minus and implicit
//! multiplication (`2x`, `3(x + 1)`). `^` is right-associative and binds tighter than unary
//! minus, so `-x^2` is `-(x^2)`.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{digit1, one_of, satisfy};
use nom::combinator::{opt, recognize};
use nom::error::{ErrorKind, ParseError};
use nom::{IResult, Parser};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Deepest nesting of parentheses, signs and exponents a formula may use.
pub const MAX_FORMULA_DEPTH: usize = 64;

/// Errors produced while parsing a formula.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    /// The formula is empty.
    #[error("empty formula")]
    Empty,
    /// A character that is not part of the grammar.
    #[error("unexpected character {ch:?} at {pos}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset in the expression.
        pos: usize,
    },
    /// An identifier other than `x`.
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    /// A malformed number literal.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    /// The expression ended where an operand was expected.
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    /// A token in a position where it is not allowed.
    #[error("unexpected token at {0}")]
    UnexpectedToken(usize),
    /// Nesting goes deeper than [`MAX_FORMULA_DEPTH`].
    #[error("formula nests deeper than {0} levels")]
    TooDeep(usize),
}

/// One step of a formula in postfix order.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Op {
    Num(f64),
    X,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl Op {
    fn binary(symbol: char) -> Self {
        match symbol {
            '+' => Self::Add,
            '-' => Self::Sub,
            '*' => Self::Mul,
            '/' => Self::Div,
            '%' => Self::Rem,
            _ => Self::Pow,
        }
    }

    fn apply(self, l: f64, r: f64) -> f64 {
        match self {
            Self::Add => l + r,
            Self::Sub => l - r,
            Self::Mul => l * r,
            Self::Div => l / r,
            Self::Rem => l % r,
            Self::Pow => l.powf(r),
            Self::Num(_) | Self::X | Self::Neg => f64::NAN,
        }
    }
}

/// Parse failure: the unparsed input where it happened, and a cause once one is known.
#[derive(Debug)]
struct SyntaxError<'a> {
    rest: &'a str,
    cause: Option<FormulaError>,
}

impl<'a> SyntaxError<'a> {
    fn fail(rest: &'a str, cause: FormulaError) -> nom::Err<Self> {
        nom::Err::Failure(Self {
            rest,
            cause: Some(cause),
        })
    }
}

impl<'a> ParseError<&'a str> for SyntaxError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self {
            rest: input,
            cause: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, O> = IResult<&'a str, O, SyntaxError<'a>>;

/// Turns a recoverable error into a failure: used once an operator commits to an operand.
fn required<'a, O>(result: PResult<'a, O>) -> PResult<'a, O> {
    result.map_err(|err| match err {
        nom::Err::Error(e) => nom::Err::Failure(e),
        other => other,
    })
}

fn space(input: &str) -> PResult<'_, &str> {
    take_while(|c: char| c.is_whitespace()).parse(input)
}

fn operator<'a>(symbols: &'static str) -> impl FnMut(&'a str) -> PResult<'a, char> {
    move |input| {
        let (input, _) = space(input)?;
        one_of(symbols).parse(input)
    }
}

/// `12`, `.5`, `1e3`, `2.5E-4`.
fn number(input: &str) -> PResult<'_, Op> {
    let (rest, text) = recognize((
        take_while1(|c: char| c.is_ascii_digit() || c == '.'),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)?;
    match text.parse::<f64>() {
        Ok(value) => Ok((rest, Op::Num(value))),
        Err(_) => Err(SyntaxError::fail(
            input,
            FormulaError::InvalidNumber(String::from(text)),
        )),
    }
}

fn variable(input: &str) -> PResult<'_, Op> {
    let (rest, ident) = recognize((
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)?;
    if ident == "x" {
        Ok((rest, Op::X))
    } else {
        Err(SyntaxError::fail(
            input,
            FormulaError::UnknownVariable(String::from(ident)),
        ))
    }
}

fn expr(input: &str, depth: usize) -> PResult<'_, Vec<Op>> {
    let (mut input, mut ops) = term(input, depth)?;
    while let Ok((rest, symbol)) = operator("+-")(input) {
        let (rest, rhs) = required(term(rest, depth))?;
        ops.extend(rhs);
        ops.push(Op::binary(symbol));
        input = rest;
    }
    Ok((input, ops))
}

fn term(input: &str, depth: usize) -> PResult<'_, Vec<Op>> {
    let (mut input, mut ops) = unary(input, depth)?;
    loop {
        let (rest, rhs, op) = if let Ok((rest, symbol)) = operator("*/%")(input) {
            let (rest, rhs) = required(unary(rest, depth))?;
            (rest, rhs, Op::binary(symbol))
        } else {
            // Implicit multiplication: `2x`, `3(x + 1)`.
            match power(input, depth) {
                Ok((rest, rhs)) => (rest, rhs, Op::Mul),
                Err(nom::Err::Error(_)) => return Ok((input, ops)),
                Err(err) => return Err(err),
            }
        };
        ops.extend(rhs);
        ops.push(op);
        input = rest;
    }
}

fn unary(input: &str, depth: usize) -> PResult<'_, Vec<Op>> {
    if depth > MAX_FORMULA_DEPTH {
        return Err(SyntaxError::fail(
            input,
            FormulaError::TooDeep(MAX_FORMULA_DEPTH),
        ));
    }
    match operator("+-")(input) {
        Ok((rest, sign)) => {
            let (rest, mut ops) = required(unary(rest, depth + 1))?;
            if sign == '-' {
                ops.push(Op::Neg);
            }
            Ok((rest, ops))
        }
        Err(_) => power(input, depth),
    }
}

/// `^` is right-associative and its exponent may carry a sign: `2^-1`.
fn power(input: &str, depth: usize) -> PResult<'_, Vec<Op>> {
    let (input, mut ops) = atom(input, depth)?;
    match operator("^")(input) {
        Ok((rest, _)) => {
            let (rest, exponent) = required(unary(rest, depth + 1))?;
            ops.extend(exponent);
            ops.push(Op::Pow);
            Ok((rest, ops))
        }
        Err(_) => Ok((input, ops)),
    }
}

fn atom(input: &str, depth: usize) -> PResult<'_, Vec<Op>> {
    if let Ok((rest, _)) = operator("(")(input) {
        let (rest, ops) = required(expr(rest, depth + 1))?;
        let (rest, _) = required(operator(")")(rest))?;
        return Ok((rest, ops));
    }
    let (input, _) = space(input)?;
    let (rest, op) = nom::branch::alt((number, variable)).parse(input)?;
    Ok((rest, vec![op]))
}

/// Maps an unexplained failure at `rest` to an error positioned in `body`.
fn locate(body: &str, rest: &str) -> FormulaError {
    let rest = rest.trim_start();
    let pos = body.len() - rest.len();
    match rest.chars().next() {
        None => FormulaError::UnexpectedEnd,
        Some('+' | '-' | '*' | '/' | '%' | '^' | '(' | ')') => FormulaError::UnexpectedToken(pos),
        Some(ch) if ch.is_alphanumeric() || ch == '.' || ch == '_' => {
            FormulaError::UnexpectedToken(pos)
        }
        Some(ch) => FormulaError::UnexpectedChar { ch, pos },
    }
}

/// A parsed formula in `x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    ops: Vec<Op>,
}

impl Formula {
    /// Parses `source`, accepting an optional leading `y =`.
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let trimmed = source.trim();
        let body = strip_assignment(trimmed).unwrap_or(trimmed);
        if body.trim().is_empty() {
            return Err(FormulaError::Empty);
        }
        match expr(body, 0) {
            Ok((rest, ops)) if rest.trim().is_empty() => Ok(Self { ops }),
            Ok((rest, _)) => Err(locate(body, rest)),
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
                Err(e.cause.unwrap_or_else(|| locate(body, e.rest)))
            }
            Err(nom::Err::Incomplete(_)) => Err(FormulaError::UnexpectedEnd),
        }
    }

    /// Evaluates the formula at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let mut stack: Vec<f64> = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let value = match *op {
                Op::Num(v) => v,
                Op::X => x,
                Op::Neg => -stack.pop().unwrap_or(f64::NAN),
                binary => {
                    let r = stack.pop().unwrap_or(f64::NAN);
                    let l = stack.pop().unwrap_or(f64::NAN);
                    binary.apply(l, r)
                }
            };
            stack.push(value);
        }
        stack.pop().unwrap_or(f64::NAN)
    }
}

fn strip_assignment(src: &str) -> Option<&str> {
    let rest = src.strip_prefix(['y', 'Y'])?;
    rest.trim_start().strip_prefix('=')
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::format;

    use super::*;

    fn eval(src: &str, x: f64) -> f64 {
        Formula::parse(src).unwrap().eval(x)
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("-x^2", 3.0), -9.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("7 % 4", 0.0), 3.0);
        assert_eq!(eval("2^-1", 0.0), 0.5);
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(eval("2x", 4.0), 8.0);
        assert_eq!(eval("3(x + 1)", 1.0), 6.0);
        assert_eq!(eval("(x)(x)", 5.0), 25.0);
    }

    #[test]
    fn assignment_prefix_and_exponents() {
        assert_eq!(eval("y = 2x + 1", 1.0), 3.0);
        assert_eq!(eval("Y=x", 1.5), 1.5);
        assert_eq!(eval("1e3 + x", 1.0), 1001.0);
        assert_eq!(eval("2.5E-1", 0.0), 0.25);
    }

    #[test]
    fn errors() {
        assert_eq!(Formula::parse("  "), Err(FormulaError::Empty));
        assert_eq!(
            Formula::parse("2 * t"),
            Err(FormulaError::UnknownVariable("t".into()))
        );
        assert_eq!(Formula::parse("(x + 1"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(Formula::parse("x +"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(Formula::parse("x )"), Err(FormulaError::UnexpectedToken(2)));
        assert_eq!(
            Formula::parse("x # 2"),
            Err(FormulaError::UnexpectedChar { ch: '#', pos: 2 })
        );
        assert_eq!(
            Formula::parse("1.2.3"),
            Err(FormulaError::InvalidNumber("1.2.3".into()))
        );
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let parens = format!("{}x{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(
            Formula::parse(&parens),
            Err(FormulaError::TooDeep(MAX_FORMULA_DEPTH))
        );
        let signs = format!("{}x", "-".repeat(200_000));
        assert_eq!(
            Formula::parse(&signs),
            Err(FormulaError::TooDeep(MAX_FORMULA_DEPTH))
        );
        let powers = format!("x{}", "^x".repeat(200_000));
        assert_eq!(
            Formula::parse(&powers),
            Err(FormulaError::TooDeep(MAX_FORMULA_DEPTH))
        );
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let depth = MAX_FORMULA_DEPTH;
        let parens = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(eval(&parens, 3.0), 3.0);
        let signs = format!("{}x", "-".repeat(depth));
        assert_eq!(eval(&signs, 3.0), 3.0);
    }

    #[test]
    fn long_flat_chains_evaluate() {
        let sum = format!("x{}", " + x".repeat(100_000));
        assert_eq!(eval(&sum, 1.0), 100_001.0);
    }
}
