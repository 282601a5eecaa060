//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Metrix.
//! The Metrix project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Metrix Formula Module
//!
//! Restricted arithmetic used by the `calculate` operator.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | COLUMN | '(' expr ')'
//! ```
//!
//! A formula is parsed once per step. Bare identifiers are column
//! references, bound per row. Nothing else is accepted: no function calls,
//! attribute access, strings or other operators.
//!
//! Column values are read as floats. Integer literals stay integers, so a
//! formula made only of integer literals may yield an integer; `/` always
//! yields a float. Float results are rounded to four decimals.
//!
//! Parentheses and unary signs may nest at most [`MAX_NESTING`] deep, and a
//! formula holds at most [`MAX_TOKENS`] tokens.

use std::fmt;

use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::table::MxRow;
use crate::value::{coerce_number, float_value};

const ROUND_FACTOR: f64 = 10_000.0;

/// Number produced while evaluating a formula.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MxNumber {
    Int(i64),
    Float(f64),
}

impl MxNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            MxNumber::Int(i) => i as f64,
            MxNumber::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            MxNumber::Int(i) => i == 0,
            MxNumber::Float(f) => f == 0.0,
        }
    }

    /// Converts the result into a cell, rounding floats to four decimals.
    pub fn into_value(self) -> Value {
        match self {
            MxNumber::Int(i) => Value::from(i),
            MxNumber::Float(f) => float_value(round4(f)),
        }
    }
}

fn round4(value: f64) -> f64 {
    let scaled = value * ROUND_FACTOR;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / ROUND_FACTOR
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        f.write_str(symbol)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Number(MxNumber),
    Column(String),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(MxNumber),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            c if c.is_whitespace() => pos += 1,
            '+' => {
                tokens.push(Token::Op(BinaryOp::Add));
                pos += 1;
            }
            '-' => {
                tokens.push(Token::Op(BinaryOp::Sub));
                pos += 1;
            }
            '*' => {
                tokens.push(Token::Op(BinaryOp::Mul));
                pos += 1;
            }
            '/' => {
                tokens.push(Token::Op(BinaryOp::Div));
                pos += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let literal: String = chars[start..pos].iter().collect();
                tokens.push(Token::Number(parse_literal(&literal)?));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                tokens.push(Token::Ident(chars[start..pos].iter().collect()));
            }
            other => {
                return Err(MxError::config(format!(
                    "Invalid formula: unexpected character '{other}' at position {pos}"
                )))
            }
        }
    }

    Ok(tokens)
}

fn parse_literal(literal: &str) -> Result<MxNumber> {
    if !literal.contains('.') {
        if let Ok(i) = literal.parse::<i64>() {
            return Ok(MxNumber::Int(i));
        }
    }
    literal
        .parse::<f64>()
        .map(MxNumber::Float)
        .map_err(|_| MxError::config(format!("Invalid formula: bad number '{literal}'")))
}

/// Deepest allowed nesting of parentheses and unary signs.
pub const MAX_NESTING: usize = 128;

/// Longest allowed formula, in tokens.
pub const MAX_TOKENS: usize = 1024;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(MxError::config("Invalid formula: nesting too deep"));
        }
        self.depth += 1;
        let out = parse(self);
        self.depth -= 1;
        out
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut left = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut left = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Op(BinaryOp::Sub)) => {
                self.pos += 1;
                let inner = self.nested(Self::unary)?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Op(BinaryOp::Add)) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Ident(name)) => Ok(Expr::Column(name)),
            Some(Token::LParen) => {
                let inner = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(MxError::config("Invalid formula: missing closing parenthesis")),
                }
            }
            Some(other) => Err(MxError::config(format!(
                "Invalid formula: unexpected token {other:?}"
            ))),
            None => Err(MxError::config("Invalid formula: unexpected end of input")),
        }
    }
}

/// A parsed arithmetic formula over row columns.
#[derive(Clone, Debug, PartialEq)]
pub struct MxFormula {
    source: String,
    root: Expr,
}

impl MxFormula {
    /// Parses a formula. Syntax errors are configuration errors.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(MxError::config("Invalid formula: empty expression"));
        }
        if tokens.len() > MAX_TOKENS {
            return Err(MxError::config(format!(
                "Invalid formula: longer than {MAX_TOKENS} tokens"
            )));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(MxError::config(format!(
                "Invalid formula: unexpected token {token:?}"
            )));
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Column names referenced by the formula, in first-use order.
    pub fn columns(&self) -> Vec<&str> {
        fn walk<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
            match expr {
                Expr::Number(_) => {}
                Expr::Column(name) => {
                    if !out.contains(&name.as_str()) {
                        out.push(name);
                    }
                }
                Expr::Neg(inner) => walk(inner, out),
                Expr::Binary(_, left, right) => {
                    walk(left, out);
                    walk(right, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Evaluates the formula, resolving columns through `lookup`.
    pub fn evaluate<F>(&self, lookup: F) -> Result<MxNumber>
    where
        F: Fn(&str) -> Result<f64>,
    {
        eval(&self.root, &lookup)
    }

    /// Evaluates the formula against a row and returns the output cell.
    ///
    /// Missing and null columns read as `0`.
    pub fn evaluate_row(&self, row: &MxRow) -> Result<Value> {
        self.evaluate(|name| coerce_number(row.get(name)))
            .map(MxNumber::into_value)
    }
}

fn eval<F>(expr: &Expr, lookup: &F) -> Result<MxNumber>
where
    F: Fn(&str) -> Result<f64>,
{
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Column(name) => lookup(name).map(MxNumber::Float),
        Expr::Neg(inner) => Ok(match eval(inner, lookup)? {
            MxNumber::Int(i) => i
                .checked_neg()
                .map(MxNumber::Int)
                .unwrap_or(MxNumber::Float(-(i as f64))),
            MxNumber::Float(f) => MxNumber::Float(-f),
        }),
        Expr::Binary(op, left, right) => {
            let left = eval(left, lookup)?;
            let right = eval(right, lookup)?;
            apply_binary(*op, left, right)
        }
    }
}

fn apply_binary(op: BinaryOp, left: MxNumber, right: MxNumber) -> Result<MxNumber> {
    if op == BinaryOp::Div {
        if right.is_zero() {
            return Err(MxError::evaluation("division by zero"));
        }
        return Ok(MxNumber::Float(left.as_f64() / right.as_f64()));
    }

    if let (MxNumber::Int(a), MxNumber::Int(b)) = (left, right) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => None,
        };
        if let Some(result) = exact {
            return Ok(MxNumber::Int(result));
        }
    }

    let (a, b) = (left.as_f64(), right.as_f64());
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
    };
    if !result.is_finite() {
        return Err(MxError::evaluation(format!("result of '{op}' is not finite")));
    }
    Ok(MxNumber::Float(result))
}
