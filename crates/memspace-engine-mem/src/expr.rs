//! Where-clause parsing and evaluation.
//!
//! Supports comparisons of a field with a literal (`=`, `<>`, `!=`, `<`,
//! `<=`, `>`, `>=`), `IS [NOT] NULL`, `[NOT] LIKE` with `%`/`_` wildcards,
//! `[NOT] IN (...)`, `NOT`, parentheses, and `AND`/`OR` with `AND` binding
//! tighter.

use crate::dataset::{Dataset, Value};

use memspace_core::{Error, Result};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare {
        field: usize,
        op: CompareOp,
        value: Value,
    },
    IsNull {
        field: usize,
        negated: bool,
    },
    Like {
        field: usize,
        pattern: String,
        negated: bool,
    },
    InList {
        field: usize,
        values: Vec<Value>,
        negated: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(Value),
    Str(String),
    Op(CompareOp),
    LParen,
    RParen,
    Comma,
}

impl Expr {
    /// Parses `src`, resolving field names against the columns of `dataset`.
    pub(crate) fn parse(src: &str, dataset: &Dataset) -> Result<Expr> {
        let tokens = tokenize(src)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            dataset,
        };

        let expr = parser.or_expr()?;
        if let Some(token) = parser.peek() {
            return Err(Error::engine(format!(
                "unexpected token {:?} in where clause",
                token
            )));
        }
        Ok(expr)
    }

    pub(crate) fn eval(&self, row: &[Value]) -> bool {
        match self {
            Expr::And(lhs, rhs) => lhs.eval(row) && rhs.eval(row),
            Expr::Or(lhs, rhs) => lhs.eval(row) || rhs.eval(row),
            Expr::Not(expr) => !expr.eval(row),
            Expr::Compare { field, op, value } => {
                let Some(ordering) = compare(&row[*field], value) else {
                    return false;
                };
                match op {
                    CompareOp::Eq => ordering == Ordering::Equal,
                    CompareOp::Ne => ordering != Ordering::Equal,
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Le => ordering != Ordering::Greater,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    CompareOp::Ge => ordering != Ordering::Less,
                }
            }
            Expr::IsNull { field, negated } => row[*field].is_null() != *negated,
            Expr::Like {
                field,
                pattern,
                negated,
            } => match &row[*field] {
                Value::Text(text) => like(text, pattern) != *negated,
                _ => false,
            },
            Expr::InList {
                field,
                values,
                negated,
            } => {
                if row[*field].is_null() {
                    return false;
                }
                let found = values
                    .iter()
                    .any(|value| compare(&row[*field], value) == Some(Ordering::Equal));
                found != *negated
            }
        }
    }
}

/// SQL-style comparison; `None` when either side is null or the types do
/// not compare.
pub(crate) fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // matches[j]: pattern[..i] matches text[..j]
    let mut matches = vec![false; text.len() + 1];
    matches[0] = true;

    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut any = false;
                for j in 0..=text.len() {
                    any |= matches[j];
                    next[j] = any;
                }
            }
            _ => {
                for j in 1..=text.len() {
                    next[j] = matches[j - 1] && (*p == '_' || *p == text[j - 1]);
                }
            }
        }
        matches = next;
    }

    matches[text.len()]
}

fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut tokens = vec![];
    let mut chars = src.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Op(CompareOp::Eq));
            }
            '<' | '>' | '!' => {
                chars.next();
                let eq = chars.next_if(|&(_, c)| c == '=').is_some();
                let op = match (c, eq) {
                    ('<', true) => CompareOp::Le,
                    ('>', true) => CompareOp::Ge,
                    ('!', true) => CompareOp::Ne,
                    ('<', false) if chars.next_if(|&(_, c)| c == '>').is_some() => CompareOp::Ne,
                    ('<', false) => CompareOp::Lt,
                    ('>', false) => CompareOp::Gt,
                    _ => {
                        return Err(Error::engine(format!(
                            "unexpected `!` at offset {} in where clause",
                            start
                        )))
                    }
                };
                tokens.push(Token::Op(op));
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        // Doubled quote escapes a quote.
                        Some((_, '\'')) if chars.next_if(|&(_, c)| c == '\'').is_some() => {
                            value.push('\'')
                        }
                        Some((_, '\'')) => break,
                        Some((_, c)) => value.push(c),
                        None => {
                            return Err(Error::engine(format!(
                                "unterminated string starting at offset {} in where clause",
                                start
                            )))
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            '"' => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, c)) => name.push(c),
                        None => {
                            return Err(Error::engine(format!(
                                "unterminated field name starting at offset {} in where clause",
                                start
                            )))
                        }
                    }
                }
                tokens.push(Token::Ident(name));
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    let sign = c == '-' && i == start;
                    if c.is_ascii_digit() || c == '.' || sign {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &src[start..end];
                let number = if let Ok(v) = text.parse::<i64>() {
                    Value::Int(v)
                } else if let Ok(v) = text.parse::<f64>() {
                    Value::Float(v)
                } else {
                    return Err(Error::engine(format!(
                        "invalid number `{}` in where clause",
                        text
                    )));
                };
                tokens.push(Token::Number(number));
            }
            c if is_ident_char(c) => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if is_ident_char(c) || c.is_ascii_digit() || c == '.' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(src[start..end].to_string()));
            }
            c => {
                return Err(Error::engine(format!(
                    "unexpected character `{}` at offset {} in where clause",
                    c, start
                )))
            }
        }
    }

    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    dataset: &'a Dataset,
}

impl Parser<'_> {
    fn or_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.and_expr()?;
        while self.eat_keyword("OR") {
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        while self.eat_keyword("AND") {
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.eat_keyword("NOT") {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }

        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let expr = self.or_expr()?;
            self.expect(Token::RParen)?;
            return Ok(expr);
        }

        self.predicate()
    }

    fn predicate(&mut self) -> Result<Expr> {
        let field = match self.next() {
            Some(Token::Ident(name)) => self.resolve(&name)?,
            other => {
                return Err(Error::engine(format!(
                    "expected a field name in where clause, found {:?}",
                    other
                )))
            }
        };

        if self.eat_keyword("IS") {
            let negated = self.eat_keyword("NOT");
            if !self.eat_keyword("NULL") {
                return Err(Error::engine("expected NULL after IS in where clause"));
            }
            return Ok(Expr::IsNull { field, negated });
        }

        let negated = self.eat_keyword("NOT");

        if self.eat_keyword("LIKE") {
            return match self.next() {
                Some(Token::Str(pattern)) => Ok(Expr::Like {
                    field,
                    pattern,
                    negated,
                }),
                other => Err(Error::engine(format!(
                    "expected a string pattern after LIKE, found {:?}",
                    other
                ))),
            };
        }

        if self.eat_keyword("IN") {
            self.expect(Token::LParen)?;
            let mut values = vec![self.literal()?];
            while self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                values.push(self.literal()?);
            }
            self.expect(Token::RParen)?;
            return Ok(Expr::InList {
                field,
                values,
                negated,
            });
        }

        if negated {
            return Err(Error::engine("expected LIKE or IN after NOT in where clause"));
        }

        let op = match self.next() {
            Some(Token::Op(op)) => op,
            other => {
                return Err(Error::engine(format!(
                    "expected a comparison operator in where clause, found {:?}",
                    other
                )))
            }
        };

        let value = self.literal()?;
        Ok(Expr::Compare { field, op, value })
    }

    fn literal(&mut self) -> Result<Value> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Str(value)) => Ok(Value::Text(value)),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("NULL") => Ok(Value::Null),
            other => Err(Error::engine(format!(
                "expected a literal in where clause, found {:?}",
                other
            ))),
        }
    }

    /// Field names match case-insensitively when there is no exact match.
    fn resolve(&self, name: &str) -> Result<usize> {
        self.dataset
            .column_index(name)
            .or_else(|| {
                self.dataset
                    .columns()
                    .iter()
                    .position(|column| column.name.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| Error::engine(format!("unknown field `{}` in where clause", name)))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            other => Err(Error::engine(format!(
                "expected {:?} in where clause, found {:?}",
                expected, other
            ))),
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }
}
