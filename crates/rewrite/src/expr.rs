//! Restricted expression evaluator for forward replacement pairs
//!
//! Replacement expressions come from the configuration store, which may be
//! shared and less trusted than the machine running the shim, so this is
//! deliberately NOT a general evaluator: integer and string literals, the
//! operators `+ - * / %`, unary minus, and parentheses. No identifiers,
//! no indexing, no calls.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to evaluate `{expr}`: {reason}")]
pub struct EvalError {
    pub expr: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Evaluate one replacement expression to its final value.
pub fn evaluate(expr: &str) -> Result<Value, EvalError> {
    let mut parser = Parser::new(expr);
    let result = (|| {
        let value = parser.expression()?;
        parser.skip_whitespace();
        if parser.pos < parser.chars.len() {
            return Err(format!(
                "unexpected trailing input at offset {}",
                parser.pos
            ));
        }
        Ok(value)
    })();

    result.map_err(|reason| EvalError {
        expr: expr.to_string(),
        reason,
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn expression(&mut self) -> Result<Value, String> {
        let mut left = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    let right = self.term()?;
                    left = add(left, right)?;
                }
                Some('-') => {
                    self.pos += 1;
                    let right = self.term()?;
                    left = arith(left, right, "-", i64::checked_sub)?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn term(&mut self) -> Result<Value, String> {
        let mut left = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    let right = self.factor()?;
                    left = arith(left, right, "*", i64::checked_mul)?;
                }
                Some('/') => {
                    self.pos += 1;
                    let right = self.factor()?;
                    left = divide(left, right, false)?;
                }
                Some('%') => {
                    self.pos += 1;
                    let right = self.factor()?;
                    left = divide(left, right, true)?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn factor(&mut self) -> Result<Value, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expression()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err("missing closing parenthesis".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some('-') => {
                self.pos += 1;
                match self.factor()? {
                    Value::Int(n) => n
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| "integer overflow".to_string()),
                    Value::Str(_) => Err("cannot negate a string".to_string()),
                }
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let mut out = String::new();
                loop {
                    match self.peek() {
                        Some(c) if c == quote => {
                            self.pos += 1;
                            return Ok(Value::Str(out));
                        }
                        Some(c) => {
                            out.push(c);
                            self.pos += 1;
                        }
                        None => return Err("unterminated string literal".to_string()),
                    }
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                digits
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| format!("integer literal `{digits}` out of range"))
            }
            Some(c) => Err(format!("unexpected character `{c}` at offset {}", self.pos)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }
}

fn add(left: Value, right: Value) -> Result<Value, String> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(b)
            .map(Value::Int)
            .ok_or_else(|| "integer overflow".to_string()),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        _ => Err("cannot mix strings and integers in `+`".to_string()),
    }
}

fn arith(
    left: Value,
    right: Value,
    op: &str,
    apply: fn(i64, i64) -> Option<i64>,
) -> Result<Value, String> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => apply(a, b)
            .map(Value::Int)
            .ok_or_else(|| "integer overflow".to_string()),
        _ => Err(format!("`{op}` requires integer operands")),
    }
}

fn divide(left: Value, right: Value, modulo: bool) -> Result<Value, String> {
    match (left, right) {
        (Value::Int(_), Value::Int(0)) => Err("division by zero".to_string()),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(if modulo { a % b } else { a / b })),
        _ => {
            let op = if modulo { "%" } else { "/" };
            Err(format!("`{op}` requires integer operands"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(evaluate("22*100+22").unwrap(), Value::Int(2222));
        assert_eq!(evaluate("(1 + 2) * 3").unwrap(), Value::Int(9));
        assert_eq!(evaluate("10 / 3").unwrap(), Value::Int(3));
        assert_eq!(evaluate("10 % 3").unwrap(), Value::Int(1));
        assert_eq!(evaluate("-4 + 1").unwrap(), Value::Int(-3));
    }

    #[test]
    fn test_string_literals_and_concat() {
        assert_eq!(
            evaluate("'remote-'+\"host\"").unwrap(),
            Value::Str("remote-host".to_string())
        );
        assert_eq!(evaluate("  '22'  ").unwrap(), Value::Str("22".to_string()));
    }

    #[test]
    fn test_rendering() {
        assert_eq!(evaluate("2200+22").unwrap().to_string(), "2222");
        assert_eq!(evaluate("'abc'").unwrap().to_string(), "abc");
    }

    #[test]
    fn test_malformed_expressions_fail() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("(1").is_err());
        assert!(evaluate("'open").is_err());
        assert!(evaluate("1 2").is_err());
    }

    #[test]
    fn test_identifiers_are_rejected() {
        // No name lookups: this is where the original's eval() would have
        // executed arbitrary configuration content.
        assert!(evaluate("os").is_err());
        assert!(evaluate("__import__('os')").is_err());
        assert!(evaluate("port + 1").is_err());
    }

    #[test]
    fn test_type_mixing_is_rejected() {
        assert!(evaluate("'a' + 1").is_err());
        assert!(evaluate("'a' * 2").is_err());
        assert!(evaluate("-'a'").is_err());
    }

    #[test]
    fn test_division_by_zero_fails() {
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("1 % 0").is_err());
    }
}
