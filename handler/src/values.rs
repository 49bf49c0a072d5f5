// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Type {
    String,
    Bool,
    Int64,
    Double,
}

/// A single cell of a `Frame` or a single option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Bool(bool),
    Int64(i64),
    Double(f64),
}

impl Type {
    /// Narrowest type every non empty literal of a column fits in. Integers
    /// with leading zeros and doubles outside plain decimal notation are
    /// kept as strings, so ids like `007` or `1e5` survive untouched.
    pub fn infer<'a, I>(literals: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (mut seen, mut int, mut double, mut boolean) = (false, true, true, true);

        for literal in literals {
            let literal = literal.trim();
            if literal.is_empty() {
                continue;
            }

            seen = true;
            int &= is_integer_literal(literal);
            double &= is_decimal_literal(literal);
            boolean &= literal == "true" || literal == "false";
        }

        match (seen, int, double, boolean) {
            (false, ..) => Type::String,
            (_, true, _, _) => Type::Int64,
            (_, _, true, _) => Type::Double,
            (_, _, _, true) => Type::Bool,
            _ => Type::String,
        }
    }
}

fn digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_integer_literal(literal: &str) -> bool {
    let unsigned = literal.strip_prefix('-').unwrap_or(literal);
    digits(unsigned) && (unsigned == "0" || !unsigned.starts_with('0')) && literal.parse::<i64>().is_ok()
}

fn is_decimal_literal(literal: &str) -> bool {
    let unsigned = literal.strip_prefix('-').unwrap_or(literal);
    let mut parts = unsigned.splitn(2, '.');

    match (parts.next(), parts.next()) {
        (Some(int), Some(fract)) => digits(int) && digits(fract),
        (Some(int), None) => digits(int),
        _ => false,
    }
}

impl Value {
    pub fn from_str(value: &str, tp: Type) -> Result<Self, ErrorKind> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::Null);
        }

        let value = match tp {
            Type::String => Self::String(value.to_owned()),
            Type::Bool => {
                let value = match trimmed {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    _ => return Err(ErrorKind::ValueConvert("Invalid literal for bool".into())),
                };

                Self::Bool(value)
            }

            Type::Int64 => {
                let value: i64 = trimmed
                    .parse()
                    .map_err(|e: <i64 as FromStr>::Err| ErrorKind::ValueConvert(e.to_string()))?;
                Self::Int64(value)
            }

            Type::Double => {
                let value: f64 = trimmed
                    .parse()
                    .map_err(|e: <f64 as FromStr>::Err| ErrorKind::ValueConvert(e.to_string()))?;
                Self::Double(value)
            }
        };

        Ok(value)
    }

    /// Type a single literal the way a column holding only it would be
    /// typed. Empty literals are `Null`.
    pub fn infer(value: &str) -> Self {
        Self::from_str(value, Type::infer(std::iter::once(value)))
            .unwrap_or_else(|_| Self::String(value.to_owned()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_string(&self) -> Result<&str, ErrorKind> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(ErrorKind::CastingValue("String")),
        }
    }

    pub fn as_i64(&self) -> Result<i64, ErrorKind> {
        match self {
            Self::Int64(v) => Ok(*v),
            _ => Err(ErrorKind::CastingValue("i64")),
        }
    }

    pub fn as_f64(&self) -> Result<f64, ErrorKind> {
        match self {
            Self::Double(v) => Ok(*v),
            _ => Err(ErrorKind::CastingValue("f64")),
        }
    }

    /// Like `as_f64` but also accepts integers and numeric strings.
    pub fn to_f64(&self) -> Result<f64, ErrorKind> {
        match self {
            Self::Double(v) => Ok(*v),
            Self::Int64(v) => Ok(*v as f64),
            Self::String(s) => s
                .trim()
                .parse()
                .map_err(|_| ErrorKind::CastingValue("f64")),
            _ => Err(ErrorKind::CastingValue("f64")),
        }
    }

    /// Like `as_i64` but also accepts integral doubles and numeric strings.
    pub fn to_i64(&self) -> Result<i64, ErrorKind> {
        match self {
            Self::Int64(v) => Ok(*v),
            Self::Double(v) if v.fract() == 0.0 && v.is_finite() => Ok(*v as i64),
            Self::String(s) => s
                .trim()
                .parse()
                .map_err(|_| ErrorKind::CastingValue("i64")),
            _ => Err(ErrorKind::CastingValue("i64")),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;
    use assert_approx_eq::*;

    #[test]
    fn casting_string() -> Result<(), Error> {
        let value = Value::from_str("quebin31", Type::String)?;
        let value = value.as_string()?;

        assert_eq!(value, "quebin31");

        Ok(())
    }

    #[test]
    fn casting_bool() -> Result<(), Error> {
        assert_eq!(Value::from_str("true", Type::Bool)?, Value::Bool(true));
        assert_eq!(Value::from_str("0", Type::Bool)?, Value::Bool(false));
        assert!(Value::from_str("yes", Type::Bool).is_err());

        Ok(())
    }

    #[test]
    fn casting_i64() -> Result<(), Error> {
        let value = Value::from_str("1234", Type::Int64)?;
        let value = value.as_i64()?;

        assert_eq!(value, 1234);

        Ok(())
    }

    #[test]
    fn casting_f64() -> Result<(), Error> {
        let value = Value::from_str("1234.12", Type::Double)?;
        let value = value.as_f64()?;

        assert_approx_eq!(value, 1234.12);

        Ok(())
    }

    #[test]
    fn infer_literals() {
        assert_eq!(Value::infer("42"), Value::Int64(42));
        assert_eq!(Value::infer(" 4.5 "), Value::Double(4.5));
        assert_eq!(Value::infer("false"), Value::Bool(false));
        assert_eq!(Value::infer("warp"), Value::String("warp".into()));
        assert_eq!(Value::infer("nan"), Value::String("nan".into()));
        assert_eq!(Value::infer("007"), Value::String("007".into()));
        assert_eq!(Value::infer("1e5"), Value::String("1e5".into()));
        assert_eq!(Value::infer("0"), Value::Int64(0));
        assert!(Value::infer("  ").is_null());
    }

    #[test]
    fn infer_column_types() {
        assert_eq!(Type::infer(vec!["1", "-20", "", "3"]), Type::Int64);
        assert_eq!(Type::infer(vec!["1", "2.5", "-0.5"]), Type::Double);
        assert_eq!(Type::infer(vec!["true", " false"]), Type::Bool);

        assert_eq!(Type::infer(vec!["007", "7"]), Type::String);
        assert_eq!(Type::infer(vec!["1e5", "5"]), Type::String);
        assert_eq!(Type::infer(vec!["7", "u9"]), Type::String);
        assert_eq!(Type::infer(vec!["", " "]), Type::String);
    }

    #[test]
    fn empty_literals_are_null() -> Result<(), Error> {
        assert!(Value::from_str("", Type::Int64)?.is_null());
        assert!(Value::from_str(" ", Type::Double)?.is_null());
        assert!(Value::from_str("", Type::String)?.is_null());
        assert_eq!(Value::from_str(" x ", Type::String)?, Value::from(" x "));

        Ok(())
    }

    #[test]
    fn lenient_numeric_conversions() -> Result<(), Error> {
        assert_approx_eq!(Value::Int64(3).to_f64()?, 3.0);
        assert_approx_eq!(Value::from("0.25").to_f64()?, 0.25);
        assert_eq!(Value::Double(7.0).to_i64()?, 7);
        assert_eq!(Value::from("12").to_i64()?, 12);

        assert!(Value::Double(7.5).to_i64().is_err());
        assert!(Value::Bool(true).to_f64().is_err());
        assert!(Value::Int64(1).as_f64().is_err());

        Ok(())
    }
}
