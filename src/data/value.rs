use crate::schema::QName;
use serde::Serialize;
use std::fmt;

/// Fixed-point decimal: `unscaled * 10^-fraction_digits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Decimal64 {
    pub unscaled: i64,
    pub fraction_digits: u8,
}

impl Decimal64 {
    /// Parses `-12.50` style input. More fraction digits than allowed is a miss.
    pub fn parse(input: &str, fraction_digits: u8) -> Option<Self> {
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
            || frac_part.len() > fraction_digits as usize
        {
            return None;
        }
        let scale = 10i64.checked_pow(fraction_digits as u32)?;
        let int_value: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let mut frac_value: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().ok()?
        };
        for _ in frac_part.len()..fraction_digits as usize {
            frac_value = frac_value.checked_mul(10)?;
        }
        let magnitude = int_value.checked_mul(scale)?.checked_add(frac_value)?;
        Some(Self {
            unscaled: if negative { -magnitude } else { magnitude },
            fraction_digits,
        })
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction_digits == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let scale = 10u64.pow(self.fraction_digits as u32);
        let magnitude = self.unscaled.unsigned_abs();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / scale,
            magnitude % scale,
            width = self.fraction_digits as usize
        )
    }
}

/// A decoded, schema-typed scalar.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Value {
    String(String),
    Boolean(bool),
    Int(i64),
    Uint(u64),
    Decimal(Decimal64),
    Enum(String),
    Identity(QName),
    Empty,
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Enum(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Identity(qname) => write!(f, "{qname}"),
            Value::Empty => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}
