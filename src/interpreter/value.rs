use std::fmt;

use serde::Serialize;

use crate::ast::Number;

/// A run-time number. Integer arithmetic stays integral; any real operand
/// promotes the result to real.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Real(f64),
}

impl Value {
    pub fn as_real(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Real(r) => r,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Self::Integer(i) => i == 0,
            Self::Real(r) => r == 0.0,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(i) => Self::Integer(i),
            Number::Real(r) => Self::Real(r),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            // Debug formatting keeps the decimal point on whole reals (15.0).
            Self::Real(r) => write!(f, "{r:?}"),
        }
    }
}
