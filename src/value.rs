use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use std::fmt;
use std::str::FromStr;

/// A calculator number: an exact decimal, or one of the two non-finite
/// values that the `inf` and `nan` constants name.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Finite(BigDecimal),
    Infinity { negative: bool },
    NaN,
}

impl Number {
    pub const INFINITY: Number = Number::Infinity { negative: false };
    pub const NEG_INFINITY: Number = Number::Infinity { negative: true };

    pub fn is_nan(&self) -> bool {
        matches!(self, Number::NaN)
    }

    /// Finite with no fractional part.
    pub fn is_integer(&self) -> bool {
        match self {
            Number::Finite(d) => is_integral(d),
            _ => false,
        }
    }

    /// Plain `>` against `limit`; `+inf` exceeds everything, `NaN` nothing.
    pub fn exceeds(&self, limit: i64) -> bool {
        match self {
            Number::Finite(d) => *d > BigDecimal::from(limit),
            Number::Infinity { negative } => !negative,
            Number::NaN => false,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Finite(d) => d.to_f64().unwrap_or(f64::NAN),
            Number::Infinity { negative: false } => f64::INFINITY,
            Number::Infinity { negative: true } => f64::NEG_INFINITY,
            Number::NaN => f64::NAN,
        }
    }

    /// Decimal from a float through its shortest round-trip text, so
    /// `0.1_f64` becomes `0.1` and not the binary expansion.
    pub fn from_f64(value: f64) -> Number {
        if value.is_nan() {
            Number::NaN
        } else if value.is_infinite() {
            Number::Infinity {
                negative: value < 0.0,
            }
        } else {
            BigDecimal::from_str(&value.to_string())
                .map(Number::Finite)
                .unwrap_or(Number::NaN)
        }
    }

    pub fn negate(&self) -> Number {
        match self {
            Number::Finite(d) => Number::Finite(-d.clone()),
            Number::Infinity { negative } => Number::Infinity {
                negative: !negative,
            },
            Number::NaN => Number::NaN,
        }
    }

    /// Presentation form: integers stay exact, anything with a fractional
    /// part is rounded to `precision` significant digits.
    pub fn rounded(&self, precision: u64) -> Number {
        match self {
            Number::Finite(d) if is_integral(d) => Number::Finite(d.normalized()),
            Number::Finite(d) => Number::Finite(d.with_prec(precision).normalized()),
            other => other.clone(),
        }
    }
}

pub(crate) fn is_integral(d: &BigDecimal) -> bool {
    d.with_scale_round(0, RoundingMode::Down) == *d
}

impl From<BigDecimal> for Number {
    fn from(value: BigDecimal) -> Self {
        Number::Finite(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Finite(BigDecimal::from(value))
    }
}

impl FromStr for Number {
    type Err = bigdecimal::ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigDecimal::from_str(s).map(Number::Finite)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Finite(d) => {
                let d = d.normalized();
                // Trailing zeros stripped by normalizing leave a negative
                // scale; print those as plain integers.
                let (_, scale) = d.as_bigint_and_exponent();
                if scale < 0 {
                    write!(f, "{}", d.with_scale(0))
                } else {
                    write!(f, "{}", d)
                }
            }
            Number::Infinity { negative: false } => write!(f, "Infinity"),
            Number::Infinity { negative: true } => write!(f, "-Infinity"),
            Number::NaN => write!(f, "NaN"),
        }
    }
}

/// Result of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// `name = expression`; displays as `"<name> = <value>"`.
    Assignment { name: String, value: Number },
    /// A bare expression.
    Value(Number),
}

impl Output {
    pub fn value(&self) -> &Number {
        match self {
            Output::Assignment { value, .. } => value,
            Output::Value(value) => value,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Output::Assignment { name, value } => write!(f, "{} = {}", name, value),
            Output::Value(value) => write!(f, "{}", value),
        }
    }
}
