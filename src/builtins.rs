//! Named constants and functions.
//!
//! Both tables are built once per process and never change. Their names are
//! reserved: a program may read them but never assign to them.

use crate::value::Number;
use bigdecimal::{BigDecimal, RoundingMode, Signed};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::LazyLock;

/// A built-in function of one argument.
pub type Function = fn(&Number) -> Number;

const PI_DIGITS: &str = "3.14159265358979323846264338327950288419716939937510582097494";
const E_DIGITS: &str = "2.71828182845904523536028747135266249775724709369995957496697";
const TAU_DIGITS: &str = "6.28318530717958647692528676655900576839433879875021164194989";

static CONSTANTS: LazyLock<HashMap<&'static str, Number>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert("pi", decimal(PI_DIGITS));
    map.insert("π", decimal(PI_DIGITS));
    map.insert("e", decimal(E_DIGITS));
    map.insert("tau", decimal(TAU_DIGITS));
    map.insert("τ", decimal(TAU_DIGITS));
    map.insert("inf", Number::INFINITY);
    map.insert("∞", Number::INFINITY);
    map.insert("nan", Number::NaN);
    map.insert("NaN", Number::NaN);

    map
});

static FUNCTIONS: LazyLock<HashMap<&'static str, Function>> = LazyLock::new(|| {
    let mut map: HashMap<&'static str, Function> = HashMap::new();

    map.insert("round", round);
    map.insert("sin", |x| float_function(x, f64::sin));
    map.insert("cos", |x| float_function(x, f64::cos));
    map.insert("tan", |x| float_function(x, f64::tan));
    map.insert("sqrt", sqrt);
    map.insert("abs", abs);

    map
});

fn decimal(digits: &str) -> Number {
    digits.parse().unwrap_or(Number::NaN)
}

pub fn constant(name: &str) -> Option<Number> {
    CONSTANTS.get(name).cloned()
}

pub fn function(name: &str) -> Option<Function> {
    FUNCTIONS.get(name).copied()
}

/// Names owned by the constant or function table.
pub fn is_reserved(name: &str) -> bool {
    CONSTANTS.contains_key(name) || FUNCTIONS.contains_key(name)
}

pub fn constant_names() -> Vec<&'static str> {
    let mut names: Vec<_> = CONSTANTS.keys().copied().collect();
    names.sort_unstable();
    names
}

pub fn function_names() -> Vec<&'static str> {
    let mut names: Vec<_> = FUNCTIONS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Nearest integer, ties to even.
fn round(x: &Number) -> Number {
    match x {
        Number::Finite(d) => Number::Finite(d.with_scale_round(0, RoundingMode::HalfEven)),
        other => other.clone(),
    }
}

fn abs(x: &Number) -> Number {
    match x {
        Number::Finite(d) => Number::Finite(d.abs()),
        Number::Infinity { .. } => Number::INFINITY,
        Number::NaN => Number::NaN,
    }
}

fn sqrt(x: &Number) -> Number {
    match x {
        Number::Finite(d) if d.is_negative() => Number::NaN,
        Number::Finite(d) => d.sqrt().map(Number::Finite).unwrap_or(Number::NaN),
        Number::Infinity { negative: false } => Number::INFINITY,
        _ => Number::NaN,
    }
}

/// Computed in `f64` and converted back; exact decimals are not kept here.
fn float_function(x: &Number, f: fn(f64) -> f64) -> Number {
    Number::from_f64(f(x.to_f64()))
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.99999999999980993,
    676.5203681218851,
    -1259.1392167224028,
    771.32342877765313,
    -176.61502916214059,
    12.507343278686905,
    -0.13857109526572012,
    9.9843695780195716e-6,
    1.5056327351493116e-7,
];

/// Gamma function (Lanczos approximation, reflection below 0.5).
pub fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }

    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + i as f64));

    (2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * series
}

/// Exact `BigDecimal` for small integers, used by factorial.
pub(crate) fn integer_factorial(n: u64) -> BigDecimal {
    (2..=n).fold(BigDecimal::from(1), |acc, k| acc * BigDecimal::from(k))
}
