use crate::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use crate::builtins;
use crate::config::DEFAULT_PRECISION;
use crate::error::{CalcError, ErrorKind};
use crate::value::{is_integral, Number, Output};
use bigdecimal::{BigDecimal, RoundingMode, Signed, ToPrimitive, Zero};
use std::collections::HashMap;

/// Largest operand `^` accepts on either side.
pub const POWER_LIMIT: i64 = 200;

/// Largest operand `!` accepts.
pub const FACTORIAL_LIMIT: i64 = 50;

/// Most digits a result may have before the decimal point.
pub const MAX_INTEGER_DIGITS: i64 = 2000;

/// Results keep at most this many decimal places; smaller magnitudes become zero.
pub const MAX_SCALE: i64 = 4000;

/// Significant digits kept by intermediate products inside `^`.
const POWER_WORKING_DIGITS: u64 = 4 * MAX_INTEGER_DIGITS as u64;

/// Variables assigned so far. Constants live in [`builtins`], not here.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Number>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Number> {
        self.values.get(name)
    }

    pub fn assign(&mut self, name: &str, value: Number) {
        self.values.insert(name.to_string(), value);
    }

}

pub struct Evaluator {
    environment: Environment,
    results: Vec<Output>,
    precision: u64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }

    pub fn with_precision(precision: u64) -> Self {
        Self {
            environment: Environment::new(),
            results: Vec::new(),
            precision: precision.max(1),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Evaluate every statement in order. On error nothing is returned for
    /// the statements that did succeed.
    pub fn evaluate_program(&mut self, program: &Program) -> Result<Vec<Output>, CalcError> {
        self.results.clear();

        for statement in &program.statements {
            match self.execute_statement(statement) {
                Ok(output) => self.results.push(output),
                Err(error) => {
                    self.results.clear();
                    return Err(error);
                }
            }
        }

        Ok(std::mem::take(&mut self.results))
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<Output, CalcError> {
        match stmt {
            Stmt::Assign { name, value, span } => {
                if builtins::is_reserved(name) {
                    return Err(CalcError::new(ErrorKind::Reserved(name.clone()), span.clone())
                        .with_help("Constants and functions cannot be reassigned; pick another name."));
                }

                let number = self.evaluate_expression(value)?;
                tracing::trace!(name = %name, value = %number, line = span.line, "assigned variable");
                self.environment.assign(name, number.clone());

                Ok(Output::Assignment {
                    name: name.clone(),
                    value: number.rounded(self.precision),
                })
            }
            Stmt::Expression { expr, span } => {
                let number = self.evaluate_expression(expr)?;
                tracing::trace!(value = %number, line = span.line, "evaluated expression");
                Ok(Output::Value(number.rounded(self.precision)))
            }
        }
    }

    pub fn evaluate_expression(&self, expr: &Expr) -> Result<Number, CalcError> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Variable { name, span } => builtins::constant(name)
                .or_else(|| self.environment.get(name).cloned())
                .ok_or_else(|| {
                    CalcError::new(ErrorKind::UndefinedVariable(name.clone()), span.clone())
                        .with_help(format!("Assign it first: {} = 1", name))
                }),
            Expr::Binary { .. } => self.evaluate_binary_chain(expr),
            Expr::Unary {
                operator: UnaryOp::Factorial,
                ..
            } => self.evaluate_factorial_chain(expr),
            Expr::Unary {
                operator: UnaryOp::Negate,
                operand,
                ..
            } => Ok(self.evaluate_expression(operand)?.negate()),
            Expr::Call {
                name,
                argument,
                span,
            } => {
                let function = builtins::function(name).ok_or_else(|| {
                    CalcError::new(ErrorKind::UndefinedVariable(name.clone()), span.clone())
                        .with_help(format!(
                            "Available functions: {}",
                            builtins::function_names().join(", ")
                        ))
                })?;
                let argument_val = self.evaluate_expression(argument)?;
                Ok(function(&argument_val))
            }
            Expr::Grouping { expr, .. } => self.evaluate_expression(expr),
        }
    }

    // `1+1+...+1` parses into a left spine as long as the input. Walk it in
    // a loop so only the right operands recurse.
    fn evaluate_binary_chain(&self, expr: &Expr) -> Result<Number, CalcError> {
        let mut pending = Vec::new();
        let mut leftmost = expr;
        while let Expr::Binary {
            left,
            operator,
            right,
            span,
        } = leftmost
        {
            pending.push((*operator, right.as_ref(), span));
            leftmost = left.as_ref();
        }

        let mut value = self.evaluate_expression(leftmost)?;
        for (operator, right, span) in pending.into_iter().rev() {
            let right_val = self.evaluate_expression(right)?;
            value = evaluate_binary_op(operator, value, right_val)
                .map_err(|kind| CalcError::new(kind, span.clone()))?;
        }
        Ok(value)
    }

    fn evaluate_factorial_chain(&self, expr: &Expr) -> Result<Number, CalcError> {
        let mut spans = Vec::new();
        let mut operand = expr;
        while let Expr::Unary {
            operator: UnaryOp::Factorial,
            operand: inner,
            span,
        } = operand
        {
            spans.push(span);
            operand = inner.as_ref();
        }

        let mut value = self.evaluate_expression(operand)?;
        for span in spans.into_iter().rev() {
            value = factorial(&value).map_err(|kind| CalcError::new(kind, span.clone()))?;
        }
        Ok(value)
    }
}

pub fn evaluate_binary_op(
    operator: BinaryOp,
    left: Number,
    right: Number,
) -> Result<Number, ErrorKind> {
    let result = match operator {
        BinaryOp::Add => add(left, right),
        BinaryOp::Subtract => add(left, right.negate()),
        BinaryOp::Multiply => multiply(left, right),
        BinaryOp::Divide => divide(left, right)?,
        BinaryOp::Modulo => modulo(left, right)?,
        BinaryOp::Power => power(left, right)?,
    };
    bounded(result)
}

/// Keep a result inside the decimal context: more than
/// [`MAX_INTEGER_DIGITS`] before the point is an overflow, places past
/// [`MAX_SCALE`] are rounded away, and the whole number is held to
/// `MAX_INTEGER_DIGITS` significant digits.
fn bounded(number: Number) -> Result<Number, ErrorKind> {
    let d = match number {
        Number::Finite(d) => d,
        other => return Ok(other),
    };

    if integer_digits(&d) > MAX_INTEGER_DIGITS {
        return Err(ErrorKind::Overflow);
    }

    let (_, scale) = d.as_bigint_and_exponent();
    let d = if scale > MAX_SCALE {
        d.with_scale_round(MAX_SCALE, RoundingMode::HalfEven)
    } else {
        d
    };

    if d.digits() > MAX_INTEGER_DIGITS as u64 {
        Ok(Number::Finite(d.with_prec(MAX_INTEGER_DIGITS as u64)))
    } else {
        Ok(Number::Finite(d))
    }
}

/// Digits before the decimal point; zero or negative below one.
fn integer_digits(d: &BigDecimal) -> i64 {
    let (_, scale) = d.as_bigint_and_exponent();
    d.digits() as i64 - scale
}

fn add(left: Number, right: Number) -> Number {
    match (left, right) {
        (Number::Finite(l), Number::Finite(r)) => Number::Finite(l + r),
        (Number::NaN, _) | (_, Number::NaN) => Number::NaN,
        (Number::Infinity { negative: l }, Number::Infinity { negative: r }) => {
            if l == r {
                Number::Infinity { negative: l }
            } else {
                Number::NaN
            }
        }
        (inf @ Number::Infinity { .. }, Number::Finite(_))
        | (Number::Finite(_), inf @ Number::Infinity { .. }) => inf,
    }
}

fn multiply(left: Number, right: Number) -> Number {
    match (left, right) {
        (Number::Finite(l), Number::Finite(r)) => Number::Finite(l * r),
        (Number::NaN, _) | (_, Number::NaN) => Number::NaN,
        (Number::Infinity { negative: l }, Number::Infinity { negative: r }) => {
            Number::Infinity { negative: l != r }
        }
        (Number::Infinity { negative }, Number::Finite(d))
        | (Number::Finite(d), Number::Infinity { negative }) => {
            if d.is_zero() {
                Number::NaN
            } else {
                Number::Infinity {
                    negative: negative != d.is_negative(),
                }
            }
        }
    }
}

fn divide(left: Number, right: Number) -> Result<Number, ErrorKind> {
    match (left, right) {
        (Number::Finite(l), Number::Finite(r)) => {
            if r.is_zero() {
                Err(ErrorKind::DivisionByZero)
            } else {
                Ok(Number::Finite(l / r))
            }
        }
        (Number::NaN, _) | (_, Number::NaN) => Ok(Number::NaN),
        (Number::Infinity { .. }, Number::Infinity { .. }) => Ok(Number::NaN),
        (Number::Infinity { negative }, Number::Finite(d)) => Ok(Number::Infinity {
            negative: negative != d.is_negative(),
        }),
        (Number::Finite(_), Number::Infinity { .. }) => Ok(Number::Finite(BigDecimal::zero())),
    }
}

/// Remainder takes the sign of the dividend.
fn modulo(left: Number, right: Number) -> Result<Number, ErrorKind> {
    match (left, right) {
        (Number::Finite(l), Number::Finite(r)) => {
            if r.is_zero() {
                Err(ErrorKind::DivisionByZero)
            } else {
                Ok(Number::Finite(l % r))
            }
        }
        (Number::NaN, _) | (_, Number::NaN) => Ok(Number::NaN),
        (Number::Infinity { .. }, _) => Ok(Number::NaN),
        (finite @ Number::Finite(_), Number::Infinity { .. }) => Ok(finite),
    }
}

/// The limit is a plain `> 200` test on each operand, so a negative base or
/// exponent of any size passes it.
fn power(base: Number, exponent: Number) -> Result<Number, ErrorKind> {
    if base.exceeds(POWER_LIMIT) || exponent.exceeds(POWER_LIMIT) {
        return Err(ErrorKind::Overflow);
    }

    if let (Number::Finite(b), Number::Finite(e)) = (&base, &exponent) {
        if is_integral(e) {
            if let Some(n) = e.to_i64().filter(|n| (-POWER_LIMIT..=POWER_LIMIT).contains(n)) {
                return integer_power(b, n);
            }
        }
    }

    Ok(Number::from_f64(base.to_f64().powf(exponent.to_f64())))
}

fn integer_power(base: &BigDecimal, exponent: i64) -> Result<Number, ErrorKind> {
    // |base| >= 10^(k - 1) for k integer digits, so |base^n| >= 10^magnitude.
    let magnitude = (integer_digits(base) - 1).max(0) * exponent.abs();

    if exponent >= 0 {
        if magnitude >= MAX_INTEGER_DIGITS {
            return Err(ErrorKind::Overflow);
        }
        return Ok(Number::Finite(pow_unsigned(base, exponent.unsigned_abs())));
    }

    if base.is_zero() {
        return Err(ErrorKind::DivisionByZero);
    }
    if magnitude > MAX_SCALE {
        return Ok(Number::Finite(BigDecimal::zero()));
    }
    let denominator = pow_unsigned(base, exponent.unsigned_abs());
    Ok(Number::Finite(BigDecimal::from(1) / denominator))
}

fn pow_unsigned(base: &BigDecimal, exponent: u64) -> BigDecimal {
    let mut result = BigDecimal::from(1);
    let mut b = base.clone();
    let mut e = exponent;
    // Exponentiation by squaring
    while e > 0 {
        if e & 1 == 1 {
            result = working_digits(&result * &b);
        }
        e >>= 1;
        if e > 0 {
            b = working_digits(&b * &b);
        }
    }
    result
}

// Integer powers that pass the magnitude check never reach this many digits,
// so only long fractions get rounded.
fn working_digits(d: BigDecimal) -> BigDecimal {
    if d.digits() > POWER_WORKING_DIGITS {
        d.with_prec(POWER_WORKING_DIGITS)
    } else {
        d
    }
}

/// `Γ(x + 1)`: exact for non-negative integers, `NaN` at the poles, and a
/// float approximation everywhere else.
pub fn factorial(operand: &Number) -> Result<Number, ErrorKind> {
    if operand.exceeds(FACTORIAL_LIMIT) {
        return Err(ErrorKind::Overflow);
    }

    match operand {
        Number::Finite(d) if is_integral(d) => {
            if d.is_negative() {
                return Ok(Number::NaN);
            }
            let n = d.to_u64().unwrap_or(0);
            Ok(Number::Finite(builtins::integer_factorial(n)))
        }
        Number::Finite(_) => Ok(Number::from_f64(builtins::gamma(operand.to_f64() + 1.0))),
        Number::Infinity { .. } | Number::NaN => Ok(Number::NaN),
    }
}
