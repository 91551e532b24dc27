use crate::config::Limits;
use crate::error::{CalcError, ErrorKind, Span};
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{Number, Output};

/// One evaluation request: lexer, parser and evaluator with a private set of
/// variables. Build a new one per request; nothing is shared between
/// instances except the read-only constant and function tables.
pub struct Calculator {
    limits: Limits,
    evaluator: Evaluator,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            evaluator: Evaluator::with_precision(limits.precision),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Number> {
        self.evaluator.environment().get(name)
    }

    /// Run every statement of `program` and return one output per statement.
    /// Variables assigned here stay visible to later calls on this instance.
    pub fn parse(&mut self, program: &str) -> Result<Vec<Output>, CalcError> {
        self.run(program).inspect_err(|error| {
            tracing::debug!(error = %error, line = error.line(), "evaluation failed");
        })
    }

    fn run(&mut self, program: &str) -> Result<Vec<Output>, CalcError> {
        self.check_length(program)?;

        let tokens = Lexer::new(program).scan_tokens()?;
        let ast = Parser::with_max_depth(tokens, self.limits.max_depth).parse()?;

        tracing::debug!(statements = ast.statements.len(), "evaluating program");
        self.evaluator.evaluate_program(&ast)
    }

    fn check_length(&self, program: &str) -> Result<(), CalcError> {
        let max = self.limits.max_input_len;
        let length = program.chars().count();
        if length <= max {
            return Ok(());
        }

        let line = 1 + program
            .chars()
            .take(max)
            .filter(|c| matches!(c, '\n' | ';'))
            .count();
        Err(CalcError::new(ErrorKind::TooLong(max), Span::new(max, length, line))
            .with_help("Split the calculation into several smaller ones."))
    }
}

/// Evaluate `program` with a fresh [`Calculator`] and default limits.
pub fn evaluate(program: &str) -> Result<Vec<Output>, CalcError> {
    Calculator::new().parse(program)
}
