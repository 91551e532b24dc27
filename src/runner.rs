use crate::calculator::Calculator;
use crate::config::Limits;
use crate::error::CalcError;

/// Evaluate `source` as one request and format each result as a line.
pub fn evaluate_to_lines(source: &str, limits: Limits) -> Result<Vec<String>, CalcError> {
    let outputs = Calculator::with_limits(limits).parse(source)?;
    Ok(outputs.iter().map(ToString::to_string).collect())
}

/// Evaluate `source`, print its results, or print a diagnostic on failure.
pub fn run(source: &str, filename: Option<&str>, limits: Limits) -> Result<(), CalcError> {
    match evaluate_to_lines(source, limits) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            Ok(())
        }
        Err(error) => {
            if let Err(io_error) = error.report(source, filename) {
                tracing::warn!(error = %io_error, "could not render diagnostic");
                eprintln!("{}", error.user_message());
            }
            Err(error)
        }
    }
}
