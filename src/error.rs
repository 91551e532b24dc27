use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};

/// Character range in the program text plus the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    pub fn single(pos: usize, line: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
            line,
        }
    }

    /// Span covering `self` through `other`, keeping the starting line.
    pub fn to(&self, other: &Span) -> Self {
        Self::new(self.start, other.end.max(self.end), self.line)
    }
}

/// What went wrong. The payload is the offending text where there is one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Illegal character, unexpected token, or `EOF` when input ended early.
    #[error("unexpected '{}'", .0.escape_debug())]
    Parsing(String),

    /// Assignment to a constant or function name.
    #[error("'{0}' is reserved and cannot be assigned")]
    Reserved(String),

    /// Operand of `^` above 200 or operand of `!` above 50.
    #[error("number too large to compute")]
    Overflow,

    /// Unknown variable, or unknown function in a call.
    #[error("'{0}' is not defined")]
    UndefinedVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("input is longer than {0} characters")]
    TooLong(usize),

    #[error("expression is nested deeper than {0} levels")]
    TooDeep(usize),
}

impl ErrorKind {
    fn title(&self) -> &'static str {
        match self {
            ErrorKind::Parsing(_) | ErrorKind::TooLong(_) | ErrorKind::TooDeep(_) => "Syntax Error",
            ErrorKind::Reserved(_) | ErrorKind::UndefinedVariable(_) => "Name Error",
            ErrorKind::Overflow | ErrorKind::DivisionByZero => "Math Error",
        }
    }

    fn color(&self) -> Color {
        match self {
            ErrorKind::Parsing(_) | ErrorKind::TooLong(_) | ErrorKind::TooDeep(_) => Color::Yellow,
            ErrorKind::Reserved(_) | ErrorKind::UndefinedVariable(_) => Color::Red,
            ErrorKind::Overflow | ErrorKind::DivisionByZero => Color::Magenta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct CalcError {
    pub kind: ErrorKind,
    pub span: Span,
    pub help: Option<String>,
}

impl CalcError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn parsing(text: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Parsing(text.into()), span)
    }

    /// Input ended while more was expected.
    pub fn eof(span: Span) -> Self {
        Self::parsing("EOF", span)
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    /// Short message meant for the person who typed the program.
    pub fn user_message(&self) -> String {
        match &self.kind {
            ErrorKind::Parsing(text) if text == "EOF" => {
                format!("The expression ended too early (line {}).", self.line())
            }
            ErrorKind::Parsing(text) => {
                format!(
                    "I could not understand '{}' on line {}.",
                    text.escape_debug(),
                    self.line()
                )
            }
            ErrorKind::Reserved(name) => {
                format!("'{}' is a built-in name and cannot be assigned.", name)
            }
            ErrorKind::Overflow => {
                "That number is too big: exponents and powers above 200 and factorials above 50 are refused.".to_string()
            }
            ErrorKind::UndefinedVariable(name) => {
                format!("'{}' is not a known variable or function.", name)
            }
            ErrorKind::DivisionByZero => "Cannot divide by zero.".to_string(),
            ErrorKind::TooLong(limit) => {
                format!("The input is too long (limit is {} characters).", limit)
            }
            ErrorKind::TooDeep(limit) => {
                format!("The expression is nested too deeply (limit is {} levels).", limit)
            }
        }
    }

    /// Print an annotated diagnostic for this error to stderr.
    pub fn report(&self, source: &str, filename: Option<&str>) -> std::io::Result<()> {
        let filename = filename.unwrap_or("<input>");
        let color = self.kind.color();
        let message = self.kind.to_string();

        let len = source.chars().count();
        let start = self.span.start.min(len);
        let end = self.span.end.min(len).max(start);

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", self.kind.title().fg(color), message))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder = report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .eprint((filename, Source::from(source)))
    }
}
