use crate::error::{CalcError, Span};
use bigdecimal::BigDecimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Caret,
    Equal,
    LeftParen,
    RightParen,

    // Literals
    Number,
    Name,

    // A run of '\n' and ';' collapsed into one statement separator
    Newline,

    // Special
    Eof,
}

/// Constant glyphs that lex as one-character names.
const NAME_GLYPHS: [char; 3] = ['π', 'τ', '∞'];

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    /// Exact decimal value of a `Number` token.
    pub fn decimal(&self) -> Option<BigDecimal> {
        match self.token_type {
            TokenType::Number => BigDecimal::from_str(&self.lexeme).ok(),
            _ => None,
        }
    }

    /// How many separators a `Newline` token swallowed.
    pub fn separator_count(&self) -> usize {
        match self.token_type {
            TokenType::Newline => self.lexeme.chars().count(),
            _ => 0,
        }
    }

    /// Text used when this token shows up where it should not. A separator
    /// run reports its first character.
    pub fn describe(&self) -> &str {
        match self.token_type {
            TokenType::Eof => "EOF",
            TokenType::Newline => self.lexeme.get(..1).unwrap_or(";"),
            _ => &self.lexeme,
        }
    }
}

/// Single-pass tokenizer. Iterating yields tokens up to and including `Eof`,
/// or stops after the first error.
pub struct Lexer {
    source: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            finished: false,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, CalcError> {
        let tokens = self.by_ref().collect::<Result<Vec<_>, _>>()?;
        tracing::trace!(count = tokens.len(), lines = self.line, "scanned tokens");
        Ok(tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Scan one lexeme starting at `self.start`. Whitespace yields `None`.
    fn scan_token(&mut self) -> Result<Option<Token>, CalcError> {
        let c = self.advance();

        let token = match c {
            '+' => self.make_token(TokenType::Plus),
            '-' => self.make_token(TokenType::Minus),
            '*' => self.make_token(TokenType::Star),
            '/' => self.make_token(TokenType::Slash),
            '%' => self.make_token(TokenType::Percent),
            '!' => self.make_token(TokenType::Bang),
            '^' => self.make_token(TokenType::Caret),
            '=' => self.make_token(TokenType::Equal),
            '(' => self.make_token(TokenType::LeftParen),
            ')' => self.make_token(TokenType::RightParen),
            ' ' | '\t' | '\r' => return Ok(None),
            '\n' | ';' => self.newline(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.name(),
            c if NAME_GLYPHS.contains(&c) => self.make_token(TokenType::Name),
            _ => {
                return Err(CalcError::parsing(
                    c.to_string(),
                    Span::single(self.start, self.line),
                ));
            }
        };

        Ok(Some(token))
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        c
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn newline(&mut self) -> Token {
        while matches!(self.peek(), '\n' | ';') {
            self.advance();
        }

        // The separator belongs to the line it ends; later tokens start after it.
        let token = self.make_token(TokenType::Newline);
        self.line += token.separator_count();
        token
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            // Consume the "."
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.make_token(TokenType::Number)
    }

    fn name(&mut self) -> Token {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        self.make_token(TokenType::Name)
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        Token::new(
            token_type,
            lexeme,
            Span::new(self.start, self.current, self.line),
        )
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.is_at_end() {
                self.finished = true;
                return Some(Ok(Token::new(
                    TokenType::Eof,
                    String::new(),
                    Span::single(self.current, self.line),
                )));
            }

            self.start = self.current;
            match self.scan_token() {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => continue,
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }
    }
}
