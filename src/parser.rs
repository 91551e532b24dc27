use crate::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{CalcError, ErrorKind, Span};
use crate::lexer::{Token, TokenType};
use crate::value::Number;

/// Recursive descent parser. Precedence, lowest first:
///
/// | level   | operators    | associativity |
/// |---------|--------------|---------------|
/// | term    | `+ -`        | left          |
/// | factor  | `* / %`      | left          |
/// | power   | `^`          | left          |
/// | postfix | `!`          | postfix       |
/// | unary   | prefix `-`   | right         |
///
/// so `-2^2` is `(-2)^2` and `2^3^2` is `(2^3)^2`.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_max_depth(tokens, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(mut tokens: Vec<Token>, max_depth: usize) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let (end, line) = tokens
                .last()
                .map(|t| (t.span.end, t.line()))
                .unwrap_or((0, 1));
            tokens.push(Token::new(TokenType::Eof, String::new(), Span::single(end, line)));
        }

        Self {
            tokens,
            current: 0,
            depth: 0,
            max_depth,
        }
    }

    pub fn parse(&mut self) -> Result<Program, CalcError> {
        let mut statements = Vec::new();

        self.skip_separators();
        while !self.is_at_end() {
            statements.push(self.statement()?);

            if !self.is_at_end() {
                self.consume(
                    TokenType::Newline,
                    "Separate statements with a newline or ';'.",
                )?;
                self.skip_separators();
            }
        }

        Ok(Program { statements })
    }

    fn skip_separators(&mut self) {
        while self.match_types(&[TokenType::Newline]) {}
    }

    fn statement(&mut self) -> Result<Stmt, CalcError> {
        if self.check(TokenType::Name) && self.check_next(TokenType::Equal) {
            let name_token = self.advance().clone();
            self.advance(); // consume the '='

            let value = self.expression().map_err(|error| {
                Self::operand_help(error, "An assignment needs a value: name = expression")
            })?;
            let span = name_token.span.to(value.span());

            return Ok(Stmt::Assign {
                name: name_token.lexeme,
                value,
                span,
            });
        }

        let expr = self.expression()?;
        Ok(Stmt::Expression {
            span: expr.span().clone(),
            expr,
        })
    }

    fn expression(&mut self) -> Result<Expr, CalcError> {
        self.term()
    }

    fn term(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.factor()?;

        while self.match_types(&[TokenType::Minus, TokenType::Plus]) {
            let operator = match self.previous().token_type {
                TokenType::Minus => BinaryOp::Subtract,
                _ => BinaryOp::Add,
            };
            let lexeme = self.previous().lexeme.clone();

            let right = self.factor().map_err(|error| {
                Self::operand_help(error, format!("'{}' needs an expression on both sides.", lexeme))
            })?;
            expr = Self::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.power()?;

        while self.match_types(&[TokenType::Star, TokenType::Slash, TokenType::Percent]) {
            let operator = match self.previous().token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                _ => BinaryOp::Modulo,
            };
            let lexeme = self.previous().lexeme.clone();

            let right = self.power().map_err(|error| {
                Self::operand_help(error, format!("'{}' needs an expression on both sides.", lexeme))
            })?;
            expr = Self::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.postfix()?;

        while self.match_types(&[TokenType::Caret]) {
            let right = self.postfix().map_err(|error| {
                Self::operand_help(error, "'^' needs a base and an exponent.")
            })?;
            expr = Self::binary(expr, BinaryOp::Power, right);
        }

        Ok(expr)
    }

    fn postfix(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.unary()?;

        while self.match_types(&[TokenType::Bang]) {
            let span = expr.span().to(&self.previous().span);
            expr = Expr::Unary {
                operator: UnaryOp::Factorial,
                operand: Box::new(expr),
                span,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, CalcError> {
        if self.match_types(&[TokenType::Minus]) {
            let start = self.previous().span.clone();
            let operand = self.nested(&start, |parser| parser.unary())?;
            let span = start.to(operand.span());

            return Ok(Expr::Unary {
                operator: UnaryOp::Negate,
                operand: Box::new(operand),
                span,
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, CalcError> {
        if self.is_at_end() {
            return Err(self
                .unexpected(self.peek())
                .with_help("Expected a number, a name, or a parenthesized expression."));
        }

        let token = self.advance().clone();

        match token.token_type {
            TokenType::Number => {
                let value = token
                    .decimal()
                    .ok_or_else(|| CalcError::parsing(token.lexeme.clone(), token.span.clone()))?;
                Ok(Expr::Literal {
                    value: Number::Finite(value),
                    span: token.span,
                })
            }
            TokenType::Name if self.check(TokenType::LeftParen) => self.finish_call(token),
            TokenType::Name => Ok(Expr::Variable {
                name: token.lexeme,
                span: token.span,
            }),
            TokenType::LeftParen => {
                let expr = self.nested(&token.span, |parser| parser.expression())?;
                let end_token = self.consume(
                    TokenType::RightParen,
                    "Every '(' needs a matching ')'.",
                )?;

                Ok(Expr::Grouping {
                    expr: Box::new(expr),
                    span: token.span.to(&end_token.span),
                })
            }
            _ => {
                let help = match token.token_type {
                    TokenType::RightParen => "Found ')' without a matching '('.",
                    TokenType::Newline => "A statement cannot end here.",
                    _ => "Expected a number, a name, or a parenthesized expression.",
                };
                Err(self.unexpected(&token).with_help(help))
            }
        }
    }

    /// `name ( expression )`; the name token is already consumed.
    fn finish_call(&mut self, name: Token) -> Result<Expr, CalcError> {
        let paren = self.advance().clone(); // consume the '('

        let argument = self.nested(&paren.span, |parser| parser.expression())?;
        let end_token = self.consume(
            TokenType::RightParen,
            "Functions take exactly one argument: name(expression)",
        )?;

        Ok(Expr::Call {
            span: name.span.to(&end_token.span),
            name: name.lexeme,
            argument: Box::new(argument),
        })
    }

    fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
        let span = left.span().to(right.span());
        Expr::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        }
    }

    /// Run `parse` one nesting level deeper, refusing past `max_depth`.
    fn nested<T>(
        &mut self,
        at: &Span,
        parse: impl FnOnce(&mut Self) -> Result<T, CalcError>,
    ) -> Result<T, CalcError> {
        if self.depth >= self.max_depth {
            return Err(CalcError::new(ErrorKind::TooDeep(self.max_depth), at.clone())
                .with_help("Remove some parentheses or repeated signs."));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn operand_help(error: CalcError, help: impl Into<String>) -> CalcError {
        match error.kind {
            ErrorKind::Parsing(_) if error.help.is_none() => error.with_help(help),
            _ => error,
        }
    }

    fn unexpected(&self, token: &Token) -> CalcError {
        match token.token_type {
            TokenType::Eof => CalcError::eof(token.span.clone()),
            _ => CalcError::parsing(token.describe(), token.span.clone()),
        }
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(*token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn check_next(&self, token_type: TokenType) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|token| token.token_type == token_type)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, token_type: TokenType, help: &str) -> Result<Token, CalcError> {
        if self.check(token_type) {
            Ok(self.advance().clone())
        } else {
            Err(self.unexpected(self.peek()).with_help(help))
        }
    }
}
