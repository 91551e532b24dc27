use crate::error::Span;
use crate::value::Number;

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

// Operator chains nest as deep as the input is long; take them apart with
// an explicit stack instead of the recursive default drop.
impl Drop for Program {
    fn drop(&mut self) {
        let mut pending: Vec<Expr> = self
            .statements
            .drain(..)
            .map(|statement| match statement {
                Stmt::Assign { value, .. } => value,
                Stmt::Expression { expr, .. } => expr,
            })
            .collect();

        while let Some(expr) = pending.pop() {
            match expr {
                Expr::Binary { left, right, .. } => {
                    pending.push(*left);
                    pending.push(*right);
                }
                Expr::Unary { operand, .. } => pending.push(*operand),
                Expr::Call { argument, .. } => pending.push(*argument),
                Expr::Grouping { expr, .. } => pending.push(*expr),
                Expr::Literal { .. } | Expr::Variable { .. } => {}
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `name = value`
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Assign { span, .. } => span,
            Stmt::Expression { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: Number,
        span: Span,
    },
    /// Constant or variable reference.
    Variable {
        name: String,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// One-argument call of a built-in function.
    Call {
        name: String,
        argument: Box<Expr>,
        span: Span,
    },
    Grouping {
        expr: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::Grouping { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Prefix `-`.
    Negate,
    /// Postfix `!`.
    Factorial,
}
