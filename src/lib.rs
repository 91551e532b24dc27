// calc: a small decimal calculator language.
//
// A program is one or more statements separated by newlines or ';'. Each
// statement is either `name = expression` or a bare expression, and
// evaluating a program yields one result per statement.

// Public modules
pub mod ast;
pub mod brackets;
pub mod builtins;
pub mod calculator;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use brackets::is_matched;
pub use calculator::{evaluate, Calculator};
pub use config::Limits;
pub use error::{CalcError, ErrorKind, Span};
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use value::{Number, Output};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
