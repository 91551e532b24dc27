//! Evaluation limits.
//!
//! The grammar itself has no bound on input size or nesting, so every
//! [`Calculator`](crate::Calculator) carries a set of limits that the lexer
//! and parser enforce before any arithmetic happens.

/// Default cap on program length, in characters. Matches a chat message.
pub const DEFAULT_MAX_INPUT_LEN: usize = 2000;

/// Default cap on nesting of parentheses, calls and prefix minus.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Significant digits kept when presenting a non-integer result.
pub const DEFAULT_PRECISION: u64 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest accepted program, in characters.
    pub max_input_len: usize,
    /// Deepest accepted nesting.
    pub max_depth: usize,
    /// Significant digits of non-integer results.
    pub precision: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl Limits {
    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Zero is treated as one digit.
    pub fn with_precision(mut self, precision: u64) -> Self {
        self.precision = precision.max(1);
        self
    }
}
