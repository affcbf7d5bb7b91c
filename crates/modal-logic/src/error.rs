//! Error types for formula parsing.
//!
//! Every syntax error carries the 1-based line and column of the offending
//! token so that rule authors can locate mistakes in persisted rule files.

use thiserror::Error;

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors produced while lexing or parsing formula text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A character that cannot start any token.
    #[error("unexpected character '{ch}' at line {line}, column {col}")]
    UnexpectedChar {
        /// The offending character
        ch: char,
        /// Line number (1-based)
        line: usize,
        /// Column number (1-based)
        col: usize,
    },

    /// A well-formed token in a position the grammar does not allow.
    #[error("unexpected {found} at line {line}, column {col}: expected {expected}")]
    UnexpectedToken {
        /// Description of the token that was found
        found: String,
        /// Description of what the grammar expected
        expected: String,
        /// Line number (1-based)
        line: usize,
        /// Column number (1-based)
        col: usize,
    },

    /// Input ended while a construct was still open.
    #[error("unexpected end of input at line {line}, column {col}: expected {expected}")]
    UnexpectedEof {
        /// Description of what the grammar expected
        expected: String,
        /// Line number (1-based)
        line: usize,
        /// Column number (1-based)
        col: usize,
    },

    /// Operator nesting exceeded the parser's depth limit.
    #[error("formula nesting exceeds limit of {limit} at line {line}, column {col}")]
    TooDeep {
        /// Maximum nesting depth
        limit: usize,
        /// Line number (1-based)
        line: usize,
        /// Column number (1-based)
        col: usize,
    },

    /// The input contained no tokens.
    #[error("empty formula")]
    Empty,
}

impl SyntaxError {
    /// Returns the `(line, column)` of the error, if it has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::UnexpectedChar { line, col, .. }
            | Self::UnexpectedToken { line, col, .. }
            | Self::UnexpectedEof { line, col, .. }
            | Self::TooDeep { line, col, .. } => Some((*line, *col)),
            Self::Empty => None,
        }
    }
}
