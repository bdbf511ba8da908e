//! Parse failures.

use std::fmt;

/// Fatal parse failure; no partial document is ever returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed grammar in IDL text.
    Syntax {
        line: usize,
        col: usize,
        message: String,
    },
    /// The precompiled artifact reported a nonzero status.
    Artifact { code: u32, message: String },
    /// The artifact finished without completing the document tree.
    IncompleteDocument { detail: String },
}

impl ParseError {
    pub fn syntax(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            col,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { line, col, message } => {
                write!(f, "parse error at {}:{}: {}", line, col, message)
            }
            Self::Artifact { code, message } => {
                write!(f, "artifact parse failed (code {}): {}", code, message)
            }
            Self::IncompleteDocument { detail } => {
                write!(f, "artifact produced an incomplete document: {}", detail)
            }
        }
    }
}

impl std::error::Error for ParseError {}
