use thiserror::Error;

/// Result type for jerase operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the jerase pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Lexical error: {message}")]
    Lexical { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a parse error with location information
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a lexical error
    pub fn lexical_error(message: impl Into<String>) -> Self {
        Self::Lexical {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
