use texmath_algebra::AlgebraError;
use texmath_syntax::SyntaxError;
use thiserror::Error;

/// Everything that can go wrong between source text and an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
    #[error("`{delimiter}` at offset {offset} has no counterpart")]
    UnmatchedDelimiter { delimiter: String, offset: usize },
    #[error("malformed number `{text}` at offset {offset}")]
    MalformedNumber { text: String, offset: usize },
    #[error("`{operator}` at offset {offset} is missing an operand")]
    MissingOperand { operator: String, offset: usize },
    #[error("{construct} at offset {offset} is never closed by {expected}")]
    MissingTerminator {
        construct: String,
        expected: String,
        offset: usize,
    },
    #[error("{construct} at offset {offset} has invalid bounds")]
    InvalidBounds { construct: String, offset: usize },
    #[error("unexpected `{token}` at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },
    #[error("unsupported environment `{name}` at offset {offset}")]
    UnsupportedEnvironment { name: String, offset: usize },
    #[error("expression nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("`{token}` at offset {offset} could not be reduced")]
    Irreducible { token: String, offset: usize },
}

impl ParseError {
    /// The byte offset the error points at, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Syntax(err) => Some(match err {
                SyntaxError::Lex { offset }
                | SyntaxError::UnterminatedStructure { offset, .. }
                | SyntaxError::EnvironmentNameMismatch { offset, .. }
                | SyntaxError::UnknownCommand { offset, .. }
                | SyntaxError::MissingArgument { offset, .. }
                | SyntaxError::NestingTooDeep { offset, .. } => *offset,
            }),
            ParseError::Algebra(_) | ParseError::NestingTooDeep { .. } => None,
            ParseError::UnmatchedDelimiter { offset, .. }
            | ParseError::MalformedNumber { offset, .. }
            | ParseError::MissingOperand { offset, .. }
            | ParseError::MissingTerminator { offset, .. }
            | ParseError::InvalidBounds { offset, .. }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnsupportedEnvironment { offset, .. }
            | ParseError::Irreducible { offset, .. } => Some(*offset),
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;
