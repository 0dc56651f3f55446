use thiserror::Error;

/// Errors raised while lexing and building the token tree.
///
/// Every variant carries the byte offset of the construct at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("dangling escape at offset {offset}")]
    Lex { offset: usize },
    #[error("unterminated {construct} starting at offset {offset}")]
    UnterminatedStructure { construct: String, offset: usize },
    #[error("environment `{begin}` at offset {offset} is closed by `\\end{{{end}}}`")]
    EnvironmentNameMismatch {
        begin: String,
        end: String,
        offset: usize,
    },
    #[error("unknown command `\\{name}` at offset {offset}")]
    UnknownCommand { name: String, offset: usize },
    #[error("`{command}` at offset {offset} is missing its `{slot}` argument")]
    MissingArgument {
        command: String,
        slot: String,
        offset: usize,
    },
    #[error("input nests deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}
