//! # texmath syntax layer
//!
//! Turns LaTeX math source into a tree of [`Token`]s:
//!
//! ```text
//! text ──lex()──► lexemes ──classify()──► tokens ──absorb──► root Group
//! ```
//!
//! Tokens build the tree themselves: every token is offered to the most
//! recent open structure first (see [`Token::absorb`]), so commands collect
//! their arguments and groups collect their children without a grammar.

pub mod builder;
pub mod command;
pub mod error;
pub mod lexer;
pub mod registry;
pub mod table;
pub mod token;

pub use builder::{TreeBuilder, build};
pub use command::{Command, Environment};
pub use error::SyntaxError;
pub use lexer::{Lexeme, LexemeKind, Lexer, lex};
pub use registry::{ArgSlot, CommandRegistry, CommandSpec};
pub use rowan::{TextRange, TextSize};
pub use table::Table;
pub use token::{Closure, Group, Literal, Special, Token};

/// Default bound on structural nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;
