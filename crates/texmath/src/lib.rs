//! # texmath
//!
//! Parses LaTeX math into expressions.
//!
//! The syntax layer ([`texmath_syntax`]) builds a token tree. This crate
//! rewrites it: every token reduces itself in place against a [`Cursor`],
//! and tokens that bind loosely (`+`, `*`) wait for later sweeps at higher
//! priority levels. Expressions are only ever built through an
//! [`Algebra`], so the result type is up to the caller.
//!
//! ```
//! use texmath::parse;
//! use texmath_algebra::Expr;
//!
//! let expr = parse(r"\frac{x}{y}").unwrap();
//! assert_eq!(expr, Expr::symbol("x") / Expr::symbol("y"));
//! assert_eq!(parse("x + y").unwrap().to_string(), "x + y");
//! ```

mod commands;
pub mod cursor;
mod engine;
pub mod error;
pub mod options;
mod reduce;

pub use cursor::{Cursor, Item};
pub use error::ParseError;
pub use options::ParseOptions;
pub use texmath_algebra::{Algebra, Expr, Symbolic};
pub use texmath_syntax::CommandRegistry;

use engine::Engine;

/// Parses `text` into a structural [`Expr`] with the built-in commands and
/// default options.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    Parser::new(&Symbolic).parse(text)
}

/// A configured parser.
///
/// ## Overview
///
/// A `Parser` ties together the three inputs of a parse:
///
/// - **Algebra**: the [`Algebra`] every expression is built through
/// - **Registry**: the [`CommandRegistry`] that gives commands their
///   argument slots, [`CommandRegistry::global`] unless replaced
/// - **Options**: [`ParseOptions`], covering strict command lookup and the
///   nesting limit shared by tree building and reduction
///
/// Parsing never writes to the registry, so one registry can back any
/// number of parsers.
///
/// ## Errors
///
/// Syntax problems come back as [`ParseError::Syntax`]; everything found
/// while rewriting the tree has its own [`ParseError`] variant with the byte
/// offset of the offending token where there is one.
///
/// ## Examples
///
/// ```
/// use texmath::{CommandRegistry, ParseOptions, Parser, Symbolic};
/// use texmath_syntax::CommandSpec;
///
/// let mut registry = CommandRegistry::builtin();
/// registry.define(CommandSpec::symbol("alpha"));
/// let options = ParseOptions { strict_commands: true, ..Default::default() };
///
/// let parser = Parser::new(&Symbolic)
///     .with_registry(&registry)
///     .with_options(options);
/// assert!(parser.parse(r"\alpha + 1").is_ok());
/// assert!(parser.parse(r"\beta + 1").is_err());
/// ```
pub struct Parser<'a, A: Algebra> {
    algebra: &'a A,
    registry: &'a CommandRegistry,
    options: ParseOptions,
}

impl<'a, A: Algebra> Parser<'a, A> {
    pub fn new(algebra: &'a A) -> Self {
        Self {
            algebra,
            registry: CommandRegistry::global(),
            options: ParseOptions::default(),
        }
    }

    pub fn with_registry(mut self, registry: &'a CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(&self, text: &str) -> Result<A::Expr, ParseError> {
        let root = texmath_syntax::build(
            text,
            self.registry,
            self.options.strict_commands,
            self.options.max_depth,
        )?;
        log::debug!("reducing {} top-level tokens", root.children.len());
        Engine::new(self.algebra, self.options.max_depth).expr_of_tokens(root.children)
    }
}
