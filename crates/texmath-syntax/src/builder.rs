use crate::lexer::{lex, Lexeme, LexemeKind};
use crate::token::{Closure, Group, Literal, Special, Token};
use crate::{Command, CommandRegistry, Environment, SyntaxError, Table, DEFAULT_MAX_DEPTH};

/// Turns one lexeme into a token. Whitespace and newlines yield `None`.
pub fn classify(
    lexeme: &Lexeme<'_>,
    registry: &CommandRegistry,
    strict: bool,
) -> Result<Option<Token>, SyntaxError> {
    let offset = lexeme.offset();
    let token = match lexeme.kind {
        LexemeKind::EscapedSpecial | LexemeKind::Char => {
            Token::Literal(Literal::new(lexeme.name(), offset))
        }
        LexemeKind::RowBreak | LexemeKind::ControlWord => {
            let name = lexeme.name();
            if strict && !registry.contains(name) {
                return Err(SyntaxError::UnknownCommand {
                    name: name.to_owned(),
                    offset: offset.into(),
                });
            }
            let spec = registry.resolve(name);
            if name == "begin" {
                Token::Environment(Environment::new(spec, offset))
            } else {
                Token::Command(Command::new(spec, offset))
            }
        }
        LexemeKind::Special => match lexeme.text.chars().next() {
            Some('{') => Token::Group(Group::new(Closure::Brace, offset)),
            Some(ch) => Token::Special(Special::new(ch, offset)),
            None => return Ok(None),
        },
        LexemeKind::Whitespace | LexemeKind::Newline => return Ok(None),
        LexemeKind::Error => {
            return Err(SyntaxError::Lex {
                offset: offset.into(),
            });
        }
    };
    Ok(Some(token))
}

/// Builds the token tree one lexeme at a time.
///
/// ```
/// use texmath_syntax::{CommandRegistry, TreeBuilder, lex};
///
/// let mut builder = TreeBuilder::new(CommandRegistry::global());
/// for lexeme in lex(r"\frac{x}{y} + 1").unwrap() {
///     builder.push(&lexeme).unwrap();
/// }
/// let root = builder.finish().unwrap();
/// assert_eq!(root.children.len(), 3);
/// ```
pub struct TreeBuilder<'r> {
    registry: &'r CommandRegistry,
    strict: bool,
    max_depth: usize,
    root: Group,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self {
            registry,
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            root: Group::root(),
        }
    }

    /// Rejects commands the registry does not know.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn push(&mut self, lexeme: &Lexeme<'_>) -> Result<(), SyntaxError> {
        let Some(token) = classify(lexeme, self.registry, self.strict)? else {
            return Ok(());
        };
        if let Err(token) = self.root.absorb(token) {
            self.root.accept(token);
        }

        let depth = self.root.open_depth().saturating_sub(1);
        if depth > self.max_depth {
            return Err(SyntaxError::NestingTooDeep {
                limit: self.max_depth,
                offset: lexeme.offset().into(),
            });
        }
        Ok(())
    }

    /// Checks that every structure was closed and every required argument
    /// bound, and returns the root group.
    pub fn finish(self) -> Result<Group, SyntaxError> {
        for child in &self.root.children {
            validate(child)?;
        }
        log::trace!("built {} top-level tokens", self.root.children.len());
        Ok(self.root)
    }
}

/// Lexes and builds `input` in one go.
pub fn build(
    input: &str,
    registry: &CommandRegistry,
    strict: bool,
    max_depth: usize,
) -> Result<Group, SyntaxError> {
    let mut builder = TreeBuilder::new(registry)
        .strict(strict)
        .max_depth(max_depth);
    for lexeme in lex(input)? {
        builder.push(&lexeme)?;
    }
    builder.finish()
}

fn validate(token: &Token) -> Result<(), SyntaxError> {
    match token {
        Token::Literal(_) => Ok(()),
        Token::Special(special) => match &special.arg {
            Some(arg) => validate(arg),
            None if special.takes_argument() => Err(SyntaxError::MissingArgument {
                command: special.ch.to_string(),
                slot: "argument".to_owned(),
                offset: special.offset.into(),
            }),
            None => Ok(()),
        },
        Token::Group(group) => validate_group(group),
        Token::Table(table) => validate_table(table),
        Token::Environment(env) => validate_environment(env),
        Token::Command(command) => validate_command(command),
    }
}

fn validate_group(group: &Group) -> Result<(), SyntaxError> {
    let Some(end) = &group.end else {
        return Err(SyntaxError::UnterminatedStructure {
            construct: group.closure.construct().to_owned(),
            offset: group.offset.into(),
        });
    };
    group.children.iter().try_for_each(validate)?;
    validate(end)
}

fn validate_table(table: &Table) -> Result<(), SyntaxError> {
    let Some(end) = &table.end else {
        let construct = match table.closure {
            Closure::Brace => "table",
            closure => closure.construct(),
        };
        return Err(SyntaxError::UnterminatedStructure {
            construct: construct.to_owned(),
            offset: table.offset.into(),
        });
    };
    for cell in table.rows.iter().flatten() {
        cell.children.iter().try_for_each(validate)?;
        if let Some(delimiter) = &cell.end {
            validate(delimiter)?;
        }
    }
    validate(end)
}

fn validate_environment(env: &Environment) -> Result<(), SyntaxError> {
    validate_command(&env.binder)?;
    if let Some(columns) = &env.columns {
        validate(columns)?;
    }
    validate_table(&env.table)?;

    let begin = env.name().unwrap_or_default();
    let end = env.end_name().unwrap_or_default();
    if begin != end {
        return Err(SyntaxError::EnvironmentNameMismatch {
            begin,
            end,
            offset: env.binder.offset.into(),
        });
    }
    Ok(())
}

fn validate_command(command: &Command) -> Result<(), SyntaxError> {
    command.args().flatten().try_for_each(validate)?;
    match command.missing().next() {
        Some(slot) => Err(SyntaxError::MissingArgument {
            command: format!("\\{}", command.name()),
            slot: slot.to_owned(),
            offset: command.offset.into(),
        }),
        None => Ok(()),
    }
}
