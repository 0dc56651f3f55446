use std::sync::Arc;

use rowan::TextSize;

use crate::registry::CommandSpec;
use crate::token::{Closure, Group, Literal, Token};
use crate::Table;

/// A control word with its argument slots.
///
/// ## Overview
///
/// The slot layout comes from the [`CommandSpec`] the registry resolved for
/// the name. Slots are filled strictly left to right:
///
/// - An **optional** slot (one with a default) only binds a `[`, which opens
///   a `]`-closed group. Any other token skips it for good and is retried
///   against the next slot.
/// - A **required** slot binds the next token that can start an argument.
/// - A **tabular** slot turns a fresh `{` into a [`Table`].
///
/// Until the command is complete, the most recently bound argument gets the
/// first chance at every token, so `\frac{a}{b}` fills `upper` with the whole
/// first group before `lower` is looked at.
///
/// ## Examples
///
/// ```
/// use texmath_syntax::{build, CommandRegistry, Token};
///
/// let root = build(r"\sqrt[3]{x}", CommandRegistry::global(), false, 128).unwrap();
/// let Some(Token::Command(sqrt)) = root.children.first() else { panic!() };
/// assert_eq!(sqrt.arg_named("n").map(Token::text).as_deref(), Some("3"));
/// assert_eq!(sqrt.arg_named("token").map(Token::text).as_deref(), Some("x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub spec: Arc<CommandSpec>,
    args: Vec<Option<Token>>,
    next: usize,
    last: Option<usize>,
    pub offset: TextSize,
}

impl Command {
    pub fn new(spec: Arc<CommandSpec>, offset: TextSize) -> Self {
        let args = vec![None; spec.slots.len()];
        Self {
            spec,
            args,
            next: 0,
            last: None,
            offset,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The token bound to slot `index`, if any.
    pub fn arg(&self, index: usize) -> Option<&Token> {
        self.args.get(index).and_then(Option::as_ref)
    }

    /// The token bound to the slot called `name`.
    pub fn arg_named(&self, name: &str) -> Option<&Token> {
        self.spec.slot_index(name).and_then(|index| self.arg(index))
    }

    pub fn args(&self) -> impl Iterator<Item = Option<&Token>> {
        self.args.iter().map(Option::as_ref)
    }

    /// Slots that are required and still empty.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.spec
            .slots
            .iter()
            .zip(&self.args)
            .filter(|(slot, arg)| !slot.is_optional() && arg.is_none())
            .map(|(slot, _)| slot.name.as_str())
    }

    /// Offers `token` to the open argument, then to the next empty slot.
    /// Hands it back once every slot is filled or when it cannot start an
    /// argument.
    pub fn absorb(&mut self, token: Token) -> Result<(), Token> {
        let mut token = token;
        if let Some(last) = self.last {
            if let Some(arg) = &mut self.args[last] {
                match arg.absorb(token) {
                    Ok(()) => return Ok(()),
                    Err(rejected) => token = rejected,
                }
            }
        }

        while self.next < self.spec.slots.len() {
            let index = self.next;
            let (optional, tabular) = {
                let slot = &self.spec.slots[index];
                (slot.is_optional(), slot.tabular)
            };

            if optional {
                self.next += 1;
                if token.is_literal("[") {
                    let group = Group::new(Closure::Bracket, token.offset());
                    self.args[index] = Some(Token::Group(group));
                    self.last = Some(index);
                    return Ok(());
                }
                self.last = None;
                continue;
            }

            if !token.can_start_argument() {
                return Err(token);
            }
            self.next += 1;
            let token = match token {
                Token::Group(group) if tabular && group.children.is_empty() && !group.is_closed() => {
                    Token::Table(Table::new(Closure::Brace, group.offset))
                }
                other => other,
            };
            self.args[index] = Some(token);
            self.last = Some(index);
            return Ok(());
        }

        Err(token)
    }

    pub(crate) fn open_depth(&self) -> usize {
        self.last
            .and_then(|index| self.arg(index))
            .map_or(0, Token::argument_depth)
    }

    pub fn text(&self) -> String {
        let mut text = format!("\\{}", self.name());
        for arg in self.args.iter().flatten() {
            text.push('{');
            text.push_str(&arg.text());
            text.push('}');
        }
        text
    }

    /// Consumes the command, yielding one entry per slot. Skipped optional
    /// slots come back as a literal of their default text.
    pub fn into_args(self) -> Vec<Option<Token>> {
        let offset = self.offset;
        self.spec
            .slots
            .iter()
            .zip(self.args)
            .map(|(slot, arg)| {
                arg.or_else(|| {
                    slot.default
                        .as_ref()
                        .map(|text| Token::Literal(Literal::new(text.clone(), offset)))
                })
            })
            .collect()
    }
}

/// `\begin{name} ... \end{name}`: a `begin` binder for the name composed
/// with a [`Table`] closed by `\end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub binder: Command,
    /// The column preamble of `array`.
    pub columns: Option<Box<Token>>,
    pub table: Table,
}

impl Environment {
    pub fn new(spec: Arc<CommandSpec>, offset: TextSize) -> Self {
        Self {
            binder: Command::new(spec, offset),
            columns: None,
            table: Table::new(Closure::End, offset),
        }
    }

    pub fn name(&self) -> Option<String> {
        self.binder.arg(0).map(Token::text)
    }

    /// The name given to the closing `\end`, once it has one.
    pub fn end_name(&self) -> Option<String> {
        self.table
            .end
            .as_deref()
            .and_then(Token::as_command)
            .and_then(|end| end.arg(0))
            .map(Token::text)
    }

    pub fn absorb(&mut self, token: Token) -> Result<(), Token> {
        let token = match self.binder.absorb(token) {
            Ok(()) => return Ok(()),
            Err(token) => token,
        };
        if self.binder.arg(0).is_none() {
            return Err(token);
        }

        if let Some(columns) = &mut self.columns {
            let token = match columns.absorb(token) {
                Ok(()) => return Ok(()),
                Err(token) => token,
            };
            return self.table.absorb(token);
        }
        if self.name().as_deref() == Some("array")
            && self.table.is_pristine()
            && matches!(token, Token::Group(_))
        {
            self.columns = Some(Box::new(token));
            return Ok(());
        }
        self.table.absorb(token)
    }

    pub(crate) fn open_depth(&self) -> usize {
        let columns = self.columns.as_deref().map_or(0, Token::open_depth);
        self.binder
            .open_depth()
            .max(columns)
            .max(self.table.open_depth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandRegistry, Special};

    fn at(n: u32) -> TextSize {
        TextSize::from(n)
    }

    fn lit(text: &str) -> Token {
        Token::Literal(Literal::new(text, at(0)))
    }

    fn brace() -> Token {
        Token::Group(Group::new(Closure::Brace, at(0)))
    }

    fn close() -> Token {
        Token::Special(Special::new('}', at(0)))
    }

    fn command(name: &str) -> Command {
        Command::new(CommandRegistry::global().resolve(name), at(0))
    }

    #[test]
    fn test_required_slots_fill_in_order() {
        let mut frac = command("frac");
        for token in [brace(), lit("x"), close(), brace(), lit("y"), close()] {
            frac.absorb(token).unwrap();
        }
        assert_eq!(frac.arg_named("upper").unwrap().text(), "x");
        assert_eq!(frac.arg_named("lower").unwrap().text(), "y");
        assert_eq!(frac.absorb(lit("z")), Err(lit("z")));
        assert_eq!(frac.missing().count(), 0);
    }

    #[test]
    fn test_optional_slot_binds_bracket() {
        let mut sqrt = command("sqrt");
        for token in [lit("["), lit("y"), lit("]"), brace(), lit("2"), close()] {
            sqrt.absorb(token).unwrap();
        }
        assert_eq!(sqrt.arg_named("n").unwrap().text(), "y");
        assert_eq!(sqrt.arg_named("token").unwrap().text(), "2");
    }

    #[test]
    fn test_optional_slot_is_skipped() {
        let mut sqrt = command("sqrt");
        sqrt.absorb(lit("2")).unwrap();
        // A later `[` does not revisit the skipped slot.
        assert_eq!(sqrt.absorb(lit("[")), Err(lit("[")));
        let args = sqrt.into_args();
        assert_eq!(args[0].as_ref().unwrap().text(), "2");
        assert_eq!(args[1].as_ref().unwrap().text(), "2");
    }

    #[test]
    fn test_missing_required_argument() {
        let mut frac = command("frac");
        frac.absorb(lit("1")).unwrap();
        assert_eq!(frac.absorb(close()), Err(close()));
        assert_eq!(frac.missing().collect::<Vec<_>>(), vec!["lower"]);
    }

    #[test]
    fn test_tabular_slot_binds_table() {
        let mut matrix = command("matrix");
        let amp = Token::Special(Special::new('&', at(0)));
        for token in [brace(), lit("a"), amp, lit("b"), close()] {
            matrix.absorb(token).unwrap();
        }
        let Some(Token::Table(table)) = matrix.arg(0) else {
            panic!("expected a table");
        };
        assert!(table.end.is_some());
        assert_eq!(table.rows[0].len(), 2);
    }

    #[test]
    fn test_environment_binds_name_then_table() {
        let registry = CommandRegistry::global();
        let mut env = Environment::new(registry.resolve("begin"), at(0));
        let end = Token::Command(Command::new(registry.resolve("end"), at(9)));
        for token in [
            brace(),
            lit("m"),
            close(),
            lit("1"),
            end,
            brace(),
            lit("m"),
            close(),
        ] {
            env.absorb(token).unwrap();
        }
        assert_eq!(env.name().as_deref(), Some("m"));
        assert_eq!(env.end_name().as_deref(), Some("m"));
        assert_eq!(env.table.rows[0][0].text(), "1");
        assert_eq!(env.absorb(lit("x")), Err(lit("x")));
    }

    #[test]
    fn test_array_takes_column_preamble() {
        let registry = CommandRegistry::global();
        let mut env = Environment::new(registry.resolve("begin"), at(0));
        for token in [brace()]
            .into_iter()
            .chain("array".chars().map(|c| lit(&c.to_string())))
            .chain([close(), brace(), lit("c"), lit("c"), close(), lit("1")])
        {
            env.absorb(token).unwrap();
        }
        assert_eq!(env.columns.as_deref().map(Token::text).as_deref(), Some("cc"));
        assert_eq!(env.table.rows[0][0].text(), "1");
    }
}
