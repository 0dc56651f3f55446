use std::fmt;

use rowan::TextSize;

use crate::registry::{ROW_BREAKS, SPACING_COMMANDS};
use crate::{Command, Environment, Table};

/// Decides which token closes a [`Group`] or [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Closure {
    /// The root group, closed only by end of input.
    Never,
    /// A bare `}`.
    Brace,
    /// A literal `]`, ending an optional argument.
    Bracket,
    /// `&` or a row break, ending a table cell.
    Cell,
    /// `\end`, ending an environment body.
    End,
}

impl Closure {
    pub fn is_closed_by(self, token: &Token) -> bool {
        match self {
            Closure::Never => false,
            Closure::Brace => token.is_special('}'),
            Closure::Bracket => token.is_literal("]"),
            Closure::Cell => token.is_special('&') || token.is_row_break(),
            Closure::End => token.is_command("end"),
        }
    }

    /// What an unclosed structure with this closure is called in errors.
    pub fn construct(self) -> &'static str {
        match self {
            Closure::Never => "input",
            Closure::Brace => "group",
            Closure::Bracket => "optional argument",
            Closure::Cell => "table cell",
            Closure::End => "environment",
        }
    }
}

/// A plain character, or an escaped special taken literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub offset: TextSize,
}

impl Literal {
    pub fn new(text: impl Into<String>, offset: TextSize) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }
}

/// A bare character from the special set. `^` and `_` own one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Special {
    pub ch: char,
    pub arg: Option<Box<Token>>,
    pub offset: TextSize,
}

impl Special {
    pub fn new(ch: char, offset: TextSize) -> Self {
        Self {
            ch,
            arg: None,
            offset,
        }
    }

    pub fn takes_argument(&self) -> bool {
        matches!(self.ch, '^' | '_')
    }

    pub fn absorb(&mut self, token: Token) -> Result<(), Token> {
        if let Some(arg) = &mut self.arg {
            return arg.absorb(token);
        }
        if self.takes_argument() && token.can_start_argument() {
            self.arg = Some(Box::new(token));
            Ok(())
        } else {
            Err(token)
        }
    }
}

/// A run of child tokens, open until its [`Closure`] sees a matching token.
///
/// The closing token is kept in `end`. Once closed, the group forwards
/// every absorb call to it, so a row break closing a cell can still take
/// its optional `[spacing]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub children: Vec<Token>,
    pub closure: Closure,
    pub end: Option<Box<Token>>,
    pub offset: TextSize,
}

impl Group {
    pub fn new(closure: Closure, offset: TextSize) -> Self {
        Self {
            children: Vec::new(),
            closure,
            end: None,
            offset,
        }
    }

    /// The top-level group of a parse.
    pub fn root() -> Self {
        Self::new(Closure::Never, TextSize::from(0))
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    pub fn absorb(&mut self, token: Token) -> Result<(), Token> {
        if let Some(end) = &mut self.end {
            return end.absorb(token);
        }
        let token = match self.children.last_mut() {
            Some(last) => match last.absorb(token) {
                Ok(()) => return Ok(()),
                Err(token) => token,
            },
            None => token,
        };
        self.accept(token);
        Ok(())
    }

    /// Closes the group with `token` or appends it, without offering it to
    /// the last child.
    pub(crate) fn accept(&mut self, token: Token) {
        if self.closure.is_closed_by(&token) {
            self.end = Some(Box::new(token));
        } else {
            self.children.push(token);
        }
    }

    pub(crate) fn open_depth(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        1 + self.children.last().map_or(0, Token::open_depth)
    }

    pub fn text(&self) -> String {
        self.children.iter().map(Token::text).collect()
    }
}

/// A node of the token tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(Literal),
    Special(Special),
    Group(Group),
    Table(Table),
    Environment(Environment),
    Command(Command),
}

impl Token {
    /// Offers `token` to this node.
    ///
    /// ## Overview
    ///
    /// Absorption is how the tree grows. Every incoming token is offered to
    /// the newest open structure first and bubbles outwards on rejection:
    ///
    /// - **Literals** never take anything
    /// - **Scripts** (`^`, `_`) bind exactly one argument
    /// - **Groups and tables** hand the token to their newest child, then
    ///   keep it themselves unless it is their closing token
    /// - **Commands and environments** fill their argument slots in order
    ///
    /// A rejected token comes back in `Err` so the caller can place it
    /// elsewhere, usually as a sibling.
    ///
    /// ## Examples
    ///
    /// ```
    /// use texmath_syntax::{Special, Token, Literal, TextSize};
    ///
    /// let at = TextSize::from(0);
    /// let mut caret = Token::Special(Special::new('^', at));
    /// assert!(caret.absorb(Token::Literal(Literal::new("2", at))).is_ok());
    ///
    /// let extra = Token::Literal(Literal::new("x", at));
    /// assert_eq!(caret.absorb(extra.clone()), Err(extra));
    /// ```
    pub fn absorb(&mut self, token: Token) -> Result<(), Token> {
        match self {
            Token::Literal(_) => Err(token),
            Token::Special(special) => special.absorb(token),
            Token::Group(group) => group.absorb(token),
            Token::Table(table) => table.absorb(token),
            Token::Environment(env) => env.absorb(token),
            Token::Command(command) => command.absorb(token),
        }
    }

    pub fn offset(&self) -> TextSize {
        match self {
            Token::Literal(literal) => literal.offset,
            Token::Special(special) => special.offset,
            Token::Group(group) => group.offset,
            Token::Table(table) => table.offset,
            Token::Environment(env) => env.binder.offset,
            Token::Command(command) => command.offset,
        }
    }

    /// Length of the chain of still-open structures below this token.
    pub fn open_depth(&self) -> usize {
        match self {
            Token::Literal(_) => 0,
            Token::Special(special) => special.arg.as_deref().map_or(0, Token::argument_depth),
            Token::Group(group) => group.open_depth(),
            Token::Table(table) => table.open_depth(),
            Token::Environment(env) => env.open_depth(),
            Token::Command(command) => command.open_depth(),
        }
    }

    /// Depth of this token when bound as an argument. Groups and tables
    /// count for themselves; anything else puts its owner one level deeper,
    /// so `\sqrt\sqrt x` and `x^^2` nest like braces do.
    pub(crate) fn argument_depth(&self) -> usize {
        match self {
            Token::Group(_) | Token::Table(_) => self.open_depth(),
            other => 1 + other.open_depth(),
        }
    }

    /// The source-like text of the token's content. Groups contribute their
    /// children without braces.
    pub fn text(&self) -> String {
        match self {
            Token::Literal(literal) => literal.text.clone(),
            Token::Special(special) => {
                let mut text = special.ch.to_string();
                if let Some(arg) = &special.arg {
                    text.push_str(&arg.text());
                }
                text
            }
            Token::Group(group) => group.text(),
            Token::Table(table) => table.text(),
            Token::Environment(env) => env.table.text(),
            Token::Command(command) => command.text(),
        }
    }

    pub fn is_literal(&self, text: &str) -> bool {
        matches!(self, Token::Literal(literal) if literal.text == text)
    }

    pub fn is_special(&self, ch: char) -> bool {
        matches!(self, Token::Special(special) if special.ch == ch)
    }

    pub fn is_command(&self, name: &str) -> bool {
        matches!(self, Token::Command(command) if command.name() == name)
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Token::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn is_row_break(&self) -> bool {
        matches!(self, Token::Command(command) if ROW_BREAKS.contains(&command.name()))
    }

    /// Pure inter-token spacing, skipped when leftovers are multiplied.
    pub fn is_spacing(&self) -> bool {
        match self {
            Token::Command(command) => {
                SPACING_COMMANDS.contains(&command.name()) || ROW_BREAKS.contains(&command.name())
            }
            Token::Special(special) => special.ch == '~',
            _ => false,
        }
    }

    /// Closing tokens never become an argument of a command or script.
    pub fn can_start_argument(&self) -> bool {
        match self {
            Token::Special(special) => !matches!(special.ch, '}' | '&'),
            Token::Command(command) => {
                !matches!(command.name(), "end" | "right") && !self.is_row_break()
            }
            _ => true,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(literal) => f.write_str(&literal.text),
            Token::Special(special) => write!(f, "{}", special.ch),
            Token::Group(group) => write!(f, "{{{}}}", group.text()),
            Token::Table(_) => f.write_str("table"),
            Token::Environment(env) => match env.name() {
                Some(name) => write!(f, "\\begin{{{name}}}"),
                None => f.write_str("\\begin"),
            },
            Token::Command(command) => write!(f, "\\{}", command.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandRegistry;

    fn at(n: u32) -> TextSize {
        TextSize::from(n)
    }

    fn lit(text: &str) -> Token {
        Token::Literal(Literal::new(text, at(0)))
    }

    fn special(ch: char) -> Token {
        Token::Special(Special::new(ch, at(0)))
    }

    fn command(name: &str) -> Token {
        Token::Command(Command::new(CommandRegistry::global().resolve(name), at(0)))
    }

    #[test]
    fn test_literal_rejects() {
        let mut token = lit("x");
        assert_eq!(token.absorb(lit("y")), Err(lit("y")));
    }

    #[test]
    fn test_group_closes_and_forwards() {
        let mut group = Group::new(Closure::Brace, at(0));
        group.absorb(lit("a")).unwrap();
        group.absorb(special('}')).unwrap();
        assert!(group.is_closed());
        assert_eq!(group.text(), "a");
        // The retained `}` rejects everything after it.
        assert_eq!(group.absorb(lit("b")), Err(lit("b")));
    }

    #[test]
    fn test_script_binds_one_argument() {
        let mut root = Group::root();
        for token in [lit("x"), special('^'), lit("2"), lit("3")] {
            root.absorb(token).unwrap();
        }
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[1].text(), "^2");
    }

    #[test]
    fn test_script_grows_through_open_group() {
        let mut root = Group::root();
        for token in [
            special('_'),
            Token::Group(Group::new(Closure::Brace, at(1))),
            lit("a"),
            lit("b"),
            special('}'),
            lit("c"),
        ] {
            root.absorb(token).unwrap();
        }
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text(), "_ab");
    }

    #[test]
    fn test_closers_do_not_start_arguments() {
        assert!(!special('}').can_start_argument());
        assert!(!special('&').can_start_argument());
        assert!(!command("end").can_start_argument());
        assert!(!command("\\").can_start_argument());
        assert!(command("frac").can_start_argument());
        assert!(lit("]").can_start_argument());
    }

    #[test]
    fn test_spacing() {
        assert!(command(";").is_spacing());
        assert!(command("qquad").is_spacing());
        assert!(special('~').is_spacing());
        assert!(!command("pi").is_spacing());
    }

    #[test]
    fn test_open_depth() {
        let mut root = Group::root();
        root.absorb(Token::Group(Group::new(Closure::Brace, at(0)))).unwrap();
        root.absorb(Token::Group(Group::new(Closure::Brace, at(1)))).unwrap();
        assert_eq!(root.open_depth(), 3);
        root.absorb(special('}')).unwrap();
        assert_eq!(root.open_depth(), 2);
    }

    #[test]
    fn test_argument_chains_count_as_nesting() {
        let mut root = Group::root();
        root.absorb(lit("x")).unwrap();
        for _ in 0..3 {
            root.absorb(special('^')).unwrap();
        }
        assert_eq!(root.open_depth(), 3);
        root.absorb(lit("2")).unwrap();
        assert_eq!(root.open_depth(), 4);

        let mut root = Group::root();
        root.absorb(command("sqrt")).unwrap();
        root.absorb(Token::Group(Group::new(Closure::Brace, at(5)))).unwrap();
        assert_eq!(root.open_depth(), 2);
        root.absorb(special('}')).unwrap();
        assert_eq!(root.open_depth(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(command("frac").to_string(), "\\frac");
        assert_eq!(special('^').to_string(), "^");
        let mut group = Group::new(Closure::Brace, at(0));
        group.absorb(lit("a")).unwrap();
        assert_eq!(Token::Group(group).to_string(), "{a}");
    }
}
