use rowan::{TextRange, TextSize};

use crate::SyntaxError;

/// Characters with a special meaning in TeX math.
pub const SPECIALS: &str = "{}$&#^_%~";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexemeKind {
    /// `\{`, `\%`: a special character taken literally.
    EscapedSpecial,
    /// `\\`
    RowBreak,
    /// `\frac`, or a control symbol such as `\;`.
    ControlWord,
    /// A bare character from [`SPECIALS`].
    Special,
    Whitespace,
    Newline,
    /// Any other single character.
    Char,
    /// A backslash with nothing after it.
    Error,
}

/// A classified slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: LexemeKind,
    pub text: &'a str,
    pub range: TextRange,
}

impl<'a> Lexeme<'a> {
    /// The meaningful part of the lexeme: the escaped character, the control
    /// word without its backslash and trailing blanks, or the text itself.
    pub fn name(&self) -> &'a str {
        match self.kind {
            LexemeKind::EscapedSpecial => &self.text[1..],
            LexemeKind::RowBreak => "\\",
            LexemeKind::ControlWord => self.text[1..].trim_end(),
            _ => self.text,
        }
    }

    pub fn offset(&self) -> TextSize {
        self.range.start()
    }
}

/// A lexer for LaTeX math.
///
/// ## Overview
///
/// The lexer scans one alternative per call, trying them in priority order:
///
/// - **Escaped specials**: `\{`, `\%`, taken literally
/// - **Row breaks**: `\\`
/// - **Control words**: a backslash, letters, then any trailing blanks
/// - **Control symbols**: a backslash and one other character, like `\,`
/// - **Specials**: one of [`SPECIALS`]
/// - **Whitespace** runs and **newlines**
/// - **Everything else**, one character at a time
///
/// Nothing is dropped here. Comments are only recognised by [`lex`], which
/// filters the stream for the tree builder.
///
/// ## Offsets
///
/// Every [`Lexeme`] carries its byte range in the input, so errors further
/// down can point back into the source.
///
/// ## Examples
///
/// ```
/// use texmath_syntax::lexer::{Lexer, LexemeKind};
///
/// let kinds: Vec<_> = Lexer::new(r"\frac{1}").map(|l| l.kind).collect();
/// assert_eq!(kinds[0], LexemeKind::ControlWord);
/// assert_eq!(kinds[1], LexemeKind::Special);
/// ```
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Starts scanning at the beginning of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.rest().chars().next() {
            if !predicate(c) {
                break;
            }
            self.position += c.len_utf8();
        }
    }

    /// Returns the next lexeme, or `None` at end of input.
    pub fn next_lexeme(&mut self) -> Option<Lexeme<'a>> {
        let start = self.position;
        let mut chars = self.rest().chars();
        let c = chars.next()?;
        self.position += c.len_utf8();

        let kind = match c {
            '\\' => match chars.next() {
                None => LexemeKind::Error,
                Some(next) if SPECIALS.contains(next) => {
                    self.position += next.len_utf8();
                    LexemeKind::EscapedSpecial
                }
                Some('\\') => {
                    self.position += 1;
                    LexemeKind::RowBreak
                }
                Some(next) if next.is_ascii_alphabetic() => {
                    self.eat_while(|c| c.is_ascii_alphabetic());
                    self.eat_while(|c| c == ' ' || c == '\t');
                    LexemeKind::ControlWord
                }
                Some(next) => {
                    self.position += next.len_utf8();
                    LexemeKind::ControlWord
                }
            },
            '\n' => LexemeKind::Newline,
            '\r' => {
                if self.rest().starts_with('\n') {
                    self.position += 1;
                }
                LexemeKind::Newline
            }
            c if SPECIALS.contains(c) => LexemeKind::Special,
            c if c.is_whitespace() => {
                self.eat_while(|c| c.is_whitespace() && c != '\n' && c != '\r');
                LexemeKind::Whitespace
            }
            _ => LexemeKind::Char,
        };

        let text = &self.input[start..self.position];
        let offset = TextSize::of(&self.input[..start]);
        Some(Lexeme {
            kind,
            text,
            range: TextRange::at(offset, TextSize::of(text)),
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_lexeme()
    }
}

/// Lexes `input`, dropping whitespace and `%` comments.
///
/// A comment runs from a bare `%` lexeme up to and including the next
/// newline lexeme.
pub fn lex(input: &str) -> Result<Vec<Lexeme<'_>>, SyntaxError> {
    let mut lexemes = Vec::new();
    let mut in_comment = false;
    for lexeme in Lexer::new(input) {
        match lexeme.kind {
            LexemeKind::Newline => in_comment = false,
            _ if in_comment => {}
            LexemeKind::Special if lexeme.text == "%" => in_comment = true,
            LexemeKind::Whitespace => {}
            LexemeKind::Error => {
                return Err(SyntaxError::Lex {
                    offset: lexeme.offset().into(),
                });
            }
            _ => lexemes.push(lexeme),
        }
    }
    Ok(lexemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(LexemeKind, &str)> {
        Lexer::new(input).map(|l| (l.kind, l.text)).collect()
    }

    #[test]
    fn test_alternatives_in_priority_order() {
        assert_eq!(
            kinds(r"\{\\\sum x^"),
            vec![
                (LexemeKind::EscapedSpecial, r"\{"),
                (LexemeKind::RowBreak, r"\\"),
                (LexemeKind::ControlWord, r"\sum "),
                (LexemeKind::Char, "x"),
                (LexemeKind::Special, "^"),
            ]
        );
    }

    #[test]
    fn test_control_words() {
        let lexemes: Vec<_> = Lexer::new("\\Alpha \t\\;\\,x").collect();
        assert_eq!(lexemes[0].name(), "Alpha");
        assert_eq!(lexemes[0].text, "\\Alpha \t");
        assert_eq!(lexemes[1].name(), ";");
        assert_eq!(lexemes[2].name(), ",");
        assert_eq!(lexemes[3].text, "x");
    }

    #[test]
    fn test_control_word_stops_before_newline() {
        assert_eq!(
            kinds("\\pi \nx"),
            vec![
                (LexemeKind::ControlWord, "\\pi "),
                (LexemeKind::Newline, "\n"),
                (LexemeKind::Char, "x"),
            ]
        );
    }

    #[test]
    fn test_ranges_are_byte_offsets() {
        let lexemes: Vec<_> = Lexer::new("é+\\pi").collect();
        assert_eq!(lexemes[1].range, TextRange::at(TextSize::from(2), TextSize::from(1)));
        assert_eq!(lexemes[2].offset(), TextSize::from(3));
    }

    #[test]
    fn test_comments_are_dropped() {
        let names: Vec<_> = lex("x % \\frac{ ignored\n+ y %tail")
            .unwrap()
            .iter()
            .map(|l| l.name())
            .collect();
        assert_eq!(names, vec!["x", "+", "y"]);
    }

    #[test]
    fn test_escaped_percent_is_not_a_comment() {
        let names: Vec<_> = lex(r"50\% x").unwrap().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["5", "0", "%", "x"]);
    }

    #[test]
    fn test_dangling_backslash() {
        assert_eq!(lex("x\\"), Err(SyntaxError::Lex { offset: 1 }));
    }

    #[test]
    fn test_crlf_is_one_newline() {
        assert_eq!(
            kinds("%c\r\nx"),
            vec![
                (LexemeKind::Special, "%"),
                (LexemeKind::Char, "c"),
                (LexemeKind::Newline, "\r\n"),
                (LexemeKind::Char, "x"),
            ]
        );
    }
}
