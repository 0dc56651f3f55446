use rowan::TextSize;

use crate::token::{Closure, Group, Token};

/// A grid of cells split on `&` and row breaks.
///
/// Every cell is a [`Group`] closed by the delimiter that ended it, so a
/// closing `\\` can still take its optional `[spacing]`. A table always has
/// at least one row of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Group>>,
    pub closure: Closure,
    pub end: Option<Box<Token>>,
    pub offset: TextSize,
}

impl Table {
    pub fn new(closure: Closure, offset: TextSize) -> Self {
        Self {
            rows: vec![vec![Group::new(Closure::Cell, offset)]],
            closure,
            end: None,
            offset,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// True until the first token lands in a cell.
    pub fn is_pristine(&self) -> bool {
        self.rows.len() == 1
            && self.rows[0].len() == 1
            && self.rows[0][0].children.is_empty()
            && !self.rows[0][0].is_closed()
    }

    fn cell(&self) -> Option<&Group> {
        self.rows.last().and_then(|row| row.last())
    }

    fn cell_mut(&mut self) -> Option<&mut Group> {
        self.rows.last_mut().and_then(|row| row.last_mut())
    }

    /// Places `token` in the current cell. `&` and row breaks close the cell
    /// and the next token opens a fresh one; the table's own closing token
    /// ends it. A closed table forwards everything to that token, which is
    /// how `\end` receives its name.
    pub fn absorb(&mut self, token: Token) -> Result<(), Token> {
        if let Some(end) = &mut self.end {
            return end.absorb(token);
        }

        // The newest token of the current cell gets the first chance, which
        // is its closing delimiter once the cell has ended.
        let token = match self.cell_mut() {
            Some(cell) => {
                let last = match &mut cell.end {
                    Some(end) => Some(end.as_mut()),
                    None => cell.children.last_mut(),
                };
                match last {
                    Some(last) => match last.absorb(token) {
                        Ok(()) => return Ok(()),
                        Err(token) => token,
                    },
                    None => token,
                }
            }
            None => token,
        };

        if self.closure.is_closed_by(&token) {
            // `a & \end` still has a second, empty column.
            let dangling = self
                .cell()
                .and_then(|cell| cell.end.as_deref())
                .is_some_and(|end| end.is_special('&'));
            if dangling {
                if let Some(row) = self.rows.last_mut() {
                    row.push(Group::new(Closure::Cell, token.offset()));
                }
            }
            self.end = Some(Box::new(token));
            return Ok(());
        }
        self.place(token);
        Ok(())
    }

    fn place(&mut self, token: Token) {
        let offset = token.offset();
        match self.cell() {
            Some(cell) if cell.is_closed() => {
                let row_ended = cell.end.as_deref().is_some_and(Token::is_row_break);
                if row_ended {
                    self.rows.push(Vec::new());
                }
                if let Some(row) = self.rows.last_mut() {
                    row.push(Group::new(Closure::Cell, offset));
                }
            }
            Some(_) => {}
            None => self.rows.push(vec![Group::new(Closure::Cell, offset)]),
        }
        if let Some(cell) = self.cell_mut() {
            cell.accept(token);
        }
    }

    pub(crate) fn open_depth(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        1 + self.cell().map_or(0, Group::open_depth)
    }

    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(Group::text).collect::<Vec<_>>().join("&"))
            .collect::<Vec<_>>()
            .join("\\\\")
    }

    /// The cells' contents, row by row.
    pub fn into_rows(self) -> Vec<Vec<Vec<Token>>> {
        self.rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.children).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, CommandRegistry, Literal, Special};

    fn at(n: u32) -> TextSize {
        TextSize::from(n)
    }

    fn lit(text: &str) -> Token {
        Token::Literal(Literal::new(text, at(0)))
    }

    fn amp() -> Token {
        Token::Special(Special::new('&', at(0)))
    }

    fn command(name: &str) -> Token {
        Token::Command(Command::new(CommandRegistry::global().resolve(name), at(0)))
    }

    fn grid(table: &Table) -> Vec<Vec<String>> {
        table
            .rows
            .iter()
            .map(|row| row.iter().map(Group::text).collect())
            .collect()
    }

    #[test]
    fn test_new_table_has_one_cell() {
        let table = Table::new(Closure::End, at(0));
        assert!(table.is_pristine());
        assert_eq!(grid(&table), vec![vec![String::new()]]);
    }

    #[test]
    fn test_cells_and_rows() {
        let mut table = Table::new(Closure::End, at(0));
        for token in [
            lit("1"),
            amp(),
            lit("2"),
            command("\\"),
            lit("3"),
            amp(),
            lit("4"),
            command("end"),
        ] {
            table.absorb(token).unwrap();
        }
        assert!(table.is_closed());
        assert_eq!(grid(&table), vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_row_break_takes_spacing() {
        let mut table = Table::new(Closure::End, at(0));
        for token in [
            lit("1"),
            command("\\"),
            lit("["),
            lit("2"),
            lit("p"),
            lit("t"),
            lit("]"),
            lit("3"),
        ] {
            table.absorb(token).unwrap();
        }
        assert_eq!(grid(&table), vec![vec!["1"], vec!["3"]]);
        let end = table.rows[0][0].end.as_deref().and_then(Token::as_command).unwrap();
        assert_eq!(end.arg(0).unwrap().text(), "2pt");
    }

    #[test]
    fn test_empty_cells_are_kept() {
        let mut table = Table::new(Closure::Brace, at(0));
        for token in [amp(), amp(), Token::Special(Special::new('}', at(0)))] {
            table.absorb(token).unwrap();
        }
        assert_eq!(grid(&table), vec![vec!["", "", ""]]);
    }
}
