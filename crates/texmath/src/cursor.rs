use std::ops::Range;

use texmath_syntax::Token;

use crate::error::Result;

/// One slot of a sequence under reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<E> {
    /// A token that has not been rewritten yet.
    Token(Token),
    /// A finished expression.
    Expr(E),
    /// The slot whose token is being reduced right now.
    Reducing,
}

impl<E> Item<E> {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Item::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_expr(&self) -> bool {
        matches!(self, Item::Expr(_))
    }
}

/// A position in a live sequence plus the priority level of the current
/// sweep.
///
/// Offsets are relative to the position: `get(-1)` is the left neighbour,
/// `get(1)` the right one. Reads out of range yield `None`; writes out of
/// range are a bug and panic.
///
/// ## Examples
///
/// ```
/// use texmath::{Cursor, Item};
///
/// let mut items = vec![Item::Expr(1), Item::Expr(2), Item::Expr(3)];
/// let mut cursor = Cursor::new(&mut items, 0);
/// cursor.advance();
/// assert_eq!(cursor.get(-1), Some(&Item::Expr(1)));
///
/// cursor
///     .replace_with(Some(-1), Some(2), |removed| Ok(Item::Expr(removed.len() as i32)))
///     .unwrap();
/// assert_eq!(cursor.position(), 0);
/// assert_eq!(items, vec![Item::Expr(3)]);
/// ```
pub struct Cursor<'s, E> {
    items: &'s mut Vec<Item<E>>,
    index: isize,
    level: u32,
}

impl<'s, E> Cursor<'s, E> {
    pub fn new(items: &'s mut Vec<Item<E>>, level: u32) -> Self {
        Self {
            items,
            index: 0,
            level,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn position(&self) -> isize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.items.len() as isize
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }

    fn resolve(&self, offset: isize) -> Option<usize> {
        let index = self.index.checked_add(offset)?;
        usize::try_from(index).ok().filter(|&i| i < self.items.len())
    }

    /// Clamps a relative window to the sequence. `None` bounds mean the
    /// start or end of the sequence.
    pub fn range(&self, start: Option<isize>, stop: Option<isize>) -> Range<usize> {
        let len = self.items.len() as isize;
        let clamp = |offset: isize| (self.index + offset).clamp(0, len) as usize;
        let start = start.map_or(0, clamp);
        let stop = stop.map_or(len as usize, clamp);
        start..stop.max(start)
    }

    pub fn get(&self, offset: isize) -> Option<&Item<E>> {
        self.resolve(offset).map(|i| &self.items[i])
    }

    /// The token at `offset`, if that slot still holds one.
    pub fn token(&self, offset: isize) -> Option<&Token> {
        self.get(offset).and_then(Item::as_token)
    }

    pub fn window(&self, start: Option<isize>, stop: Option<isize>) -> &[Item<E>] {
        let range = self.range(start, stop);
        &self.items[range]
    }

    /// Overwrites the slot at `offset`.
    pub fn set(&mut self, offset: isize, item: Item<E>) {
        let Some(index) = self.resolve(offset) else {
            panic!("cursor write out of range: offset {offset} from {}", self.index);
        };
        self.items[index] = item;
    }

    /// Removes the slot at `offset`. The cursor keeps pointing at the same
    /// element, or at the one before it when the current slot is removed.
    pub fn delete(&mut self, offset: isize) -> Item<E> {
        let Some(index) = self.resolve(offset) else {
            panic!("cursor delete out of range: offset {offset} from {}", self.index);
        };
        if index as isize <= self.index {
            self.index -= 1;
        }
        self.items.remove(index)
    }

    /// Moves the token out of the current slot, leaving
    /// [`Item::Reducing`] behind.
    pub fn take(&mut self) -> Option<Token> {
        let index = self.resolve(0)?;
        match std::mem::replace(&mut self.items[index], Item::Reducing) {
            Item::Token(token) => Some(token),
            other => {
                self.items[index] = other;
                None
            }
        }
    }

    /// Puts a token taken with [`Cursor::take`] back unchanged.
    pub fn restore(&mut self, token: Token) {
        self.set(0, Item::Token(token));
    }

    /// Replaces the window `start..stop` with the single item `build` makes
    /// from the removed items. The cursor lands on the new item, whose
    /// absolute range is returned.
    pub fn replace_with(
        &mut self,
        start: Option<isize>,
        stop: Option<isize>,
        build: impl FnOnce(Vec<Item<E>>) -> Result<Item<E>>,
    ) -> Result<Range<usize>> {
        let range = self.range(start, stop);
        let removed: Vec<_> = self.items.drain(range.clone()).collect();
        let item = build(removed)?;
        self.items.insert(range.start, item);
        self.index = range.start as isize;
        Ok(range.start..range.start + 1)
    }

    /// Hands everything left of the cursor and everything right of it to
    /// `combine` and replaces the whole sequence with the result.
    pub fn zip(&mut self, combine: impl FnOnce(Vec<Item<E>>, Vec<Item<E>>) -> Result<E>) -> Result<()> {
        let Some(index) = self.resolve(0) else {
            panic!("cursor zip out of range at {}", self.index);
        };
        let right = self.items.split_off(index + 1);
        self.items.pop();
        let left = std::mem::take(self.items);
        let expr = combine(left, right)?;
        self.items.push(Item::Expr(expr));
        self.index = 0;
        Ok(())
    }

    /// The priority gate: fails with `level` when the current sweep runs
    /// below it.
    pub fn require(&self, level: u32) -> std::result::Result<(), u32> {
        if self.level >= level { Ok(()) } else { Err(level) }
    }
}
