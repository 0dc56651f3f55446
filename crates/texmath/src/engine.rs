//! The priority-gated fixpoint.
//!
//! A sequence is swept left to right once per pending priority level,
//! lowest first. Every token reduces itself against a [`Cursor`]; a token
//! whose level is above the current sweep hands itself back as
//! [`Reduced::Deferred`] and its level is queued. When no level is left,
//! spacing is dropped and whatever remains is multiplied together.

use std::collections::BTreeSet;

use texmath_algebra::Algebra;
use texmath_syntax::Token;

use crate::cursor::{Cursor, Item};
use crate::error::{ParseError, Result};

/// `+` and `-`.
pub(crate) const ADDITIVE: u32 = 2;
/// `*`, `/`, `\times`, `\cdot`.
pub(crate) const MULTIPLICATIVE: u32 = 3;

/// What a token did when asked to reduce.
#[derive(Debug)]
pub(crate) enum Reduced {
    /// The token rewrote the sequence; its slot is gone or holds a result.
    Done,
    /// Nothing to do here; the token stays as it is.
    Keep(Token),
    /// The token needs a sweep at the given level.
    Deferred(u32, Token),
}

pub(crate) struct Engine<'a, A: Algebra> {
    pub(crate) algebra: &'a A,
    max_depth: usize,
    depth: usize,
}

impl<'a, A: Algebra> Engine<'a, A> {
    pub(crate) fn new(algebra: &'a A, max_depth: usize) -> Self {
        Self {
            algebra,
            max_depth,
            depth: 0,
        }
    }

    pub(crate) fn expr_of_tokens(&mut self, tokens: Vec<Token>) -> Result<A::Expr> {
        self.expr_of_items(tokens.into_iter().map(Item::Token).collect())
    }

    /// A bare token is a sequence of one. A group stands for its children.
    pub(crate) fn expr_of_token(&mut self, token: Token) -> Result<A::Expr> {
        match token {
            Token::Group(group) => self.expr_of_tokens(group.children),
            token => self.expr_of_tokens(vec![token]),
        }
    }

    pub(crate) fn expr_of_item(&mut self, item: Item<A::Expr>) -> Result<A::Expr> {
        match item {
            Item::Expr(expr) => Ok(expr),
            Item::Token(token) => self.expr_of_token(token),
            Item::Reducing => unreachable!("the slot under reduction escaped its cursor"),
        }
    }

    /// Reduces `items` to a fixpoint and collapses the rest into one
    /// expression.
    pub(crate) fn expr_of_items(&mut self, mut items: Vec<Item<A::Expr>>) -> Result<A::Expr> {
        if items.len() == 1 && items.iter().all(Item::is_expr) {
            return match items.pop() {
                Some(item) => self.expr_of_item(item),
                None => Ok(self.algebra.zero()),
            };
        }

        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self
            .run(&mut items)
            .and_then(|()| self.collapse(items));
        self.depth -= 1;
        result
    }

    fn run(&mut self, items: &mut Vec<Item<A::Expr>>) -> Result<()> {
        let mut pending = BTreeSet::from([0]);
        while let Some(level) = pending.pop_first() {
            log::trace!("sweep at level {level} over {} items", items.len());
            let mut cursor = Cursor::new(items, level);
            while !cursor.at_end() {
                if let Some(token) = cursor.take() {
                    match self.reduce(token, &mut cursor)? {
                        Reduced::Done => {}
                        Reduced::Keep(token) => cursor.restore(token),
                        Reduced::Deferred(required, token) => {
                            log::debug!("deferring `{token}` to level {required}");
                            pending.insert(required);
                            cursor.restore(token);
                        }
                    }
                }
                cursor.advance();
            }
        }
        Ok(())
    }

    /// Drops spacing and multiplies the remaining expressions left to right.
    fn collapse(&mut self, items: Vec<Item<A::Expr>>) -> Result<A::Expr> {
        let mut product: Option<A::Expr> = None;
        for item in items {
            let expr = match item {
                Item::Expr(expr) => expr,
                Item::Token(token) if token.is_spacing() => continue,
                Item::Token(token) => {
                    return Err(ParseError::Irreducible {
                        token: token.to_string(),
                        offset: token.offset().into(),
                    });
                }
                Item::Reducing => unreachable!("the slot under reduction escaped its cursor"),
            };
            product = Some(match product {
                Some(lhs) => self.algebra.mul(lhs, expr),
                None => expr,
            });
        }
        Ok(product.unwrap_or_else(|| self.algebra.zero()))
    }

    /// The expression of an operand span. Spans holding nothing but spacing
    /// are missing operands.
    pub(crate) fn operand(
        &mut self,
        items: Vec<Item<A::Expr>>,
        operator: &Token,
    ) -> Result<A::Expr> {
        let empty = items
            .iter()
            .all(|item| matches!(item, Item::Token(token) if token.is_spacing()));
        if empty {
            return Err(missing_operand(operator));
        }
        self.expr_of_items(items)
    }
}

pub(crate) fn missing_operand(operator: &Token) -> ParseError {
    ParseError::MissingOperand {
        operator: operator.to_string(),
        offset: operator.offset().into(),
    }
}
