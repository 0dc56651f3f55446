//! Per-token rewrite rules for literals, specials and operators.

use texmath_algebra::{Algebra, Constant};
use texmath_syntax::{Literal, Special, Token};

use crate::commands::find_right;
use crate::cursor::{Cursor, Item};
use crate::engine::{missing_operand, Engine, Reduced, ADDITIVE, MULTIPLICATIVE};
use crate::error::{ParseError, Result};

/// Binary operators that may sit between two operands.
pub(crate) fn is_operator<E>(item: &Item<E>) -> bool {
    match item {
        Item::Reducing => true,
        Item::Expr(_) => false,
        Item::Token(Token::Literal(literal)) => {
            matches!(literal.text.as_str(), "+" | "-" | "*" | "/" | "=")
        }
        Item::Token(Token::Command(command)) => {
            matches!(command.name(), "times" | "cdot" | "over" | "choose")
        }
        Item::Token(_) => false,
    }
}

fn is_additive(token: &Token) -> bool {
    token.is_literal("+") || token.is_literal("-")
}

fn is_multiplicative(token: &Token) -> bool {
    token.is_literal("*")
        || token.is_literal("/")
        || token.is_command("times")
        || token.is_command("cdot")
}

/// Whether the nearest non-spacing item left of `offset` is an operand.
fn has_left_operand<E>(cursor: &Cursor<'_, E>, offset: isize) -> bool {
    let mut k = offset - 1;
    while let Some(item) = cursor.get(k) {
        match item {
            Item::Token(token) if token.is_spacing() => k -= 1,
            item => return !is_operator(item),
        }
    }
    false
}

/// Text made only of digits with at most one decimal point.
pub(crate) fn is_numeric(text: &str) -> bool {
    let mut digits = 0;
    let mut points = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

impl<A: Algebra> Engine<'_, A> {
    pub(crate) fn reduce(&mut self, token: Token, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        match token {
            Token::Literal(literal) => self.reduce_literal(literal, cursor),
            Token::Special(special) => self.reduce_special(special, cursor),
            Token::Group(group) => {
                let expr = self.expr_of_tokens(group.children)?;
                cursor.set(0, Item::Expr(expr));
                Ok(Reduced::Done)
            }
            Token::Table(table) => {
                let expr = self.matrix(table)?;
                cursor.set(0, Item::Expr(expr));
                Ok(Reduced::Done)
            }
            Token::Environment(env) => self.reduce_environment(env, cursor),
            Token::Command(command) => self.reduce_command(command, cursor),
        }
    }

    fn reduce_literal(&mut self, literal: Literal, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        match literal.text.as_str() {
            "+" | "-" => self.reduce_additive(Token::Literal(literal), cursor),
            "*" | "/" => self.reduce_multiplicative(Token::Literal(literal), cursor),
            "=" => {
                self.zip_binary(Token::Literal(literal), cursor, |algebra, lhs, rhs| {
                    algebra.equals(lhs, rhs)
                })?;
                Ok(Reduced::Done)
            }
            "(" | "[" => self.reduce_bracket(literal, cursor),
            ")" | "]" => Err(ParseError::UnmatchedDelimiter {
                delimiter: literal.text,
                offset: literal.offset.into(),
            }),
            "," => Err(ParseError::UnexpectedToken {
                token: literal.text,
                offset: literal.offset.into(),
            }),
            "!" => {
                let operator = Token::Literal(literal);
                let Some(operand) = cursor.get(-1) else {
                    return Err(missing_operand(&operator));
                };
                if is_operator(operand) {
                    return Err(missing_operand(&operator));
                }
                cursor.replace_with(Some(-1), Some(1), |mut items| {
                    let operand = self.expr_of_item(items.swap_remove(0))?;
                    Ok(Item::Expr(self.algebra.factorial(operand)))
                })?;
                Ok(Reduced::Done)
            }
            _ => self.reduce_atom(literal, cursor),
        }
    }

    /// Subscripted names, function application, numbers, `e` and symbols.
    fn reduce_atom(&mut self, mut literal: Literal, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        let alphabetic = literal.text.chars().all(char::is_alphabetic);

        if alphabetic {
            if let Some(Token::Special(script)) = cursor.token(1) {
                if script.ch == '_' {
                    if let Some(arg) = &script.arg {
                        let name = subscripted(&literal.text, arg);
                        cursor.delete(1);
                        cursor.set(0, Item::Expr(self.algebra.symbol(&name)));
                        return Ok(Reduced::Done);
                    }
                }
            }
            let opens_call = cursor
                .token(1)
                .and_then(Token::as_command)
                .is_some_and(|left| left.name() == "left" && left.arg(0).is_some_and(|d| d.is_literal("(")));
            if opens_call {
                return self.reduce_call(literal, cursor);
            }
        }

        if literal.text.chars().all(|c| c.is_ascii_digit() || c == '.') {
            while let Some(Token::Literal(next)) = cursor.token(1) {
                let merged = format!("{}{}", literal.text, next.text);
                if !is_numeric(&merged) {
                    break;
                }
                literal.text = merged;
                cursor.delete(1);
            }
            if is_numeric(&literal.text) {
                let expr = self.number(&literal)?;
                cursor.set(0, Item::Expr(expr));
                return Ok(Reduced::Done);
            }
        }

        let expr = match literal.text.as_str() {
            "e" => self.algebra.constant(Constant::E),
            name => self.algebra.symbol(name),
        };
        cursor.set(0, Item::Expr(expr));
        Ok(Reduced::Done)
    }

    fn number(&self, literal: &Literal) -> Result<A::Expr> {
        let malformed = || ParseError::MalformedNumber {
            text: literal.text.clone(),
            offset: literal.offset.into(),
        };
        if literal.text.contains('.') {
            let value: f64 = literal.text.parse().map_err(|_| malformed())?;
            Ok(self.algebra.float(value))
        } else if let Ok(value) = literal.text.parse::<i64>() {
            Ok(self.algebra.integer(value))
        } else if literal.text.bytes().all(|b| b.is_ascii_digit()) {
            Ok(self.algebra.big_integer(literal.text.trim_start_matches('0')))
        } else {
            Err(malformed())
        }
    }

    /// `f\left( a, b \right)`.
    fn reduce_call(&mut self, literal: Literal, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        let close = find_right(cursor, 1)?;
        cursor.replace_with(Some(0), Some(close + 1), |mut items| {
            items.truncate(items.len() - 1);
            let mut args = split_arguments(items.split_off(2));
            if args.len() == 1 && args[0].is_empty() {
                args.clear();
            }
            let args = args
                .into_iter()
                .map(|arg| self.expr_of_items(arg))
                .collect::<Result<Vec<_>>>()?;
            Ok(Item::Expr(self.algebra.apply(&literal.text, args)))
        })?;
        Ok(Reduced::Done)
    }

    fn reduce_special(&mut self, special: Special, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        match special.ch {
            '^' => {
                let offset = special.offset;
                let Some(exponent) = special.arg else {
                    return Err(ParseError::MissingOperand {
                        operator: "^".into(),
                        offset: offset.into(),
                    });
                };
                let base_ok = cursor.get(-1).is_some_and(|item| !is_operator(item));
                if !base_ok {
                    return Err(ParseError::MissingOperand {
                        operator: "^".into(),
                        offset: offset.into(),
                    });
                }
                cursor.replace_with(Some(-1), Some(1), |mut items| {
                    let base = self.expr_of_item(items.swap_remove(0))?;
                    let exponent = self.expr_of_token(*exponent)?;
                    Ok(Item::Expr(self.algebra.pow(base, exponent)))
                })?;
                Ok(Reduced::Done)
            }
            '_' | '$' => {
                cursor.delete(0);
                Ok(Reduced::Done)
            }
            '~' => Ok(Reduced::Keep(Token::Special(special))),
            '}' => Err(ParseError::UnmatchedDelimiter {
                delimiter: "}".into(),
                offset: special.offset.into(),
            }),
            ch => Err(ParseError::UnexpectedToken {
                token: ch.to_string(),
                offset: special.offset.into(),
            }),
        }
    }

    /// `+` and `-`. The first binary one folds the whole sequence; an
    /// operator without a left operand negates the rest of the sequence
    /// unless a binary one follows.
    fn reduce_additive(&mut self, token: Token, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        if let Err(level) = cursor.require(ADDITIVE) {
            return Ok(Reduced::Deferred(level, token));
        }
        if has_left_operand(cursor, 0) {
            self.fold_chain(token, cursor, is_additive, |algebra, operator, lhs, rhs| {
                if operator.is_literal("-") { algebra.sub(lhs, rhs) } else { algebra.add(lhs, rhs) }
            })?;
            return Ok(Reduced::Done);
        }

        let mut k = 1;
        while let Some(item) = cursor.get(k) {
            if item.as_token().is_some_and(is_additive) && has_left_operand(cursor, k) {
                return Ok(Reduced::Keep(token));
            }
            k += 1;
        }
        let minus = token.is_literal("-");
        cursor.replace_with(Some(0), None, |mut items| {
            items.remove(0);
            let operand = self.operand(items, &token)?;
            Ok(Item::Expr(if minus { self.algebra.neg(operand) } else { operand }))
        })?;
        Ok(Reduced::Done)
    }

    /// `*`, `/`, `\times` and `\cdot`.
    pub(crate) fn reduce_multiplicative(
        &mut self,
        token: Token,
        cursor: &mut Cursor<'_, A::Expr>,
    ) -> Result<Reduced> {
        if let Err(level) = cursor.require(MULTIPLICATIVE) {
            return Ok(Reduced::Deferred(level, token));
        }
        if !has_left_operand(cursor, 0) {
            return Err(missing_operand(&token));
        }
        self.fold_chain(token, cursor, is_multiplicative, |algebra, operator, lhs, rhs| {
            if operator.is_literal("/") { algebra.div(lhs, rhs) } else { algebra.mul(lhs, rhs) }
        })?;
        Ok(Reduced::Done)
    }

    /// Splits the sequence at every binary operator of `class` and folds the
    /// operands left to right. Each operand span costs one level of depth,
    /// however long the chain.
    fn fold_chain(
        &mut self,
        token: Token,
        cursor: &mut Cursor<'_, A::Expr>,
        class: fn(&Token) -> bool,
        combine: impl Fn(&A, &Token, A::Expr, A::Expr) -> A::Expr,
    ) -> Result<()> {
        cursor.restore(token);
        cursor.replace_with(None, None, |items| {
            let (operands, operators) = split_chain(items, class);
            let mut operands = operands.into_iter();
            let first = operands.next().unwrap_or_default();
            let Some(head) = operators.first() else {
                return Ok(Item::Expr(self.expr_of_items(first)?));
            };
            let mut acc = self.operand(first, head)?;
            for (operator, operand) in operators.iter().zip(operands) {
                let rhs = self.operand(operand, operator)?;
                acc = combine(self.algebra, operator, acc, rhs);
            }
            Ok(Item::Expr(acc))
        })?;
        Ok(())
    }

    /// Folds the whole sequence into `combine(left, right)`.
    pub(crate) fn zip_binary(
        &mut self,
        token: Token,
        cursor: &mut Cursor<'_, A::Expr>,
        combine: impl FnOnce(&A, A::Expr, A::Expr) -> A::Expr,
    ) -> Result<()> {
        cursor.zip(|left, right| {
            let lhs = self.operand(left, &token)?;
            let rhs = self.operand(right, &token)?;
            Ok(combine(self.algebra, lhs, rhs))
        })
    }

    /// `( ... )` and `[ ... ]`.
    fn reduce_bracket(&mut self, literal: Literal, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        let (open, close) = match literal.text.as_str() {
            "(" => ("(", ")"),
            _ => ("[", "]"),
        };
        let mut depth = 0usize;
        let mut k = 1;
        let end = loop {
            let Some(item) = cursor.get(k) else {
                return Err(ParseError::UnmatchedDelimiter {
                    delimiter: literal.text,
                    offset: literal.offset.into(),
                });
            };
            if let Some(token) = item.as_token() {
                if token.is_literal(open) {
                    depth += 1;
                } else if token.is_literal(close) {
                    if depth == 0 {
                        break k;
                    }
                    depth -= 1;
                }
            }
            k += 1;
        };

        cursor.replace_with(Some(0), Some(end + 1), |mut items| {
            items.pop();
            items.remove(0);
            Ok(Item::Expr(self.expr_of_items(items)?))
        })?;
        Ok(Reduced::Done)
    }
}

/// Cuts `items` at each operator of `class` that follows an operand. Unary
/// uses stay inside their operand span.
fn split_chain<E>(items: Vec<Item<E>>, class: fn(&Token) -> bool) -> (Vec<Vec<Item<E>>>, Vec<Token>) {
    let mut operands = vec![Vec::new()];
    let mut operators = Vec::new();
    let mut after_operand = false;
    for item in items {
        let binary = after_operand && item.as_token().is_some_and(class);
        if !item.as_token().is_some_and(Token::is_spacing) {
            after_operand = !is_operator(&item);
        }
        match item {
            Item::Token(token) if binary => {
                operators.push(token);
                operands.push(Vec::new());
            }
            item => {
                if let Some(operand) = operands.last_mut() {
                    operand.push(item);
                }
            }
        }
    }
    (operands, operators)
}

/// `x_1` for a one-character subscript, `x_{ab}` otherwise.
fn subscripted(base: &str, script: &Token) -> String {
    let text = script.text();
    if text.chars().count() == 1 {
        format!("{base}_{text}")
    } else {
        format!("{base}_{{{text}}}")
    }
}

/// Splits call arguments on commas outside nested brackets.
fn split_arguments<E>(items: Vec<Item<E>>) -> Vec<Vec<Item<E>>> {
    let mut args = vec![Vec::new()];
    let mut depth = 0usize;
    for item in items {
        if let Some(token) = item.as_token() {
            if token.is_literal("(") || token.is_literal("[") || token.is_command("left") {
                depth += 1;
            } else if token.is_literal(")") || token.is_literal("]") || token.is_command("right") {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && token.is_literal(",") {
                args.push(Vec::new());
                continue;
            }
        }
        if let Some(arg) = args.last_mut() {
            arg.push(item);
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_text() {
        assert!(is_numeric("12"));
        assert!(is_numeric("1.5"));
        assert!(is_numeric("1."));
        assert!(is_numeric(".5"));
        assert!(!is_numeric("."));
        assert!(!is_numeric("1.2.3"));
        assert!(!is_numeric("1a"));
        assert!(!is_numeric(""));
    }

    #[test]
    fn test_subscript_names() {
        use texmath_syntax::TextSize;
        let one = Token::Literal(Literal::new("1", TextSize::from(0)));
        assert_eq!(subscripted("x", &one), "x_1");
        let two = Token::Literal(Literal::new("ab", TextSize::from(0)));
        assert_eq!(subscripted("x", &two), "x_{ab}");
    }
}
