//! Rewrite rules for control words, environments and matrices.

use texmath_algebra::{Algebra, Constant};
use texmath_syntax::registry::{ROW_BREAKS, SPACING_COMMANDS};
use texmath_syntax::{Command, Environment, Table, Token};

use crate::cursor::{Cursor, Item};
use crate::engine::{Engine, Reduced};
use crate::error::{ParseError, Result};

/// Environments whose body is a matrix.
const MATRIX_ENVIRONMENTS: &[&str] = &[
    "matrix",
    "array",
    "pmatrix",
    "bmatrix",
    "Bmatrix",
    "vmatrix",
    "smallmatrix",
];

fn is_differential(token: &Token) -> bool {
    matches!(token, Token::Command(command)
        if command.name() == "mathrm" && command.arg(0).is_some_and(|arg| arg.text() == "d"))
}

/// Removes `\limits` and any `^`/`_` scripts directly right of the cursor,
/// returning the script arguments as `(lower, upper)`.
fn take_limits<E>(cursor: &mut Cursor<'_, E>) -> (Option<Token>, Option<Token>) {
    let (mut lower, mut upper) = (None, None);
    while let Some(token) = cursor.token(1) {
        if token.is_command("limits") {
            cursor.delete(1);
            continue;
        }
        let upper_script = match token {
            Token::Special(special) if special.ch == '^' => true,
            Token::Special(special) if special.ch == '_' => false,
            _ => break,
        };
        if let Item::Token(Token::Special(special)) = cursor.delete(1) {
            let arg = special.arg.map(|arg| *arg);
            if upper_script {
                upper = arg;
            } else {
                lower = arg;
            }
        }
    }
    (lower, upper)
}

/// Locates the `\right` matching a `\left` at `start`.
pub(crate) fn find_right<E>(cursor: &Cursor<'_, E>, start: isize) -> Result<isize> {
    let offset = cursor.token(start).map_or(0, |left| left.offset().into());
    find_closing(cursor, start, "left", "right", offset)
}

/// Finds the `\close` matching the `\open` at `start`, skipping nested
/// pairs.
fn find_closing<E>(
    cursor: &Cursor<'_, E>,
    start: isize,
    open: &str,
    close: &str,
    offset: usize,
) -> Result<isize> {
    let mut depth = 0usize;
    let mut k = start + 1;
    while let Some(item) = cursor.get(k) {
        if let Some(token) = item.as_token() {
            if token.is_command(open) {
                depth += 1;
            } else if token.is_command(close) {
                if depth == 0 {
                    return Ok(k);
                }
                depth -= 1;
            }
        }
        k += 1;
    }
    Err(ParseError::UnmatchedDelimiter {
        delimiter: format!("\\{open}"),
        offset,
    })
}

impl<A: Algebra> Engine<'_, A> {
    pub(crate) fn reduce_command(
        &mut self,
        command: Command,
        cursor: &mut Cursor<'_, A::Expr>,
    ) -> Result<Reduced> {
        if SPACING_COMMANDS.contains(&command.name()) || ROW_BREAKS.contains(&command.name()) {
            return Ok(Reduced::Keep(Token::Command(command)));
        }

        let name = command.name().to_owned();
        let expr = match name.as_str() {
            "frac" => {
                let [upper, lower] = self.fixed(command)?;
                self.algebra.div(upper, lower)
            }
            "sqrt" => {
                let [index, radicand] = self.fixed(command)?;
                self.algebra.root(radicand, index)
            }
            "binom" => {
                let [n, k] = self.fixed(command)?;
                self.algebra.binomial(n, k)
            }
            "sin" => {
                let [arg] = self.fixed(command)?;
                self.algebra.sin(arg)
            }
            "cos" => {
                let [arg] = self.fixed(command)?;
                self.algebra.cos(arg)
            }
            "tan" => {
                let [arg] = self.fixed(command)?;
                self.algebra.tan(arg)
            }
            "ds" => {
                let [sym] = self.fixed(command)?;
                sym
            }
            "mathrm" => {
                let text = command.arg(0).map(Token::text).unwrap_or_default();
                self.algebra.symbol(&text)
            }
            "pi" => self.algebra.constant(Constant::Pi),
            "over" => {
                self.zip_binary(Token::Command(command), cursor, |algebra, lhs, rhs| {
                    algebra.div(lhs, rhs)
                })?;
                return Ok(Reduced::Done);
            }
            "choose" => {
                self.zip_binary(Token::Command(command), cursor, |algebra, lhs, rhs| {
                    algebra.binomial(lhs, rhs)
                })?;
                return Ok(Reduced::Done);
            }
            "times" | "cdot" => {
                return self.reduce_multiplicative(Token::Command(command), cursor);
            }
            "int" => return self.reduce_integral(command, cursor),
            "sum" => return self.reduce_sum(command, cursor),
            "left" => return self.reduce_left(command, cursor),
            "lfloor" => return self.reduce_rounding(command, cursor, "rfloor", "floor"),
            "lceil" => return self.reduce_rounding(command, cursor, "rceil", "ceiling"),
            "right" | "end" | "rfloor" | "rceil" => {
                return Err(ParseError::UnmatchedDelimiter {
                    delimiter: format!("\\{name}"),
                    offset: command.offset.into(),
                });
            }
            "limits" => {
                cursor.delete(0);
                return Ok(Reduced::Done);
            }
            _ if command.spec.slots.is_empty() => self.algebra.symbol(&name),
            _ => {
                let mut args = command.into_args().into_iter().flatten();
                match (args.next(), args.next()) {
                    // `\matrix{...}` and other single tabular slots.
                    (Some(Token::Table(table)), None) => self.matrix(table)?,
                    (first, second) => {
                        let args = first
                            .into_iter()
                            .chain(second)
                            .chain(args)
                            .map(|arg| self.expr_of_token(arg))
                            .collect::<Result<Vec<_>>>()?;
                        self.algebra.apply(&name, args)
                    }
                }
            }
        };
        cursor.set(0, Item::Expr(expr));
        Ok(Reduced::Done)
    }

    /// The expressions of all slots of `command`, defaults included.
    fn arguments(&mut self, command: Command) -> Result<Vec<A::Expr>> {
        let operator = format!("\\{}", command.name());
        let offset: usize = command.offset.into();
        command
            .into_args()
            .into_iter()
            .map(|arg| match arg {
                Some(arg) => self.expr_of_token(arg),
                None => Err(ParseError::MissingOperand {
                    operator: operator.clone(),
                    offset,
                }),
            })
            .collect()
    }

    fn fixed<const N: usize>(&mut self, command: Command) -> Result<[A::Expr; N]> {
        let operator = format!("\\{}", command.name());
        let offset: usize = command.offset.into();
        self.arguments(command)?
            .try_into()
            .map_err(|_| ParseError::MissingOperand { operator, offset })
    }

    /// `\int` with optional limits, up to and including `\mathrm{d}` and its
    /// variable. Nested integrals claim their own differentials.
    fn reduce_integral(
        &mut self,
        command: Command,
        cursor: &mut Cursor<'_, A::Expr>,
    ) -> Result<Reduced> {
        let offset: usize = command.offset.into();
        let (lower, upper) = take_limits(cursor);

        let mut nested = 0usize;
        let mut k = 1;
        let end = loop {
            let Some(item) = cursor.get(k) else {
                return Err(ParseError::MissingTerminator {
                    construct: "\\int".into(),
                    expected: "\\mathrm{d}".into(),
                    offset,
                });
            };
            if let Some(token) = item.as_token() {
                if token.is_command("int") {
                    nested += 1;
                } else if is_differential(token) {
                    if nested == 0 {
                        break k;
                    }
                    nested -= 1;
                }
            }
            k += 1;
        };
        if cursor.get(end + 1).is_none() {
            let d_offset = cursor.token(end).map_or(offset, |d| d.offset().into());
            return Err(ParseError::MissingOperand {
                operator: "\\mathrm{d}".into(),
                offset: d_offset,
            });
        }

        let lower = lower.map(|bound| self.expr_of_token(bound)).transpose()?;
        let upper = upper.map(|bound| self.expr_of_token(bound)).transpose()?;
        cursor.replace_with(Some(0), Some(end + 2), |mut items| {
            let var = items.split_off(items.len() - 1);
            items.truncate(items.len() - 1);
            items.remove(0);
            let var = self.expr_of_items(var)?;
            let spacing_only = items
                .iter()
                .all(|item| item.as_token().is_some_and(Token::is_spacing));
            let body = if spacing_only {
                self.algebra.integer(1)
            } else {
                self.expr_of_items(items)?
            };
            Ok(Item::Expr(self.algebra.integral(body, var, lower, upper)))
        })?;
        Ok(Reduced::Done)
    }

    /// `\sum_{var=lower}^{upper}` applied to everything up to the next
    /// spacing token or `=`.
    fn reduce_sum(&mut self, command: Command, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        let offset: usize = command.offset.into();
        let invalid = || ParseError::InvalidBounds {
            construct: "\\sum".into(),
            offset,
        };

        let (Some(lower), Some(upper)) = take_limits(cursor) else {
            return Err(invalid());
        };
        let mut var = match lower {
            Token::Group(group) => group.children,
            token => vec![token],
        };
        let split = var
            .iter()
            .position(|token| token.is_literal("="))
            .ok_or_else(invalid)?;
        let lower = var.split_off(split + 1);
        var.truncate(split);
        if var.is_empty() || lower.is_empty() {
            return Err(invalid());
        }
        let var = self.expr_of_tokens(var)?;
        let lower = self.expr_of_tokens(lower)?;
        let upper = self.expr_of_token(upper)?;

        let mut k = 1;
        while let Some(item) = cursor.get(k) {
            if item
                .as_token()
                .is_some_and(|token| token.is_spacing() || token.is_literal("="))
            {
                break;
            }
            k += 1;
        }
        if k == 1 {
            return Err(ParseError::MissingOperand {
                operator: "\\sum".into(),
                offset,
            });
        }

        cursor.replace_with(Some(0), Some(k), |mut items| {
            items.remove(0);
            let body = self.expr_of_items(items)?;
            Ok(Item::Expr(self.algebra.summation(body, var, lower, upper)))
        })?;
        Ok(Reduced::Done)
    }

    /// `\left X ... \right Y`. A lone environment inside is left for the
    /// environment to handle, since the delimiters may make it a
    /// determinant.
    fn reduce_left(&mut self, command: Command, cursor: &mut Cursor<'_, A::Expr>) -> Result<Reduced> {
        let close = find_closing(cursor, 0, "left", "right", command.offset.into())?;
        if close == 2 && matches!(cursor.token(1), Some(Token::Environment(_))) {
            return Ok(Reduced::Keep(Token::Command(command)));
        }

        let opener = command.arg(0).map(Token::text).unwrap_or_default();
        cursor.replace_with(Some(0), Some(close + 1), |mut items| {
            items.truncate(items.len() - 1);
            items.remove(0);
            let inner = self.expr_of_items(items)?;
            let expr = match opener.as_str() {
                "|" => self.algebra.apply("Abs", vec![inner]),
                "\\lfloor" => self.algebra.apply("floor", vec![inner]),
                "\\lceil" => self.algebra.apply("ceiling", vec![inner]),
                _ => inner,
            };
            Ok(Item::Expr(expr))
        })?;
        Ok(Reduced::Done)
    }

    /// Bare `\lfloor x \rfloor` and `\lceil x \rceil`.
    fn reduce_rounding(
        &mut self,
        command: Command,
        cursor: &mut Cursor<'_, A::Expr>,
        close: &str,
        function: &str,
    ) -> Result<Reduced> {
        let end = find_closing(cursor, 0, command.name(), close, command.offset.into())?;
        cursor.replace_with(Some(0), Some(end + 1), |mut items| {
            items.truncate(items.len() - 1);
            items.remove(0);
            let inner = self.expr_of_items(items)?;
            Ok(Item::Expr(self.algebra.apply(function, vec![inner])))
        })?;
        Ok(Reduced::Done)
    }

    pub(crate) fn reduce_environment(
        &mut self,
        env: Environment,
        cursor: &mut Cursor<'_, A::Expr>,
    ) -> Result<Reduced> {
        let name = env.name().unwrap_or_default();
        if !MATRIX_ENVIRONMENTS.contains(&name.as_str()) {
            return Err(ParseError::UnsupportedEnvironment {
                name,
                offset: env.binder.offset.into(),
            });
        }
        let mut matrix = self.matrix(env.table)?;

        let bracketed = cursor.token(-1).is_some_and(|left| left.is_command("left"))
            && cursor.token(1).is_some_and(|right| right.is_command("right"));
        let pipes = bracketed
            && cursor
                .token(-1)
                .and_then(Token::as_command)
                .and_then(|left| left.arg(0))
                .is_some_and(|delimiter| delimiter.is_literal("|"));
        if bracketed {
            cursor.delete(1);
            cursor.delete(-1);
        }
        if pipes || name == "vmatrix" {
            matrix = self.algebra.determinant(matrix)?;
        }
        cursor.set(0, Item::Expr(matrix));
        Ok(Reduced::Done)
    }

    /// Reduces every cell of `table` on its own. Trailing rows with only
    /// empty cells are dropped.
    pub(crate) fn matrix(&mut self, table: Table) -> Result<A::Expr> {
        let mut rows = table.into_rows();
        while rows
            .last()
            .is_some_and(|row| row.iter().all(Vec::is_empty))
        {
            rows.pop();
        }
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| self.expr_of_tokens(cell))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.algebra.matrix(rows)?)
    }
}
