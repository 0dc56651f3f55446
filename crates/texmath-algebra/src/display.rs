use std::fmt::{self, Display, Formatter, Write};

use crate::{Constant, Expr, Matrix};

// Binding strength used to decide where parentheses are needed.
const ADD: u8 = 1;
const MUL: u8 = 2;
const NEG: u8 = 3;
const POW: u8 = 4;
const ATOM: u8 = 5;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => ADD,
            Expr::Mul(..) | Expr::Div(..) => MUL,
            Expr::Neg(_) => NEG,
            Expr::Integer(v) if *v < 0 => NEG,
            Expr::Float(v) if *v < 0.0 => NEG,
            Expr::Pow(..) => POW,
            _ => ATOM,
        }
    }
}

fn operand(f: &mut Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn list(f: &mut Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Pi => f.write_str("pi"),
            Constant::E => f.write_str("E"),
        }
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Matrix([")?;
        for r in 0..self.rows() {
            if r > 0 {
                f.write_str(", ")?;
            }
            f.write_char('[')?;
            list(f, self.row(r))?;
            f.write_char(']')?;
        }
        f.write_str("])")
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(v) => write!(f, "{v}"),
            Expr::BigInteger(digits) => f.write_str(digits),
            Expr::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Expr::Float(v) => write!(f, "{v}"),
            Expr::Symbol(name) => f.write_str(name),
            Expr::Constant(c) => write!(f, "{c}"),
            Expr::Neg(inner) => {
                f.write_char('-')?;
                operand(f, inner, POW)
            }
            Expr::Add(l, r) => {
                operand(f, l, ADD)?;
                f.write_str(" + ")?;
                operand(f, r, ADD)
            }
            Expr::Sub(l, r) => {
                operand(f, l, ADD)?;
                f.write_str(" - ")?;
                operand(f, r, MUL)
            }
            Expr::Mul(l, r) => {
                operand(f, l, MUL)?;
                f.write_char('*')?;
                operand(f, r, NEG)
            }
            Expr::Div(l, r) => {
                operand(f, l, MUL)?;
                f.write_char('/')?;
                operand(f, r, NEG + 1)
            }
            Expr::Pow(l, r) => {
                operand(f, l, ATOM)?;
                f.write_str("**")?;
                operand(f, r, POW)
            }
            Expr::Equals(l, r) => write!(f, "Eq({l}, {r})"),
            Expr::Factorial(inner) => write!(f, "factorial({inner})"),
            Expr::Root { radicand, index } => write!(f, "root({radicand}, {index})"),
            Expr::Binomial { n, k } => write!(f, "binomial({n}, {k})"),
            Expr::Apply { name, args } => {
                write!(f, "{name}(")?;
                list(f, args)?;
                f.write_char(')')
            }
            Expr::Integral {
                body,
                var,
                lower,
                upper,
            } => match (lower, upper) {
                (None, None) => write!(f, "Integral({body}, {var})"),
                (lower, upper) => {
                    write!(f, "Integral({body}, ({var}, ")?;
                    match lower {
                        Some(lower) => write!(f, "{lower}")?,
                        None => f.write_str("None")?,
                    }
                    f.write_str(", ")?;
                    match upper {
                        Some(upper) => write!(f, "{upper}")?,
                        None => f.write_str("None")?,
                    }
                    f.write_str("))")
                }
            },
            Expr::Sum {
                body,
                var,
                lower,
                upper,
            } => write!(f, "Sum({body}, ({var}, {lower}, {upper}))"),
            Expr::Matrix(m) => write!(f, "{m}"),
            Expr::Determinant(inner) => write!(f, "det({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use crate::{Constant, Expr};

    fn x() -> Expr {
        Expr::symbol("x")
    }

    fn y() -> Expr {
        Expr::symbol("y")
    }

    #[test]
    fn test_binary_parenthesization() {
        let expr = (x() + y()) * (Expr::symbol("z") - Expr::symbol("w"));
        expect![["(x + y)*(z - w)"]].assert_eq(&expr.to_string());

        let expr = x() - (y() - Expr::integer(1));
        expect![["x - (y - 1)"]].assert_eq(&expr.to_string());

        let expr = (x() - y()) - Expr::integer(1);
        expect![["x - y - 1"]].assert_eq(&expr.to_string());

        let expr = x() / (y() * Expr::integer(2));
        expect![["x/(y*2)"]].assert_eq(&expr.to_string());
    }

    #[test]
    fn test_powers_and_negation() {
        let expr = (x() + Expr::integer(1)).pow(Expr::integer(2));
        expect![["(x + 1)**2"]].assert_eq(&expr.to_string());

        let expr = x() * Expr::integer(-3);
        expect![["x*-3"]].assert_eq(&expr.to_string());

        let expr = -(x() + y());
        expect![["-(x + y)"]].assert_eq(&expr.to_string());

        expect![["2.0"]].assert_eq(&Expr::float(2.0).to_string());
        expect![["1.234"]].assert_eq(&Expr::float(1.234).to_string());

        let big = -Expr::big_integer("12345678901234567890");
        expect![["-12345678901234567890"]].assert_eq(&big.to_string());
    }

    #[test]
    fn test_function_forms() {
        let m = Expr::matrix(vec![
            vec![Expr::integer(1), Expr::integer(2)],
            vec![Expr::integer(3), Expr::integer(4)],
        ])
        .unwrap();
        expect![["Matrix([[1, 2], [3, 4]])"]].assert_eq(&m.to_string());

        let sum = Expr::summation(
            Expr::integer(2) * Expr::symbol("i"),
            Expr::symbol("i"),
            Expr::integer(1),
            Expr::symbol("n"),
        );
        expect![["Sum(2*i, (i, 1, n))"]].assert_eq(&sum.to_string());

        let eq = (x() + Expr::symbol("z") * Expr::from(Constant::Pi)).equals(y());
        expect![["Eq(x + z*pi, y)"]].assert_eq(&eq.to_string());

        let indefinite = Expr::integral(x(), x(), None, None);
        expect![["Integral(x, x)"]].assert_eq(&indefinite.to_string());

        let upper_only = Expr::integral(x(), x(), None, Some(Expr::integer(1)));
        expect![["Integral(x, (x, None, 1))"]].assert_eq(&upper_only.to_string());
    }
}
