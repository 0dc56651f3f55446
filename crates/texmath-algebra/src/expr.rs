use std::ops;

use serde::{Deserialize, Serialize};

use crate::{AlgebraError, Constant};

/// A structural expression tree.
///
/// Nodes are stored exactly as they were built; `x + 0` stays `x + 0`.
/// The only folding happens in [`Expr::neg`], which turns the negation of a
/// numeric literal into a negative literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Expr {
    Integer(i64),
    /// An integer literal past the range of `i64`, kept as its decimal digits.
    BigInteger(String),
    Float(f64),
    Symbol(String),
    Constant(Constant),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Equals(Box<Expr>, Box<Expr>),
    Factorial(Box<Expr>),
    Root {
        radicand: Box<Expr>,
        index: Box<Expr>,
    },
    Binomial {
        n: Box<Expr>,
        k: Box<Expr>,
    },
    /// Function application by name (`sin`, `Abs`, user functions).
    Apply {
        name: String,
        args: Vec<Expr>,
    },
    Integral {
        body: Box<Expr>,
        var: Box<Expr>,
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
    },
    Sum {
        body: Box<Expr>,
        var: Box<Expr>,
        lower: Box<Expr>,
        upper: Box<Expr>,
    },
    Matrix(Matrix),
    Determinant(Box<Expr>),
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn integer(value: i64) -> Self {
        Expr::Integer(value)
    }

    pub fn big_integer(digits: impl Into<String>) -> Self {
        Expr::BigInteger(digits.into())
    }

    pub fn float(value: f64) -> Self {
        Expr::Float(value)
    }

    pub fn pow(self, exponent: Expr) -> Self {
        Expr::Pow(Box::new(self), Box::new(exponent))
    }

    pub fn equals(self, rhs: Expr) -> Self {
        Expr::Equals(Box::new(self), Box::new(rhs))
    }

    pub fn factorial(self) -> Self {
        Expr::Factorial(Box::new(self))
    }

    pub fn root(radicand: Expr, index: Expr) -> Self {
        Expr::Root {
            radicand: Box::new(radicand),
            index: Box::new(index),
        }
    }

    pub fn binomial(n: Expr, k: Expr) -> Self {
        Expr::Binomial {
            n: Box::new(n),
            k: Box::new(k),
        }
    }

    pub fn apply(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Apply {
            name: name.into(),
            args,
        }
    }

    pub fn integral(body: Expr, var: Expr, lower: Option<Expr>, upper: Option<Expr>) -> Self {
        Expr::Integral {
            body: Box::new(body),
            var: Box::new(var),
            lower: lower.map(Box::new),
            upper: upper.map(Box::new),
        }
    }

    pub fn summation(body: Expr, var: Expr, lower: Expr, upper: Expr) -> Self {
        Expr::Sum {
            body: Box::new(body),
            var: Box::new(var),
            lower: Box::new(lower),
            upper: Box::new(upper),
        }
    }

    /// Builds a matrix expression, rejecting empty and jagged grids.
    pub fn matrix(rows: Vec<Vec<Expr>>) -> Result<Self, AlgebraError> {
        Matrix::from_rows(rows).map(Expr::Matrix)
    }

    /// Negates `self`, folding numeric literals.
    pub fn neg(self) -> Self {
        match self {
            Expr::Integer(value) => match value.checked_neg() {
                Some(negated) => Expr::Integer(negated),
                None => Expr::Neg(Box::new(Expr::Integer(value))),
            },
            Expr::Float(value) => Expr::Float(-value),
            other => Expr::Neg(Box::new(other)),
        }
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Integer(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Float(value)
    }
}

impl From<Constant> for Expr {
    fn from(constant: Constant) -> Self {
        Expr::Constant(constant)
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs))
            }
        }
    };
}

binary_op!(Add, add, Add);
binary_op!(Sub, sub, Sub);
binary_op!(Mul, mul, Mul);
binary_op!(Div, div, Div);

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::neg(self)
    }
}

/// A dense row-major matrix of expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    entries: Vec<Expr>,
}

impl Matrix {
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self, AlgebraError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(AlgebraError::EmptyMatrix);
        }
        for (i, row) in rows.iter().enumerate().skip(1) {
            if row.len() != expected {
                return Err(AlgebraError::JaggedMatrix {
                    row: i + 1,
                    expected,
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            rows: rows.len(),
            cols: expected,
            entries: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Expr> {
        if row < self.rows && col < self.cols {
            self.entries.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[Expr] {
        let start = row * self.cols;
        &self.entries[start..start + self.cols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neg_folds_literals() {
        assert_eq!(-Expr::integer(3), Expr::Integer(-3));
        assert_eq!(-Expr::float(1.5), Expr::Float(-1.5));
        assert_eq!(
            -Expr::symbol("x"),
            Expr::Neg(Box::new(Expr::symbol("x")))
        );
        assert_eq!(
            Expr::integer(i64::MIN).neg(),
            Expr::Neg(Box::new(Expr::Integer(i64::MIN)))
        );
    }

    #[test]
    fn test_matrix_shape_checks() {
        let m = Matrix::from_rows(vec![
            vec![Expr::integer(1), Expr::integer(2)],
            vec![Expr::integer(3), Expr::integer(4)],
        ])
        .unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert_eq!(m.get(1, 0), Some(&Expr::Integer(3)));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(0), &[Expr::Integer(1), Expr::Integer(2)]);

        let jagged = Matrix::from_rows(vec![vec![Expr::integer(1), Expr::integer(2)], vec![Expr::integer(3)]]);
        assert_eq!(
            jagged,
            Err(AlgebraError::JaggedMatrix {
                row: 2,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(Matrix::from_rows(vec![]), Err(AlgebraError::EmptyMatrix));
    }

    #[test]
    fn test_big_integers_negate_structurally() {
        let big = Expr::big_integer("99999999999999999999");
        assert_eq!(-big.clone(), Expr::Neg(Box::new(big)));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let expr = Expr::symbol("x") + Expr::integer(1);
        let json = serde_json::to_string(&expr).unwrap();
        assert!(json.starts_with(r#"{"kind":"add""#), "{json}");
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
