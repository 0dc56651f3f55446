use crate::{Algebra, AlgebraError, Constant, Expr};

/// The bundled [`Algebra`]: builds [`Expr`] trees verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Symbolic;

impl Algebra for Symbolic {
    type Expr = Expr;

    fn symbol(&self, name: &str) -> Expr {
        Expr::symbol(name)
    }

    fn integer(&self, value: i64) -> Expr {
        Expr::Integer(value)
    }

    fn big_integer(&self, digits: &str) -> Expr {
        Expr::big_integer(digits)
    }

    fn float(&self, value: f64) -> Expr {
        Expr::Float(value)
    }

    fn constant(&self, constant: Constant) -> Expr {
        Expr::Constant(constant)
    }

    fn add(&self, lhs: Expr, rhs: Expr) -> Expr {
        lhs + rhs
    }

    fn sub(&self, lhs: Expr, rhs: Expr) -> Expr {
        lhs - rhs
    }

    fn mul(&self, lhs: Expr, rhs: Expr) -> Expr {
        lhs * rhs
    }

    fn div(&self, lhs: Expr, rhs: Expr) -> Expr {
        lhs / rhs
    }

    fn pow(&self, base: Expr, exponent: Expr) -> Expr {
        base.pow(exponent)
    }

    fn equals(&self, lhs: Expr, rhs: Expr) -> Expr {
        lhs.equals(rhs)
    }

    fn neg(&self, operand: Expr) -> Expr {
        operand.neg()
    }

    fn factorial(&self, operand: Expr) -> Expr {
        operand.factorial()
    }

    fn root(&self, radicand: Expr, index: Expr) -> Expr {
        Expr::root(radicand, index)
    }

    fn binomial(&self, n: Expr, k: Expr) -> Expr {
        Expr::binomial(n, k)
    }

    fn integral(&self, body: Expr, var: Expr, lower: Option<Expr>, upper: Option<Expr>) -> Expr {
        Expr::integral(body, var, lower, upper)
    }

    fn summation(&self, body: Expr, var: Expr, lower: Expr, upper: Expr) -> Expr {
        Expr::summation(body, var, lower, upper)
    }

    fn apply(&self, name: &str, args: Vec<Expr>) -> Expr {
        Expr::apply(name, args)
    }

    fn matrix(&self, rows: Vec<Vec<Expr>>) -> Result<Expr, AlgebraError> {
        Expr::matrix(rows)
    }

    fn determinant(&self, matrix: Expr) -> Result<Expr, AlgebraError> {
        let Expr::Matrix(m) = &matrix else {
            return Err(AlgebraError::NotAMatrix);
        };
        if !m.is_square() {
            return Err(AlgebraError::NotSquare {
                rows: m.rows(),
                cols: m.cols(),
            });
        }
        Ok(Expr::Determinant(Box::new(matrix)))
    }
}
