//! # texmath algebra boundary
//!
//! The rewrite engine never looks inside an expression. It only builds values
//! through the [`Algebra`] trait, so any symbolic library can sit behind it.
//!
//! [`Symbolic`] is the bundled implementation: it builds a structural
//! [`Expr`] tree without simplifying anything, which is what the parser's
//! tests compare against.
//!
//! ```
//! use texmath_algebra::{Algebra, Expr, Symbolic};
//!
//! let algebra = Symbolic;
//! let sum = algebra.add(algebra.symbol("x"), algebra.integer(1));
//! assert_eq!(sum, Expr::symbol("x") + Expr::integer(1));
//! assert_eq!(sum.to_string(), "x + 1");
//! ```

mod display;
pub mod expr;
mod symbolic;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use expr::{Expr, Matrix};
pub use symbolic::Symbolic;

/// Named mathematical constants the parser can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    /// π, from `\pi`.
    Pi,
    /// Euler's number, from a bare `e`.
    E,
}

/// Failures raised by the fallible algebra constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    #[error("matrix has no entries")]
    EmptyMatrix,
    #[error("jagged matrix: row 1 has {expected} columns, but row {row} has {found}")]
    JaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("determinant requires a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("determinant requires a matrix operand")]
    NotAMatrix,
}

/// The operations the parser needs from a symbolic-math backend.
///
/// Only `matrix` and `determinant` can fail; everything else is a plain
/// constructor. Defaults are provided where an operation can be expressed
/// through another one.
pub trait Algebra {
    type Expr;

    fn symbol(&self, name: &str) -> Self::Expr;
    fn integer(&self, value: i64) -> Self::Expr;
    /// An integer literal too large for `i64`, as its decimal digits without
    /// leading zeros.
    fn big_integer(&self, digits: &str) -> Self::Expr;
    fn float(&self, value: f64) -> Self::Expr;
    fn constant(&self, constant: Constant) -> Self::Expr;

    /// The additive identity, used for empty sequences.
    fn zero(&self) -> Self::Expr {
        self.integer(0)
    }

    fn add(&self, lhs: Self::Expr, rhs: Self::Expr) -> Self::Expr;
    fn sub(&self, lhs: Self::Expr, rhs: Self::Expr) -> Self::Expr;
    fn mul(&self, lhs: Self::Expr, rhs: Self::Expr) -> Self::Expr;
    fn div(&self, lhs: Self::Expr, rhs: Self::Expr) -> Self::Expr;
    fn pow(&self, base: Self::Expr, exponent: Self::Expr) -> Self::Expr;
    /// An equality assertion `lhs = rhs`.
    fn equals(&self, lhs: Self::Expr, rhs: Self::Expr) -> Self::Expr;

    fn neg(&self, operand: Self::Expr) -> Self::Expr {
        self.sub(self.zero(), operand)
    }

    fn factorial(&self, operand: Self::Expr) -> Self::Expr {
        self.apply("factorial", vec![operand])
    }

    fn sin(&self, operand: Self::Expr) -> Self::Expr {
        self.apply("sin", vec![operand])
    }

    fn cos(&self, operand: Self::Expr) -> Self::Expr {
        self.apply("cos", vec![operand])
    }

    fn tan(&self, operand: Self::Expr) -> Self::Expr {
        self.apply("tan", vec![operand])
    }

    /// The `index`-th root of `radicand`.
    fn root(&self, radicand: Self::Expr, index: Self::Expr) -> Self::Expr;
    fn binomial(&self, n: Self::Expr, k: Self::Expr) -> Self::Expr;

    /// An integral over `var`; both bounds absent means indefinite.
    fn integral(
        &self,
        body: Self::Expr,
        var: Self::Expr,
        lower: Option<Self::Expr>,
        upper: Option<Self::Expr>,
    ) -> Self::Expr;

    fn summation(
        &self,
        body: Self::Expr,
        var: Self::Expr,
        lower: Self::Expr,
        upper: Self::Expr,
    ) -> Self::Expr;

    /// Applies the function `name` to `args`.
    fn apply(&self, name: &str, args: Vec<Self::Expr>) -> Self::Expr;

    /// Builds a matrix from row-major cells.
    fn matrix(&self, rows: Vec<Vec<Self::Expr>>) -> Result<Self::Expr, AlgebraError>;
    fn determinant(&self, matrix: Self::Expr) -> Result<Self::Expr, AlgebraError>;
}
