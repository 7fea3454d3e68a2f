use crate::ast::{BinOp, Expr};

/// A single transformation statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Assignment to a path under `src` or `dst`
    ///
    /// `op` is set for augmented assignment.
    ///
    /// # Example
    /// ```text
    /// dst.greeting = src.observations[0].input[0]
    /// dst.count += 1
    /// ```
    Assign {
        target: Expr,
        op: Option<BinOp>,
        value: Expr,
    },

    /// Removal of the last key of a path
    ///
    /// # Example
    /// ```text
    /// del dst.messages
    /// ```
    Delete(Expr),

    /// Bare expression, evaluated for its side effects
    ///
    /// # Example
    /// ```text
    /// dst.placeholder
    /// ```
    Expr(Expr),

    /// Blank or comment-only line
    Pass,
}
