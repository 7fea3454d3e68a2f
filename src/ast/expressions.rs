use crate::ast::BinOp;

/// Abstract Syntax Tree node representing a parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 42.0
    /// ```
    Float(f64),

    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// 'hello'
    /// ```
    String(String),

    /// Boolean literal (`True`, `true`, `False`, `false`)
    Boolean(bool),

    /// Null literal (`None`, `null`)
    Null,

    // References
    /// Bound name
    ///
    /// Only `src` and `dst` resolve; anything else fails at evaluation.
    Name(String),

    // Access
    /// Attribute-style access, creating a placeholder when missing
    ///
    /// # Examples
    /// ```text
    /// dst.messages
    /// src.observations
    /// ```
    Attr { object: Box<Expr>, name: String },

    /// Index-style access; more than one key projects a tuple of keys
    ///
    /// # Examples
    /// ```text
    /// src.items[0]
    /// src["user-name"]
    /// src["a", "b"]
    /// ```
    Index { object: Box<Expr>, keys: Vec<Expr> },

    // Operations
    /// Binary operation (arithmetic, comparison, logical, membership)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical negation (`not x`)
    Not(Box<Expr>),

    /// Arithmetic negation (`-x`)
    Negate(Box<Expr>),

    /// Builtin function call
    ///
    /// # Example
    /// ```text
    /// len(src.items)
    /// ```
    Call { function: String, args: Vec<Expr> },

    /// Method call
    ///
    /// # Examples
    /// ```text
    /// src.name.upper()
    /// src.tags.keys()
    /// ```
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },

    // Object and Array Literals
    /// Object literal
    ///
    /// # Example
    /// ```text
    /// {"name": src.name, "total": src.total}
    /// ```
    Object(Vec<(String, Expr)>),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [src.item1, src.item2]
    /// ```
    Array(Vec<Expr>),
}

impl Expr {
    /// Whether the expression is an access chain rooted at a name, i.e. something
    /// that can be assigned to or deleted.
    pub fn is_place(&self) -> bool {
        match self {
            Expr::Attr { object, .. } | Expr::Index { object, .. } => {
                matches!(object.as_ref(), Expr::Name(_)) || object.is_place()
            }
            _ => false,
        }
    }
}
