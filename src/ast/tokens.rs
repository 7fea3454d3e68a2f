#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e-3
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// String literal enclosed in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'item #1'
    /// ```
    String(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// True
    /// false
    /// ```
    Boolean(bool),

    /// Null value (`None` or `null`)
    Null,

    // Identifiers
    /// Bound name, attribute name, function or method name
    ///
    /// Must start with letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// src
    /// input_text
    /// _internal
    /// ```
    Identifier(String),

    // Keywords
    /// Logical AND
    And,

    /// Logical OR
    Or,

    /// Logical negation, also part of `not in`
    Not,

    /// Membership test
    In,

    /// Deletion statement
    ///
    /// # Examples
    /// ```text
    /// del dst.messages
    /// ```
    Del,

    // Assignment
    /// Plain assignment (`=`)
    Assign,

    /// Augmented assignment (`+=`)
    PlusAssign,

    /// Augmented assignment (`-=`)
    MinusAssign,

    /// Augmented assignment (`*=`)
    StarAssign,

    /// Augmented assignment (`/=`)
    SlashAssign,

    // Comparison
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Arithmetic
    /// Addition or concatenation
    Plus,

    /// Subtraction or negation
    Minus,

    /// Multiplication
    Star,

    /// True division
    Slash,

    /// Floor division
    DoubleSlash,

    /// Modulo
    Percent,

    // Delimiters
    /// Left bracket for index access and list literals
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis for grouping or calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left brace for object literals
    LBrace,

    /// Right brace
    RBrace,

    /// Dot for attribute access or method calls
    Dot,

    /// Comma for separating arguments, elements or tuple keys
    Comma,

    /// Colon for object literal key-value pairs
    Colon,

    /// End of statement
    Eof,
}
