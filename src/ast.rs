//! # Statement language - Abstract Syntax Tree
//!
//! Transformation statements are single lines of a small, Python-flavoured
//! language with exactly two bound names: `src`, the input document, and
//! `dst`, the document being built.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, access, operations, calls)
//! - **[operators]** - Binary operators (comparison, arithmetic, logical)
//! - **[statements]** - Assignment, deletion and bare expressions
//! - **[program]** - The compiled statement sequence of a run
//!
//! ## Quick Start
//!
//! ```text
//! dst.greeting = src.observations[0].input[0]
//! dst.user.name = src.first + " " + src.last
//! dst.tags[0] = "new"
//! dst.count += 1
//! del dst.messages
//! ```
//!
//! ## Access
//!
//! - `x.name` reads attribute-style: a missing name is created as an empty object
//! - `x[key]` reads index-style: a missing key is an error
//! - `x[a, b]` projects the keys `a` and `b` into a new object
//!
//! Writing an integer key (`dst.tags[0] = ...`) turns the container into a list.
pub mod expressions;
pub mod operators;
pub mod program;
pub mod statements;
pub mod tokens;

pub use expressions::Expr;
pub use operators::BinOp;
pub use program::{Program, SourceStatement};
pub use statements::Statement;
pub use tokens::Token;
