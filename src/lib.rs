//! Transforms JSON documents by running short Python-flavoured statements
//! against a `src` (input) and `dst` (output) tree.
//!
//! ```
//! use json_transformer::{Executor, ExecutorConfig, Pipeline, PipelineConfig, Program};
//! use serde_json::json;
//!
//! let program = Program::compile(["dst.a = 1", "dst.a = dst.a + 1"]).unwrap();
//! let executor = Executor::new(program, &ExecutorConfig { reseed: None }).unwrap();
//! let pipeline = Pipeline::new(executor, PipelineConfig::default());
//!
//! assert_eq!(pipeline.transform(json!({})).unwrap(), json!({"a": 2}));
//! ```
pub mod ast;
pub mod cli;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod transform;
pub mod tree;
pub mod value;

pub use ast::{BinOp, Expr, Program, Statement, Token};
pub use evaluator::{EvalError, Evaluator};
pub use executor::{DEFAULT_RESEED, Executor, ExecutorConfig, TransformError};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{CompileError, ParseError, Parser};
pub use pipeline::{BatchReport, Input, Output, Pipeline, PipelineConfig};
pub use tree::{Form, Key, TreeError, TreeView};
pub use value::Value;
