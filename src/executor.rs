//! Runs a compiled [`Program`] against one document.
//!
//! Each document gets a fresh `src`/`dst` pair. Before every statement the
//! reseed statement (by default `dst.messages[0] = src.observations[0].input[0]`)
//! is executed, so the conversation seed is always present in the output no
//! matter what the previous statement did to it.
//!
//! # Examples
//!
//! ```
//! use json_transformer::{Executor, ExecutorConfig, Program};
//! use serde_json::json;
//!
//! let program = Program::compile(["dst.greeting = src.observations[0].input[0]"]).unwrap();
//! let executor = Executor::new(program, &ExecutorConfig::default()).unwrap();
//!
//! let output = executor
//!     .execute(json!({"observations": [{"input": ["hello"]}]}))
//!     .unwrap();
//! assert_eq!(output, json!({"messages": ["hello"], "greeting": "hello"}));
//! ```

use log::debug;
use serde_json::Value as Json;
use thiserror::Error;

use crate::{
    ast::{Program, SourceStatement},
    evaluator::{EvalError, Evaluator},
    parser::{CompileError, parse_statement},
    tree::{TreeError, TreeView},
};

/// Statement run before every program statement unless configured otherwise.
pub const DEFAULT_RESEED: &str = "dst.messages[0] = src.observations[0].input[0]";

/// Errors raised while transforming a single document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A statement failed; `index` is `None` for the reseed statement
    #[error("{} `{statement}` failed: {source}", describe(.index))]
    Statement {
        index: Option<usize>,
        statement: String,
        source: EvalError,
    },

    /// The input document cannot be bound as `src`
    #[error("input document: {0}")]
    Source(TreeError),

    /// `dst` cannot be turned back into plain JSON
    #[error("output document: {0}")]
    Materialize(TreeError),
}

fn describe(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("statement {}", i),
        None => "reseed statement".to_string(),
    }
}

/// Executor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    /// Statement re-established before each program statement; `None` disables it
    pub reseed: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            reseed: Some(DEFAULT_RESEED.to_string()),
        }
    }
}

/// Applies a program to documents, one fresh binding per document.
#[derive(Debug, Clone)]
pub struct Executor {
    program: Program,
    reseed: Option<SourceStatement>,
}

impl Executor {
    /// Compiles the configured reseed statement alongside `program`.
    pub fn new(program: Program, config: &ExecutorConfig) -> Result<Self, CompileError> {
        let reseed = match &config.reseed {
            Some(text) => {
                let statement = parse_statement(text).map_err(|source| CompileError {
                    index: 0,
                    statement: text.clone(),
                    source,
                })?;
                Some(SourceStatement {
                    text: text.clone(),
                    statement,
                })
            }
            None => None,
        };
        Ok(Executor { program, reseed })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Transforms one document into the materialized `dst`.
    pub fn execute(&self, document: Json) -> Result<Json, TransformError> {
        let src = TreeView::from_json(document).map_err(TransformError::Source)?;
        let dst = self.execute_view(src)?;
        dst.to_plain().map_err(TransformError::Materialize)
    }

    /// Transforms an already wrapped `src`, returning `dst` unmaterialized.
    pub fn execute_view(&self, src: TreeView) -> Result<TreeView, TransformError> {
        let mut evaluator = Evaluator::new(src);

        for (index, statement) in self.program.iter().enumerate() {
            if let Some(reseed) = &self.reseed {
                run(&mut evaluator, None, reseed)?;
            }
            debug!("statement {}: {}", index, statement.text);
            run(&mut evaluator, Some(index), statement)?;
        }

        Ok(evaluator.into_dst())
    }
}

fn run(
    evaluator: &mut Evaluator,
    index: Option<usize>,
    statement: &SourceStatement,
) -> Result<(), TransformError> {
    evaluator
        .exec(&statement.statement)
        .map_err(|source| TransformError::Statement {
            index,
            statement: statement.text.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn executor(statements: &[&str], reseed: Option<&str>) -> Executor {
        let config = ExecutorConfig {
            reseed: reseed.map(str::to_string),
        };
        Executor::new(Program::compile(statements.iter().copied()).unwrap(), &config).unwrap()
    }

    #[test]
    fn test_no_statements_no_reseed() {
        let output = executor(&[], Some(DEFAULT_RESEED))
            .execute(json!({"observations": [{"input": ["hi"]}]}))
            .unwrap();
        assert_eq!(output, json!({}));
    }

    #[test]
    fn test_failing_reseed_has_no_index() {
        let err = executor(&["dst.a = 1"], Some(DEFAULT_RESEED))
            .execute(json!({"other": 1}))
            .unwrap_err();
        match err {
            TransformError::Statement { index, .. } => assert_eq!(index, None),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_reseed_is_compile_error() {
        let config = ExecutorConfig {
            reseed: Some("dst.messages[0] =".to_string()),
        };
        assert!(Executor::new(Program::default(), &config).is_err());
    }
}
