//! Compile statements and run them over the loaded input

use log::info;

use super::CliError;
use crate::{
    Program,
    executor::{Executor, ExecutorConfig},
    pipeline::{Input, Output, Pipeline, PipelineConfig},
};

/// Options for a transformation run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Statement texts, in execution order
    pub transformers: Vec<String>,
    pub executor: ExecutorConfig,
    pub pipeline: PipelineConfig,
}

/// Compile the statements (and the reseed statement) into a ready pipeline.
///
/// Call this before reading any input so a bad statement is reported first.
pub fn build_pipeline(options: &RunOptions) -> Result<Pipeline, CliError> {
    let program = Program::compile(&options.transformers)?;
    info!("compiled {} statement(s)", program.len());

    let executor = Executor::new(program, &options.executor)?;
    Ok(Pipeline::new(executor, options.pipeline.clone()))
}

/// Compile the statements, then transform the input.
///
/// Compilation happens before any document is touched, so a bad statement is
/// reported even for an empty batch.
pub fn execute_run(options: &RunOptions, input: Input) -> Result<Output, CliError> {
    Ok(build_pipeline(options)?.run(input)?)
}
