use clap::Parser as ClapParser;
use json_transformer::{
    ExecutorConfig, Input, PipelineConfig,
    cli::{self, CliError, RunOptions},
};
use log::LevelFilter;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "json-transform")]
#[command(about = "Transform JSON documents with src/dst assignment statements")]
#[command(version)]
struct Cli {
    /// JSON file, or directory of JSON files (reads from stdin if not provided)
    from_file: Option<PathBuf>,

    /// File with one statement per line; overrides -t
    #[arg(short = 'f', long)]
    code_file: Option<PathBuf>,

    /// Output file (path containing '.') or directory
    #[arg(short, long, default_value = "transform_results")]
    output: PathBuf,

    /// A statement to run; repeat for several, applied in order
    #[arg(short = 't', value_name = "STATEMENT")]
    transformers: Vec<String>,

    /// Stop at the first failing document instead of dropping it
    #[arg(long)]
    fail_fast: bool,

    /// Do not re-seed dst.messages[0] before each statement
    #[arg(long)]
    no_reseed: bool,

    /// Write single-file output without indentation
    #[arg(long)]
    compact: bool,

    /// Log each document and statement
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let transformers = cli::load_transformers(cli.code_file.as_deref(), &cli.transformers)?;

    let mut options = RunOptions {
        transformers,
        pipeline: PipelineConfig {
            continue_on_error: !cli.fail_fast,
        },
        ..RunOptions::default()
    };
    if cli.no_reseed {
        options.executor = ExecutorConfig { reseed: None };
    }

    let pipeline = cli::build_pipeline(&options)?;
    let input = read_input(cli.from_file)?;
    let output = pipeline.run(input)?;
    cli::save_results(&cli.output, &output, !cli.compact)
}

fn read_input(from_file: Option<PathBuf>) -> Result<Input, CliError> {
    match from_file {
        Some(path) => cli::load_documents(&path),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            cli::parse_documents(&buffer, "<stdin>")
        }
        None => Err(CliError::NoInput),
    }
}
