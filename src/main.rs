use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use edmx_trimmer::{EdmxTrimmer, TracingReporter, TrimOptions};

/// Exit status for unusable command-line arguments.
const INVALID_ARGUMENTS: u8 = 160;

#[derive(Debug, Parser)]
#[command(
    name = "edmx-trimmer",
    version,
    about = "Trim an EDMX metadata document down to selected entity sets"
)]
struct Args {
    /// Source EDMX document
    #[arg(long, value_name = "PATH")]
    edmx_file: PathBuf,

    /// Destination file, overwritten if it exists
    #[arg(long, value_name = "PATH", default_value = "Output.edmx")]
    output_file_name: PathBuf,

    /// Entity sets or types to keep (comma separated, `?` and `*` wildcards)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    entities_to_keep: Vec<String>,

    /// Entity sets or types to drop after the keep filter
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    entities_to_exclude: Vec<String>,

    /// Treat entity and action names as regular expressions
    #[arg(long)]
    entities_are_regular_expressions: bool,

    /// Keep exactly these actions instead of the reachable ones
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    actions_to_include: Vec<String>,

    /// Remove Annotations blocks targeting the schema namespace
    #[arg(long)]
    remove_primary_annotations: bool,

    /// Remove every ActionImport
    #[arg(long)]
    remove_action_imports: bool,

    /// Remove every FunctionImport
    #[arg(long)]
    remove_function_imports: bool,

    /// Remove every ComplexType
    #[arg(long)]
    remove_complex_types: bool,

    /// Report entity set counts and log at info level
    #[arg(short, long)]
    verbose: bool,

    /// JSON options file; flags given here override or extend it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Args {
    fn into_options(self) -> Result<(TrimOptions, PathBuf, PathBuf)> {
        let mut options = match &self.config {
            Some(path) => TrimOptions::read_from_file(path)
                .with_context(|| format!("failed to load options from {}", path.display()))?,
            None => TrimOptions::default(),
        };
        options.entities_to_keep.extend(self.entities_to_keep);
        options.entities_to_exclude.extend(self.entities_to_exclude);
        options.actions_to_include.extend(self.actions_to_include);
        options.entities_are_regular_expressions |= self.entities_are_regular_expressions;
        options.remove_primary_annotations |= self.remove_primary_annotations;
        options.remove_action_imports |= self.remove_action_imports;
        options.remove_function_imports |= self.remove_function_imports;
        options.remove_complex_types |= self.remove_complex_types;
        options.verbose |= self.verbose;
        Ok((options, self.edmx_file, self.output_file_name))
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { INVALID_ARGUMENTS } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let (options, source, destination) = args.into_options()?;
    init_logging(options.verbose);

    let trimmer = EdmxTrimmer::new(options);
    let summary = trimmer
        .trim_file(&source, &destination, &mut TracingReporter)
        .with_context(|| format!("failed to trim {}", source.display()))?;

    tracing::debug!(
        "{} -> {}: {} of {} entity sets kept",
        source.display(),
        summary.destination.display(),
        summary.outcome.entity_sets_after,
        summary.outcome.entity_sets_before
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
