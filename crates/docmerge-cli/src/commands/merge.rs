//! Implementation of the `docmerge merge` command.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use docmerge::{Engine, EnglishMessages, MergeError, MergeErrorVisitor, RussianMessages};
use miette::{IntoDiagnostic, Result, WrapErr};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::debug;

use super::functions::builtin_functions;
use super::values::ValueArgs;

/// Arguments for the merge command.
#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Template document (.docx or .xlsx)
    #[arg(long)]
    pub template: PathBuf,

    /// Where to write the merged document
    #[arg(long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub values: ValueArgs,

    /// Language of field error messages
    #[arg(long, value_enum, default_value_t = Language::En)]
    pub lang: Language,

    /// Exit with non-zero code if any field could not be merged
    #[arg(long)]
    pub strict: bool,

    /// Output field errors as JSON
    #[arg(long)]
    pub json: bool,
}

/// Language for rendering field errors.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Language {
    En,
    Ru,
}

impl Language {
    fn messages(self) -> &'static dyn MergeErrorVisitor {
        match self {
            Language::En => &EnglishMessages,
            Language::Ru => &RussianMessages,
        }
    }
}

/// JSON output for one field error.
#[derive(Debug, Serialize)]
struct MergeErrorJson {
    kind: &'static str,
    name: String,
    message: String,
}

fn kind(error: &MergeError) -> &'static str {
    match error {
        MergeError::InvalidExpression { .. } => "invalid_expression",
        MergeError::MissingField { .. } => "missing_field",
    }
}

/// Run the merge command.
pub fn run_merge(args: MergeArgs) -> Result<i32> {
    let properties = args.values.load()?;
    let engine = Engine::with_functions(builtin_functions());
    debug!(
        template = %args.template.display(),
        output = %args.output.display(),
        properties = properties.len(),
        "merging template"
    );

    let errors = engine
        .merge(&args.template, properties.iter(), &args.output)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to merge {}", args.template.display()))?;

    let messages = args.lang.messages();
    if args.json {
        let json: Vec<MergeErrorJson> = errors
            .iter()
            .map(|error| MergeErrorJson {
                kind: kind(error),
                name: error.subject().to_string(),
                message: error.accept(messages),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
    } else {
        for error in &errors {
            println!(
                "{} {}",
                "warning:".if_supports_color(Stream::Stdout, |text| text.yellow()),
                error.accept(messages)
            );
        }
        println!(
            "{} {} ({} field errors)",
            "Wrote".if_supports_color(Stream::Stdout, |text| text.green()),
            args.output.display(),
            errors.len()
        );
    }

    if args.strict && !errors.is_empty() {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}
