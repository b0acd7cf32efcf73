//! Implementation of the `docmerge eval` command.

use docmerge::{Engine, compute_suggestions, evaluate, find_missing};
use miette::IntoDiagnostic;
use serde::Serialize;

use super::functions::builtin_functions;
use super::values::ValueArgs;
use crate::output::ExpressionDiagnostic;

/// Arguments for the eval command.
#[derive(Debug, clap::Args)]
pub struct EvalArgs {
    /// Field expression to evaluate
    #[arg(long = "expr", required = true)]
    pub expression: String,

    #[command(flatten)]
    pub values: ValueArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for eval results.
#[derive(Serialize)]
pub struct EvalResult {
    pub result: String,
}

/// A property the expression needs but was not given.
#[derive(Debug, Serialize)]
struct MissingJson {
    name: String,
    suggestions: Vec<String>,
}

/// Run the eval command.
pub fn run_eval(args: EvalArgs) -> miette::Result<i32> {
    let properties = args.values.load()?;
    let engine = Engine::with_functions(builtin_functions());

    let expression = match engine.parse(&args.expression) {
        Ok(expression) => expression,
        Err(e) => {
            return Err(ExpressionDiagnostic::from_parse_error(
                &args.expression,
                &e,
                engine.functions(),
            )
            .into());
        }
    };

    let missing = find_missing(&expression, &properties);
    if !missing.is_empty() {
        let available: Vec<&str> = properties.names().collect();
        let missing: Vec<MissingJson> = missing
            .into_iter()
            .map(|name| MissingJson {
                suggestions: compute_suggestions(&name, &available),
                name,
            })
            .collect();
        if args.json {
            let output = serde_json::json!({ "missing": missing });
            eprintln!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        } else {
            for field in &missing {
                if field.suggestions.is_empty() {
                    eprintln!("Missing value for field '{}'", field.name);
                } else {
                    eprintln!(
                        "Missing value for field '{}'; did you mean: {}?",
                        field.name,
                        field.suggestions.join(", ")
                    );
                }
            }
        }
        return Ok(exitcode::DATAERR);
    }

    match evaluate(&expression, &properties, engine.functions()) {
        Ok(result) => {
            if args.json {
                let output = EvalResult { result };
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                println!("{result}");
            }
            Ok(exitcode::OK)
        }
        Err(e) => {
            if args.json {
                let output = serde_json::json!({
                    "error": e.to_string()
                });
                eprintln!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                eprintln!("Evaluation error: {e}");
            }
            Ok(exitcode::DATAERR)
        }
    }
}
