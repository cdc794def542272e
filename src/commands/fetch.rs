use clap::Args as ClapArgs;
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use super::{Context, OutputFormat, print_json, print_result};
use crate::client::ResultsOutcome;

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(help("Run `intake scan <PATH>` to analyze the sources locally instead"))]
struct FetchFailed {
    message: String,
}

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Id of the analysis task
    pub task_id: String,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub async fn run(args: Args, context: &Context) -> miette::Result<()> {
    let client = context.client();
    let cache = context.cache()?;

    let outcome = client
        .fetch_analysis_results(&args.task_id, &cache, &context.cancel)
        .await;

    match outcome {
        ResultsOutcome::Fresh(result) => print_result(&result, args.format),
        ResultsOutcome::Cached(result) => {
            info!(task_id = %args.task_id, "backend unreachable, showing last known results");
            eprintln!("note: the backend is unreachable, showing the last known results");
            print_result(&result, args.format)
        }
        ResultsOutcome::Failed(failure) => {
            if args.format == OutputFormat::Json {
                print_json(&failure)?;
            }

            Err(FetchFailed {
                message: failure.message,
            }
            .into())
        }
    }
}
