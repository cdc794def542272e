use clap::Args as ClapArgs;

use super::{Context, print_json};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Id of the analysis task
    pub task_id: String,
}

pub async fn run(args: Args, context: &Context) -> miette::Result<()> {
    let client = context.client();
    let cache = context.cache()?;

    let progress = client
        .progress(&args.task_id, &cache, &context.cancel)
        .await;

    print_json(&progress)
}
