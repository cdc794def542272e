use clap::Args as ClapArgs;

use super::{Context, print_json};

#[derive(ClapArgs, Debug)]
pub struct Args {}

pub async fn run(_args: Args, context: &Context) -> miette::Result<()> {
    let history = context.client().history(&context.cancel).await?;

    print_json(&history)
}
