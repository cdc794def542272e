use clap::Args as ClapArgs;

use super::{OutputFormat, print_result, read_payload};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// JSON file with the backend payload, or `-` for stdin
    pub input: String,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub fn run(args: Args) -> miette::Result<()> {
    let payload = read_payload(&args.input)?;
    let result = crate::normalize::normalize(&payload);

    print_result(&result, args.format)
}
