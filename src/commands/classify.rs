use clap::Args as ClapArgs;

use super::read_payload;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// JSON file with the backend payload, or `-` for stdin
    pub input: String,
}

pub fn run(args: Args) -> miette::Result<()> {
    let payload = read_payload(&args.input)?;

    println!("{}", crate::normalize::classify(&payload));
    Ok(())
}
