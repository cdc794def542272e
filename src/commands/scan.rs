use std::path::PathBuf;

use clap::Args as ClapArgs;

use super::{OutputFormat, print_result};
use crate::local::{LocalAnalyzer, collect_sources};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Files or directories to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

pub fn run(args: Args) -> miette::Result<()> {
    let files = collect_sources(&args.paths)?;
    let analyzer = LocalAnalyzer::new()?;

    let result = analyzer.analyze(&files);

    print_result(&result, args.format)
}
