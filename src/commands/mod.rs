use std::io::Read as _;

use clap::ValueEnum;
use miette::{Context as _, IntoDiagnostic as _};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::auth::EnvToken;
use crate::cache::FileCache;
use crate::client::AnalysisClient;
use crate::config::Config;
use crate::normalize::NormalizedResult;
use crate::report::render_summary;
use crate::transport::ReqwestTransport;

pub mod classify;
pub mod fetch;
pub mod history;
pub mod normalize;
pub mod progress;
pub mod scan;

/// What every command gets from `main`: the resolved config and the token
/// cancelled on Ctrl-C.
pub struct Context {
    pub config: Config,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new(config: Config, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn client(&self) -> AnalysisClient<ReqwestTransport> {
        AnalysisClient::new(
            ReqwestTransport::new(self.config.timeout()),
            Box::new(EnvToken::new(&self.config.auth.token_env)),
            &self.config.api.base_url,
        )
        .with_retry(self.config.retry_policy())
    }

    pub fn cache(&self) -> miette::Result<FileCache> {
        Ok(FileCache::new(self.config.cache_dir()?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Summary,
}

/// Reads a JSON document from `input`, or from stdin when it is `-`.
pub fn read_payload(input: &str) -> miette::Result<Value> {
    let contents = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .into_diagnostic()
            .context("reading payload from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {input}"))?
    };

    serde_json::from_str(&contents)
        .into_diagnostic()
        .wrap_err_with(|| format!("{input} is not valid JSON"))
}

pub fn print_json<T: Serialize>(value: &T) -> miette::Result<()> {
    let rendered = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{rendered}");
    Ok(())
}

pub fn print_result(result: &NormalizedResult, format: OutputFormat) -> miette::Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Summary => {
            print!("{}", render_summary(result));
            Ok(())
        }
    }
}
