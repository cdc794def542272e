use miette::{Context as _, IntoDiagnostic as _};
use tracing::debug;

pub mod model;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use model::*;

use crate::cache::FileCache;
use crate::transport::RetryPolicy;

pub const CONFIG_FILE: &str = "intake.toml";
pub const BASE_URL_ENV: &str = "INTAKE_API_BASE_URL";

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid config in {}", path.display()))?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> miette::Result<()> {
        let contents = toml::to_string_pretty(self).into_diagnostic()?;
        std::fs::write(path, contents).into_diagnostic()?;
        Ok(())
    }

    /// An explicit path must exist; otherwise `./intake.toml` is used when
    /// present and built-in defaults when not. Environment overrides apply
    /// last.
    pub fn resolve(explicit: Option<&Path>) -> miette::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let local = std::env::current_dir().into_diagnostic()?.join(CONFIG_FILE);

                if local.exists() {
                    Self::load(&local)?
                } else {
                    debug!("no {CONFIG_FILE} found, using defaults");
                    Self::default()
                }
            }
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            debug!(%base_url, "api base url overridden from environment");
            self.api.base_url = base_url;
        }

        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn cache_dir(&self) -> miette::Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(FileCache::default_location()?.dir().to_path_buf()),
        }
    }
}
