pub mod ci_config;
#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
use crate::core::fetcher::{DEFAULT_JOKE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
pub const MAX_TIMEOUT_SECS: u64 = 600;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "dadjoke")]
#[command(about = "Fetches a random dad joke and prints it")]
pub struct CliConfig {
    #[arg(long, env = "DADJOKE_URL", default_value = DEFAULT_JOKE_URL)]
    pub url: String,

    #[arg(
        long,
        env = "DADJOKE_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Request timeout in seconds, 0 waits forever"
    )]
    pub timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("url", &self.url)?;
        validate_range("timeout_secs", self.timeout_secs, 0, MAX_TIMEOUT_SECS)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        Ok(())
    }
}
