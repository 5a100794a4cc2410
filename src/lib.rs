pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::CiArgs, CliConfig};

pub use adapters::DockerCli;
pub use config::ci_config::CiConfig;
pub use core::ci::{plan_for, TaskRunner};
pub use core::fetcher::{fetch_joke, JokeFetcher, DEFAULT_JOKE_URL};
pub use utils::error::{AppError, JokeError, RequestBuildError, Result};
