use clap::Parser;
use dadjoke::utils::{logger, validation::Validate};
use dadjoke::{CliConfig, JokeFetcher};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::debug!("Configuration validation failed: {:?}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let fetcher = match JokeFetcher::with_settings(config.timeout(), &config.user_agent) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::debug!(kind = e.kind(), "Could not set up HTTP client: {:?}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match fetcher.fetch(&config.url).await {
        Ok(joke) => println!("{}", joke),
        Err(e) => {
            tracing::debug!(kind = e.kind(), "Failed to fetch joke: {:?}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
