use anyhow::Context;
use clap::Parser;
use dadjoke::utils::{logger, validation::Validate};
use dadjoke::{plan_for, CiArgs, CiConfig, DockerCli, TaskRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CiArgs::parse();

    logger::init_ci_logger(args.verbose, args.json_logs);
    tracing::debug!("CI args: {:?}", args);

    let config = match &args.config {
        Some(path) => CiConfig::from_file(path)
            .with_context(|| format!("loading CI config from {}", path.display()))?,
        None => CiConfig::default(),
    };
    config.validate().context("invalid CI config")?;

    let plan = plan_for(args.task, &config, args.local);
    let runtime = DockerCli::new(&args.runtime, &config.source_dir);
    tracing::info!(
        "Using {} for {} ({})",
        args.runtime,
        config.app_name,
        if args.local { "local" } else { "remote" }
    );

    let runner = TaskRunner::new(runtime);
    let message = runner
        .run(&plan)
        .await
        .with_context(|| format!("Error {}", args.task))?;

    tracing::info!("{}", message);
    Ok(())
}
