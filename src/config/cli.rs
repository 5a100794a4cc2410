use crate::domain::model::TaskKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ci")]
#[command(about = "Runs the containerized CI tasks for dadjoke")]
pub struct CiArgs {
    #[arg(long, help = "Whether to run locally; exports build output to the host")]
    pub local: bool,

    #[arg(long, help = "TOML file overriding the default pipeline settings")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "docker", help = "Container runtime CLI to call")]
    pub runtime: String,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(value_enum)]
    pub task: TaskKind,
}
