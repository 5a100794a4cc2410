use crate::config::ci_config::CiConfig;
use crate::domain::model::{ContainerStep, TaskKind, TaskPlan};
use crate::domain::ports::ContainerRuntime;
use crate::utils::error::{AppError, Result};

pub const SOURCE_MOUNT: &str = "/src";

/// Toolchain container that runs the test suite against the mounted source.
pub fn test_step(config: &CiConfig) -> ContainerStep {
    let toolchain = &config.toolchain;
    let mut step = ContainerStep::new(
        "test",
        format!("{}:{}", toolchain.image, toolchain.version),
    )
    .with_source(SOURCE_MOUNT)
    .with_workdir(SOURCE_MOUNT)
    .with_cache(&config.cache_volume, &toolchain.cache_path);

    for (key, value) in &toolchain.env {
        step = step.with_env(key, value);
    }

    step.with_exec(&toolchain.test_command)
}

/// Release packaging container with the SBOM tool binary copied in and the
/// publishing token injected as a secret.
pub fn release_step(config: &CiConfig, args: &[&str]) -> ContainerStep {
    let release = &config.release;
    ContainerStep::new(
        "release",
        format!("{}:{}", release.image, release.version),
    )
    .with_cache(&config.cache_volume, &config.toolchain.cache_path)
    .with_file_from_image(
        format!("{}:{}", release.sbom_image, release.sbom_version),
        &release.sbom_binary,
        "/bin",
    )
    .with_source(SOURCE_MOUNT)
    .with_workdir(SOURCE_MOUNT)
    .with_env("TINI_SUBREAPER", "true")
    .with_secret(&release.token_name, &release.token_env)
    .with_exec(args.iter().copied())
}

pub fn pull_request_plan(config: &CiConfig, local: bool) -> TaskPlan {
    let mut build = release_step(config, &["release", "--snapshot", "--clean"]);
    build.name = "snapshot-build".to_string();
    if local {
        build = build.with_export(&config.build_path);
    }

    TaskPlan {
        task: TaskKind::PullRequest,
        steps: vec![test_step(config), build],
        success_message: "Pull-Request tasks completed successfully!".to_string(),
    }
}

pub fn release_plan(config: &CiConfig) -> TaskPlan {
    TaskPlan {
        task: TaskKind::Release,
        steps: vec![release_step(config, &["--clean"])],
        success_message: "Release tasks completed successfully!".to_string(),
    }
}

pub fn plan_for(task: TaskKind, config: &CiConfig, local: bool) -> TaskPlan {
    match task {
        TaskKind::PullRequest => pull_request_plan(config, local),
        TaskKind::Release => release_plan(config),
    }
}

/// Runs the steps of a plan in order, stopping at the first failure.
pub struct TaskRunner<R: ContainerRuntime> {
    runtime: R,
}

impl<R: ContainerRuntime> TaskRunner<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub async fn run(&self, plan: &TaskPlan) -> Result<String> {
        tracing::info!("Running task {} ({} steps)", plan.task, plan.steps.len());

        for (index, step) in plan.steps.iter().enumerate() {
            tracing::info!(
                "▶ Step {}/{}: {} ({})",
                index + 1,
                plan.steps.len(),
                step.name,
                step.image
            );

            self.runtime
                .run_step(step)
                .await
                .map_err(|e| AppError::TaskError {
                    task: plan.task.to_string(),
                    step: step.name.clone(),
                    message: e.to_string(),
                })?;

            tracing::info!("✅ Step {} passed", step.name);
            if let Some(export) = &step.export {
                tracing::info!("📁 Exported {} to local successfully!", export);
            }
        }

        Ok(plan.success_message.clone())
    }
}
