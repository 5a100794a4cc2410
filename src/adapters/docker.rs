use crate::domain::model::{ContainerStep, ImageFile};
use crate::domain::ports::ContainerRuntime;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs container steps by shelling out to the `docker` CLI (or a
/// command-compatible one such as `podman`).
///
/// Sources are copied into the container rather than bind-mounted, so a step
/// only changes the host through an explicit export.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    source_dir: PathBuf,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            source_dir: source_dir.into(),
        }
    }

    /// Arguments for `docker create` of the step's main container. Secrets
    /// appear by name only; their values travel through the environment of
    /// the CLI process.
    pub fn create_args(step: &ContainerStep) -> Vec<String> {
        let mut args = vec!["create".to_string()];

        if let Some(workdir) = &step.workdir {
            args.push("--workdir".to_string());
            args.push(workdir.clone());
        }

        for cache in &step.cache_volumes {
            args.push("--volume".to_string());
            args.push(format!("{}:{}", cache.name, cache.path));
        }

        for (key, value) in &step.env {
            args.push("--env".to_string());
            args.push(format!("{}={}", key, value));
        }

        for secret in &step.secrets {
            args.push("--env".to_string());
            args.push(secret.name.clone());
        }

        args.push(step.image.clone());
        args.extend(step.args.iter().cloned());
        args
    }

    fn command(&self, args: &[String]) -> Command {
        tracing::debug!("{} {}", self.binary, args.join(" "));
        let mut command = Command::new(&self.binary);
        command.args(args).kill_on_drop(true);
        command
    }

    /// Runs a short CLI call and returns its trimmed stdout.
    async fn output(&self, args: &[String]) -> Result<String> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(AppError::RuntimeError {
                message: format!(
                    "`{} {}` exited with {}: {}",
                    self.binary,
                    args.first().map(String::as_str).unwrap_or_default(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn output_bytes(&self, args: &[String]) -> Result<Vec<u8>> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(AppError::RuntimeError {
                message: format!(
                    "copy out of container failed with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(output.stdout)
    }

    async fn input_bytes(&self, args: &[String], data: &[u8]) -> Result<()> {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(data).await?;
            // Dropping stdin closes the pipe so the CLI sees EOF.
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(AppError::RuntimeError {
                message: format!(
                    "copy into container failed with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }

    fn spawn_error(&self, e: std::io::Error) -> AppError {
        AppError::RuntimeError {
            message: format!("failed to run `{}`: {}", self.binary, e),
        }
    }

    /// Pulls one file out of an image as a tar stream.
    async fn extract_file(&self, file: &ImageFile, created: &mut Vec<String>) -> Result<Vec<u8>> {
        let id = self
            .output(&["create".to_string(), file.image.clone()])
            .await?;
        created.push(id.clone());

        self.output_bytes(&["cp".to_string(), format!("{}:{}", id, file.path), "-".to_string()])
            .await
    }

    async fn run_step_inner(&self, step: &ContainerStep, created: &mut Vec<String>) -> Result<()> {
        let mut archives = Vec::with_capacity(step.image_files.len());
        for file in &step.image_files {
            tracing::debug!("Copying {} out of {}", file.path, file.image);
            let tar = self.extract_file(file, created).await?;
            archives.push((file, tar));
        }

        let mut create = self.command(&Self::create_args(step));
        for secret in &step.secrets {
            let value = std::env::var(&secret.host_var).unwrap_or_else(|_| {
                tracing::warn!("Secret source {} is not set, passing empty value", secret.host_var);
                String::new()
            });
            create.env(&secret.name, value);
        }

        let output = create
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(AppError::RuntimeError {
                message: format!(
                    "creating {} failed with {}: {}",
                    step.image,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        created.push(id.clone());

        if let Some(mount) = &step.source_mount {
            let source = format!("{}/.", self.source_dir.display());
            self.output(&["cp".to_string(), source, format!("{}:{}", id, mount)])
                .await?;
        }

        for (file, tar) in &archives {
            self.input_bytes(
                &["cp".to_string(), "-".to_string(), format!("{}:{}", id, file.dest_dir)],
                tar,
            )
            .await?;
        }

        let status = self
            .command(&["start".to_string(), "--attach".to_string(), id.clone()])
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;
        if !status.success() {
            return Err(AppError::RuntimeError {
                message: format!("{} exited with {}", step.image, status),
            });
        }

        if let Some(export) = &step.export {
            let workdir = step.workdir.as_deref().unwrap_or("/");
            let container_path = Path::new(workdir).join(export);
            let host_path = self.source_dir.join(export);
            tokio::fs::create_dir_all(&host_path).await?;

            self.output(&[
                "cp".to_string(),
                format!("{}:{}/.", id, container_path.display()),
                host_path.display().to_string(),
            ])
            .await?;
        }

        Ok(())
    }

    async fn remove(&self, id: &str) {
        let args = ["rm".to_string(), "--force".to_string(), id.to_string()];
        if let Err(e) = self.output(&args).await {
            tracing::warn!("Failed to remove container {}: {}", id, e);
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn run_step(&self, step: &ContainerStep) -> Result<()> {
        let mut created = Vec::new();
        let result = self.run_step_inner(step, &mut created).await;

        for id in created.iter().rev() {
            self.remove(id).await;
        }
        tracing::debug!("Removed {} container(s) for step {}", created.len(), step.name);

        result
    }
}
