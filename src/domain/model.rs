use serde::Deserialize;
use std::fmt;

/// Body returned by the joke API. Keys other than `joke` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Joke {
    pub joke: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TaskKind {
    /// Run the tests and a snapshot release build
    PullRequest,
    /// Publish a release
    Release,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::PullRequest => "pull-request",
            TaskKind::Release => "release",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheVolume {
    pub name: String,
    pub path: String,
}

/// Environment variable whose value is read from the host at run time and
/// never written into a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretVar {
    pub name: String,
    pub host_var: String,
}

/// A single file lifted out of another image and placed into the step's
/// container under `dest_dir`, keeping its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub image: String,
    pub path: String,
    pub dest_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerStep {
    pub name: String,
    pub image: String,
    pub workdir: Option<String>,
    pub source_mount: Option<String>,
    pub cache_volumes: Vec<CacheVolume>,
    pub env: Vec<(String, String)>,
    pub secrets: Vec<SecretVar>,
    pub image_files: Vec<ImageFile>,
    pub args: Vec<String>,
    pub export: Option<String>,
}

impl ContainerStep {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Copies the host source directory into the container at `path`.
    pub fn with_source(mut self, path: impl Into<String>) -> Self {
        self.source_mount = Some(path.into());
        self
    }

    pub fn with_workdir(mut self, path: impl Into<String>) -> Self {
        self.workdir = Some(path.into());
        self
    }

    pub fn with_cache(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.cache_volumes.push(CacheVolume {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_secret(mut self, name: impl Into<String>, host_var: impl Into<String>) -> Self {
        self.secrets.push(SecretVar {
            name: name.into(),
            host_var: host_var.into(),
        });
        self
    }

    pub fn with_file_from_image(
        mut self,
        image: impl Into<String>,
        path: impl Into<String>,
        dest_dir: impl Into<String>,
    ) -> Self {
        self.image_files.push(ImageFile {
            image: image.into(),
            path: path.into(),
            dest_dir: dest_dir.into(),
        });
        self
    }

    pub fn with_exec<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Directory, relative to the workdir, copied back to the same relative
    /// path on the host once the step succeeds.
    pub fn with_export(mut self, path: impl Into<String>) -> Self {
        self.export = Some(path.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TaskPlan {
    pub task: TaskKind,
    pub steps: Vec<ContainerStep>,
    pub success_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joke_ignores_extra_keys() {
        let joke: Joke =
            serde_json::from_str(r#"{"id":"R7UfaahVfFd","joke":"Hi","status":200}"#).unwrap();
        assert_eq!(joke.joke, "Hi");
    }

    #[test]
    fn test_joke_requires_joke_key() {
        assert!(serde_json::from_str::<Joke>(r#"{"status":200}"#).is_err());
    }

    #[test]
    fn test_container_step_builder() {
        let step = ContainerStep::new("test", "rust:1.80")
            .with_source("/src")
            .with_workdir("/src")
            .with_cache("cargo-registry", "/usr/local/cargo/registry")
            .with_env("CARGO_TERM_COLOR", "never")
            .with_secret("GITHUB_TOKEN", "GITHUB_TOKEN")
            .with_exec(["cargo", "test"]);

        assert_eq!(step.image, "rust:1.80");
        assert_eq!(step.source_mount.as_deref(), Some("/src"));
        assert_eq!(step.cache_volumes[0].name, "cargo-registry");
        assert_eq!(step.secrets[0].host_var, "GITHUB_TOKEN");
        assert_eq!(step.args, vec!["cargo", "test"]);
        assert!(step.export.is_none());
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::PullRequest.to_string(), "pull-request");
        assert_eq!(TaskKind::Release.to_string(), "release");
    }
}
