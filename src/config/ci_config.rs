use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_container_path, validate_non_empty_string, validate_path, Validate,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Settings for the containerized CI tasks. Every field has a default, so an
/// empty TOML file (or no file at all) gives the stock pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    pub app_name: String,
    pub source_dir: String,
    pub build_path: String,
    pub cache_volume: String,
    pub toolchain: ToolchainConfig,
    pub release: ReleaseConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub image: String,
    pub version: String,
    pub cache_path: String,
    pub test_command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub image: String,
    pub version: String,
    pub sbom_image: String,
    pub sbom_version: String,
    pub sbom_binary: String,
    /// Variable name inside the release container
    pub token_name: String,
    /// Host variable the token is read from
    pub token_env: String,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            app_name: "dadjoke".to_string(),
            source_dir: ".".to_string(),
            build_path: "dist".to_string(),
            cache_volume: "cargo-registry".to_string(),
            toolchain: ToolchainConfig::default(),
            release: ReleaseConfig::default(),
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        let mut env = BTreeMap::new();
        env.insert("CARGO_TERM_COLOR".to_string(), "never".to_string());

        Self {
            image: "rust".to_string(),
            version: "1.80-alpine".to_string(),
            cache_path: "/usr/local/cargo/registry".to_string(),
            test_command: vec!["cargo".to_string(), "test".to_string()],
            env,
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            image: "goreleaser/goreleaser".to_string(),
            version: "v2.5.0".to_string(),
            sbom_image: "anchore/syft".to_string(),
            sbom_version: "v0.76.0".to_string(),
            sbom_binary: "/syft".to_string(),
            token_name: "GITHUB_TOKEN".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

impl CiConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of `VAR`; unknown variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }
}

impl Validate for CiConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("app_name", &self.app_name)?;
        validate_path("source_dir", &self.source_dir)?;
        validate_path("build_path", &self.build_path)?;
        validate_non_empty_string("cache_volume", &self.cache_volume)?;

        validate_non_empty_string("toolchain.image", &self.toolchain.image)?;
        validate_non_empty_string("toolchain.version", &self.toolchain.version)?;
        validate_container_path("toolchain.cache_path", &self.toolchain.cache_path)?;
        if self.toolchain.test_command.is_empty() {
            return Err(AppError::InvalidConfigValueError {
                field: "toolchain.test_command".to_string(),
                value: "[]".to_string(),
                reason: "Test command cannot be empty".to_string(),
            });
        }

        validate_non_empty_string("release.image", &self.release.image)?;
        validate_non_empty_string("release.version", &self.release.version)?;
        validate_non_empty_string("release.sbom_image", &self.release.sbom_image)?;
        validate_non_empty_string("release.sbom_version", &self.release.sbom_version)?;
        validate_container_path("release.sbom_binary", &self.release.sbom_binary)?;
        validate_non_empty_string("release.token_name", &self.release.token_name)?;
        validate_non_empty_string("release.token_env", &self.release.token_env)?;

        if Path::new(&self.build_path).is_absolute() || self.build_path.contains("..") {
            return Err(AppError::InvalidConfigValueError {
                field: "build_path".to_string(),
                value: self.build_path.clone(),
                reason: "Build path must stay inside the source directory".to_string(),
            });
        }

        Ok(())
    }
}
