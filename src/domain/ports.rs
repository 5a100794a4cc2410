use crate::domain::model::ContainerStep;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Something that can run one container step to completion.
///
/// Implementations must release everything they created for the step
/// (containers, helper containers) before returning, on success and on error.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn run_step(&self, step: &ContainerStep) -> Result<()>;
}
