pub mod ci;
pub mod fetcher;

pub use crate::domain::model::{ContainerStep, Joke, TaskKind, TaskPlan};
pub use crate::domain::ports::ContainerRuntime;
pub use crate::utils::error::Result;
