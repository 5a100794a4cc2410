use thiserror::Error;

/// Failure classes of a single joke fetch. Each one keeps the underlying cause.
#[derive(Error, Debug)]
pub enum JokeError {
    #[error("error creating request: {0}")]
    RequestConstruction(#[source] RequestBuildError),

    #[error("error getting response: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("error reading response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    #[error("error decoding response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl JokeError {
    /// Short, stable name of the failure class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            JokeError::RequestConstruction(_) => "request_construction",
            JokeError::Transport(_) => "transport",
            JokeError::BodyRead(_) => "body_read",
            JokeError::Decode(_) => "decode",
        }
    }
}

/// Why a request could not be built from the given address.
#[derive(Error, Debug)]
pub enum RequestBuildError {
    #[error("invalid control character {0:?} in URL")]
    ControlCharacter(char),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Joke(#[from] JokeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Container runtime error: {message}")]
    RuntimeError { message: String },

    #[error("Task {task} failed at step '{step}': {message}")]
    TaskError {
        task: String,
        step: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
