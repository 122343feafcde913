mod logging;
mod runner;
mod settings;
mod speech;
mod storage;

pub use logging::setup_logging;
pub use runner::run;
pub use settings::{Command, RunArgs, Settings};

use turn_nav_lib::NavError;
use turn_nav_lib::ports::StorageError;

/// Everything that can stop a command
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Nav(#[from] NavError),

    #[error("Cache error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No routes given and none cached from a previous run")]
    NoRoutes,

    #[error("Routes unavailable: {0}")]
    RoutesUnavailable(String),

    #[error("Fix file {0} holds no fixes")]
    NoFixes(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Fix producer failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
