use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("expense '{title}' rejected: {source}")]
    Expense {
        title: String,
        #[source]
        source: EngineError,
    },
    #[error("activity '{title}' rejected: {source}")]
    Activity {
        title: String,
        #[source]
        source: EngineError,
    },
    #[error("invalid argument: {0}")]
    Argument(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
