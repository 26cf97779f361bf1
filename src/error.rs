use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymstackError {
    #[error("Malformed genome: {0}")]
    MalformedGenome(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("no archive available")]
    EmptyArchive,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SymstackError>;
