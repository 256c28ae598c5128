use std::io;
use thiserror::Error;
use tinytable::TableError;

#[derive(Debug, Error)]
pub enum ScriptParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} needs an argument")]
    MissingArgument(String),

    #[error("{0} takes no argument")]
    UnexpectedArgument(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Session failed: {0}")]
    SessionFailed(String),

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    TableError(#[from] TableError),
}
