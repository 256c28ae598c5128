use thiserror::Error;

use crate::store::EntryId;

pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Name already in table: {0}.")]
    DuplicateName(String),
    #[error("Name's length must be between {min} and {max} characters.")]
    InvalidLength { min: usize, max: usize },
    #[error("No such key: {0}.")]
    UnknownId(String),
    #[error("The database is empty.")]
    EmptyStore,
    #[error("Transport is closed: {0}")]
    TransportClosed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TableError {
    pub(crate) fn unknown_id(id: EntryId) -> Self {
        Self::UnknownId(id.to_string())
    }
}

impl rpc::HandlerError for TableError {
    fn kind(&self) -> &'static str {
        match self {
            TableError::DuplicateName(_) => "DuplicateName",
            TableError::InvalidLength { .. } => "InvalidLength",
            TableError::UnknownId(_) => "UnknownId",
            TableError::EmptyStore => "EmptyStore",
            TableError::TransportClosed(_) => "TransportClosed",
            TableError::Config(_) => "Config",
            TableError::Io(_) => "Io",
        }
    }
}

impl From<toml::de::Error> for TableError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<url::ParseError> for TableError {
    fn from(e: url::ParseError) -> Self {
        Self::Config(e.to_string())
    }
}
