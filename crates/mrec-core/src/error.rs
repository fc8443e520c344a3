//! Error types for mrec

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Record with id {0} not found")]
    NotFound(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[source] csv::Error),

    #[error("Malformed row {row}: invalid {field}")]
    Malformed { row: usize, field: &'static str },

    #[error("Config error: {0}")]
    Config(String),
}

/// I/O failures inside the CSV reader or writer surface as `Error::Io`
impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return Error::Csv(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            kind => Error::Io(std::io::Error::other(format!("{:?}", kind))),
        }
    }
}
