use std::fmt;

#[derive(Debug)]
pub enum Error {
    InvalidArgument(&'static str),
    Framing(&'static str),
    Decryption(DecodeError),
    EmptyResponse,
    MissingField(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Timeout(tokio::time::error::Elapsed),
}

/// Reasons a decrypted frame could not be turned into a value.
#[derive(Debug)]
pub enum DecodeError {
    Utf8(std::str::Utf8Error),
    Json(serde_json::Error),
    NotAnObject,
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::Decryption(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::Timeout(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Framing(msg) => write!(f, "framing error: {msg}"),
            Self::Decryption(err) => write!(f, "decryption error: {err}"),
            Self::EmptyResponse => write!(f, "empty response"),
            Self::MissingField(path) => write!(f, "missing field: {path}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Timeout(err) => write!(f, "timeout error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8(err) => write!(f, "invalid utf-8: {err}"),
            Self::Json(err) => write!(f, "invalid json: {err}"),
            Self::NotAnObject => write!(f, "expected a json object"),
        }
    }
}

impl std::error::Error for DecodeError {}
