use std::fmt;
use std::net::Ipv4Addr;

use crate::supervisor;

#[derive(Debug)]
pub enum Error {
    Json(serde_json::Error),
    MissingVar(&'static str),
    InvalidVar(&'static str, String),
    UnknownDevice(String),
    Supervisor(Ipv4Addr, Box<supervisor::Error<Error>>),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::MissingVar(name) => write!(f, "set ENV variable {name}"),
            Self::InvalidVar(name, value) => write!(f, "invalid value of {name}: {value}"),
            Self::UnknownDevice(mac) => write!(f, "unknown device {mac}"),
            Self::Supervisor(ip, err) => write!(f, "polling {ip} stopped: {err}"),
        }
    }
}

impl std::error::Error for Error {}
