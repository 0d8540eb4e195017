mod client;
mod command;
mod response;

pub mod protocol;

mod error;
pub use error::{DecodeError, Error};

pub use client::{Client, DEFAULT_PORT};
pub use command::{Command, Emeter, System};
pub use response::{canonical_mac, DeviceInfo, Response};

pub type Result<T> = std::result::Result<T, Error>;
