mod cache;
mod config;
mod error;
mod gatherer;
mod measurement;
mod range;

pub mod supervisor;

pub use cache::{IdentityMap, IpCache};
pub use config::{Config, GathererConfig};
pub use error::Error;
pub use gatherer::Gatherer;
pub use range::ip_range;
pub use supervisor::{State, Supervisor};

pub type Result<T> = std::result::Result<T, Error>;
