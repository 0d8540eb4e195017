pub mod senml;

mod error;
pub use error::Error;

mod publisher;
pub use publisher::{connect_mqtt, Publisher};

mod topic;
pub use topic::Topic;

pub type Result<T> = std::result::Result<T, Error>;
