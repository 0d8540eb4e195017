use std::collections::HashMap;

use async_trait::async_trait;

mod error;
pub use error::Error;

mod etcd;
pub use etcd::Etcd;

mod memory;
pub use memory::Memory;

pub type Result<T> = std::result::Result<T, Error>;

/// Hierarchical key/value store. Keys are `/`-separated paths.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Direct children of `key`, keyed by the last path segment. A key that
    /// doesn't exist reads as an empty map.
    async fn read(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

pub fn join_key(parent: &str, leaf: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), leaf)
}

fn leaf(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
