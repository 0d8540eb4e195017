use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{join_key, leaf, Registry, Result};

/// Registry kept in process memory.
#[derive(Debug, Default)]
pub struct Memory {
    values: Mutex<BTreeMap<String, String>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `parent` with `children`, the way [`Registry::read`] returns
    /// them.
    pub fn with_children<I, K, V>(parent: &str, children: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = children
            .into_iter()
            .map(|(key, value)| (join_key(parent, key.as_ref()), value.into()))
            .collect();

        Self {
            values: Mutex::new(values),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl Registry for Memory {
    async fn read(&self, key: &str) -> Result<HashMap<String, String>> {
        let prefix = join_key(key, "");
        let values = self.values.lock().await;

        let children = values
            .range(prefix.clone()..)
            .take_while(|(child, _)| child.starts_with(&prefix))
            .filter(|(child, _)| !child[prefix.len()..].contains('/'))
            .map(|(child, value)| (leaf(child).to_string(), value.clone()))
            .collect();

        Ok(children)
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());

        Ok(())
    }
}
