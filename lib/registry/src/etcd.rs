use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chipp_http::{HttpClient, HttpMethod, NoInterceptor};
use log::{debug, trace};
use serde::Deserialize;
use tokio::time::timeout;
use url::Url;

use crate::{leaf, Error, Registry, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// etcd v2 keys API client.
pub struct Etcd {
    base: Url,
    http_client: HttpClient<NoInterceptor>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    key: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    dir: bool,
    #[serde(default)]
    nodes: Vec<Node>,
}

impl Etcd {
    pub fn new(address: &str) -> Result<Self> {
        let base = Url::parse(address).map_err(|_| Error::InvalidAddress(address.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidAddress(address.to_string()));
        }

        let http_client = HttpClient::new(address)?;

        Ok(Self {
            base,
            http_client,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn key_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|_| Error::InvalidAddress(self.base.to_string()))?
            .pop_if_empty()
            .extend(["v2", "keys"])
            .extend(key.split('/').filter(|segment| !segment.is_empty()));

        Ok(url)
    }
}

#[async_trait]
impl Registry for Etcd {
    async fn read(&self, key: &str) -> Result<HashMap<String, String>> {
        let url = self.key_url(key)?;
        trace!("GET {url}");

        let request = self.http_client.new_request_with_url(url.to_string())?;

        let body = timeout(
            self.timeout,
            self.http_client
                .perform_request(request, |req, res| match res.status_code {
                    200 => Ok(Some(res.body)),
                    404 => Ok(None),
                    _ => Err((req, res).into()),
                }),
        )
        .await??;

        match body {
            Some(body) => parse_children(key, &body),
            None => {
                debug!("key {key} not found");
                Ok(HashMap::new())
            }
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut url = self.key_url(key)?;
        url.query_pairs_mut().append_pair("value", value);
        trace!("PUT {url}");

        let mut request = self.http_client.new_request_with_url(url.to_string())?;
        request.set_method(HttpMethod::Put);

        timeout(
            self.timeout,
            self.http_client
                .perform_request(request, |req, res| match res.status_code {
                    200 | 201 => Ok(()),
                    _ => Err((req, res).into()),
                }),
        )
        .await??;

        Ok(())
    }
}

fn parse_children(key: &str, body: &[u8]) -> Result<HashMap<String, String>> {
    let response: KeysResponse = serde_json::from_slice(body)?;

    if !response.node.dir {
        return Err(Error::NotADirectory(key.to_string()));
    }

    let children = response
        .node
        .nodes
        .into_iter()
        .filter_map(|node| match node.value {
            Some(value) if !node.dir => Some((leaf(&node.key).to_string(), value)),
            _ => {
                trace!("skipping directory {}", node.key);
                None
            }
        })
        .collect();

    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDS: &str = r#"{
        "action": "get",
        "node": {
            "key": "/toad/sp/ids",
            "dir": true,
            "nodes": [
                {
                    "key": "/toad/sp/ids/CA:FE:CA:FE:CA:FE",
                    "value": "w.r0.c0",
                    "modifiedIndex": 7,
                    "createdIndex": 7
                },
                {
                    "key": "/toad/sp/ids/FE:CA:FE:CA:FE:CA",
                    "value": "w.r1.c1",
                    "modifiedIndex": 8,
                    "createdIndex": 8
                },
                {
                    "key": "/toad/sp/ids/archive",
                    "dir": true,
                    "modifiedIndex": 9,
                    "createdIndex": 9
                }
            ],
            "modifiedIndex": 6,
            "createdIndex": 6
        }
    }"#;

    #[test]
    fn test_parse_children() {
        let children = parse_children("/toad/sp/ids", IDS.as_bytes()).unwrap();

        assert_eq!(children.len(), 2);
        assert_eq!(children["CA:FE:CA:FE:CA:FE"], "w.r0.c0");
        assert_eq!(children["FE:CA:FE:CA:FE:CA"], "w.r1.c1");
    }

    #[test]
    fn test_parse_empty_directory() {
        let body = r#"{"action":"get","node":{"key":"/toad/sp/cache","dir":true}}"#;
        let children = parse_children("/toad/sp/cache", body.as_bytes()).unwrap();

        assert!(children.is_empty());
    }

    #[test]
    fn test_parse_leaf() {
        let body = r#"{"action":"get","node":{"key":"/toad/sp/cache","value":"10.0.0.5"}}"#;
        let error = parse_children("/toad/sp/cache", body.as_bytes()).unwrap_err();

        assert!(matches!(error, Error::NotADirectory(key) if key == "/toad/sp/cache"));
    }

    #[test]
    fn test_parse_garbage() {
        let error = parse_children("/toad/sp/cache", b"<html></html>").unwrap_err();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_key_url() {
        let etcd = Etcd::new("http://etcd:2379").unwrap();

        assert_eq!(
            etcd.key_url("/toad/sp/ids").unwrap().as_str(),
            "http://etcd:2379/v2/keys/toad/sp/ids"
        );

        let mut url = etcd.key_url("/toad/sp/cache/w.r0.c0").unwrap();
        url.query_pairs_mut().append_pair("value", "10.0.0.5");
        assert_eq!(
            url.as_str(),
            "http://etcd:2379/v2/keys/toad/sp/cache/w.r0.c0?value=10.0.0.5"
        );
    }

    #[test]
    fn test_invalid_address() {
        assert!(matches!(
            Etcd::new("mailto:root@localhost"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(Etcd::new("etcd"), Err(Error::InvalidAddress(_))));
    }
}
