use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::select_all;
use kasa::{Client, DeviceInfo};
use log::{debug, error, info, trace, warn};
use registry::{join_key, Registry};
use tokio::sync::Mutex;
use transport::senml::{Envelope, Record};
use transport::{Publisher, Topic};

use crate::cache::{IdentityMap, IpCache};
use crate::measurement::records;
use crate::supervisor::Supervisor;
use crate::{Error, GathererConfig, Result};

/// Polls a set of addresses, one supervised loop per address.
pub struct Gatherer {
    inner: Arc<Inner>,
    supervisors: Vec<(Ipv4Addr, Supervisor<Error>)>,
}

struct Inner {
    config: GathererConfig,
    client: Client,
    identities: IdentityMap,
    cache: Mutex<IpCache>,
    registry: Arc<dyn Registry>,
    publisher: Arc<dyn Publisher>,
}

impl Gatherer {
    /// Loads identities and the address cache from the registry.
    /// An unreachable registry leaves both empty.
    pub async fn new(
        config: GathererConfig,
        client: Client,
        registry: Arc<dyn Registry>,
        publisher: Arc<dyn Publisher>,
    ) -> Gatherer {
        let identities: IdentityMap = load(registry.as_ref(), &config.id_key)
            .await
            .into_iter()
            .collect();
        info!("{} known devices", identities.len());

        let cache: IpCache = load(registry.as_ref(), &config.cache_key)
            .await
            .into_iter()
            .collect();
        info!("{} cached addresses", cache.len());

        let inner = Inner {
            config,
            client,
            identities,
            cache: Mutex::new(cache),
            registry,
            publisher,
        };

        Gatherer {
            inner: Arc::new(inner),
            supervisors: vec![],
        }
    }

    pub fn identities(&self) -> &IdentityMap {
        &self.inner.identities
    }

    pub async fn cached_ips(&self) -> IpCache {
        self.inner.cache.lock().await.clone()
    }

    pub fn start<I>(&mut self, ips: I) -> Result<()>
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        for ip in ips {
            let inner = self.inner.clone();
            let mut supervisor = Supervisor::new(
                move |ip: Ipv4Addr| {
                    let inner = inner.clone();
                    async move { inner.run_once(ip).await }
                },
                ip,
            );

            supervisor
                .start()
                .map_err(|err| Error::Supervisor(ip, Box::new(err)))?;
            self.supervisors.push((ip, supervisor));
        }

        info!("polling {} addresses", self.supervisors.len());
        Ok(())
    }

    /// Stops every loop and reports the first failure among them.
    pub async fn stop(&mut self) -> Result<()> {
        let mut first_error = None;

        for (ip, supervisor) in self.supervisors.iter_mut() {
            if let Err(err) = supervisor.stop().await {
                error!("polling {ip} failed: {err}");
                if first_error.is_none() {
                    first_error = Some(Error::Supervisor(*ip, Box::new(err)));
                }
            }
        }

        self.supervisors.clear();
        info!("stopped polling");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Resolves once any loop ends on its own, which only happens on a
    /// fatal error.
    pub async fn wait_for_failure(&mut self) -> Result<()> {
        if self.supervisors.is_empty() {
            return std::future::pending().await;
        }

        let finished = self.supervisors.iter_mut().map(|(ip, supervisor)| {
            let ip = *ip;
            Box::pin(async move { (ip, supervisor.finished().await) })
        });

        let ((ip, result), _, _) = select_all(finished).await;
        result.map_err(|err| Error::Supervisor(ip, Box::new(err)))
    }

    /// Runs a single poll of `ip` and returns the delay before the next one.
    pub async fn poll(&self, ip: Ipv4Addr) -> Result<Duration> {
        self.inner.poll(ip).await
    }
}

impl Inner {
    async fn run_once(&self, ip: Ipv4Addr) -> Result<()> {
        let delay = self.poll(ip).await?;
        tokio::time::sleep(delay).await;
        Ok(())
    }

    async fn poll(&self, ip: Ipv4Addr) -> Result<Duration> {
        let Some(info) = self.read_device(ip).await else {
            let cache = self.cache.lock().await;
            return Ok(backoff(&self.config, &cache, ip));
        };

        let identity = match self.identities.resolve(&info.mac) {
            Ok(identity) => identity,
            Err(err) => {
                warn!("{ip}: {err}");
                return Ok(self.config.short_sleep);
            }
        };

        debug!("{identity} at {ip}: {}W, relay {}", info.power, info.relay_state);

        self.publish(records(identity, &info, Utc::now())).await?;
        self.remember(identity, ip).await;

        Ok(self.config.short_sleep)
    }

    async fn read_device(&self, ip: Ipv4Addr) -> Option<DeviceInfo> {
        let response = self.client.get_power(ip.into()).await?;

        match response.extract_info() {
            Ok(info) => Some(info),
            Err(err) => {
                debug!("{ip} answered without a reading: {err}");
                None
            }
        }
    }

    async fn publish(&self, records: Vec<Record>) -> Result<()> {
        let payload = serde_json::to_vec(&Envelope { data: records })?;

        for database in self.config.databases.iter() {
            let topic = Topic::plug_data(database).to_string();

            match self.publisher.publish(&topic, payload.clone()).await {
                Ok(()) => trace!("published to {topic}"),
                Err(err) => error!("Error publishing to {topic}: {err}"),
            }
        }

        Ok(())
    }

    async fn remember(&self, identity: &str, ip: Ipv4Addr) {
        let previous = self.cache.lock().await.insert(identity, ip);
        if previous != Some(ip) {
            info!("{identity} is at {ip}");
        }

        let registry = self.registry.clone();
        let key = join_key(&self.config.cache_key, identity);

        tokio::spawn(async move {
            if let Err(err) = registry.write(&key, &ip.to_string()).await {
                error!("Error caching {key}: {err}");
            }
        });
    }
}

/// A silent address that once belonged to a known device is retried soon,
/// anything else waits for the long interval.
fn backoff(config: &GathererConfig, cache: &IpCache, ip: Ipv4Addr) -> Duration {
    if cache.contains_ip(ip) {
        config.short_sleep
    } else {
        config.long_sleep
    }
}

async fn load(registry: &dyn Registry, key: &str) -> HashMap<String, String> {
    match registry.read(key).await {
        Ok(children) => children,
        Err(err) => {
            error!("Error reading {key}: {err}");
            HashMap::new()
        }
    }
}
