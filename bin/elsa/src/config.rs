use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

const DEFAULT_SLEEP_TIME_SHORT: Duration = Duration::from_secs(1);
const DEFAULT_SLEEP_TIME_LONG: Duration = Duration::from_secs(60);
const DEFAULT_DEVICE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub etcd_address: String,
    pub mqtt_address: String,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub ip_range_start: Ipv4Addr,
    pub ip_range_end: Ipv4Addr,
    pub device_port: u16,
    pub device_timeout: Duration,
    pub gatherer: GathererConfig,
}

/// Settings the polling cycles depend on.
#[derive(Clone, Debug, PartialEq)]
pub struct GathererConfig {
    pub id_key: String,
    pub cache_key: String,
    pub short_sleep: Duration,
    pub long_sleep: Duration,
    pub databases: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Config>
    where
        L: Fn(&'static str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let databases = vars
            .required("MQTT_DATA_BASES")?
            .split(',')
            .map(str::trim)
            .filter(|database| !database.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        if databases.is_empty() {
            return Err(Error::InvalidVar("MQTT_DATA_BASES", String::new()));
        }

        let gatherer = GathererConfig {
            id_key: vars.required("ETCD_ID_KEY")?,
            cache_key: vars.required("ETCD_CACHE_KEY")?,
            short_sleep: vars.seconds("SLEEP_TIME_SHORT", DEFAULT_SLEEP_TIME_SHORT)?,
            long_sleep: vars.seconds("SLEEP_TIME_LONG", DEFAULT_SLEEP_TIME_LONG)?,
            databases,
        };

        Ok(Config {
            etcd_address: vars.required("ETCD_ADDRESS")?,
            mqtt_address: vars.required("MQTT_ADDRESS")?,
            mqtt_username: vars.optional("MQTT_USER"),
            mqtt_password: vars.optional("MQTT_PASS"),
            ip_range_start: vars.parsed("IP_RANGE_START")?,
            ip_range_end: vars.parsed("IP_RANGE_END")?,
            device_port: vars.parsed_or("DEVICE_PORT", kasa::DEFAULT_PORT)?,
            device_timeout: vars.seconds("DEVICE_TIMEOUT", DEFAULT_DEVICE_TIMEOUT)?,
            gatherer,
        })
    }
}

struct Vars<L>(L);

impl<L> Vars<L>
where
    L: Fn(&'static str) -> Option<String>,
{
    fn optional(&self, name: &'static str) -> Option<String> {
        (self.0)(name).filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String> {
        self.optional(name).ok_or(Error::MissingVar(name))
    }

    fn parsed<T: FromStr>(&self, name: &'static str) -> Result<T> {
        let value = self.required(name)?;
        value.parse().map_err(|_| Error::InvalidVar(name, value))
    }

    fn parsed_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T> {
        match self.optional(name) {
            Some(_) => self.parsed(name),
            None => Ok(default),
        }
    }

    fn seconds(&self, name: &'static str, default: Duration) -> Result<Duration> {
        let seconds = match self.optional(name) {
            Some(_) => self.parsed::<f64>(name)?,
            None => return Ok(default),
        };

        Duration::try_from_secs_f64(seconds).map_err(|_| Error::InvalidVar(name, seconds.to_string()))
    }
}
