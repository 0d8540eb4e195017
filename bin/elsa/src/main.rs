use std::sync::Arc;

use elsa::{ip_range, Config, Gatherer};
use kasa::Client;
use registry::Etcd;
use transport::connect_mqtt;

use log::{error, info};
use tokio::signal::unix::{signal, SignalKind};

type ErasedError = Box<dyn std::error::Error + Send + Sync + 'static>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ErasedError> {
    pretty_env_logger::init_timed();

    info!("elsa version {VERSION}");

    let config = Config::from_env()?;

    let registry = Etcd::new(&config.etcd_address)?;
    info!("using etcd at {}", config.etcd_address);

    let mqtt_client = connect_mqtt(
        config.mqtt_address.clone(),
        config.mqtt_username.clone(),
        config.mqtt_password.clone(),
        "elsa",
    )
    .await?;
    info!("connected mqtt");

    let client = Client::new(config.device_port, config.device_timeout);
    let publisher = Arc::new(mqtt_client.clone());

    let mut gatherer =
        Gatherer::new(config.gatherer, client, Arc::new(registry), publisher).await;
    info!(
        "scanning {} to {}",
        config.ip_range_start, config.ip_range_end
    );
    gatherer.start(ip_range(config.ip_range_start, config.ip_range_end))?;

    let mut sigterm = signal(SignalKind::terminate())?;

    let failure = tokio::select! {
        _ = sigterm.recv() => {
            info!("got SIGTERM, exiting...");
            None
        },
        _ = tokio::signal::ctrl_c() => {
            info!("got SIGINT, exiting...");
            None
        },
        result = gatherer.wait_for_failure() => result.err(),
    };

    if let Some(err) = &failure {
        error!("{err}");
    }

    let stopped = gatherer.stop().await;

    if let Err(err) = mqtt_client.disconnect(None).await {
        error!("Error disconnecting mqtt: {err}");
    }

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(stopped?),
    }
}
