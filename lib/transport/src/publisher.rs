use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use paho_mqtt::{self as mqtt, MessageBuilder, SslOptions, QOS_1};

use crate::Result;

/// Sink for outgoing messages.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

#[async_trait]
impl Publisher for mqtt::AsyncClient {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        trace!("publish to {topic}: {}", String::from_utf8_lossy(&payload));

        let message = MessageBuilder::new()
            .topic(topic)
            .payload(payload)
            .qos(QOS_1)
            .finalize();

        mqtt::AsyncClient::publish(self, message).await?;

        Ok(())
    }
}

pub async fn connect_mqtt(
    address: String,
    username: Option<String>,
    password: Option<String>,
    client_id: &str,
) -> Result<mqtt::AsyncClient> {
    let use_ssl = address.starts_with("ssl://") || address.starts_with("mqtts://");

    let create_opts = mqtt::CreateOptionsBuilder::new_v3()
        .server_uri(address)
        .client_id(client_id)
        .finalize();

    let client = mqtt::AsyncClient::new(create_opts)?;

    let mut conn_opts = mqtt::ConnectOptionsBuilder::new_v3();
    conn_opts
        .keep_alive_interval(Duration::from_secs(30))
        .clean_session(true)
        .automatic_reconnect(Duration::from_secs(1), Duration::from_secs(30));

    if let Some(username) = username {
        conn_opts.user_name(username);
    }

    if let Some(password) = password {
        conn_opts.password(password);
    }

    if use_ssl {
        conn_opts.ssl_options(SslOptions::new());
    }

    client.connect(conn_opts.finalize()).await?;

    Ok(client)
}
