use crate::{endpoint, Result};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const REDIS_PORT: u16 = 6379;
const DEFAULT_TAG: &str = "8.6.0";

/// A standalone Redis container that lives as long as this value.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
}

impl RedisServer {
    pub async fn new() -> Result<Self> {
        Self::with_tag(DEFAULT_TAG).await
    }

    pub async fn with_tag(tag: &str) -> Result<Self> {
        let container = GenericImage::new("redis", tag)
            .with_exposed_port(REDIS_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await?;
        Ok(Self { container })
    }

    /// `redis://host:port` for the mapped port.
    pub async fn redis_url(&self) -> Result<String> {
        let (host, port) = endpoint(&self.container, REDIS_PORT).await?;
        Ok(format!("redis://{host}:{port}"))
    }
}
