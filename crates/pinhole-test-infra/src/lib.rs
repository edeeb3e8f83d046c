//! Disposable backend containers for integration tests.

mod error;
pub mod mysql;
pub mod redis;

pub use error::{Result, TestInfraError};

use testcontainers::{ContainerAsync, GenericImage};

/// Host and mapped IPv4 port for `container_port`.
///
/// `localhost` is pinned to `127.0.0.1` so clients that prefer IPv6 still
/// reach the IPv4 port mapping.
pub(crate) async fn endpoint(
    container: &ContainerAsync<GenericImage>,
    container_port: u16,
) -> Result<(String, u16)> {
    let host = match container.get_host().await?.to_string().as_str() {
        "localhost" => "127.0.0.1".to_string(),
        other => other.to_string(),
    };
    let port = container.get_host_port_ipv4(container_port).await?;
    Ok((host, port))
}
