//! C4: owns the single gRPC channel to the kernel.
//!
//! Grounded on `BpmnLiteConnection::connect_lazy` — a cloneable wrapper
//! around a `tonic::transport::Channel`, which is itself cheaply cloneable
//! because the underlying HTTP/2 connection is reference-counted.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};

use crate::error::GatewayError;
use crate::pb::syscall_client::SyscallClient;

const DEFAULT_KERNEL_URL: &str = "http://[::1]:50100";
const ENV_KERNEL_URL: &str = "SYSCALL_GATEWAY_KERNEL_URL";

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);
const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// A shared, cloneable handle to the kernel's gRPC endpoint.
#[derive(Debug, Clone)]
pub struct KernelConnection {
    client: SyscallClient<Channel>,
    url: String,
}

fn build_endpoint(url: &str) -> Result<Endpoint, GatewayError> {
    let endpoint = Endpoint::from_shared(url.to_string())?
        .tcp_keepalive(Some(KEEPALIVE_INTERVAL))
        .http2_keep_alive_interval(KEEPALIVE_INTERVAL)
        .keep_alive_timeout(KEEPALIVE_TIMEOUT)
        .keep_alive_while_idle(false);
    Ok(endpoint)
}

fn wrap_client(channel: Channel) -> SyscallClient<Channel> {
    SyscallClient::new(channel)
        .max_decoding_message_size(MAX_MESSAGE_SIZE)
        .max_encoding_message_size(MAX_MESSAGE_SIZE)
}

impl KernelConnection {
    /// Connect without blocking; the first RPC pays the dial cost.
    pub fn connect_lazy(url: &str) -> Result<Self, GatewayError> {
        let channel = build_endpoint(url)?.connect_lazy();
        Ok(KernelConnection {
            client: wrap_client(channel),
            url: url.to_string(),
        })
    }

    /// Connect eagerly, failing fast if the kernel is unreachable at
    /// startup.
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let channel = build_endpoint(url)?.connect().await?;
        Ok(KernelConnection {
            client: wrap_client(channel),
            url: url.to_string(),
        })
    }

    /// Build from `SYSCALL_GATEWAY_KERNEL_URL`, falling back to the
    /// loopback default, without blocking.
    pub fn from_env() -> Result<Self, GatewayError> {
        let url = std::env::var(ENV_KERNEL_URL).unwrap_or_else(|_| DEFAULT_KERNEL_URL.to_string());
        Self::connect_lazy(&url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn client(&self) -> SyscallClient<Channel> {
        self.client.clone()
    }

    /// Closing is idempotent: dropping every clone of the underlying
    /// channel releases the connection; there is no explicit handshake to
    /// perform here.
    pub fn close(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_lazy_succeeds_without_a_live_kernel() {
        let conn = KernelConnection::connect_lazy("http://127.0.0.1:1").unwrap();
        assert_eq!(conn.url(), "http://127.0.0.1:1");
    }

    #[test]
    fn connect_lazy_rejects_invalid_url() {
        assert!(KernelConnection::connect_lazy("not a url").is_err());
    }

    #[test]
    fn from_env_uses_default_when_unset() {
        std::env::remove_var(ENV_KERNEL_URL);
        let conn = KernelConnection::from_env().unwrap();
        assert_eq!(conn.url(), DEFAULT_KERNEL_URL);
    }

    #[test]
    fn from_env_honors_override() {
        std::env::set_var(ENV_KERNEL_URL, "http://127.0.0.1:9");
        let conn = KernelConnection::from_env().unwrap();
        assert_eq!(conn.url(), "http://127.0.0.1:9");
        std::env::remove_var(ENV_KERNEL_URL);
    }
}
