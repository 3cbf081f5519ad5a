//! The top-level facade wiring every component together.

use std::sync::Arc;
use std::time::Duration;

use crate::async_task::AsyncTaskEngine;
use crate::breaker::CircuitBreaker;
use crate::completion::CompletionQueue;
use crate::config::GatewayConfig;
use crate::connection::KernelConnection;
use crate::dispatch::{BatchDispatcher, SyncDispatcher};
use crate::error::GatewayError;
use crate::pb;
use crate::stream::StreamEngine;

/// A client-side handle to a single kernel target, bundling the connection
/// manager, the shared breaker, and every dispatch mode on top of it.
///
/// Cloning is cheap: every field is either an `Arc` or a cloneable channel
/// handle, so sharing one gateway across tasks is the expected usage.
#[derive(Clone)]
pub struct SyscallGateway {
    connection: KernelConnection,
    sync: SyncDispatcher,
    batch: BatchDispatcher,
    async_tasks: AsyncTaskEngine,
    completions: CompletionQueue,
    streams: StreamEngine,
}

impl SyscallGateway {
    /// Build a gateway without blocking; the first RPC pays the dial cost.
    pub fn connect_lazy(config: GatewayConfig) -> Result<Self, GatewayError> {
        let connection = KernelConnection::connect_lazy(&config.kernel_url)?;
        Ok(Self::from_connection(connection, &config))
    }

    /// Build a gateway, failing fast if the kernel is unreachable.
    pub async fn connect(config: GatewayConfig) -> Result<Self, GatewayError> {
        let connection = KernelConnection::connect(&config.kernel_url).await?;
        Ok(Self::from_connection(connection, &config))
    }

    /// Build from environment-variable configuration (see
    /// [`GatewayConfig::from_env`]), without blocking.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::connect_lazy(GatewayConfig::from_env())
    }

    fn from_connection(connection: KernelConnection, config: &GatewayConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(
            config.breaker_cooldown,
            config.breaker_window,
            config.breaker_half_open_probes,
        ));

        SyscallGateway {
            sync: SyncDispatcher::new(connection.clone(), breaker.clone(), config),
            batch: BatchDispatcher::new(connection.clone(), breaker, config),
            async_tasks: AsyncTaskEngine::new(connection.clone()),
            completions: CompletionQueue::new(connection.clone()),
            streams: StreamEngine::new(connection.clone()),
            connection,
        }
    }

    /// Create a new sandboxed process on the kernel, obtaining its pid.
    /// This is the one control-plane call that precedes every other
    /// syscall, since every subsequent call is keyed by pid.
    pub async fn create_process(
        &self,
        process_key: &str,
        sandbox: SandboxLevel,
    ) -> Result<u32, GatewayError> {
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::CreateProcessRequest {
            process_key: process_key.to_string(),
            sandbox: pb::SandboxLevel::from(sandbox) as i32,
        });
        let deadline = Duration::from_secs(5);
        let response = tokio::time::timeout(deadline, client.create_process(request))
            .await??
            .into_inner();
        Ok(response.pid)
    }

    pub fn sync(&self) -> &SyncDispatcher {
        &self.sync
    }

    pub fn batch(&self) -> &BatchDispatcher {
        &self.batch
    }

    pub fn async_tasks(&self) -> &AsyncTaskEngine {
        &self.async_tasks
    }

    pub fn completions(&self) -> &CompletionQueue {
        &self.completions
    }

    pub fn streams(&self) -> &StreamEngine {
        &self.streams
    }

    pub fn kernel_url(&self) -> &str {
        self.connection.url()
    }
}

/// Domain-facing mirror of [`pb::SandboxLevel`], so callers outside this
/// crate never need to depend on the generated protobuf types directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxLevel {
    Standard,
    Minimal,
    Privileged,
}

impl From<SandboxLevel> for pb::SandboxLevel {
    fn from(level: SandboxLevel) -> Self {
        match level {
            SandboxLevel::Standard => pb::SandboxLevel::Standard,
            SandboxLevel::Minimal => pb::SandboxLevel::Minimal,
            SandboxLevel::Privileged => pb::SandboxLevel::Privileged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_lazy_builds_a_gateway_without_a_live_kernel() {
        let mut config = GatewayConfig::default();
        config.kernel_url = "http://127.0.0.1:1".to_string();
        let gateway = SyscallGateway::connect_lazy(config).unwrap();
        assert_eq!(gateway.kernel_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn sandbox_level_maps_onto_the_wire_enum() {
        assert_eq!(
            pb::SandboxLevel::from(SandboxLevel::Privileged),
            pb::SandboxLevel::Privileged
        );
    }
}
