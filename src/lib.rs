//! Client-side syscall gateway: dispatch, resilience, and completion fabric
//! for submitting OS-style calls (filesystem, process, IPC, sockets,
//! signals, memory, scheduling) to a remote kernel over binary RPC.
//!
//! The gateway unifies five dispatch modes over one breaker-guarded
//! transport: synchronous one-shot calls, batches, async-task polling,
//! completion-queue reaping (io_uring-style), and bidirectional streaming.
//! [`SyscallGateway`] is the entry point; everything else is composable if
//! a caller wants direct access to one dispatch mode.

pub mod async_task;
pub mod breaker;
pub mod client;
pub mod completion;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod ops;
pub mod params;
pub mod pb;
pub mod request;
pub mod response;
pub mod stream;

pub use client::{SandboxLevel, SyscallGateway};
pub use config::GatewayConfig;
pub use dispatch::CallContext;
pub use error::{GatewayError, Result};
pub use params::Params;
