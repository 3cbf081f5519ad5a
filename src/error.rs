//! Error types returned by the gateway client.

use thiserror::Error;

/// Everything that can go wrong dispatching a syscall through the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The remote kernel rejected the call because the caller lacks the
    /// required capability. Never counted as a breaker failure.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// The remote kernel executed the call and reported a domain-level
    /// failure (bad path, bad fd, out-of-range handle, ...).
    #[error("syscall failed: {message}")]
    SyscallFailed { message: String },

    /// The circuit breaker is open and is not letting calls through.
    #[error("circuit breaker is open, retry after {retry_after_ms}ms")]
    BreakerOpen { retry_after_ms: u64 },

    /// A call, batch, or stream did not complete before its deadline.
    #[error("deadline exceeded")]
    DeadlineExceeded(#[from] tokio::time::error::Elapsed),

    /// The gRPC channel could not be built or connected.
    #[error("transport setup failed: {0}")]
    TransportSetup(#[from] tonic::transport::Error),

    /// An RPC returned a non-OK gRPC status that isn't otherwise classified
    /// above (transport drop, server panic, cancellation, ...).
    #[error("transport failure: {0}")]
    TransportFailure(#[from] tonic::Status),

    /// A response payload did not decode into the shape its call name
    /// promised.
    #[error("malformed response for `{call}`: {detail}")]
    MalformedResponse { call: String, detail: String },

    /// `Params` was missing a required key, or the value had the wrong type.
    #[error("invalid parameter `{name}` for `{call}`: {detail}")]
    InvalidParameter {
        call: String,
        name: String,
        detail: String,
    },

    /// The call name is not part of the closed set this gateway understands.
    #[error("unknown syscall `{0}`")]
    UnknownCall(String),

    /// An async task token or io_uring sequence number referenced something
    /// the gateway has no record of.
    #[error("unknown task token `{0}`")]
    UnknownTask(String),

    /// The bidirectional stream ended or was torn down mid-transfer.
    #[error("stream closed: {0}")]
    StreamClosed(String),

    /// The caller's own cancellation token fired before the call reached a
    /// terminal state.
    #[error("operation cancelled")]
    Cancelled,

    /// The kernel refused to accept a submission (async task or io_uring
    /// entry) before it ever started running.
    #[error("submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    /// An async task reached its `Failed` terminal phase.
    #[error("task `{task_token}` failed: {detail}")]
    TaskFailed { task_token: String, detail: String },

    /// An async task reached its `Cancelled` terminal phase.
    #[error("task `{task_token}` was cancelled")]
    TaskCancelled { task_token: String },

    /// A completion token (`iouring_<seq>`) did not parse into a sequence
    /// number.
    #[error("failed to parse task token `{0}`")]
    ParseTokenFailed(String),
}

impl GatewayError {
    /// Whether this error should count against the circuit breaker's
    /// consecutive/windowed failure counters.
    ///
    /// `PermissionDenied` is excluded: a caller without a capability will
    /// keep failing that one call forever, and letting it trip the breaker
    /// would collaterally block every other in-flight caller.
    pub fn counts_as_breaker_failure(&self) -> bool {
        !matches!(self, GatewayError::PermissionDenied { .. })
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
