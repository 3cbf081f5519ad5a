//! C5/C6: the synchronous and batch dispatchers that sit on top of the
//! connection manager and circuit breaker.

mod batch;
mod sync;

pub use batch::{BatchDispatcher, BatchItem, BatchOutcome};
pub use sync::SyncDispatcher;

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Per-call cancellation and deadline override, threaded through every
/// dispatch mode per the concurrency model: every operation accepts a
/// propagating cancellation token, and a caller-supplied deadline wins
/// when it is earlier than the gateway's own ceiling.
///
/// `CallContext::default()` carries no deadline override and a token that
/// never fires — equivalent to "use the gateway's own ceiling, don't
/// cancel."
#[derive(Clone)]
pub struct CallContext {
    pub(crate) deadline: Option<Duration>,
    pub(crate) cancellation: CancellationToken,
}

impl Default for CallContext {
    fn default() -> Self {
        CallContext {
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// The earlier of this context's deadline and the dispatcher's own
    /// ceiling for the call.
    fn resolve(&self, ceiling: Duration) -> Duration {
        self.resolve_or(ceiling)
    }

    /// Same as `resolve`, exposed for callers outside this module (e.g. the
    /// streaming engine) that have their own ceiling constant instead of a
    /// [`Deadlines`] table.
    pub(crate) fn resolve_or(&self, ceiling: Duration) -> Duration {
        match self.deadline {
            Some(d) if d < ceiling => d,
            _ => ceiling,
        }
    }
}

/// Race `fut` against `ctx`'s resolved deadline and cancellation token.
/// `fut` itself yields a `tonic::Status` error, converted through
/// `GatewayError`'s own `#[from]` the same as a bare `.await?` would.
pub(crate) async fn run_with_ctx<F, T>(
    ctx: &CallContext,
    ceiling: Duration,
    fut: F,
) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, tonic::Status>>,
{
    tokio::select! {
        result = tokio::time::timeout(ctx.resolve(ceiling), fut) => {
            Ok(result??)
        }
        _ = ctx.cancellation.cancelled() => Err(GatewayError::Cancelled),
    }
}

const SCHEDULER_CALLS: &[&str] = &[
    "schedule_next",
    "yield_process",
    "get_current_scheduled",
    "get_scheduler_stats",
    "set_scheduling_policy",
    "get_scheduling_policy",
    "set_time_quantum",
    "get_time_quantum",
    "get_process_scheduler_stats",
    "get_all_process_scheduler_stats",
    "boost_priority",
    "lower_priority",
];

/// The deadline ceilings a dispatcher enforces, sourced from
/// [`GatewayConfig`]. A caller-supplied earlier deadline still wins; this
/// is just the gateway's own ceiling.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadlines {
    sync_timeout: Duration,
    metadata_timeout: Duration,
}

impl From<&GatewayConfig> for Deadlines {
    fn from(cfg: &GatewayConfig) -> Self {
        Deadlines {
            sync_timeout: cfg.sync_timeout,
            metadata_timeout: cfg.metadata_timeout,
        }
    }
}

impl Deadlines {
    /// 5 seconds for metadata-like (scheduler-control) calls, 30 seconds
    /// for everything else, by default.
    fn for_call(&self, call: &str) -> Duration {
        if SCHEDULER_CALLS.contains(&call) {
            self.metadata_timeout
        } else {
            self.sync_timeout
        }
    }

    fn batch(&self) -> Duration {
        self.sync_timeout
    }
}
