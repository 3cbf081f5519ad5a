//! C6: batch dispatch. Aggregates per-item outcomes without aborting the
//! batch on a single item's failure.

use std::sync::Arc;

use crate::breaker::CircuitBreaker;
use crate::config::GatewayConfig;
use crate::connection::KernelConnection;
use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;
use crate::request;
use crate::response::{self, Outcome};

use super::{run_with_ctx, CallContext, Deadlines};

/// One named call plus the parameters to build it, as submitted to a batch.
pub struct BatchItem<'a> {
    pub call_name: &'a str,
    pub params: Params,
}

/// The decoded result of a batch dispatch: item outcomes in input order,
/// plus the server's own aggregate counts.
pub struct BatchOutcome {
    pub results: Vec<Result<Outcome, GatewayError>>,
    pub success_count: u32,
    pub failure_count: u32,
}

#[derive(Clone)]
pub struct BatchDispatcher {
    connection: KernelConnection,
    breaker: Arc<CircuitBreaker>,
    deadlines: Deadlines,
}

impl BatchDispatcher {
    pub fn new(connection: KernelConnection, breaker: Arc<CircuitBreaker>, config: &GatewayConfig) -> Self {
        BatchDispatcher {
            connection,
            breaker,
            deadlines: Deadlines::from(config),
        }
    }

    /// `parallel` is advisory to the server: it governs server-side
    /// execution order, not how the client submits. Responses preserve
    /// input order regardless.
    pub async fn execute_batch(
        &self,
        ctx: &CallContext,
        pid: u32,
        items: Vec<BatchItem<'_>>,
        parallel: bool,
    ) -> Result<BatchOutcome, GatewayError> {
        let call_names: Vec<String> = items.iter().map(|i| i.call_name.to_string()).collect();
        let calls = items
            .into_iter()
            .map(|item| request::build(item.call_name, &item.params))
            .collect::<Result<Vec<_>, _>>()?;

        let ticket = self.breaker.admit()?;
        let outcome = self.dispatch(ctx, pid, calls, parallel, &call_names).await;
        // Only the transport-level success/failure of the batch RPC itself
        // counts here; per-item failures are business outcomes, already
        // reflected in `BatchOutcome::failure_count`.
        ticket.complete_raw(outcome.is_err());
        outcome
    }

    async fn dispatch(
        &self,
        ctx: &CallContext,
        pid: u32,
        calls: Vec<pb::CallVariant>,
        parallel: bool,
        call_names: &[String],
    ) -> Result<BatchOutcome, GatewayError> {
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::BatchRequest {
            pid,
            calls,
            parallel,
        });

        let response = run_with_ctx(ctx, self.deadlines.batch(), client.execute_syscall_batch(request))
            .await?
            .into_inner();

        let mut results = Vec::with_capacity(response.responses.len());
        let mut success_count = 0u32;
        let mut failure_count = 0u32;

        for (resp, name) in response.responses.into_iter().zip(call_names.iter()) {
            let decoded = response::decode(name, resp);
            match &decoded {
                Ok(_) => success_count += 1,
                Err(_) => failure_count += 1,
            }
            results.push(decoded);
        }

        Ok(BatchOutcome {
            results,
            success_count,
            failure_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_item_carries_its_own_params() {
        let item = BatchItem {
            call_name: "read_file",
            params: Params::new().insert("path", "/tmp/x"),
        };
        assert_eq!(item.call_name, "read_file");
    }
}
