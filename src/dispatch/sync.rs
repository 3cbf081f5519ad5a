//! C5: one-shot synchronous dispatch: build, admit through the breaker,
//! submit, decode.

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

#[derive(Clone)]
pub struct SyncDispatcher {
    connection: KernelConnection,
    breaker: Arc<CircuitBreaker>,
    deadlines: Deadlines,
}

impl SyncDispatcher {
    pub fn new(connection: KernelConnection, breaker: Arc<CircuitBreaker>, config: &GatewayConfig) -> Self {
        SyncDispatcher {
            connection,
            breaker,
            deadlines: Deadlines::from(config),
        }
    }

    /// Execute one named syscall, end to end. Surfaces transport errors,
    /// timeouts, breaker-open and decoder failures unmodified; never
    /// retries. `ctx` carries an optional caller deadline (honored only if
    /// earlier than the gateway's own ceiling) and a cancellation token.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        pid: u32,
        call_name: &str,
        params: &Params,
    ) -> Result<Outcome, GatewayError> {
        let call = request::build(call_name, params)?;
        let ticket = self.breaker.admit()?;

        let result = self.dispatch(ctx, pid, call, call_name).await;
        ticket.complete(&result);
        result
    }

    async fn dispatch(
        &self,
        ctx: &CallContext,
        pid: u32,
        call: pb::CallVariant,
        call_name: &str,
    ) -> Result<Outcome, GatewayError> {
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::Request {
            pid,
            call: Some(call),
        });

        let ceiling = self.deadlines.for_call(call_name);
        let response = run_with_ctx(ctx, ceiling, client.execute_syscall(request)).await?;

        response::decode(call_name, response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_calls_get_the_metadata_deadline() {
        let deadlines = Deadlines::from(&GatewayConfig::default());
        assert_eq!(
            deadlines.for_call("schedule_next"),
            std::time::Duration::from_secs(5)
        );
        assert_eq!(
            deadlines.for_call("read_file"),
            std::time::Duration::from_secs(30)
        );
    }
}
