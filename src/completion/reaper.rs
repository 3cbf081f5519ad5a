//! Per-pid reaper actor.
//!
//! `waitFor` has a documented hazard: a single caller reaping completions
//! for its sequence incidentally consumes completions belonging to other,
//! concurrently-waiting callers on the same pid. This module fixes that by
//! routing every waiter for a pid through one authoritative reaper task —
//! a long-lived `tokio::spawn`ed actor addressed via an `mpsc` command
//! channel, looked up through a `DashMap<u32, ReaperHandle>` registry. This
//! is the same combination (`dashmap` registry + channel-addressed actor)
//! the `fusillade` daemon uses for its request-coalescing workers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};

use crate::connection::KernelConnection;
use crate::dispatch::{run_with_ctx, CallContext};
use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;
use crate::request;
use crate::response::{self, Outcome};

/// The bounded cap applied to every incidental reap tick, so one slow
/// waiter can't starve the others by draining everything in one call.
const REAP_TICK_CAP: u32 = 32;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
const COMMAND_CHANNEL_DEPTH: usize = 64;
const SUBMIT_DEADLINE: Duration = Duration::from_secs(5);
const REAP_DEADLINE: Duration = Duration::from_secs(5);

enum ReaperCommand {
    WaitFor {
        seq: u64,
        poll_interval: Duration,
        respond_to: oneshot::Sender<Result<pb::Response, GatewayError>>,
    },
    /// Sent when a waiter's own cancellation token fires, so the actor
    /// drops its entry instead of holding it forever.
    CancelWait { seq: u64 },
}

#[derive(Clone)]
struct ReaperHandle {
    cmd_tx: mpsc::Sender<ReaperCommand>,
}

/// Client-facing entry point for the submission/completion split.
pub struct CompletionQueue {
    connection: KernelConnection,
    reapers: Arc<DashMap<u32, ReaperHandle>>,
}

impl CompletionQueue {
    pub fn new(connection: KernelConnection) -> Self {
        CompletionQueue {
            connection,
            reapers: Arc::new(DashMap::new()),
        }
    }

    /// Submit one call; returns the `iouring_<seq>` token verbatim, as the
    /// wire contract defines it.
    pub async fn submit(
        &self,
        ctx: &CallContext,
        pid: u32,
        call_name: &str,
        params: &Params,
    ) -> Result<String, GatewayError> {
        let call = request::build(call_name, params)?;
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::IouringSubmitRequest {
            pid,
            call: Some(call),
        });
        let response = run_with_ctx(ctx, SUBMIT_DEADLINE, client.execute_syscall_iouring(request))
            .await?
            .into_inner();
        if !response.accepted {
            return Err(GatewayError::SubmissionRejected {
                reason: format!("kernel rejected iouring submit for `{call_name}`"),
            });
        }
        Ok(format!("iouring_{}", response.sequence))
    }

    /// Submit a batch of calls; sequence numbers are returned in the same
    /// order as the input.
    pub async fn submit_batch(
        &self,
        ctx: &CallContext,
        pid: u32,
        items: &[(&str, Params)],
    ) -> Result<Vec<u64>, GatewayError> {
        let calls = items
            .iter()
            .map(|(name, params)| request::build(name, params))
            .collect::<Result<Vec<_>, _>>()?;
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::IouringBatchSubmitRequest { pid, calls });
        let response = run_with_ctx(ctx, SUBMIT_DEADLINE, client.submit_iouring_batch(request))
            .await?
            .into_inner();
        Ok(response.sequences)
    }

    /// Reap up to `max_completions` completions directly. `max_completions
    /// == 0` means "all currently available." This bypasses the
    /// per-pid actor and is destructive on the server exactly like the raw
    /// RPC: callers that also use `wait_for` on the same pid should prefer
    /// routing everything through the reaper actor instead.
    pub async fn reap(
        &self,
        ctx: &CallContext,
        pid: u32,
        max_completions: u32,
    ) -> Result<Vec<(u64, Result<Outcome, GatewayError>)>, GatewayError> {
        let completions = raw_reap(ctx, &self.connection, pid, max_completions).await?;
        Ok(completions
            .into_iter()
            .map(|c| {
                let seq = c.sequence;
                let decoded = c
                    .result
                    .ok_or_else(|| GatewayError::MalformedResponse {
                        call: format!("iouring_{seq}"),
                        detail: "completion carried no result".to_string(),
                    })
                    .and_then(|resp| response::decode(&format!("iouring_{seq}"), resp));
                (seq, decoded)
            })
            .collect())
    }

    /// Wait for a specific sequence number's completion, dispatching any
    /// incidentally-reaped completions to other registered waiters on the
    /// same pid (or dropping them with a warning if none is registered).
    /// `poll_interval` is this waiter's own preference; the actor's shared
    /// ticker runs at the fastest interval any currently-registered waiter
    /// on the pid has asked for. If `ctx`'s cancellation token fires first,
    /// the actor is told to drop this waiter's entry so it doesn't leak.
    pub async fn wait_for(
        &self,
        ctx: &CallContext,
        pid: u32,
        seq: u64,
        poll_interval: Duration,
    ) -> Result<Outcome, GatewayError> {
        let handle = self.reaper_for(pid);
        let (respond_to, response) = oneshot::channel();
        handle
            .cmd_tx
            .send(ReaperCommand::WaitFor {
                seq,
                poll_interval,
                respond_to,
            })
            .await
            .map_err(|_| GatewayError::StreamClosed("reaper actor is gone".to_string()))?;

        let wait = async {
            let result = response.await.map_err(|_| {
                GatewayError::StreamClosed("reaper actor dropped the waiter".to_string())
            })??;
            response::decode(&format!("iouring_{seq}"), result)
        };

        tokio::select! {
            result = wait => result,
            _ = ctx.cancellation.cancelled() => {
                let _ = handle.cmd_tx.send(ReaperCommand::CancelWait { seq }).await;
                Err(GatewayError::Cancelled)
            }
        }
    }

    /// Parse the sequence number out of a submit token, then wait for it.
    pub async fn submit_and_wait(
        &self,
        ctx: &CallContext,
        pid: u32,
        call_name: &str,
        params: &Params,
    ) -> Result<Outcome, GatewayError> {
        let token = self.submit(ctx, pid, call_name, params).await?;
        let seq = parse_sequence(&token)?;
        self.wait_for(ctx, pid, seq, DEFAULT_POLL_INTERVAL).await
    }

    fn reaper_for(&self, pid: u32) -> ReaperHandle {
        if let Some(handle) = self.reapers.get(&pid) {
            return handle.clone();
        }
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_DEPTH);
        let handle = ReaperHandle { cmd_tx };
        self.reapers.insert(pid, handle.clone());
        tokio::spawn(reaper_loop(self.connection.clone(), pid, cmd_rx));
        handle
    }
}

fn parse_sequence(token: &str) -> Result<u64, GatewayError> {
    token
        .strip_prefix("iouring_")
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| GatewayError::ParseTokenFailed(token.to_string()))
}

async fn raw_reap(
    ctx: &CallContext,
    connection: &KernelConnection,
    pid: u32,
    max_completions: u32,
) -> Result<Vec<pb::Completion>, GatewayError> {
    let mut client = connection.client();
    let request = tonic::Request::new(pb::ReapRequest {
        pid,
        max_completions,
    });
    let response = run_with_ctx(ctx, REAP_DEADLINE, client.reap_completions(request))
        .await?
        .into_inner();
    Ok(response.completions)
}

struct Waiter {
    poll_interval: Duration,
    respond_to: oneshot::Sender<Result<pb::Response, GatewayError>>,
}

/// The shared tick rate: the fastest interval any live waiter asked for,
/// or the default if nobody is waiting.
fn effective_poll_interval(waiters: &HashMap<u64, Waiter>) -> Duration {
    waiters
        .values()
        .map(|w| w.poll_interval)
        .min()
        .unwrap_or(DEFAULT_POLL_INTERVAL)
}

async fn reaper_loop(
    connection: KernelConnection,
    pid: u32,
    mut cmd_rx: mpsc::Receiver<ReaperCommand>,
) {
    let mut waiters: HashMap<u64, Waiter> = HashMap::new();
    let mut ticker = tokio::time::interval(DEFAULT_POLL_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ReaperCommand::WaitFor { seq, poll_interval, respond_to }) => {
                        waiters.insert(seq, Waiter { poll_interval, respond_to });
                        ticker = tokio::time::interval(effective_poll_interval(&waiters));
                        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    }
                    Some(ReaperCommand::CancelWait { seq }) => {
                        waiters.remove(&seq);
                        ticker = tokio::time::interval(effective_poll_interval(&waiters));
                        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    }
                    None => {
                        tracing::debug!(pid, "reaper actor shutting down, no more waiters referencing it");
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                if waiters.is_empty() {
                    continue;
                }
                match raw_reap(&CallContext::new(), &connection, pid, REAP_TICK_CAP).await {
                    Ok(completions) => {
                        for completion in completions {
                            if let Some(waiter) = waiters.remove(&completion.sequence) {
                                let _ = waiter.respond_to.send(Ok(completion.result.unwrap_or_default()));
                            } else {
                                tracing::warn!(
                                    pid,
                                    sequence = completion.sequence,
                                    "reaped completion for an unregistered waiter, dropping"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(pid, error = %e, "reap tick failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_sequence_token() {
        assert_eq!(parse_sequence("iouring_42").unwrap(), 42);
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(parse_sequence("not_a_token").is_err());
        assert!(parse_sequence("iouring_not_a_number").is_err());
    }

    #[test]
    fn effective_poll_interval_tracks_the_fastest_waiter() {
        let mut waiters = HashMap::new();
        assert_eq!(effective_poll_interval(&waiters), DEFAULT_POLL_INTERVAL);

        let (tx1, _rx1) = oneshot::channel();
        waiters.insert(
            1,
            Waiter {
                poll_interval: Duration::from_millis(50),
                respond_to: tx1,
            },
        );
        let (tx2, _rx2) = oneshot::channel();
        waiters.insert(
            2,
            Waiter {
                poll_interval: Duration::from_millis(5),
                respond_to: tx2,
            },
        );
        assert_eq!(effective_poll_interval(&waiters), Duration::from_millis(5));
    }
}
