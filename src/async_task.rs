//! C7: the async task engine — submit, poll status, cancel, and
//! wait-for-completion over a polling loop.
//!
//! The poll loop races a `tokio::time::interval` tick against a
//! cancellation token's `cancelled()` future, the same shape the teacher's
//! `JobWorker::run` uses to race a backoff sleep against a shutdown
//! `watch::Receiver`.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::connection::KernelConnection;
use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;
use crate::request;
use crate::response::{self, Outcome};

const METADATA_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl From<pb::AsyncPhase> for TaskPhase {
    fn from(phase: pb::AsyncPhase) -> Self {
        match phase {
            pb::AsyncPhase::Pending => TaskPhase::Pending,
            pb::AsyncPhase::Running => TaskPhase::Running,
            pb::AsyncPhase::Completed => TaskPhase::Completed,
            pb::AsyncPhase::Failed => TaskPhase::Failed,
            pb::AsyncPhase::Cancelled => TaskPhase::Cancelled,
        }
    }
}

pub struct TaskStatus {
    pub phase: TaskPhase,
    pub result: Option<pb::Response>,
}

#[derive(Clone)]
pub struct AsyncTaskEngine {
    connection: KernelConnection,
}

impl AsyncTaskEngine {
    pub fn new(connection: KernelConnection) -> Self {
        AsyncTaskEngine { connection }
    }

    pub async fn submit(
        &self,
        pid: u32,
        call_name: &str,
        params: &Params,
    ) -> Result<String, GatewayError> {
        let call = request::build(call_name, params)?;
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::AsyncSubmitRequest {
            pid,
            call: Some(call),
        });

        let response = tokio::time::timeout(METADATA_DEADLINE, client.execute_syscall_async(request))
            .await??
            .into_inner();

        if response.accepted {
            Ok(response.task_token)
        } else {
            Err(GatewayError::SubmissionRejected {
                reason: response.reason,
            })
        }
    }

    pub async fn status(&self, pid: u32, task_token: &str) -> Result<TaskStatus, GatewayError> {
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::AsyncStatusRequest {
            pid,
            task_token: task_token.to_string(),
        });

        let response = tokio::time::timeout(METADATA_DEADLINE, client.get_async_status(request))
            .await??
            .into_inner();

        Ok(TaskStatus {
            phase: pb::AsyncPhase::try_from(response.phase)
                .unwrap_or(pb::AsyncPhase::Pending)
                .into(),
            result: response.result,
        })
    }

    pub async fn cancel(&self, pid: u32, task_token: &str) -> Result<(), GatewayError> {
        let mut client = self.connection.client();
        let request = tonic::Request::new(pb::AsyncCancelRequest {
            pid,
            task_token: task_token.to_string(),
        });

        let response = tokio::time::timeout(METADATA_DEADLINE, client.cancel_async(request))
            .await??
            .into_inner();

        if response.cancelled {
            Ok(())
        } else {
            Err(GatewayError::SyscallFailed {
                message: response.reason,
            })
        }
    }

    /// Poll `task_token` at `poll_interval` until it reaches a terminal
    /// phase or `cancellation` fires. There is no backoff: the expected
    /// completion horizon is sub-second, so a fixed tick is sufficient.
    pub async fn wait_for_completion(
        &self,
        pid: u32,
        task_token: &str,
        poll_interval: Duration,
        cancellation: &CancellationToken,
    ) -> Result<Outcome, GatewayError> {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = self.status(pid, task_token).await?;
                    match status.phase {
                        TaskPhase::Completed => {
                            let resp = status.result.ok_or_else(|| GatewayError::MalformedResponse {
                                call: task_token.to_string(),
                                detail: "completed task carried no result".to_string(),
                            })?;
                            return response::decode(task_token, resp);
                        }
                        TaskPhase::Failed => {
                            let resp = status.result.ok_or_else(|| GatewayError::MalformedResponse {
                                call: task_token.to_string(),
                                detail: "failed task carried no result".to_string(),
                            })?;
                            // The embedded Response is surfaced as the detail
                            // when it decodes; otherwise the decode error
                            // itself is the detail.
                            let detail = match response::decode(task_token, resp) {
                                Ok(outcome) => String::from_utf8_lossy(outcome.as_bytes()).into_owned(),
                                Err(e) => e.to_string(),
                            };
                            return Err(GatewayError::TaskFailed {
                                task_token: task_token.to_string(),
                                detail,
                            });
                        }
                        TaskPhase::Cancelled => {
                            return Err(GatewayError::TaskCancelled {
                                task_token: task_token.to_string(),
                            });
                        }
                        TaskPhase::Pending | TaskPhase::Running => continue,
                    }
                }
                _ = cancellation.cancelled() => {
                    return Err(GatewayError::Cancelled);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_conversion_maps_every_variant() {
        assert_eq!(TaskPhase::from(pb::AsyncPhase::Pending), TaskPhase::Pending);
        assert_eq!(TaskPhase::from(pb::AsyncPhase::Running), TaskPhase::Running);
        assert_eq!(
            TaskPhase::from(pb::AsyncPhase::Completed),
            TaskPhase::Completed
        );
        assert_eq!(TaskPhase::from(pb::AsyncPhase::Failed), TaskPhase::Failed);
        assert_eq!(
            TaskPhase::from(pb::AsyncPhase::Cancelled),
            TaskPhase::Cancelled
        );
    }
}
