//! Scheduler typed helpers.

use serde_json::Value;

use crate::dispatch::{CallContext, SyncDispatcher};
use crate::error::GatewayError;
use crate::params::Params;

pub async fn schedule_next(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<Value, GatewayError> {
    let outcome = dispatcher
        .execute(ctx, pid, "schedule_next", &Params::new())
        .await?;
    outcome.parse_json("schedule_next")
}

pub async fn yield_process(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<(), GatewayError> {
    dispatcher
        .execute(ctx, pid, "yield_process", &Params::new())
        .await?;
    Ok(())
}

pub async fn get_current_scheduled(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<Value, GatewayError> {
    let outcome = dispatcher
        .execute(ctx, pid, "get_current_scheduled", &Params::new())
        .await?;
    outcome.parse_json("get_current_scheduled")
}

pub async fn get_scheduler_stats(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<Value, GatewayError> {
    let outcome = dispatcher
        .execute(ctx, pid, "get_scheduler_stats", &Params::new())
        .await?;
    outcome.parse_json("get_scheduler_stats")
}

pub async fn set_scheduling_policy(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    policy: &str,
) -> Result<(), GatewayError> {
    let params = Params::new().insert("policy", policy);
    dispatcher
        .execute(ctx, pid, "set_scheduling_policy", &params)
        .await?;
    Ok(())
}

pub async fn get_scheduling_policy(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<Value, GatewayError> {
    let outcome = dispatcher
        .execute(ctx, pid, "get_scheduling_policy", &Params::new())
        .await?;
    outcome.parse_json("get_scheduling_policy")
}

pub async fn set_time_quantum(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    quantum_ms: u64,
) -> Result<(), GatewayError> {
    let params = Params::new().insert("quantum_ms", quantum_ms);
    dispatcher
        .execute(ctx, pid, "set_time_quantum", &params)
        .await?;
    Ok(())
}

pub async fn get_time_quantum(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<Value, GatewayError> {
    let outcome = dispatcher
        .execute(ctx, pid, "get_time_quantum", &Params::new())
        .await?;
    outcome.parse_json("get_time_quantum")
}

pub async fn get_process_scheduler_stats(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    target_pid: u32,
) -> Result<Value, GatewayError> {
    let params = Params::new().insert("target_pid", target_pid as u64);
    let outcome = dispatcher
        .execute(ctx, pid, "get_process_scheduler_stats", &params)
        .await?;
    outcome.parse_json("get_process_scheduler_stats")
}

pub async fn get_all_process_scheduler_stats(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<Value, GatewayError> {
    let outcome = dispatcher
        .execute(ctx, pid, "get_all_process_scheduler_stats", &Params::new())
        .await?;
    outcome.parse_json("get_all_process_scheduler_stats")
}

/// `target_pid = None` boosts/lowers the caller's own process.
pub async fn boost_priority(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    target_pid: Option<u32>,
) -> Result<(), GatewayError> {
    let mut params = Params::new();
    if let Some(target) = target_pid {
        params = params.insert("target_pid", target as u64);
    }
    dispatcher
        .execute(ctx, pid, "boost_priority", &params)
        .await?;
    Ok(())
}

pub async fn lower_priority(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    target_pid: Option<u32>,
) -> Result<(), GatewayError> {
    let mut params = Params::new();
    if let Some(target) = target_pid {
        params = params.insert("target_pid", target as u64);
    }
    dispatcher
        .execute(ctx, pid, "lower_priority", &params)
        .await?;
    Ok(())
}
