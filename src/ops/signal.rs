//! Signal constants and typed helpers.

use serde_json::Value;

use crate::dispatch::{CallContext, SyncDispatcher};
use crate::error::GatewayError;
use crate::params::Params;

pub const SIGHUP: i32 = 1;
pub const SIGINT: i32 = 2;
pub const SIGQUIT: i32 = 3;
pub const SIGILL: i32 = 4;
pub const SIGTRAP: i32 = 5;
pub const SIGABRT: i32 = 6;
pub const SIGBUS: i32 = 7;
pub const SIGFPE: i32 = 8;
pub const SIGKILL: i32 = 9;
pub const SIGUSR1: i32 = 10;
pub const SIGSEGV: i32 = 11;
pub const SIGUSR2: i32 = 12;
pub const SIGPIPE: i32 = 13;
pub const SIGALRM: i32 = 14;
pub const SIGTERM: i32 = 15;

/// The inclusive real-time signal range, per Unix convention.
pub const SIGRTMIN: i32 = 34;
pub const SIGRTMAX: i32 = 63;

pub async fn send_signal(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    target_pid: u32,
    signal: i32,
) -> Result<(), GatewayError> {
    let params = Params::new()
        .insert("target_pid", target_pid as u64)
        .insert("signal", signal as i64);
    dispatcher.execute(ctx, pid, "send_signal", &params).await?;
    Ok(())
}

pub async fn register_signal_handler(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    signal: i32,
) -> Result<(), GatewayError> {
    let params = Params::new().insert("signal", signal as i64);
    dispatcher
        .execute(ctx, pid, "register_signal_handler", &params)
        .await?;
    Ok(())
}

pub async fn block_signal(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    signal: i32,
) -> Result<(), GatewayError> {
    let params = Params::new().insert("signal", signal as i64);
    dispatcher.execute(ctx, pid, "block_signal", &params).await?;
    Ok(())
}

pub async fn unblock_signal(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    signal: i32,
) -> Result<(), GatewayError> {
    let params = Params::new().insert("signal", signal as i64);
    dispatcher.execute(ctx, pid, "unblock_signal", &params).await?;
    Ok(())
}

pub async fn get_pending_signals(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
) -> Result<Value, GatewayError> {
    let outcome = dispatcher
        .execute(ctx, pid, "get_pending_signals", &Params::new())
        .await?;
    outcome.parse_json("get_pending_signals")
}

/// `target_pid = None` asks for the caller's own process state.
pub async fn get_signal_state(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    target_pid: Option<u32>,
) -> Result<Value, GatewayError> {
    let mut params = Params::new();
    if let Some(target) = target_pid {
        params = params.insert("target_pid", target as u64);
    }
    let outcome = dispatcher
        .execute(ctx, pid, "get_signal_state", &params)
        .await?;
    outcome.parse_json("get_signal_state")
}

/// `timeout_ms = None` blocks indefinitely.
pub async fn wait_for_signal(
    dispatcher: &SyncDispatcher,
    ctx: &CallContext,
    pid: u32,
    signal: i32,
    timeout_ms: Option<u64>,
) -> Result<Value, GatewayError> {
    let mut params = Params::new().insert("signal", signal as i64);
    if let Some(timeout) = timeout_ms {
        params = params.insert("timeout_ms", timeout);
    }
    let outcome = dispatcher
        .execute(ctx, pid, "wait_for_signal", &params)
        .await?;
    outcome.parse_json("wait_for_signal")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_constants_follow_unix_convention() {
        assert_eq!(SIGHUP, 1);
        assert_eq!(SIGKILL, 9);
        assert_eq!(SIGTERM, 15);
        assert_eq!(SIGRTMIN, 34);
        assert_eq!(SIGRTMAX, 63);
    }
}
