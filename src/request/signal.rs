//! Signal family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! signal_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Signal(pb::SignalCall {
                op: Some(pb::signal_call::Op::$op($msg)),
            })),
        })
    };
}

fn send_signal(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("send_signal", "target_pid")?;
    let signal = p.require_i32("send_signal", "signal")?;
    signal_variant!(SendSignal, pb::SendSignalCall { target_pid, signal })
}

fn register_signal_handler(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let signal = p.require_i32("register_signal_handler", "signal")?;
    signal_variant!(
        RegisterSignalHandler,
        pb::RegisterSignalHandlerCall { signal }
    )
}

fn block_signal(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let signal = p.require_i32("block_signal", "signal")?;
    signal_variant!(BlockSignal, pb::BlockSignalCall { signal })
}

fn unblock_signal(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let signal = p.require_i32("unblock_signal", "signal")?;
    signal_variant!(UnblockSignal, pb::UnblockSignalCall { signal })
}

fn get_pending_signals(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    signal_variant!(GetPendingSignals, pb::GetPendingSignalsCall {})
}

fn get_signal_stats(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    signal_variant!(GetSignalStats, pb::GetSignalStatsCall {})
}

// `target_pid` absent means "the caller's own process state".
fn get_signal_state(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.optional_u32("get_signal_state", "target_pid")?;
    signal_variant!(GetSignalState, pb::GetSignalStateCall { target_pid })
}

fn wait_for_signal(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let signal = p.require_i32("wait_for_signal", "signal")?;
    let timeout_ms = p.optional_u64("wait_for_signal", "timeout_ms")?;
    signal_variant!(
        WaitForSignal,
        pb::WaitForSignalCall {
            signal,
            timeout_ms
        }
    )
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("send_signal", send_signal);
    table.insert("register_signal_handler", register_signal_handler);
    table.insert("block_signal", block_signal);
    table.insert("unblock_signal", unblock_signal);
    table.insert("get_pending_signals", get_pending_signals);
    table.insert("get_signal_stats", get_signal_stats);
    table.insert("get_signal_state", get_signal_state);
    table.insert("wait_for_signal", wait_for_signal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_for_signal_without_timeout_is_none() {
        let p = Params::new().insert("signal", 15i64);
        let v = wait_for_signal(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Signal(pb::SignalCall {
                op: Some(pb::signal_call::Op::WaitForSignal(inner)),
            })) => {
                assert_eq!(inner.signal, 15);
                assert_eq!(inner.timeout_ms, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
