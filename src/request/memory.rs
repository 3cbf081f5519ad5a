//! Memory family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! memory_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Memory(pb::MemoryCall {
                op: Some(pb::memory_call::Op::$op($msg)),
            })),
        })
    };
}

fn get_memory_stats(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    memory_variant!(GetMemoryStats, pb::GetMemoryStatsCall {})
}

fn get_process_memory_stats(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("get_process_memory_stats", "target_pid")?;
    memory_variant!(
        GetProcessMemoryStats,
        pb::GetProcessMemoryStatsCall { target_pid }
    )
}

// `target_pid` is genuinely optional here: absent means "GC everything",
// present means "GC just this process". Neither case is a default of 0.
fn trigger_gc(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.optional_u32("trigger_gc", "target_pid")?;
    memory_variant!(TriggerGc, pb::TriggerGcCall { target_pid })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("get_memory_stats", get_memory_stats);
    table.insert("get_process_memory_stats", get_process_memory_stats);
    table.insert("trigger_gc", trigger_gc);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_gc_without_target_pid_is_none_not_zero() {
        let v = trigger_gc(&Params::new()).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Memory(pb::MemoryCall {
                op: Some(pb::memory_call::Op::TriggerGc(inner)),
            })) => assert_eq!(inner.target_pid, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
