//! Process family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! process_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Process(pb::ProcessCall {
                op: Some(pb::process_call::Op::$op($msg)),
            })),
        })
    };
}

fn spawn_process(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let command = p.require_str("spawn_process", "command")?;
    let args = p.require_str_array("spawn_process", "args")?;
    process_variant!(SpawnProcess, pb::SpawnProcessCall { command, args })
}

fn kill_process(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("kill_process", "target_pid")?;
    let signal = p.require_i32("kill_process", "signal")?;
    process_variant!(KillProcess, pb::KillProcessCall { target_pid, signal })
}

fn get_process_info(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("get_process_info", "target_pid")?;
    process_variant!(GetProcessInfo, pb::GetProcessInfoCall { target_pid })
}

fn get_process_list(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    process_variant!(GetProcessList, pb::GetProcessListCall {})
}

fn set_process_priority(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("set_process_priority", "target_pid")?;
    let priority = p.require_i32("set_process_priority", "priority")?;
    process_variant!(
        SetProcessPriority,
        pb::SetProcessPriorityCall {
            target_pid,
            priority
        }
    )
}

fn get_process_state(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("get_process_state", "target_pid")?;
    process_variant!(GetProcessState, pb::GetProcessStateCall { target_pid })
}

fn get_process_stats(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("get_process_stats", "target_pid")?;
    process_variant!(GetProcessStats, pb::GetProcessStatsCall { target_pid })
}

fn wait_process(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("wait_process", "target_pid")?;
    process_variant!(WaitProcess, pb::WaitProcessCall { target_pid })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("spawn_process", spawn_process);
    table.insert("kill_process", kill_process);
    table.insert("get_process_info", get_process_info);
    table.insert("get_process_list", get_process_list);
    table.insert("set_process_priority", set_process_priority);
    table.insert("get_process_state", get_process_state);
    table.insert("get_process_stats", get_process_stats);
    table.insert("wait_process", wait_process);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_process_builds_process_variant() {
        let p = Params::new().insert("target_pid", 42u64).insert("signal", 9i64);
        let v = kill_process(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Process(pb::ProcessCall {
                op: Some(pb::process_call::Op::KillProcess(inner)),
            })) => {
                assert_eq!(inner.target_pid, 42);
                assert_eq!(inner.signal, 9);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
