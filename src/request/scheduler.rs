//! Scheduler family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! scheduler_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Scheduler(pb::SchedulerCall {
                op: Some(pb::scheduler_call::Op::$op($msg)),
            })),
        })
    };
}

fn schedule_next(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    scheduler_variant!(ScheduleNext, pb::ScheduleNextCall {})
}

fn yield_process(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    scheduler_variant!(YieldProcess, pb::YieldProcessCall {})
}

fn get_current_scheduled(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    scheduler_variant!(GetCurrentScheduled, pb::GetCurrentScheduledCall {})
}

fn get_scheduler_stats(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    scheduler_variant!(GetSchedulerStats, pb::GetSchedulerStatsCall {})
}

fn set_scheduling_policy(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let policy = p.require_str("set_scheduling_policy", "policy")?;
    scheduler_variant!(SetSchedulingPolicy, pb::SetSchedulingPolicyCall { policy })
}

fn get_scheduling_policy(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    scheduler_variant!(GetSchedulingPolicy, pb::GetSchedulingPolicyCall {})
}

fn set_time_quantum(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let quantum_ms = p.require_u64("set_time_quantum", "quantum_ms")?;
    scheduler_variant!(SetTimeQuantum, pb::SetTimeQuantumCall { quantum_ms })
}

fn get_time_quantum(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    scheduler_variant!(GetTimeQuantum, pb::GetTimeQuantumCall {})
}

fn get_process_scheduler_stats(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.require_u32("get_process_scheduler_stats", "target_pid")?;
    scheduler_variant!(
        GetProcessSchedulerStats,
        pb::GetProcessSchedulerStatsCall { target_pid }
    )
}

fn get_all_process_scheduler_stats(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    scheduler_variant!(
        GetAllProcessSchedulerStats,
        pb::GetAllProcessSchedulerStatsCall {}
    )
}

// `target_pid` absent means "the caller's own process".
fn boost_priority(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.optional_u32("boost_priority", "target_pid")?;
    scheduler_variant!(BoostPriority, pb::BoostPriorityCall { target_pid })
}

fn lower_priority(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let target_pid = p.optional_u32("lower_priority", "target_pid")?;
    scheduler_variant!(LowerPriority, pb::LowerPriorityCall { target_pid })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("schedule_next", schedule_next);
    table.insert("yield_process", yield_process);
    table.insert("get_current_scheduled", get_current_scheduled);
    table.insert("get_scheduler_stats", get_scheduler_stats);
    table.insert("set_scheduling_policy", set_scheduling_policy);
    table.insert("get_scheduling_policy", get_scheduling_policy);
    table.insert("set_time_quantum", set_time_quantum);
    table.insert("get_time_quantum", get_time_quantum);
    table.insert("get_process_scheduler_stats", get_process_scheduler_stats);
    table.insert(
        "get_all_process_scheduler_stats",
        get_all_process_scheduler_stats,
    );
    table.insert("boost_priority", boost_priority);
    table.insert("lower_priority", lower_priority);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_priority_without_target_defaults_to_self() {
        let v = boost_priority(&Params::new()).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Scheduler(pb::SchedulerCall {
                op: Some(pb::scheduler_call::Op::BoostPriority(inner)),
            })) => assert_eq!(inner.target_pid, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
