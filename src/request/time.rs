//! Time family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! time_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Time(pb::TimeCall {
                op: Some(pb::time_call::Op::$op($msg)),
            })),
        })
    };
}

fn sleep(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let duration_ms = p.require_u64("sleep", "duration_ms")?;
    time_variant!(Sleep, pb::SleepCall { duration_ms })
}

fn get_uptime(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    time_variant!(GetUptime, pb::GetUptimeCall {})
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("sleep", sleep);
    table.insert("get_uptime", get_uptime);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_defaults_missing_duration_to_zero() {
        let v = sleep(&Params::new()).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Time(pb::TimeCall {
                op: Some(pb::time_call::Op::Sleep(inner)),
            })) => assert_eq!(inner.duration_ms, 0),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn sleep_rejects_duration_of_the_wrong_type() {
        let p = Params::new().insert("duration_ms", "soon");
        assert!(sleep(&p).is_err());
    }
}
