//! System-info family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! system_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::System(pb::SystemCall {
                op: Some(pb::system_call::Op::$op($msg)),
            })),
        })
    };
}

fn get_system_info(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    system_variant!(GetSystemInfo, pb::GetSystemInfoCall {})
}

fn get_current_time(_p: &Params) -> Result<pb::CallVariant, GatewayError> {
    system_variant!(GetCurrentTime, pb::GetCurrentTimeCall {})
}

fn get_env_var(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let name = p.require_str("get_env_var", "name")?;
    system_variant!(GetEnvVar, pb::GetEnvVarCall { name })
}

fn set_env_var(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let name = p.require_str("set_env_var", "name")?;
    let value = p.require_str("set_env_var", "value")?;
    system_variant!(SetEnvVar, pb::SetEnvVarCall { name, value })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("get_system_info", get_system_info);
    table.insert("get_current_time", get_current_time);
    table.insert("get_env_var", get_env_var);
    table.insert("set_env_var", set_env_var);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_env_var_builds_system_variant() {
        let p = Params::new().insert("name", "PATH").insert("value", "/bin");
        let v = set_env_var(&p).unwrap();
        assert!(matches!(
            v.family,
            Some(pb::call_variant::Family::System(pb::SystemCall {
                op: Some(pb::system_call::Op::SetEnvVar(_)),
            }))
        ));
    }
}
