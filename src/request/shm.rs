//! Shared-memory family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! shm_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Shm(pb::ShmCall {
                op: Some(pb::shm_call::Op::$op($msg)),
            })),
        })
    };
}

fn create_shm(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let name = p.require_str("create_shm", "name")?;
    let size = p.require_u64("create_shm", "size")?;
    shm_variant!(CreateShm, pb::CreateShmCall { name, size })
}

fn attach_shm(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let name = p.require_str("attach_shm", "name")?;
    shm_variant!(AttachShm, pb::AttachShmCall { name })
}

fn detach_shm(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("detach_shm", "handle")?;
    shm_variant!(DetachShm, pb::DetachShmCall { handle })
}

fn write_shm(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("write_shm", "handle")?;
    let offset = p.require_u64("write_shm", "offset")?;
    let data = p.require_bytes("write_shm", "data")?;
    shm_variant!(
        WriteShm,
        pb::WriteShmCall {
            handle,
            offset,
            data
        }
    )
}

fn read_shm(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("read_shm", "handle")?;
    let offset = p.require_u64("read_shm", "offset")?;
    let size = p.require_u64("read_shm", "size")?;
    shm_variant!(
        ReadShm,
        pb::ReadShmCall {
            handle,
            offset,
            size
        }
    )
}

fn destroy_shm(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let name = p.require_str("destroy_shm", "name")?;
    shm_variant!(DestroyShm, pb::DestroyShmCall { name })
}

fn shm_stats(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("shm_stats", "handle")?;
    shm_variant!(ShmStats, pb::ShmStatsCall { handle })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("create_shm", create_shm);
    table.insert("attach_shm", attach_shm);
    table.insert("detach_shm", detach_shm);
    table.insert("write_shm", write_shm);
    table.insert("read_shm", read_shm);
    table.insert("destroy_shm", destroy_shm);
    table.insert("shm_stats", shm_stats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_shm_builds_shm_variant() {
        let p = Params::new().insert("name", "region-a").insert("size", 4096u64);
        let v = create_shm(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Shm(pb::ShmCall {
                op: Some(pb::shm_call::Op::CreateShm(inner)),
            })) => assert_eq!(inner.size, 4096),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
