//! Memory-mapped-file family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! mmap_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Mmap(pb::MmapCall {
                op: Some(pb::mmap_call::Op::$op($msg)),
            })),
        })
    };
}

fn mmap(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("mmap", "path")?;
    let size = p.require_u64("mmap", "size")?;
    let flags = p.require_u32("mmap", "flags")?;
    mmap_variant!(Mmap, pb::MmapOpenCall { path, size, flags })
}

fn mmap_read(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("mmap_read", "handle")?;
    let offset = p.require_u64("mmap_read", "offset")?;
    let size = p.require_u64("mmap_read", "size")?;
    mmap_variant!(
        MmapRead,
        pb::MmapReadCall {
            handle,
            offset,
            size
        }
    )
}

fn mmap_write(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("mmap_write", "handle")?;
    let offset = p.require_u64("mmap_write", "offset")?;
    let data = p.require_bytes("mmap_write", "data")?;
    mmap_variant!(
        MmapWrite,
        pb::MmapWriteCall {
            handle,
            offset,
            data
        }
    )
}

fn msync(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("msync", "handle")?;
    mmap_variant!(Msync, pb::MsyncCall { handle })
}

fn munmap(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("munmap", "handle")?;
    mmap_variant!(Munmap, pb::MunmapCall { handle })
}

fn mmap_stats(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("mmap_stats", "handle")?;
    mmap_variant!(MmapStats, pb::MmapStatsCall { handle })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("mmap", mmap);
    table.insert("mmap_read", mmap_read);
    table.insert("mmap_write", mmap_write);
    table.insert("msync", msync);
    table.insert("munmap", munmap);
    table.insert("mmap_stats", mmap_stats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn munmap_builds_mmap_variant() {
        let p = Params::new().insert("handle", 9u64);
        let v = munmap(&p).unwrap();
        assert!(matches!(
            v.family,
            Some(pb::call_variant::Family::Mmap(pb::MmapCall {
                op: Some(pb::mmap_call::Op::Munmap(_)),
            }))
        ));
    }
}
