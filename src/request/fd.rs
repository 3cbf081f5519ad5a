//! File-descriptor family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! fd_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Fd(pb::FdCall {
                op: Some(pb::fd_call::Op::$op($msg)),
            })),
        })
    };
}

fn open(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let path = p.require_str("open", "path")?;
    let flags = p.require_u32("open", "flags")?;
    fd_variant!(Open, pb::OpenCall { path, flags })
}

fn close(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let fd = p.require_i32("close", "fd")?;
    fd_variant!(Close, pb::CloseCall { fd })
}

fn dup(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let fd = p.require_i32("dup", "fd")?;
    fd_variant!(Dup, pb::DupCall { fd })
}

fn dup2(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let fd = p.require_i32("dup2", "fd")?;
    let new_fd = p.require_i32("dup2", "new_fd")?;
    fd_variant!(Dup2, pb::Dup2Call { fd, new_fd })
}

fn lseek(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let fd = p.require_i32("lseek", "fd")?;
    let offset = p.require_i64("lseek", "offset")?;
    let whence = p.require_i32("lseek", "whence")?;
    fd_variant!(
        Lseek,
        pb::LseekCall {
            fd,
            offset,
            whence
        }
    )
}

fn fcntl(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let fd = p.require_i32("fcntl", "fd")?;
    let cmd = p.require_i32("fcntl", "cmd")?;
    let arg = p.require_i64("fcntl", "arg")?;
    fd_variant!(Fcntl, pb::FcntlCall { fd, cmd, arg })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("open", open);
    table.insert("close", close);
    table.insert("dup", dup);
    table.insert("dup2", dup2);
    table.insert("lseek", lseek);
    table.insert("fcntl", fcntl);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dup2_builds_fd_variant() {
        let p = Params::new().insert("fd", 3i64).insert("new_fd", 7i64);
        let v = dup2(&p).unwrap();
        assert!(matches!(
            v.family,
            Some(pb::call_variant::Family::Fd(pb::FdCall {
                op: Some(pb::fd_call::Op::Dup2(_)),
            }))
        ));
    }
}
