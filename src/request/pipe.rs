//! Pipe family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! pipe_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Pipe(pb::PipeCall {
                op: Some(pb::pipe_call::Op::$op($msg)),
            })),
        })
    };
}

// `capacity` absent means "use the kernel's default pipe capacity".
fn create_pipe(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let capacity = p.optional_u64("create_pipe", "capacity")?;
    pipe_variant!(CreatePipe, pb::CreatePipeCall { capacity })
}

fn write_pipe(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("write_pipe", "handle")?;
    let data = p.require_bytes("write_pipe", "data")?;
    pipe_variant!(WritePipe, pb::WritePipeCall { handle, data })
}

fn read_pipe(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("read_pipe", "handle")?;
    let size = p.require_u64("read_pipe", "size")?;
    pipe_variant!(ReadPipe, pb::ReadPipeCall { handle, size })
}

fn close_pipe(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("close_pipe", "handle")?;
    pipe_variant!(ClosePipe, pb::ClosePipeCall { handle })
}

fn destroy_pipe(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("destroy_pipe", "handle")?;
    pipe_variant!(DestroyPipe, pb::DestroyPipeCall { handle })
}

fn pipe_stats(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("pipe_stats", "handle")?;
    pipe_variant!(PipeStats, pb::PipeStatsCall { handle })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("create_pipe", create_pipe);
    table.insert("write_pipe", write_pipe);
    table.insert("read_pipe", read_pipe);
    table.insert("close_pipe", close_pipe);
    table.insert("destroy_pipe", destroy_pipe);
    table.insert("pipe_stats", pipe_stats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_pipe_without_capacity_is_none() {
        let v = create_pipe(&Params::new()).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Pipe(pb::PipeCall {
                op: Some(pb::pipe_call::Op::CreatePipe(inner)),
            })) => assert_eq!(inner.capacity, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
