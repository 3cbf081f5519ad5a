//! Async message-queue family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! queue_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Queue(pb::QueueCall {
                op: Some(pb::queue_call::Op::$op($msg)),
            })),
        })
    };
}

// `capacity` absent means an unbounded queue.
fn create_queue(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let name = p.require_str("create_queue", "name")?;
    let capacity = p.optional_u64("create_queue", "capacity")?;
    queue_variant!(CreateQueue, pb::CreateQueueCall { name, capacity })
}

// `priority` absent means the queue's default priority.
fn send_queue(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("send_queue", "handle")?;
    let data = p.require_bytes("send_queue", "data")?;
    let priority = p.optional_i32("send_queue", "priority")?;
    queue_variant!(
        SendQueue,
        pb::SendQueueCall {
            handle,
            data,
            priority
        }
    )
}

// `timeout_ms` absent means block indefinitely.
fn receive_queue(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("receive_queue", "handle")?;
    let timeout_ms = p.optional_u64("receive_queue", "timeout_ms")?;
    queue_variant!(
        ReceiveQueue,
        pb::ReceiveQueueCall {
            handle,
            timeout_ms
        }
    )
}

fn subscribe_queue(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("subscribe_queue", "handle")?;
    queue_variant!(SubscribeQueue, pb::SubscribeQueueCall { handle })
}

fn unsubscribe_queue(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("unsubscribe_queue", "handle")?;
    queue_variant!(UnsubscribeQueue, pb::UnsubscribeQueueCall { handle })
}

fn close_queue(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("close_queue", "handle")?;
    queue_variant!(CloseQueue, pb::CloseQueueCall { handle })
}

fn destroy_queue(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let name = p.require_str("destroy_queue", "name")?;
    queue_variant!(DestroyQueue, pb::DestroyQueueCall { name })
}

fn queue_stats(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("queue_stats", "handle")?;
    queue_variant!(QueueStats, pb::QueueStatsCall { handle })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("create_queue", create_queue);
    table.insert("send_queue", send_queue);
    table.insert("receive_queue", receive_queue);
    table.insert("subscribe_queue", subscribe_queue);
    table.insert("unsubscribe_queue", unsubscribe_queue);
    table.insert("close_queue", close_queue);
    table.insert("destroy_queue", destroy_queue);
    table.insert("queue_stats", queue_stats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_queue_without_timeout_blocks_indefinitely() {
        let p = Params::new().insert("handle", 2u64);
        let v = receive_queue(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Queue(pb::QueueCall {
                op: Some(pb::queue_call::Op::ReceiveQueue(inner)),
            })) => assert_eq!(inner.timeout_ms, None),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
