//! Socket family request builders.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

macro_rules! sock_variant {
    ($op:ident, $msg:expr) => {
        Ok(pb::CallVariant {
            family: Some(pb::call_variant::Family::Sock(pb::SockCall {
                op: Some(pb::sock_call::Op::$op($msg)),
            })),
        })
    };
}

fn socket(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let domain = p.require_i32("socket", "domain")?;
    let sock_type = p.require_i32("socket", "sock_type")?;
    let protocol = p.require_i32("socket", "protocol")?;
    sock_variant!(
        Socket,
        pb::SocketOpenCall {
            domain,
            sock_type,
            protocol
        }
    )
}

fn bind(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("bind", "handle")?;
    let address = p.require_str("bind", "address")?;
    let port = p.require_u32("bind", "port")?;
    sock_variant!(
        Bind,
        pb::BindCall {
            handle,
            address,
            port
        }
    )
}

fn listen(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("listen", "handle")?;
    let backlog = p.require_i32("listen", "backlog")?;
    sock_variant!(Listen, pb::ListenCall { handle, backlog })
}

fn accept(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("accept", "handle")?;
    sock_variant!(Accept, pb::AcceptCall { handle })
}

fn connect(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("connect", "handle")?;
    let address = p.require_str("connect", "address")?;
    let port = p.require_u32("connect", "port")?;
    sock_variant!(
        Connect,
        pb::ConnectCall {
            handle,
            address,
            port
        }
    )
}

fn send(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("send", "handle")?;
    let data = p.require_bytes("send", "data")?;
    let flags = p.require_u32("send", "flags")?;
    sock_variant!(
        Send,
        pb::SendCall {
            handle,
            data,
            flags
        }
    )
}

fn recv(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("recv", "handle")?;
    let size = p.require_u64("recv", "size")?;
    let flags = p.require_u32("recv", "flags")?;
    sock_variant!(
        Recv,
        pb::RecvCall {
            handle,
            size,
            flags
        }
    )
}

fn send_to(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("send_to", "handle")?;
    let data = p.require_bytes("send_to", "data")?;
    let address = p.require_str("send_to", "address")?;
    let port = p.require_u32("send_to", "port")?;
    sock_variant!(
        SendTo,
        pb::SendToCall {
            handle,
            data,
            address,
            port
        }
    )
}

fn recv_from(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("recv_from", "handle")?;
    let size = p.require_u64("recv_from", "size")?;
    sock_variant!(RecvFrom, pb::RecvFromCall { handle, size })
}

fn close_socket(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("close_socket", "handle")?;
    sock_variant!(CloseSocket, pb::CloseSocketCall { handle })
}

fn set_sock_opt(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("set_sock_opt", "handle")?;
    let option = p.require_i32("set_sock_opt", "option")?;
    let value = p.require_i64("set_sock_opt", "value")?;
    sock_variant!(
        SetSockOpt,
        pb::SetSockOptCall {
            handle,
            option,
            value
        }
    )
}

fn get_sock_opt(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let handle = p.require_u64("get_sock_opt", "handle")?;
    let option = p.require_i32("get_sock_opt", "option")?;
    sock_variant!(GetSockOpt, pb::GetSockOptCall { handle, option })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("socket", socket);
    table.insert("bind", bind);
    table.insert("listen", listen);
    table.insert("accept", accept);
    table.insert("connect", connect);
    table.insert("send", send);
    table.insert("recv", recv);
    table.insert("send_to", send_to);
    table.insert("recv_from", recv_from);
    table.insert("close_socket", close_socket);
    table.insert("set_sock_opt", set_sock_opt);
    table.insert("get_sock_opt", get_sock_opt);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_defaults_missing_flags_to_zero() {
        let p = Params::new().insert("handle", 1u64).insert("data", "hi");
        let v = send(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Sock(pb::SockCall {
                op: Some(pb::sock_call::Op::Send(inner)),
            })) => assert_eq!(inner.flags, 0),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn send_rejects_flags_of_the_wrong_type() {
        let p = Params::new()
            .insert("handle", 1u64)
            .insert("data", "hi")
            .insert("flags", "not-a-number");
        let err = send(&p).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidParameter { .. }));
    }

    #[test]
    fn send_builds_sock_variant_with_given_flags() {
        let p = Params::new()
            .insert("handle", 1u64)
            .insert("data", "hi")
            .insert("flags", 4u64);
        let v = send(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Sock(pb::SockCall {
                op: Some(pb::sock_call::Op::Send(inner)),
            })) => assert_eq!(inner.flags, 4),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
