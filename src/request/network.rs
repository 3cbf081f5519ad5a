//! High-level network-request family builder.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

use super::BuildFn;

fn network_request(p: &Params) -> Result<pb::CallVariant, GatewayError> {
    let url = p.require_str("network_request", "url")?;
    let method = p.require_str("network_request", "method")?;
    let body = p.get("body").map_or(Ok(Vec::new()), |_| {
        p.require_bytes("network_request", "body")
    })?;
    Ok(pb::CallVariant {
        family: Some(pb::call_variant::Family::Network(pb::NetworkCall {
            op: Some(pb::network_call::Op::NetworkRequest(
                pb::NetworkRequestCall { url, method, body },
            )),
        })),
    })
}

pub(crate) fn register(table: &mut HashMap<&'static str, BuildFn>) {
    table.insert("network_request", network_request);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_request_defaults_empty_body() {
        let p = Params::new()
            .insert("url", "http://example.test")
            .insert("method", "GET");
        let v = network_request(&p).unwrap();
        match v.family {
            Some(pb::call_variant::Family::Network(pb::NetworkCall {
                op: Some(pb::network_call::Op::NetworkRequest(inner)),
            })) => assert!(inner.body.is_empty()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
