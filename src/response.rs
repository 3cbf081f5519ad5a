//! C2: decodes a [`pb::Response`] into either a raw byte payload or a typed
//! [`GatewayError`].

use serde_json::Value;

use crate::error::GatewayError;
use crate::pb;

/// A decoded, successful response body.
///
/// The base layer is the raw bytes the kernel returned — `read_file`'s
/// file content, `recv`'s socket bytes, `mmap_read`'s mapped region, and so
/// on are returned exactly as the kernel sent them, with no assumption that
/// they are JSON. A handful of calls (scheduler stats, the active
/// scheduling policy name, ...) additionally promise a JSON-encoded
/// structured value as their payload; callers that know they're decoding
/// one of those go through [`Outcome::parse_json`] for the second layer.
/// `crate::ops` does this on the caller's behalf for the calls it wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome(pub Vec<u8>);

impl Outcome {
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parse this payload as the structured JSON second layer a handful of
    /// calls promise. `call` is carried into the error for diagnostics
    /// only; it does not gate which calls are allowed to parse.
    pub fn parse_json(&self, call: &str) -> Result<Value, GatewayError> {
        if self.0.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.0).map_err(|e| GatewayError::MalformedResponse {
            call: call.to_string(),
            detail: e.to_string(),
        })
    }
}

/// Decode the three-way wire outcome (`success` / `error` / `permission
/// denied`) into a Rust `Result`. A `success` outcome's data is returned
/// verbatim as bytes; no JSON parsing happens at this layer.
pub fn decode(call: &str, response: pb::Response) -> Result<Outcome, GatewayError> {
    match response.outcome {
        Some(pb::response::Outcome::Success(success)) => Ok(Outcome(success.data)),
        Some(pb::response::Outcome::Error(err)) => Err(GatewayError::SyscallFailed {
            message: err.message,
        }),
        Some(pb::response::Outcome::PermissionDenied(denied)) => {
            Err(GatewayError::PermissionDenied {
                reason: denied.reason,
            })
        }
        None => Err(GatewayError::MalformedResponse {
            call: call.to_string(),
            detail: "response carried no outcome".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_as_raw_bytes() {
        let resp = pb::Response {
            outcome: Some(pb::response::Outcome::Success(pb::SuccessResult {
                data: b"mock-kernel\n".to_vec(),
            })),
        };
        let outcome = decode("read_file", resp).unwrap();
        assert_eq!(outcome.into_bytes(), b"mock-kernel\n".to_vec());
    }

    #[test]
    fn decodes_empty_success_as_empty_bytes() {
        let resp = pb::Response {
            outcome: Some(pb::response::Outcome::Success(pb::SuccessResult {
                data: Vec::new(),
            })),
        };
        let outcome = decode("close", resp).unwrap();
        assert!(outcome.into_bytes().is_empty());
    }

    #[test]
    fn decodes_error_outcome() {
        let resp = pb::Response {
            outcome: Some(pb::response::Outcome::Error(pb::ErrorResult {
                message: "no such file".to_string(),
            })),
        };
        let err = decode("read_file", resp).unwrap_err();
        assert!(matches!(err, GatewayError::SyscallFailed { .. }));
    }

    #[test]
    fn decodes_permission_denied_outcome() {
        let resp = pb::Response {
            outcome: Some(pb::response::Outcome::PermissionDenied(
                pb::PermissionDeniedResult {
                    reason: "missing capability".to_string(),
                },
            )),
        };
        let err = decode("kill_process", resp).unwrap_err();
        assert!(matches!(err, GatewayError::PermissionDenied { .. }));
    }

    #[test]
    fn non_json_bytes_decode_successfully_without_a_second_layer_parse() {
        let resp = pb::Response {
            outcome: Some(pb::response::Outcome::Success(pb::SuccessResult {
                data: b"not json".to_vec(),
            })),
        };
        let outcome = decode("read_file", resp).unwrap();
        assert_eq!(outcome.into_bytes(), b"not json".to_vec());
    }

    #[test]
    fn parse_json_decodes_the_structured_second_layer() {
        let outcome = Outcome(br#"{"policy":"fair"}"#.to_vec());
        assert_eq!(
            outcome.parse_json("get_scheduling_policy").unwrap(),
            serde_json::json!({"policy": "fair"})
        );
    }

    #[test]
    fn parse_json_rejects_non_json_bytes() {
        let outcome = Outcome(b"not json".to_vec());
        let err = outcome.parse_json("get_scheduler_stats").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { .. }));
    }
}
