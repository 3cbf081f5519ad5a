//! The dynamic parameter bag accepted by [`crate::request::build`].
//!
//! Callers that don't want to construct a typed request by hand go through
//! `Params`, a thin wrapper over a JSON object. Per the request-builder
//! contract, a key absent from the map (or explicitly `null`) is not a
//! builder-level error: `require_*` extraction falls back to the zero of
//! its semantic type and lets a well-formed-but-empty request through,
//! leaving required-field validation to the kernel. A value that *is*
//! present but of the wrong JSON type is always an error — that can only
//! be a caller bug, never a legitimately absent field. `optional_*`
//! extraction is the other family: it preserves presence/absence as
//! `Option`, for fields the wire message itself marks `optional`.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::GatewayError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(HashMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Params(HashMap::new())
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn wrong_type(call: &str, name: &str, want: &str) -> GatewayError {
        GatewayError::InvalidParameter {
            call: call.to_string(),
            name: name.to_string(),
            detail: format!("expected {want}"),
        }
    }

    pub fn require_str(&self, call: &str, name: &str) -> Result<String, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(v) => v
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| Self::wrong_type(call, name, "string")),
        }
    }

    pub fn optional_str(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(Value::as_str).map(str::to_string)
    }

    pub fn require_u64(&self, call: &str, name: &str) -> Result<u64, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(0),
            Some(v) => v
                .as_u64()
                .ok_or_else(|| Self::wrong_type(call, name, "u64")),
        }
    }

    pub fn optional_u64(&self, call: &str, name: &str) -> Result<Option<u64>, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| Self::wrong_type(call, name, "u64")),
        }
    }

    pub fn require_u32(&self, call: &str, name: &str) -> Result<u32, GatewayError> {
        Ok(self.require_u64(call, name)? as u32)
    }

    pub fn optional_u32(&self, call: &str, name: &str) -> Result<Option<u32>, GatewayError> {
        Ok(self.optional_u64(call, name)?.map(|v| v as u32))
    }

    pub fn require_i64(&self, call: &str, name: &str) -> Result<i64, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(0),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| Self::wrong_type(call, name, "i64")),
        }
    }

    pub fn require_i32(&self, call: &str, name: &str) -> Result<i32, GatewayError> {
        Ok(self.require_i64(call, name)? as i32)
    }

    pub fn optional_i32(&self, call: &str, name: &str) -> Result<Option<i32>, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_i64()
                .map(|v| Some(v as i32))
                .ok_or_else(|| Self::wrong_type(call, name, "i32")),
        }
    }

    pub fn require_bool(&self, call: &str, name: &str) -> Result<bool, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(v) => v
                .as_bool()
                .ok_or_else(|| Self::wrong_type(call, name, "bool")),
        }
    }

    pub fn optional_bool(&self, name: &str, default: bool) -> bool {
        self.0.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn require_bytes(&self, call: &str, name: &str) -> Result<Vec<u8>, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(s.as_bytes().to_vec()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_u64().map(|b| b as u8))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| Self::wrong_type(call, name, "byte array")),
            Some(_) => Err(Self::wrong_type(call, name, "bytes")),
        }
    }

    pub fn require_str_array(&self, call: &str, name: &str) -> Result<Vec<String>, GatewayError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => v
                .as_array()
                .ok_or_else(|| Self::wrong_type(call, name, "array"))?
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| Self::wrong_type(call, name, "string array"))
                })
                .collect(),
        }
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Params(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_roundtrips() {
        let p = Params::new().insert("path", "/tmp/x");
        assert_eq!(p.require_str("read_file", "path").unwrap(), "/tmp/x");
    }

    #[test]
    fn missing_required_defaults_to_the_zero_value() {
        let p = Params::new();
        assert_eq!(p.require_u64("sleep", "duration_ms").unwrap(), 0);
        assert_eq!(p.require_str("read_file", "path").unwrap(), "");
        assert!(!p.require_bool("some_call", "flag").unwrap());
        assert_eq!(p.require_bytes("send", "data").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn explicit_null_is_treated_as_missing() {
        let p = Params::new().insert("duration_ms", Value::Null);
        assert_eq!(p.require_u64("sleep", "duration_ms").unwrap(), 0);
    }

    #[test]
    fn optional_absent_is_none_not_zero() {
        let p = Params::new();
        assert_eq!(p.optional_u64("create_pipe", "capacity").unwrap(), None);
    }

    #[test]
    fn optional_present_zero_is_some_zero() {
        let p = Params::new().insert("capacity", 0u64);
        assert_eq!(p.optional_u64("create_pipe", "capacity").unwrap(), Some(0));
    }

    #[test]
    fn wrong_type_present_is_still_an_error() {
        let p = Params::new().insert("path", 5u64);
        assert!(p.require_str("read_file", "path").is_err());
    }
}
