//! C1: maps a syscall name and a [`Params`] bag onto a typed [`pb::CallVariant`].
//!
//! Dispatch is table-driven rather than one giant match: each family module
//! registers its call names into a single [`HashMap`], built once behind a
//! [`OnceLock`] and shared by every caller.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::GatewayError;
use crate::params::Params;
use crate::pb;

mod fd;
mod fs;
mod memory;
mod mmap;
mod network;
mod pipe;
mod process;
mod queue;
mod scheduler;
mod shm;
mod signal;
mod sock;
mod system;
mod time;

type BuildFn = fn(&Params) -> Result<pb::CallVariant, GatewayError>;

fn table() -> &'static HashMap<&'static str, BuildFn> {
    static TABLE: OnceLock<HashMap<&'static str, BuildFn>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        fs::register(&mut table);
        process::register(&mut table);
        system::register(&mut table);
        time::register(&mut table);
        memory::register(&mut table);
        signal::register(&mut table);
        network::register(&mut table);
        sock::register(&mut table);
        fd::register(&mut table);
        pipe::register(&mut table);
        shm::register(&mut table);
        mmap::register(&mut table);
        queue::register(&mut table);
        scheduler::register(&mut table);
        table
    })
}

/// Look up `call` in the closed set and build its typed wire payload.
pub fn build(call: &str, params: &Params) -> Result<pb::CallVariant, GatewayError> {
    match table().get(call) {
        Some(build_fn) => build_fn(params),
        None => Err(GatewayError::UnknownCall(call.to_string())),
    }
}

/// Whether `call` is part of the closed set this gateway understands.
pub fn is_known_call(call: &str) -> bool {
    table().contains_key(call)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_documented_family() {
        for name in [
            "read_file",
            "spawn_process",
            "get_system_info",
            "sleep",
            "get_memory_stats",
            "send_signal",
            "network_request",
            "socket",
            "open",
            "create_pipe",
            "create_shm",
            "mmap",
            "create_queue",
            "schedule_next",
        ] {
            assert!(is_known_call(name), "{name} should be a known call");
        }
    }

    #[test]
    fn unknown_call_is_rejected() {
        let err = build("reboot_the_universe", &Params::new()).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownCall(_)));
    }

    #[test]
    fn table_has_all_ninety_seven_calls() {
        assert_eq!(table().len(), 97);
    }
}
