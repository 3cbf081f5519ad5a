//! C10: typed wrappers over commonly-used signal and scheduler syscalls.
//!
//! Each wrapper is a thin specialisation: it constructs the variant
//! directly via [`crate::request`], dispatches through the raw-request path
//! (C3's breaker-guarded [`SyncDispatcher`]), and decodes the structured
//! bytes for the caller. Signal numbers follow Unix convention (HUP=1,
//! INT=2, KILL=9, TERM=15, real-time range 34-63).

pub mod scheduler;
pub mod signal;
