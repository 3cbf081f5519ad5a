//! C8: the completion-queue engine (io_uring-style submission/reap pair
//! emulated over request/reply RPC).

mod reaper;

pub use reaper::CompletionQueue;
