//! C3: a per-target circuit breaker guarding RPC dispatch.
//!
//! State lives behind a [`parking_lot::Mutex`] — the non-poisoning,
//! fast-uncontended-path lock the `fusillade`/`dwctl` examples reach for on
//! hot in-memory counters. The critical section here is O(1), so a plain
//! lock beats juggling separate atomics for each counter.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::GatewayError;

const CONSECUTIVE_FAILURE_THRESHOLD: u32 = 5;
const WINDOW_MIN_REQUESTS: u32 = 10;
const WINDOW_FAILURE_RATIO_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    window_requests: u32,
    window_failures: u32,
    window_start: Instant,
    opened_at: Option<Instant>,
    half_open_in_flight: u32,
}

impl Inner {
    fn new() -> Self {
        Inner {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            window_requests: 0,
            window_failures: 0,
            window_start: Instant::now(),
            opened_at: None,
            half_open_in_flight: 0,
        }
    }

    fn reset_window_if_elapsed(&mut self, window: Duration) {
        if self.window_start.elapsed() >= window {
            self.window_requests = 0;
            self.window_failures = 0;
            self.window_start = Instant::now();
        }
    }
}

/// Guards dispatch to a single kernel target.
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    window: Duration,
    max_half_open_probes: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, window: Duration, max_half_open_probes: u32) -> Self {
        CircuitBreaker {
            inner: Mutex::new(Inner::new()),
            cooldown,
            window,
            max_half_open_probes,
        }
    }

    pub fn current_state(&self) -> BreakerState {
        let mut guard = self.inner.lock();
        self.maybe_transition_to_half_open(&mut guard);
        guard.state
    }

    fn maybe_transition_to_half_open(&self, guard: &mut Inner) {
        if guard.state == BreakerState::Open {
            if let Some(opened_at) = guard.opened_at {
                if opened_at.elapsed() >= self.cooldown {
                    tracing::debug!("circuit breaker cooldown elapsed, entering half-open");
                    guard.state = BreakerState::HalfOpen;
                    guard.half_open_in_flight = 0;
                }
            }
        }
    }

    /// Reserve a slot to dispatch one call. Returns an error immediately if
    /// the breaker is open, or if half-open and already at its probe limit.
    pub fn admit(&self) -> Result<BreakerTicket<'_>, GatewayError> {
        let mut guard = self.inner.lock();
        guard.reset_window_if_elapsed(self.window);
        self.maybe_transition_to_half_open(&mut guard);

        match guard.state {
            BreakerState::Open => {
                let retry_after_ms = guard
                    .opened_at
                    .map(|t| self.cooldown.saturating_sub(t.elapsed()).as_millis() as u64)
                    .unwrap_or(0);
                Err(GatewayError::BreakerOpen { retry_after_ms })
            }
            BreakerState::HalfOpen => {
                if guard.half_open_in_flight >= self.max_half_open_probes {
                    Err(GatewayError::BreakerOpen { retry_after_ms: 0 })
                } else {
                    guard.half_open_in_flight += 1;
                    Ok(BreakerTicket { breaker: self })
                }
            }
            BreakerState::Closed => Ok(BreakerTicket { breaker: self }),
        }
    }

    fn record(&self, failed: bool) {
        let mut guard = self.inner.lock();

        if guard.state == BreakerState::HalfOpen {
            guard.half_open_in_flight = guard.half_open_in_flight.saturating_sub(1);
            if failed {
                tracing::warn!("half-open probe failed, reopening circuit breaker");
                guard.state = BreakerState::Open;
                guard.opened_at = Some(Instant::now());
                guard.consecutive_failures = 0;
                guard.window_requests = 0;
                guard.window_failures = 0;
                guard.window_start = Instant::now();
            } else if guard.half_open_in_flight == 0 {
                tracing::debug!("half-open probes succeeded, closing circuit breaker");
                guard.state = BreakerState::Closed;
                guard.consecutive_failures = 0;
                guard.window_requests = 0;
                guard.window_failures = 0;
                guard.window_start = Instant::now();
            }
            return;
        }

        guard.reset_window_if_elapsed(self.window);
        guard.window_requests += 1;

        if failed {
            guard.consecutive_failures += 1;
            guard.window_failures += 1;
        } else {
            guard.consecutive_failures = 0;
        }

        let window_ratio_trip = guard.window_requests >= WINDOW_MIN_REQUESTS
            && (guard.window_failures as f64 / guard.window_requests as f64)
                > WINDOW_FAILURE_RATIO_THRESHOLD;

        if guard.consecutive_failures >= CONSECUTIVE_FAILURE_THRESHOLD || window_ratio_trip {
            tracing::warn!(
                consecutive = guard.consecutive_failures,
                window_requests = guard.window_requests,
                window_failures = guard.window_failures,
                "circuit breaker opening"
            );
            guard.state = BreakerState::Open;
            guard.opened_at = Some(Instant::now());
        }
    }
}

/// Tracks one admitted call; records its outcome against the breaker on
/// drop unless the caller explicitly reports it first.
pub struct BreakerTicket<'a> {
    breaker: &'a CircuitBreaker,
}

impl<'a> BreakerTicket<'a> {
    /// Report the outcome of the call this ticket was admitted for.
    /// `PermissionDenied` deliberately does not count as a failure.
    pub fn complete<T>(self, result: &Result<T, GatewayError>) {
        let failed = match result {
            Ok(_) => false,
            Err(e) => e.counts_as_breaker_failure(),
        };
        self.breaker.record(failed);
    }

    /// Report a pre-computed failure verdict directly, for call sites where
    /// the transport-level outcome doesn't map cleanly onto a single
    /// `Result<T, GatewayError>` (e.g. a batch call whose per-item results
    /// are tracked separately from the batch RPC's own success/failure).
    pub fn complete_raw(self, failed: bool) {
        self.breaker.record(failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(Duration::from_millis(50), Duration::from_secs(60), 2)
    }

    fn fail(err: GatewayError) -> Result<crate::response::Outcome, GatewayError> {
        Err(err)
    }

    fn ok() -> Result<crate::response::Outcome, GatewayError> {
        Ok(crate::response::Outcome(Vec::new()))
    }

    #[test]
    fn opens_after_five_consecutive_failures() {
        let b = breaker();
        for _ in 0..4 {
            let ticket = b.admit().unwrap();
            ticket.complete(&fail(GatewayError::SyscallFailed {
                message: "x".into(),
            }));
            assert_eq!(b.current_state(), BreakerState::Closed);
        }
        let ticket = b.admit().unwrap();
        ticket.complete(&fail(GatewayError::SyscallFailed {
            message: "x".into(),
        }));
        assert_eq!(b.current_state(), BreakerState::Open);
    }

    #[test]
    fn permission_denied_never_trips_the_breaker() {
        let b = breaker();
        for _ in 0..50 {
            let ticket = b.admit().unwrap();
            ticket.complete(&fail(GatewayError::PermissionDenied {
                reason: "no".into(),
            }));
        }
        assert_eq!(b.current_state(), BreakerState::Closed);
    }

    #[test]
    fn opens_on_windowed_failure_ratio() {
        let b = breaker();
        // 6 failures, 4 successes out of 10 => ratio 0.6 > 0.5, but fewer
        // than 5 consecutive failures if interleaved.
        let pattern = [true, false, true, false, true, false, true, false, true, true];
        for failed in pattern {
            let ticket = b.admit().unwrap();
            if failed {
                ticket.complete(&fail(GatewayError::SyscallFailed {
                    message: "x".into(),
                }));
            } else {
                ticket.complete(&ok());
            }
        }
        assert_eq!(b.current_state(), BreakerState::Open);
    }

    #[test]
    fn open_breaker_fails_fast() {
        let b = breaker();
        for _ in 0..5 {
            let ticket = b.admit().unwrap();
            ticket.complete(&fail(GatewayError::SyscallFailed {
                message: "x".into(),
            }));
        }
        assert!(matches!(
            b.admit().unwrap_err(),
            GatewayError::BreakerOpen { .. }
        ));
    }

    #[test]
    fn half_open_all_success_closes() {
        let b = breaker();
        for _ in 0..5 {
            let ticket = b.admit().unwrap();
            ticket.complete(&fail(GatewayError::SyscallFailed {
                message: "x".into(),
            }));
        }
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(b.current_state(), BreakerState::HalfOpen);
        let t1 = b.admit().unwrap();
        let t2 = b.admit().unwrap();
        t1.complete(&ok());
        t2.complete(&ok());
        assert_eq!(b.current_state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_any_failure_reopens() {
        let b = breaker();
        for _ in 0..5 {
            let ticket = b.admit().unwrap();
            ticket.complete(&fail(GatewayError::SyscallFailed {
                message: "x".into(),
            }));
        }
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(b.current_state(), BreakerState::HalfOpen);
        let ticket = b.admit().unwrap();
        ticket.complete(&fail(GatewayError::SyscallFailed {
            message: "x".into(),
        }));
        assert_eq!(b.current_state(), BreakerState::Open);
    }
}
