//! Ambient configuration, in the style of `BpmnLiteConnection::from_env()`:
//! environment-variable overrides with sane defaults, no file-based config
//! layer (the teacher doesn't carry one for this kind of client).

use std::time::Duration;

const ENV_KERNEL_URL: &str = "SYSCALL_GATEWAY_KERNEL_URL";
const ENV_SYNC_TIMEOUT_MS: &str = "SYSCALL_GATEWAY_SYNC_TIMEOUT_MS";
const ENV_METADATA_TIMEOUT_MS: &str = "SYSCALL_GATEWAY_METADATA_TIMEOUT_MS";
const ENV_BREAKER_COOLDOWN_MS: &str = "SYSCALL_GATEWAY_BREAKER_COOLDOWN_MS";
const ENV_BREAKER_WINDOW_MS: &str = "SYSCALL_GATEWAY_BREAKER_WINDOW_MS";
const ENV_BREAKER_HALF_OPEN_PROBES: &str = "SYSCALL_GATEWAY_BREAKER_HALF_OPEN_PROBES";

const DEFAULT_KERNEL_URL: &str = "http://[::1]:50100";
const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BREAKER_COOLDOWN: Duration = Duration::from_secs(30);
const DEFAULT_BREAKER_WINDOW: Duration = Duration::from_secs(60);
const DEFAULT_BREAKER_HALF_OPEN_PROBES: u32 = 3;

/// Everything a [`crate::client::SyscallGateway`] needs to bootstrap: the
/// kernel's URL, per-call timeout ceilings, and the breaker's tuning knobs.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub kernel_url: String,
    pub sync_timeout: Duration,
    pub metadata_timeout: Duration,
    pub breaker_cooldown: Duration,
    pub breaker_window: Duration,
    pub breaker_half_open_probes: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            kernel_url: DEFAULT_KERNEL_URL.to_string(),
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            breaker_cooldown: DEFAULT_BREAKER_COOLDOWN,
            breaker_window: DEFAULT_BREAKER_WINDOW,
            breaker_half_open_probes: DEFAULT_BREAKER_HALF_OPEN_PROBES,
        }
    }
}

fn env_duration_ms(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

impl GatewayConfig {
    /// Read overrides from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        GatewayConfig {
            kernel_url: std::env::var(ENV_KERNEL_URL).unwrap_or_else(|_| DEFAULT_KERNEL_URL.to_string()),
            sync_timeout: env_duration_ms(ENV_SYNC_TIMEOUT_MS, DEFAULT_SYNC_TIMEOUT),
            metadata_timeout: env_duration_ms(ENV_METADATA_TIMEOUT_MS, DEFAULT_METADATA_TIMEOUT),
            breaker_cooldown: env_duration_ms(ENV_BREAKER_COOLDOWN_MS, DEFAULT_BREAKER_COOLDOWN),
            breaker_window: env_duration_ms(ENV_BREAKER_WINDOW_MS, DEFAULT_BREAKER_WINDOW),
            breaker_half_open_probes: env_u32(
                ENV_BREAKER_HALF_OPEN_PROBES,
                DEFAULT_BREAKER_HALF_OPEN_PROBES,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.kernel_url, DEFAULT_KERNEL_URL);
        assert_eq!(cfg.sync_timeout, Duration::from_secs(30));
        assert_eq!(cfg.metadata_timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_env_overrides_kernel_url() {
        std::env::set_var(ENV_KERNEL_URL, "http://127.0.0.1:7000");
        let cfg = GatewayConfig::from_env();
        assert_eq!(cfg.kernel_url, "http://127.0.0.1:7000");
        std::env::remove_var(ENV_KERNEL_URL);
    }

    #[test]
    fn from_env_ignores_unparseable_override() {
        std::env::set_var(ENV_SYNC_TIMEOUT_MS, "not-a-number");
        let cfg = GatewayConfig::from_env();
        assert_eq!(cfg.sync_timeout, DEFAULT_SYNC_TIMEOUT);
        std::env::remove_var(ENV_SYNC_TIMEOUT_MS);
    }
}
