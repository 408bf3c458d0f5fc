// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed settings the core consumes.

use std::time::Duration;

use crate::multiaddr::Multiaddr;

/// Default idle interval used when the executor spawns a daemon without an
/// explicit `--auto-exit-interval`.
pub const DEFAULT_AUTO_EXIT_INTERVAL: Duration = Duration::from_secs(30);

/// The subset of settings the daemon orchestrator (G) reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub service_addresses: Vec<Multiaddr>,
    /// `None` disables auto-exit; `Some(Duration::ZERO)` is also disabled.
    pub auto_exit_interval: Option<Duration>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_addresses(mut self, addresses: Vec<Multiaddr>) -> Self {
        self.service_addresses = addresses;
        self
    }

    pub fn with_auto_exit_interval(mut self, interval: Option<Duration>) -> Self {
        self.auto_exit_interval = interval;
        self
    }

    /// Whether the idle-tick trigger should run at all.
    pub fn auto_exit_enabled(&self) -> bool {
        matches!(self.auto_exit_interval, Some(d) if !d.is_zero())
    }

    /// Reads settings from the process environment, following each field's
    /// alias. Unset or unparsable values fall back to the default, in the
    /// plain `env::var` + manual-parse style (no config-crate dependency).
    pub fn from_env() -> Self {
        let service_addresses = std::env::var("IPFSD_SERVICE_ADDRESSES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .filter(|s| !s.trim().is_empty())
                    .filter_map(|s| Multiaddr::parse(s.trim()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let auto_exit_interval = std::env::var("IPFSD_AUTO_EXIT_INTERVAL")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        Self { service_addresses, auto_exit_interval }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_auto_exit() {
        let s = Settings::new();
        assert!(!s.auto_exit_enabled());
    }

    #[test]
    fn zero_interval_disables_auto_exit() {
        let s = Settings::new().with_auto_exit_interval(Some(Duration::ZERO));
        assert!(!s.auto_exit_enabled());
    }

    #[test]
    fn nonzero_interval_enables_auto_exit() {
        let s = Settings::new().with_auto_exit_interval(Some(Duration::from_secs(1)));
        assert!(s.auto_exit_enabled());
    }

    #[test]
    fn from_env_parses_addresses() {
        std::env::set_var("IPFSD_SERVICE_ADDRESSES", "/ip4/127.0.0.1/tcp/5001,/unix/tmp/s");
        std::env::set_var("IPFSD_AUTO_EXIT_INTERVAL", "45");
        let s = Settings::from_env();
        assert_eq!(s.service_addresses.len(), 2);
        assert_eq!(s.auto_exit_interval, Some(Duration::from_secs(45)));
        std::env::remove_var("IPFSD_SERVICE_ADDRESSES");
        std::env::remove_var("IPFSD_AUTO_EXIT_INTERVAL");
    }
}
