// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three stop triggers (components D and E): OS signal, an explicit
//! RPC-driven cancellation, and an idle-tick watchdog. Each trigger is an
//! independent future racing the others in the orchestrator's select loop;
//! whichever resolves first calls [`ipfsd_core::Stopper::stop`].

use std::sync::Arc;
use std::time::Duration;

use ipfsd_core::{Reason, Stopper};
use tokio::signal::unix::{signal, SignalKind};

/// Whether any mount (or other long-lived surface) is presently active.
/// The only implementation shipped here is [`AlwaysIdle`]: no mount/NFS/9P
/// surface exists in this build, so there is never anything to wait on.
#[async_trait::async_trait]
pub trait IdleCheck: Send + Sync {
    async fn is_idle(&self) -> bool;
}

/// Always reports idle. Correct as long as no mount surface is wired up;
/// the idle-tick trigger then fires on its very first tick whenever
/// auto-exit is enabled.
pub struct AlwaysIdle;

#[async_trait::async_trait]
impl IdleCheck for AlwaysIdle {
    async fn is_idle(&self) -> bool {
        true
    }
}

/// Waits for SIGINT or SIGTERM, then stops with [`Reason::Canceled`].
pub async fn signal_trigger(stopper: Arc<Stopper>) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }

    tracing::info!("signal trigger fired");
    let _ = stopper.stop(Reason::Canceled);
}

/// Waits for `cancel_rx` (fired by an RPC-dispatched stop request), then
/// stops with [`Reason::Requested`].
pub async fn request_cancel_trigger(stopper: Arc<Stopper>, cancel_rx: tokio::sync::oneshot::Receiver<()>) {
    if cancel_rx.await.is_ok() {
        tracing::info!("request-cancel trigger fired");
        let _ = stopper.stop(Reason::Requested);
    }
}

/// Polls `idle` every `interval`; the first idle tick stops with
/// [`Reason::Idle`]. Only run when `Settings::auto_exit_enabled()`.
pub async fn idle_tick_trigger(stopper: Arc<Stopper>, idle: Arc<dyn IdleCheck>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if idle.is_idle().await {
            tracing::info!("idle-tick trigger fired");
            let _ = stopper.stop(Reason::Idle);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn idle_tick_fires_on_the_first_tick_when_always_idle() {
        let stopper = Arc::new(Stopper::new());
        let rx = stopper.initialize(CancellationToken::new()).unwrap();
        idle_tick_trigger(stopper.clone(), Arc::new(AlwaysIdle), Duration::from_millis(5)).await;
        assert_eq!(rx.await.unwrap(), Reason::Idle);
    }

    #[tokio::test]
    async fn request_cancel_trigger_stops_with_requested() {
        let stopper = Arc::new(Stopper::new());
        let rx = stopper.initialize(CancellationToken::new()).unwrap();
        let (tx, cancel_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(request_cancel_trigger(stopper.clone(), cancel_rx));
        tx.send(()).unwrap();
        handle.await.unwrap();
        assert_eq!(rx.await.unwrap(), Reason::Requested);
    }

    struct NeverIdle;

    #[async_trait::async_trait]
    impl IdleCheck for NeverIdle {
        async fn is_idle(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn idle_tick_never_fires_while_not_idle() {
        let stopper = Arc::new(Stopper::new());
        let _rx = stopper.initialize(CancellationToken::new()).unwrap();
        let result = tokio::time::timeout(
            Duration::from_millis(30),
            idle_tick_trigger(stopper, Arc::new(NeverIdle), Duration::from_millis(5)),
        )
        .await;
        assert!(result.is_err());
    }
}
