// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon orchestrator (component G): acquires listeners, starts a
//! server per listener, wires the stop triggers, waits for a stop, and
//! shuts every server down within a grace period.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use axum::Router;
use ipfsd_core::{Reason, Response, Settings, Stopper};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::DaemonError;
use crate::listener;
use crate::serve::ServerInstance;
use crate::stdio::StdioSync;
use crate::triggers::{self, AlwaysIdle, IdleCheck};

/// Grace period given to every server instance to finish in-flight
/// requests once shutdown has been signaled.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Everything the orchestrator needs besides the settings themselves.
pub struct Orchestrator {
    settings: Settings,
    router_factory: Box<dyn Fn(Arc<Stopper>) -> Router + Send + Sync>,
    idle: Arc<dyn IdleCheck>,
    stopper: Arc<Stopper>,
    stdio: Arc<StdioSync>,
    cancel_tx: StdMutex<Option<oneshot::Sender<()>>>,
    cancel_rx: StdMutex<Option<oneshot::Receiver<()>>>,
}

impl Orchestrator {
    /// `router_factory` is handed this orchestrator's [`Stopper`] so the
    /// router it builds (one call per acquired listener) can dispatch a
    /// `service/daemon/stop` command straight into it.
    pub fn new(
        settings: Settings,
        router_factory: impl Fn(Arc<Stopper>) -> Router + Send + Sync + 'static,
    ) -> Self {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        Self {
            settings,
            router_factory: Box::new(router_factory),
            idle: Arc::new(AlwaysIdle),
            stopper: Arc::new(Stopper::new()),
            stdio: Arc::new(StdioSync::new()),
            cancel_tx: StdMutex::new(Some(cancel_tx)),
            cancel_rx: StdMutex::new(Some(cancel_rx)),
        }
    }

    pub fn with_idle_check(mut self, idle: Arc<dyn IdleCheck>) -> Self {
        self.idle = idle;
        self
    }

    /// Exposed so an HTTP handler (e.g. the `service/daemon/stop` RPC) can
    /// request a stop via [`ipfsd_core::Stopper::stop`] independently of
    /// the request-cancel trigger below.
    pub fn stopper(&self) -> Arc<Stopper> {
        self.stopper.clone()
    }

    /// Hands out the sender side of the request-cancel trigger. Intended
    /// to be taken once, before [`Orchestrator::run`], and wired into
    /// whatever dispatches the `service/daemon/stop` command so that
    /// sending on it (rather than calling [`Orchestrator::stopper`]
    /// directly) also exercises the dedicated trigger task.
    pub fn take_cancel_sender(&self) -> Option<oneshot::Sender<()>> {
        self.cancel_tx.lock().ok().and_then(|mut g| g.take())
    }

    /// Runs the full startup -> ready -> wait -> shutdown procedure,
    /// returning the first error encountered (a step-5 serve failure takes
    /// priority over a step-6 shutdown failure), or `Ok(())` on a clean
    /// stop.
    pub async fn run(self) -> Result<(), DaemonError> {
        let ctx = CancellationToken::new();
        let stop_rx = self.stopper.initialize(ctx.clone()).map_err(|_| DaemonError::NoListeners)?;

        // Step 1: acquire listeners.
        let addresses = if self.settings.service_addresses.is_empty() {
            listener::default_addresses()
        } else {
            self.settings.service_addresses.clone()
        };
        self.stdio.emit(&Response::starting()).await?;

        let acquired = listener::acquire(&addresses).await;
        let mut listeners = Vec::new();
        for (addr, result) in acquired {
            match result {
                Ok(l) => listeners.push(l),
                Err(e) => tracing::warn!(%addr, error = %e, "failed to acquire listener"),
            }
        }
        if listeners.is_empty() {
            return Err(DaemonError::NoListeners);
        }

        // Step 2: build servers.
        let mut instances = Vec::new();
        for l in listeners {
            self.stdio.emit(&Response::starting_listener(l.addr().clone())).await?;
            let router = (self.router_factory)(self.stopper.clone());
            instances.push(ServerInstance::spawn(l, router));
        }

        // Step 3: wire triggers.
        let mut trigger_handles = Vec::new();

        trigger_handles.push(tokio::spawn(triggers::signal_trigger(self.stopper.clone())));
        self.stdio.emit(&Response::info("/os/interrupt")).await?;

        if let Some(cancel_rx) = self.cancel_rx.lock().ok().and_then(|mut g| g.take()) {
            trigger_handles
                .push(tokio::spawn(triggers::request_cancel_trigger(self.stopper.clone(), cancel_rx)));
        }
        self.stdio.emit(&Response::info("/service/daemon/stop")).await?;

        let idle_interval = if self.settings.auto_exit_enabled() {
            let interval = self.settings.auto_exit_interval.unwrap_or(ipfsd_core::settings::DEFAULT_AUTO_EXIT_INTERVAL);
            trigger_handles.push(tokio::spawn(triggers::idle_tick_trigger(
                self.stopper.clone(),
                self.idle.clone(),
                interval,
            )));
            Some(interval)
        } else {
            None
        };

        let stdio_for_detach = self.stdio.clone();
        tokio::spawn(async move { stdio_for_detach.watch_for_detach().await });

        // Step 4: ready.
        self.stdio.emit(&Response::ready()).await?;

        if let Some(interval) = idle_interval {
            self.stdio
                .emit(&Response::info(format!("/go/ticker/is-service-idle-every:{interval:?}")))
                .await?;
        }

        // Step 5: wait for a stop reason. A server that fails spontaneously
        // surfaces that failure at step 6, when its join handle is awaited.
        let stop_reason = stop_rx.await.unwrap_or(Reason::Error);
        ctx.cancel();

        self.stdio.emit(&Response::stopping(stop_reason)).await?;

        // Step 6: shut every instance down within the grace period.
        let mut first_error = None;
        for instance in instances {
            let addr = instance.addr.clone();
            let result = tokio::time::timeout(SHUTDOWN_GRACE, instance.shutdown()).await;
            match result {
                Ok(Ok(())) => {
                    let _ = self.stdio.emit(&Response::info(format!("listener {addr} stopped"))).await;
                }
                Ok(Err(e)) => {
                    tracing::warn!(%addr, error = %e, "server shutdown failed");
                    first_error.get_or_insert(e);
                }
                Err(_) => {
                    tracing::warn!(%addr, "server did not stop within the grace period");
                    first_error.get_or_insert(DaemonError::Serve(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "shutdown grace period exceeded",
                    )));
                }
            }
        }

        for handle in trigger_handles {
            handle.abort();
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
