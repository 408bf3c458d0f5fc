// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server instances (component F): one `axum::serve` task per acquired
//! listener, each individually graceful-shutdownable.

use axum::Router;
use ipfsd_core::Multiaddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::DaemonError;
use crate::listener::Listener;

/// A running server plus the means to stop it.
pub struct ServerInstance {
    pub addr: Multiaddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl ServerInstance {
    /// Spawns `router` behind `listener`, returning immediately; the serve
    /// task runs in the background until [`ServerInstance::shutdown`] is
    /// called or the task itself fails.
    pub fn spawn(listener: Listener, router: Router) -> Self {
        let addr = listener.addr().clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = match listener {
            Listener::Tcp { listener, .. } => tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
            }),
            Listener::Unix { listener, cleanup_dir, .. } => tokio::spawn(async move {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
                let _ = tokio::fs::remove_dir_all(&cleanup_dir).await;
                result
            }),
        };

        Self { addr, shutdown_tx: Some(shutdown_tx), handle }
    }

    /// Signals graceful shutdown and waits for the serve task to exit.
    pub async fn shutdown(mut self) -> Result<(), DaemonError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DaemonError::Serve(e)),
            Err(e) => Err(DaemonError::Serve(std::io::Error::other(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener;
    use axum::routing::get;

    #[tokio::test]
    async fn serves_and_shuts_down_cleanly() {
        let addr = Multiaddr::parse("/ip4/127.0.0.1/tcp/0").unwrap();
        let mut results = listener::acquire(&[addr]).await;
        let (_, result) = results.pop().unwrap();
        let listener = result.unwrap();

        let router = Router::new().route("/", get(|| async { "ok" }));
        let instance = ServerInstance::spawn(listener, router);
        instance.shutdown().await.unwrap();
    }
}
