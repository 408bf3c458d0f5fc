// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point: `__service_daemon` is the hidden re-exec target the
//! executor launches as a subprocess (see `ipfsd_client::spawn`); every
//! other invocation is the user-facing surface, which locates (spawning if
//! necessary) a daemon and dispatches a command to it.

mod command_client;
mod flags;

use ipfsd_core::{Multiaddr, Settings};
use ipfsd_wire::CommandPath;

/// Process exit codes: 0 on a clean shutdown or successful command, 1 on
/// any other failure. The daemon and the client share this convention so
/// a caller that shells out to `ipfsd` sees a single non-zero signal.
const EXIT_FAILURE: i32 = 1;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = match args.first().map(String::as_str) {
        Some("__service_daemon") => run_daemon(&args[1..]),
        Some("stop") => with_runtime(|| run_stop(args[1..].to_vec())),
        _ => with_runtime(|| run_ensure(args.clone())),
    };

    if let Err(message) = result {
        eprintln!("{message}");
        std::process::exit(EXIT_FAILURE);
    }
}

fn with_runtime<F, Fut>(f: F) -> Result<(), String>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<(), String>>,
{
    let rt = tokio::runtime::Runtime::new().map_err(|e| format!("failed to start async runtime: {e}"))?;
    rt.block_on(f())
}

/// The hidden daemon entry point: builds settings from flags and runs the
/// orchestrator to completion, blocking the process until it stops.
fn run_daemon(args: &[String]) -> Result<(), String> {
    let args = args.to_vec();
    with_runtime(move || async move {
        let flags = flags::parse(&args).map_err(|e| format!("invalid daemon flags: {e}"))?;
        let settings = Settings::new()
            .with_service_addresses(flags.mounts)
            .with_auto_exit_interval(flags.auto_exit_interval);

        let orchestrator = ipfsd_daemon::Orchestrator::new(settings, |stopper| {
            ipfsd_fs::router(ipfsd_fs::HandlerState::new(stopper))
        });

        orchestrator.run().await.map_err(|e| e.to_string())
    })
}

/// `ipfsd stop [--mount <addr> ...]`: locates a live daemon (never
/// spawning one, per the stop subcommand's special case) and dispatches
/// `service/daemon/stop` to it.
async fn run_stop(args: Vec<String>) -> Result<(), String> {
    let flags = flags::parse(&args).map_err(|e| format!("invalid flags: {e}"))?;
    let addr = locate(&flags.mounts, true).await?;

    let path = CommandPath::new(["service", "daemon", "stop"]);
    let accepted = command_client::post_command(&addr, path)
        .await
        .map_err(|e| format!("failed to send stop command to {addr}: {e}"))?;

    if !accepted {
        return Err(format!("{addr} rejected the stop command"));
    }
    println!("stopped {addr}");
    Ok(())
}

/// The default (no subcommand) surface: ensures a daemon is reachable,
/// spawning one if none is, and reports the address it is listening on.
async fn run_ensure(args: Vec<String>) -> Result<(), String> {
    let flags = flags::parse(&args).map_err(|e| format!("invalid flags: {e}"))?;
    let addr = locate(&flags.mounts, false).await?;
    println!("{addr}");
    Ok(())
}

async fn locate(explicit: &[Multiaddr], is_stop_subcommand: bool) -> Result<Multiaddr, String> {
    let self_exe =
        std::env::current_exe().map_err(|e| format!("could not determine our own executable path: {e}"))?;
    let request = ipfsd_client::LocateRequest { explicit_addresses: explicit, is_stop_subcommand };
    ipfsd_client::locate_or_spawn(request, &self_exe, ipfsd_core::settings::DEFAULT_AUTO_EXIT_INTERVAL)
        .await
        .map_err(|e| e.to_string())
}
