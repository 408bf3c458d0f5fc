// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios driving the built `ipfsd` binary as a real
//! subprocess: spawn-then-stop over RPC, a conflicting listener address,
//! signal-driven stop, and auto-idle exit.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::time::Duration;

use ipfsd_core::{Response, Status};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

fn ipfsd_bin() -> std::path::PathBuf {
    assert_cmd::cargo::cargo_bin("ipfsd")
}

fn wait_until(mut predicate: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    predicate()
}

#[test]
fn spawn_then_stop_via_rpc() {
    let dir = tempfile::tempdir().unwrap();

    let mut ensure = assert_cmd::Command::new(ipfsd_bin());
    ensure.env("IPFSD_STATE_DIR", dir.path());
    let assert = ensure.assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).trim().to_string();
    assert!(stdout.contains("/unix"), "expected a unix listener address, got {stdout:?}");

    let socket_path = dir.path().join("fs").join("server");
    assert!(socket_path.exists(), "daemon should have bound {}", socket_path.display());

    let mut stop = assert_cmd::Command::new(ipfsd_bin());
    stop.arg("stop").env("IPFSD_STATE_DIR", dir.path());
    stop.assert().success();

    let cleaned_up = wait_until(|| !dir.path().join("fs").exists(), Duration::from_secs(5));
    assert!(cleaned_up, "parent directory of the socket should be removed after stop");
}

#[test]
fn conflicting_listener_still_reaches_ready() {
    let dir = tempfile::tempdir().unwrap();
    let fs_dir = dir.path().join("fs");
    std::fs::create_dir_all(&fs_dir).unwrap();
    let blocked_path = fs_dir.join("blocked");
    std::fs::write(&blocked_path, b"not a socket").unwrap();

    let good_path = dir.path().join("good").join("server");

    let mut child = Command::new(ipfsd_bin())
        .arg("__service_daemon")
        .arg("--mount")
        .arg(format!("/unix{}", blocked_path.display()))
        .arg("--mount")
        .arg(format!("/unix{}", good_path.display()))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let reader = BufReader::new(stdout);

    let mut saw_good_listener = false;
    let mut saw_ready = false;
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let Ok(resp) = Response::from_line(&line) else { continue };
        if let Some(listener) = &resp.listener {
            if listener.text().contains("good") {
                saw_good_listener = true;
            }
        }
        if resp.status == Status::Ready {
            saw_ready = true;
            break;
        }
    }

    assert!(saw_good_listener, "the unblocked address should still become a listener");
    assert!(saw_ready, "the daemon should reach Ready with at least one live listener");

    let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
    let status = child.wait().unwrap();
    assert!(status.success());
}

#[test]
fn signal_stop() {
    let mut child = Command::new(ipfsd_bin())
        .arg("__service_daemon")
        .arg("--mount")
        .arg("/ip4/127.0.0.1/tcp/0")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();

    loop {
        line.clear();
        let n = std::io::BufRead::read_line(&mut reader, &mut line).unwrap();
        assert!(n > 0, "daemon closed stdout before becoming ready");
        let Ok(resp) = Response::from_line(&line) else { continue };
        if resp.status == Status::Ready {
            break;
        }
    }

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

    let mut saw_canceled_stop = false;
    loop {
        line.clear();
        let n = std::io::BufRead::read_line(&mut reader, &mut line).unwrap();
        if n == 0 {
            break;
        }
        let Ok(resp) = Response::from_line(&line) else { continue };
        if resp.status == Status::Stopping {
            saw_canceled_stop = resp.stop_reason == Some(ipfsd_core::Reason::Canceled);
            break;
        }
    }

    let status = child.wait().unwrap();
    assert!(saw_canceled_stop, "expected a Stopping(reason=canceled) record after SIGINT");
    assert!(status.success(), "the daemon should exit 0 on a signal-driven stop");
}

#[test]
fn auto_idle_exit() {
    let mut child = Command::new(ipfsd_bin())
        .arg("__service_daemon")
        .arg("--mount")
        .arg("/ip4/127.0.0.1/tcp/0")
        .arg("--auto-exit-interval=1")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let reader = BufReader::new(stdout);

    let mut saw_idle_stop = false;
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let Ok(resp) = Response::from_line(&line) else { continue };
        if resp.status == Status::Stopping {
            saw_idle_stop = resp.stop_reason == Some(ipfsd_core::Reason::Idle);
            break;
        }
    }

    let status = child.wait().unwrap();
    assert!(saw_idle_stop, "expected a Stopping(reason=idle) record once the ticker fires");
    assert!(status.success());
}
