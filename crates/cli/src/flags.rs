// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hand-parsed flags: CLI argument parsing proper is an external
//! collaborator's concern; this binary only needs enough to demonstrate
//! the daemon/client wiring.

use std::time::Duration;

use ipfsd_core::Multiaddr;

#[derive(Debug, Default)]
pub struct Flags {
    pub mounts: Vec<Multiaddr>,
    pub auto_exit_interval: Option<Duration>,
    pub encoding_json: bool,
}

/// Parses flags from `args` (already past the leading subcommand, if
/// any): `--mount <multiaddr>` (repeatable), `--auto-exit-interval=<secs>`,
/// `--encoding=json`.
pub fn parse(args: &[String]) -> Result<Flags, String> {
    let mut flags = Flags::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--mount" {
            let value = iter.next().ok_or("--mount requires a value")?;
            let addr = Multiaddr::parse(value).map_err(|e| e.to_string())?;
            flags.mounts.push(addr);
        } else if let Some(secs) = arg.strip_prefix("--auto-exit-interval=") {
            let secs: u64 = secs.parse().map_err(|_| format!("invalid --auto-exit-interval value {secs:?}"))?;
            flags.auto_exit_interval = Some(Duration::from_secs(secs));
        } else if let Some(encoding) = arg.strip_prefix("--encoding=") {
            if encoding != "json" {
                return Err(format!("unsupported --encoding {encoding:?}"));
            }
            flags.encoding_json = true;
        } else {
            return Err(format!("unrecognized argument {arg:?}"));
        }
    }

    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_mount_flags() {
        let args: Vec<String> = vec![
            "--mount".into(),
            "/ip4/127.0.0.1/tcp/5001".into(),
            "--mount".into(),
            "/unix/tmp/fs/server".into(),
            "--auto-exit-interval=45".into(),
        ];
        let flags = parse(&args).unwrap();
        assert_eq!(flags.mounts.len(), 2);
        assert_eq!(flags.auto_exit_interval, Some(Duration::from_secs(45)));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(parse(&["--bogus".to_string()]).is_err());
    }
}
