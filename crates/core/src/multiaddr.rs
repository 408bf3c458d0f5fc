// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multiaddress codec: binary, text, and JSON round-trip.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// An ordered sequence of `(protocol, value)` components.
///
/// Thin wrapper over the `multiaddr` crate's `Multiaddr` so the rest of the
/// workspace only ever sees this type, and so JSON encodes it as the
/// canonical text form (a quoted string) rather than the crate's own
/// `Serialize` impl.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Multiaddr(multiaddr::Multiaddr);

impl Multiaddr {
    /// Parses the canonical text form, e.g. `/ip4/127.0.0.1/tcp/5001`.
    pub fn parse(text: &str) -> Result<Self> {
        multiaddr::Multiaddr::from_str(text)
            .map(Multiaddr)
            .map_err(|e| Error::invalid_item(format!("invalid multiaddress {text:?}: {e}")))
    }

    /// Parses the binary (wire) encoding.
    pub fn parse_binary(bytes: &[u8]) -> Result<Self> {
        multiaddr::Multiaddr::try_from(bytes.to_vec())
            .map(Multiaddr)
            .map_err(|e| Error::invalid_item(format!("invalid multiaddress bytes: {e}")))
    }

    /// The canonical text form.
    pub fn text(&self) -> String {
        self.0.to_string()
    }

    /// The binary (wire) encoding.
    pub fn binary(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Whether this address names a Unix-domain socket path.
    pub fn is_unix(&self) -> bool {
        self.0.iter().any(|p| matches!(p, multiaddr::Protocol::Unix(_)))
    }

    /// The filesystem path of a `/unix/...` address, if it is one.
    pub fn unix_path(&self) -> Option<String> {
        self.0.iter().find_map(|p| match p {
            multiaddr::Protocol::Unix(path) => Some(format!("/{path}")),
            _ => None,
        })
    }

    /// If this address describes a TCP endpoint (`/ip4.../tcp/<port>`,
    /// `/dns4.../tcp/<port>`, ...), a `host:port` string suitable for
    /// `ToSocketAddrs`/hostname resolution.
    pub fn tcp_target(&self) -> Option<String> {
        let mut host: Option<String> = None;
        for proto in self.0.iter() {
            match proto {
                multiaddr::Protocol::Ip4(addr) => host = Some(addr.to_string()),
                multiaddr::Protocol::Ip6(addr) => host = Some(format!("[{addr}]")),
                multiaddr::Protocol::Dns4(name) | multiaddr::Protocol::Dns6(name) => {
                    host = Some(name.to_string())
                }
                multiaddr::Protocol::Tcp(port) => return host.as_ref().map(|h| format!("{h}:{port}")),
                _ => {}
            }
        }
        None
    }
}

impl fmt::Display for Multiaddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Multiaddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Multiaddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text())
    }
}

impl<'de> Deserialize<'de> for Multiaddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TextVisitor;

        impl Visitor<'_> for TextVisitor {
            type Value = Multiaddr;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a multiaddress string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Multiaddr, E> {
                Multiaddr::parse(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(TextVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_addresses() -> Vec<&'static str> {
        vec![
            "/ip4/127.0.0.1/tcp/5001",
            "/ip6/::1/tcp/5001",
            "/unix/var/run/fs/server",
            "/dns4/example.com/tcp/443/https",
        ]
    }

    #[test]
    fn text_round_trip() {
        for text in sample_addresses() {
            let m = Multiaddr::parse(text).unwrap();
            let reparsed = Multiaddr::parse(&m.text()).unwrap();
            assert_eq!(m, reparsed);
        }
    }

    #[test]
    fn binary_round_trip() {
        for text in sample_addresses() {
            let m = Multiaddr::parse(text).unwrap();
            let bytes = m.binary();
            let reparsed = Multiaddr::parse_binary(&bytes).unwrap();
            assert_eq!(m, reparsed);
        }
    }

    #[test]
    fn json_round_trip() {
        for text in sample_addresses() {
            let m = Multiaddr::parse(text).unwrap();
            let json = serde_json::to_string(&m).unwrap();
            let reparsed: Multiaddr = serde_json::from_str(&json).unwrap();
            assert_eq!(m, reparsed);
        }
    }

    #[test]
    fn unix_path_is_extracted() {
        let m = Multiaddr::parse("/unix/var/run/fs/server").unwrap();
        assert!(m.is_unix());
        assert_eq!(m.unix_path().as_deref(), Some("/var/run/fs/server"));
    }

    #[test]
    fn invalid_text_is_rejected() {
        assert!(Multiaddr::parse("not-a-multiaddr").is_err());
    }

    #[test]
    fn tcp_target_combines_host_and_port() {
        let m = Multiaddr::parse("/ip4/127.0.0.1/tcp/5001").unwrap();
        assert_eq!(m.tcp_target().as_deref(), Some("127.0.0.1:5001"));
    }

    #[test]
    fn unix_address_has_no_tcp_target() {
        let m = Multiaddr::parse("/unix/var/run/fs/server").unwrap();
        assert!(m.tcp_target().is_none());
    }
}
