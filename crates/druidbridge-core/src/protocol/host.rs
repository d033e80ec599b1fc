//! Host token parsing (panic-free).
//!
//! Accepted shapes:
//! - `10.0.0.5` and `broker-1` (address only)
//! - `10.0.0.5:8082` and `broker-1:8082`
//! - `[fd00::5]:8082` (bracketed IPv6 with port)
//! - `fd00::5` (more than one colon and no brackets: address only)

/// A host token split into its address and optional port. An empty port
/// (`host:`) is kept so the token rebuilds unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostToken<'a> {
    pub address: &'a str,
    pub port: Option<&'a str>,
}

impl<'a> HostToken<'a> {
    pub fn parse(token: &'a str) -> Self {
        if let Some(rest) = token.strip_prefix('[') {
            if let Some((address, tail)) = rest.split_once(']') {
                return Self { address, port: tail.strip_prefix(':') };
            }
            return Self { address: token, port: None };
        }

        match token.split_once(':') {
            Some((address, port)) if !port.contains(':') => Self {
                address,
                port: Some(port),
            },
            _ => Self { address: token, port: None },
        }
    }

    /// Rebuild the token around a (possibly resolved) address, keeping the port.
    pub fn rejoin(&self, address: &str) -> String {
        match self.port {
            Some(port) if address.contains(':') => format!("[{address}]:{port}"),
            Some(port) => format!("{address}:{port}"),
            None => address.to_string(),
        }
    }
}
