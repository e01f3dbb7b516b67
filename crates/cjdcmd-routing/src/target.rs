//! Command targets

use crate::error::{Result, RoutingError};
use crate::path::Path;
use std::fmt;
use std::net::Ipv6Addr;

/// Whether `ip` lies in the cjdns address range `fc00::/8`
pub fn is_cjdns_address(ip: &Ipv6Addr) -> bool {
    ip.octets()[0] == 0xfc
}

/// What a target refers to once parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetQuery {
    Address(Ipv6Addr),
    Path(Path),
    /// Needs resolution before it can be looked up
    Hostname(String),
}

/// A node named on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub query: TargetQuery,
    /// The argument as the user typed it
    pub supplied: String,
}

impl Target {
    /// Classify `input` as a cjdns address, a path (when `allow_path`) or
    /// a hostname
    pub fn parse(input: &str, allow_path: bool) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RoutingError::InvalidTarget("empty target".to_string()));
        }

        let query = if let Ok(ip) = input.parse::<Ipv6Addr>() {
            if !is_cjdns_address(&ip) {
                return Err(RoutingError::InvalidTarget(format!(
                    "{input} is not a cjdns address (fc00::/8)"
                )));
            }
            TargetQuery::Address(ip)
        } else if looks_like_path(input) {
            if !allow_path {
                return Err(RoutingError::InvalidTarget(
                    "you must specify an IPv6 address or hostname".to_string(),
                ));
            }
            TargetQuery::Path(input.parse()?)
        } else if is_valid_hostname(input) {
            TargetQuery::Hostname(input.to_string())
        } else if allow_path {
            return Err(RoutingError::InvalidTarget(format!(
                "{input} is not an IPv6 address, cjdns path, or hostname"
            )));
        } else {
            return Err(RoutingError::InvalidTarget(format!(
                "{input} is not an IPv6 address or hostname"
            )));
        };

        Ok(Target {
            query,
            supplied: input.to_string(),
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            TargetQuery::Address(ip) if ip.to_string() != self.supplied => {
                write!(f, "{} ({})", self.supplied, ip)
            }
            _ => write!(f, "{}", self.supplied),
        }
    }
}

/// `xxxx.xxxx.xxxx.xxxx` with hex groups
fn looks_like_path(input: &str) -> bool {
    let groups: Vec<&str> = input.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| g.len() == 4 && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Letters, digits, dots and dashes, starting and ending alphanumeric
fn is_valid_hostname(input: &str) -> bool {
    let bytes = input.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'.')
}
