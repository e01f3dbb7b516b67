//! Hostname resolution for targets and display
//!
//! Names come from an `/etc/hosts` style file first and the system
//! resolver second. Only cjdns addresses (`fc00::/8`) are ever returned.

use anyhow::{anyhow, Result};
use cjdcmd_routing::target::is_cjdns_address;
use cjdcmd_routing::{HostnameCache, Path, ReverseLookup, Target, TargetQuery};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use tracing::debug;

/// Name and address pairs read from a hosts file
#[derive(Debug, Clone, Default)]
pub struct HostsFile {
    by_addr: HashMap<Ipv6Addr, String>,
    by_name: HashMap<String, Vec<Ipv6Addr>>,
}

impl HostsFile {
    /// Parse hosts file contents, keeping only cjdns addresses
    pub fn parse(contents: &str) -> Self {
        let mut hosts = HostsFile::default();

        for line in contents.lines() {
            let line = line.split('#').next().unwrap_or_default();
            let mut fields = line.split_whitespace();
            let Some(addr) = fields.next() else {
                continue;
            };
            let Ok(ip) = addr.parse::<Ipv6Addr>() else {
                continue;
            };
            if !is_cjdns_address(&ip) {
                continue;
            }

            for name in fields {
                let name = name.trim_end_matches('.').to_lowercase();
                hosts.by_addr.entry(ip).or_insert_with(|| name.clone());
                let addrs = hosts.by_name.entry(name).or_default();
                if !addrs.contains(&ip) {
                    addrs.push(ip);
                }
            }
        }

        hosts
    }

    /// Read a hosts file; a missing or unreadable file yields no names
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => HostsFile::parse(&contents),
            Err(e) => {
                debug!("Not using hosts file {}: {}", path.display(), e);
                HostsFile::default()
            }
        }
    }

    /// Addresses listed for `name`
    pub fn addresses(&self, name: &str) -> &[Ipv6Addr] {
        let name = name.trim_end_matches('.').to_lowercase();
        self.by_name.get(&name).map(Vec::as_slice).unwrap_or_default()
    }
}

impl ReverseLookup for HostsFile {
    fn reverse(&self, ip: &Ipv6Addr) -> Option<String> {
        self.by_addr.get(ip).cloned()
    }
}

/// Reverse lookup that can be switched off
#[derive(Debug, Clone)]
pub enum NameSource {
    Disabled,
    Hosts(HostsFile),
}

impl ReverseLookup for NameSource {
    fn reverse(&self, ip: &Ipv6Addr) -> Option<String> {
        match self {
            NameSource::Disabled => None,
            NameSource::Hosts(hosts) => hosts.reverse(ip),
        }
    }
}

/// A target once reduced to something the routing table can answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Address(Ipv6Addr),
    Path(Path),
}

/// A resolved target with the name the user gave it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub resolved: Resolved,
    pub name: String,
}

impl ResolvedTarget {
    pub fn address(&self) -> Option<Ipv6Addr> {
        match self.resolved {
            Resolved::Address(ip) => Some(ip),
            Resolved::Path(_) => None,
        }
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resolved {
            Resolved::Address(ip) if ip.to_string() != self.name => {
                write!(f, "{} ({})", self.name, ip)
            }
            _ => write!(f, "{}", self.name),
        }
    }
}

/// Forward and reverse name resolution with a per-run cache
pub struct Resolver {
    hosts: HostsFile,
    names: HostnameCache<NameSource>,
}

impl Resolver {
    pub fn new(hosts: HostsFile, reverse_lookup: bool) -> Self {
        let source = if reverse_lookup {
            NameSource::Hosts(hosts.clone())
        } else {
            NameSource::Disabled
        };

        Resolver {
            hosts,
            names: HostnameCache::new(source),
        }
    }

    /// Resolver that knows no names
    pub fn disabled() -> Self {
        Resolver::new(HostsFile::default(), false)
    }

    /// Cache used for display names
    pub fn names(&self) -> &HostnameCache<NameSource> {
        &self.names
    }

    /// Hostname for `ip`, or the address itself
    pub fn display_name(&self, ip: &Ipv6Addr) -> String {
        self.names.display_name(ip)
    }

    /// Every cjdns address known for `name`
    pub async fn lookup_host(&self, name: &str) -> Result<Vec<Ipv6Addr>> {
        let listed = self.hosts.addresses(name);
        if !listed.is_empty() {
            return Ok(listed.to_vec());
        }

        let addrs = tokio::net::lookup_host((name, 0)).await?;
        let mut found: Vec<Ipv6Addr> = Vec::new();
        for addr in addrs {
            if let IpAddr::V6(ip) = addr.ip() {
                if is_cjdns_address(&ip) && !found.contains(&ip) {
                    found.push(ip);
                }
            }
        }

        if found.is_empty() {
            return Err(anyhow!("no fc::/8 address found for {}", name));
        }
        Ok(found)
    }

    /// Reduce a parsed target to an address or path
    pub async fn resolve(&self, target: &Target) -> Result<ResolvedTarget> {
        let resolved = match &target.query {
            TargetQuery::Address(ip) => Resolved::Address(*ip),
            TargetQuery::Path(path) => Resolved::Path(*path),
            TargetQuery::Hostname(name) => {
                let addrs = self.lookup_host(name).await?;
                Resolved::Address(addrs[0])
            }
        };

        Ok(ResolvedTarget {
            resolved,
            name: target.supplied.clone(),
        })
    }

    /// Parse and resolve a command line argument
    pub async fn resolve_arg(&self, arg: &str, allow_path: bool) -> Result<ResolvedTarget> {
        let target = Target::parse(arg, allow_path)?;
        self.resolve(&target).await
    }
}
