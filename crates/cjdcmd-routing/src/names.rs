//! Reverse hostname lookups for display

use dashmap::DashMap;
use std::net::Ipv6Addr;

/// Source of hostnames for addresses
pub trait ReverseLookup: Send + Sync {
    /// Hostname for `ip`, if one is known
    fn reverse(&self, ip: &Ipv6Addr) -> Option<String>;
}

/// Lookup that never resolves anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl ReverseLookup for NoLookup {
    fn reverse(&self, _ip: &Ipv6Addr) -> Option<String> {
        None
    }
}

/// Memoizing wrapper around a [`ReverseLookup`].
///
/// Only successful lookups are remembered. The cache lives as long as the
/// caller keeps it; share it by reference between renderers.
pub struct HostnameCache<L> {
    lookup: L,
    names: DashMap<Ipv6Addr, String>,
}

impl<L: ReverseLookup> HostnameCache<L> {
    pub fn new(lookup: L) -> Self {
        HostnameCache {
            lookup,
            names: DashMap::new(),
        }
    }

    /// Cached hostname for `ip`, resolving it on first use
    pub fn get(&self, ip: &Ipv6Addr) -> Option<String> {
        if let Some(name) = self.names.get(ip) {
            return Some(name.clone());
        }

        let name = self.lookup.reverse(ip)?;
        let name = name.trim_end_matches('.').to_string();
        self.names.insert(*ip, name.clone());
        Some(name)
    }

    /// Hostname for `ip`, or the address itself when it does not resolve
    pub fn display_name(&self, ip: &Ipv6Addr) -> String {
        self.get(ip).unwrap_or_else(|| ip.to_string())
    }

    /// Number of cached names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for HostnameCache<NoLookup> {
    fn default() -> Self {
        HostnameCache::new(NoLookup)
    }
}
