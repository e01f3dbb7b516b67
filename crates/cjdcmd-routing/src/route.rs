//! Routing table model
//!
//! A [`Routes`] table is assembled once per invocation from the daemon's
//! table dump and then reordered, filtered and searched in memory.

use crate::error::{Result, RoutingError};
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv6Addr;
use std::ops::Deref;

/// Divisor that turns the daemon's raw link metric into a quality figure
pub const MAGIC_LINK_CONSTANT: f64 = 5_366_870.0;

/// One entry of the daemon's routing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub ip: Ipv6Addr,
    pub path: Path,
    /// Raw link metric as reported by the daemon
    pub raw_link: i64,
    /// Protocol version spoken by the node
    pub version: i64,
}

impl Route {
    pub fn new(ip: Ipv6Addr, path: Path, raw_link: i64, version: i64) -> Self {
        Route {
            ip,
            path,
            raw_link,
            version,
        }
    }

    /// Build a route from the string fields of a table dump entry
    pub fn from_entry(ip: &str, path: &str, raw_link: i64, version: i64) -> Result<Self> {
        let ip = ip
            .parse::<Ipv6Addr>()
            .map_err(|e| RoutingError::InvalidAddress(format!("{ip}: {e}")))?;
        let path = path.parse()?;
        Ok(Route::new(ip, path, raw_link, version))
    }

    /// Normalized link quality
    pub fn link(&self) -> f64 {
        self.raw_link as f64 / MAGIC_LINK_CONSTANT
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.ip, self.path)
    }
}

/// Link quality cut-off for listing established routes.
///
/// Zero or negative quality marks a placeholder route the daemon has not
/// established yet. Call sites disagree on whether quality exactly `1.0`
/// counts, so both comparisons are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkThreshold {
    /// Keep routes with `link > x`
    Above(f64),
    /// Keep routes with `link >= x`
    AtLeast(f64),
}

impl LinkThreshold {
    /// Used by route and peer listings
    pub const LISTING: LinkThreshold = LinkThreshold::Above(1.0);

    /// Used by the plain table dump
    pub const DUMP: LinkThreshold = LinkThreshold::AtLeast(1.0);

    /// Whether `route` passes this threshold
    pub fn admits(&self, route: &Route) -> bool {
        match *self {
            LinkThreshold::Above(x) => route.link() > x,
            LinkThreshold::AtLeast(x) => route.link() >= x,
        }
    }
}

/// Ordered routing table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Routes(Vec<Route>);

impl Routes {
    pub fn new() -> Self {
        Routes(Vec::new())
    }

    pub fn push(&mut self, route: Route) {
        self.0.push(route);
    }

    pub fn into_inner(self) -> Vec<Route> {
        self.0
    }

    /// Stable ascending sort on the raw path value; self sorts first
    pub fn sort_by_path(&mut self) {
        self.0.sort_by_key(|r| r.path);
    }

    /// Stable descending sort on the raw link metric
    pub fn sort_by_quality(&mut self) {
        self.0.sort_by(|a, b| b.raw_link.cmp(&a.raw_link));
    }

    /// Routes passing `threshold`, in table order
    pub fn filter_established(&self, threshold: LinkThreshold) -> Routes {
        self.0
            .iter()
            .filter(|r| threshold.admits(r))
            .cloned()
            .collect()
    }

    /// Every known route to `ip`, in table order
    pub fn routes_to(&self, ip: &Ipv6Addr) -> Routes {
        self.0.iter().filter(|r| &r.ip == ip).cloned().collect()
    }

    /// The route using exactly `path`
    pub fn find_by_path(&self, path: Path) -> Option<&Route> {
        self.0.iter().find(|r| r.path == path)
    }

    /// Routes on the way from self to `full_path`, nearest first.
    ///
    /// Selects every route whose path is an ancestor of (or equal to)
    /// `full_path`, so the result starts with self when the table holds it
    /// and ends with the target.
    pub fn hops(&self, full_path: Path) -> Routes {
        let mut hops: Routes = self
            .0
            .iter()
            .filter(|r| full_path.is_behind(r.path))
            .cloned()
            .collect();
        hops.sort_by_path();
        hops
    }

    /// Direct neighbours of every node reachable at `ip`
    pub fn peers(&self, ip: &Ipv6Addr) -> Routes {
        self.peers_of_nodes(self.0.iter().filter(|r| &r.ip == ip).map(|r| r.path))
    }

    /// Direct neighbours of the node at `path`
    pub fn peers_of(&self, path: Path) -> Routes {
        self.peers_of_nodes(std::iter::once(path))
    }

    /// One-hop neighbours in either direction, one entry per IP.
    ///
    /// When an IP is reachable over several paths the smallest path wins.
    fn peers_of_nodes(&self, nodes: impl Iterator<Item = Path>) -> Routes {
        let mut by_ip: HashMap<Ipv6Addr, &Route> = HashMap::new();

        for node in nodes {
            for candidate in &self.0 {
                if !(node.is_one_hop(candidate.path) || candidate.path.is_one_hop(node)) {
                    continue;
                }
                by_ip
                    .entry(candidate.ip)
                    .and_modify(|kept| {
                        if candidate.path < kept.path {
                            *kept = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
        }

        let mut peers: Routes = by_ip.into_values().cloned().collect();
        peers.sort_by_path();
        peers
    }
}

impl Deref for Routes {
    type Target = [Route];

    fn deref(&self) -> &[Route] {
        &self.0
    }
}

impl From<Vec<Route>> for Routes {
    fn from(routes: Vec<Route>) -> Self {
        Routes(routes)
    }
}

impl FromIterator<Route> for Routes {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Routes(iter.into_iter().collect())
    }
}

impl IntoIterator for Routes {
    type Item = Route;
    type IntoIter = std::vec::IntoIter<Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Routes {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_LINK: i64 = 5 * MAGIC_LINK_CONSTANT as i64;

    fn route(ip: &str, path: &str, raw_link: i64) -> Route {
        Route::from_entry(ip, path, raw_link, 1).unwrap()
    }

    fn sample_table() -> Routes {
        Routes::from(vec![
            route("fc00::3", "0000.0000.0000.0153", GOOD_LINK),
            route("fc00::1", "0000.0000.0000.0001", GOOD_LINK * 2),
            route("fc00::2", "0000.0000.0000.0013", GOOD_LINK * 3),
            route("fc00::4", "0000.0000.0000.0015", 0),
        ])
    }

    #[test]
    fn test_from_entry_rejects_bad_fields() {
        assert!(matches!(
            Route::from_entry("not-an-ip", "0000.0000.0000.0001", 0, 0),
            Err(RoutingError::InvalidAddress(_))
        ));
        assert!(matches!(
            Route::from_entry("fc00::1", "0000.0000.0001", 0, 0),
            Err(RoutingError::InvalidPathFormat(_))
        ));
        assert_eq!(
            Route::from_entry("fc00::1", "0000.0000.0000.0000", 0, 0),
            Err(RoutingError::MalformedPath)
        );
    }

    #[test]
    fn test_sort_by_path_puts_self_first() {
        let mut table = sample_table();
        table.sort_by_path();

        let paths: Vec<String> = table.iter().map(|r| r.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "0000.0000.0000.0001",
                "0000.0000.0000.0013",
                "0000.0000.0000.0015",
                "0000.0000.0000.0153",
            ]
        );
    }

    #[test]
    fn test_sort_by_quality_is_descending_and_stable() {
        let mut table = sample_table();
        table.push(route("fc00::5", "0000.0000.0000.0017", GOOD_LINK));
        table.sort_by_quality();

        let ips: Vec<String> = table.iter().map(|r| r.ip.to_string()).collect();
        // fc00::3 and fc00::5 tie and keep their table order
        assert_eq!(ips, vec!["fc00::2", "fc00::1", "fc00::3", "fc00::5", "fc00::4"]);
    }

    #[test]
    fn test_link_threshold_boundary() {
        let exact = route("fc00::1", "0000.0000.0000.0013", MAGIC_LINK_CONSTANT as i64);
        assert_eq!(exact.link(), 1.0);

        let table = Routes::from(vec![exact.clone()]);
        assert!(table.filter_established(LinkThreshold::LISTING).is_empty());
        assert_eq!(table.filter_established(LinkThreshold::DUMP).len(), 1);
    }

    #[test]
    fn test_filter_drops_placeholders() {
        let table = sample_table();
        let established = table.filter_established(LinkThreshold::Above(0.0));
        assert_eq!(established.len(), 3);
        assert!(established.iter().all(|r| r.raw_link > 0));
    }

    #[test]
    fn test_routes_to_and_find_by_path() {
        let mut table = sample_table();
        table.push(route("fc00::3", "0000.0000.0000.0135", GOOD_LINK));

        let ip: Ipv6Addr = "fc00::3".parse().unwrap();
        assert_eq!(table.routes_to(&ip).len(), 2);

        let path: Path = "0000.0000.0000.0013".parse().unwrap();
        assert_eq!(table.find_by_path(path).unwrap().ip.to_string(), "fc00::2");
        assert!(table.find_by_path(Path::new(0x99).unwrap()).is_none());
    }

    #[test]
    fn test_hops_orders_from_self() {
        let table = sample_table();
        let target: Path = "0000.0000.0000.0153".parse().unwrap();
        let hops = table.hops(target);

        let ips: Vec<String> = hops.iter().map(|r| r.ip.to_string()).collect();
        assert_eq!(ips, vec!["fc00::1", "fc00::2", "fc00::3"]);
        assert_eq!(hops, table.hops(target));
    }

    #[test]
    fn test_hops_to_self_and_empty_table() {
        let table = sample_table();
        let hops = table.hops(Path::SELF);
        assert_eq!(hops.len(), 1);
        assert!(hops[0].path.is_self());

        assert!(Routes::new().hops(Path::SELF).is_empty());
    }

    #[test]
    fn test_peers_dedup_keeps_shortest_path() {
        let mut table = sample_table();
        // fc00::1 also reachable over a longer loop
        table.push(route("fc00::1", "0000.0000.0000.01b3", GOOD_LINK));

        let peer: Path = "0000.0000.0000.0013".parse().unwrap();
        let peers = table.peers_of(peer);

        let found: Vec<(String, String)> = peers
            .iter()
            .map(|r| (r.ip.to_string(), r.path.to_string()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("fc00::1".to_string(), "0000.0000.0000.0001".to_string()),
                ("fc00::3".to_string(), "0000.0000.0000.0153".to_string()),
            ]
        );
    }

    #[test]
    fn test_peers_by_ip_and_empty_table() {
        let table = sample_table();
        let ip: Ipv6Addr = "fc00::2".parse().unwrap();
        assert_eq!(table.peers(&ip).len(), 2);

        assert!(Routes::new().peers(&ip).is_empty());
        let unknown: Ipv6Addr = "fc00::99".parse().unwrap();
        assert!(table.peers(&unknown).is_empty());
    }
}
