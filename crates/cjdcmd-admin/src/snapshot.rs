//! Offline admin client backed by a saved table dump
//!
//! A snapshot file is JSON in one of three shapes:
//! - a bare list of table entries
//! - a single dump page (`{"routingTable": [...]}`)
//! - a list of pages (`{"pages": [{"routingTable": [...]}, ...]}`)
//!
//! Any object form may carry `"pings"`, a map from path or address to a
//! recorded round trip in milliseconds, and `"version"`, the daemon version
//! reported in ping replies.

use crate::client::AdminClient;
use crate::error::Result;
use crate::types::{DumpEntry, DumpPage, PingReply};
use cjdcmd_routing::{Path, Routes};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv6Addr;
use tracing::debug;

/// Default number of entries served per page
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing_table: Vec<DumpEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<DumpPage>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub pings: HashMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Entries(Vec<DumpEntry>),
    Snapshot(Snapshot),
}

/// Replays a saved routing table, re-paged at a fixed size
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    entries: Vec<DumpEntry>,
    page_size: usize,
    pings: HashMap<String, u64>,
    version: Option<String>,
}

impl SnapshotClient {
    pub fn new(snapshot: Snapshot, page_size: usize) -> Self {
        let mut entries = snapshot.routing_table;
        for page in snapshot.pages {
            entries.extend(page.routing_table);
        }

        let pings = snapshot
            .pings
            .into_iter()
            .map(|(target, ms)| (normalize_target(&target), ms))
            .collect();

        SnapshotClient {
            entries,
            page_size: page_size.max(1),
            pings,
            version: snapshot.version,
        }
    }

    /// Snapshot of an already decoded table
    pub fn from_routes(routes: &Routes, page_size: usize) -> Self {
        let snapshot = Snapshot {
            routing_table: routes.iter().map(DumpEntry::from).collect(),
            ..Default::default()
        };
        SnapshotClient::new(snapshot, page_size)
    }

    pub fn from_json(json: &str, page_size: usize) -> Result<Self> {
        let snapshot = match serde_json::from_str(json)? {
            SnapshotFile::Entries(routing_table) => Snapshot {
                routing_table,
                ..Default::default()
            },
            SnapshotFile::Snapshot(snapshot) => snapshot,
        };
        Ok(SnapshotClient::new(snapshot, page_size))
    }

    pub async fn from_file(path: impl AsRef<std::path::Path>, page_size: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading table snapshot: {}", path.display());
        let json = tokio::fs::read_to_string(path).await?;
        SnapshotClient::from_json(&json, page_size)
    }

    /// Record a round trip for `target`
    pub fn record_ping(&mut self, target: &str, ms: u64) {
        self.pings.insert(normalize_target(target), ms);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl AdminClient for SnapshotClient {
    async fn dump_table_page(&self, page: u32) -> Result<DumpPage> {
        let start = (page as usize).saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size).min(self.entries.len());
        let routing_table = self
            .entries
            .get(start..end)
            .map(<[DumpEntry]>::to_vec)
            .unwrap_or_default();

        Ok(DumpPage {
            routing_table,
            more: (end < self.entries.len()).then_some(1),
            error: None,
        })
    }

    async fn ping_node(&self, target: &str, timeout_ms: u64) -> Result<PingReply> {
        let reply = match self.pings.get(&normalize_target(target)) {
            Some(&ms) if timeout_ms == 0 || ms <= timeout_ms => PingReply {
                ms,
                version: self.version.clone(),
                error: None,
            },
            _ => PingReply {
                ms: timeout_ms,
                version: None,
                error: Some("timeout".to_string()),
            },
        };
        Ok(reply)
    }
}

/// Canonical spelling of a path or address so lookups ignore formatting
fn normalize_target(target: &str) -> String {
    if let Ok(path) = target.parse::<Path>() {
        return path.to_string();
    }
    if let Ok(ip) = target.parse::<Ipv6Addr>() {
        return ip.to_string();
    }
    target.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::dump_routing_table;

    const TABLE: &str = r#"[
        {"ip": "fc00::1", "path": "0000.0000.0000.0001", "link": 100, "version": 18},
        {"ip": "fc00::2", "path": "0000.0000.0000.0013", "link": 100, "version": 18},
        {"ip": "fc00::3", "path": "0000.0000.0000.0153", "link": 100, "version": 18}
    ]"#;

    #[tokio::test]
    async fn test_pages_entries() {
        let client = SnapshotClient::from_json(TABLE, 2).unwrap();

        let first = client.dump_table_page(0).await.unwrap();
        assert_eq!(first.routing_table.len(), 2);
        assert!(first.has_more());

        let second = client.dump_table_page(1).await.unwrap();
        assert_eq!(second.routing_table.len(), 1);
        assert!(!second.has_more());

        let past_end = client.dump_table_page(7).await.unwrap();
        assert!(past_end.routing_table.is_empty());

        assert_eq!(dump_routing_table(&client).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_page_forms_are_merged() {
        let json = r#"{
            "pages": [
                {"routingTable": [{"ip": "fc00::1", "path": "0000.0000.0000.0001", "link": 1, "version": 18}], "more": 1},
                {"routingTable": [{"ip": "fc00::2", "path": "0000.0000.0000.0013", "link": 1, "version": 18}]}
            ],
            "pings": {"0000.0000.0000.0013": 42},
            "version": "cjdns-v20"
        }"#;
        let client = SnapshotClient::from_json(json, DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(client.len(), 2);

        let reply = client.ping_node("0000.0000.0000.0013", 1000).await.unwrap();
        assert!(reply.is_ok());
        assert_eq!(reply.ms, 42);
        assert_eq!(reply.version.as_deref(), Some("cjdns-v20"));
    }

    #[tokio::test]
    async fn test_ping_normalizes_and_times_out() {
        let mut client = SnapshotClient::from_json(TABLE, 0).unwrap();
        client.record_ping("fc00:0000::0002", 7);

        let reply = client.ping_node("fc00::2", 0).await.unwrap();
        assert_eq!(reply.ms, 7);

        let reply = client.ping_node("fc00::3", 500).await.unwrap();
        assert!(!reply.is_ok());
        assert_eq!(reply.ms, 500);
    }

    #[tokio::test]
    async fn test_from_routes() {
        let routes = SnapshotClient::from_json(TABLE, 10).unwrap();
        let table = dump_routing_table(&routes).await.unwrap();

        let client = SnapshotClient::from_routes(&table, 1);
        assert_eq!(dump_routing_table(&client).await.unwrap(), table);
    }
}
