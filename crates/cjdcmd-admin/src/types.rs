//! Admin API message types
//!
//! Field names follow the daemon's replies (`routingTable`, `more`, `ms`).

use cjdcmd_routing::{Route, RoutingError};
use serde::{Deserialize, Serialize};

/// Error string the daemon uses for success
pub const NO_ERROR: &str = "none";

/// One row of `NodeStore_dumpTable`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpEntry {
    pub ip: String,
    pub path: String,
    pub link: i64,
    pub version: i64,
}

impl DumpEntry {
    /// Decode into a [`Route`]
    pub fn to_route(&self) -> Result<Route, RoutingError> {
        Route::from_entry(&self.ip, &self.path, self.link, self.version)
    }
}

impl From<&Route> for DumpEntry {
    fn from(route: &Route) -> Self {
        DumpEntry {
            ip: route.ip.to_string(),
            path: route.path.to_string(),
            link: route.raw_link,
            version: route.version,
        }
    }
}

/// One page of `NodeStore_dumpTable`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpPage {
    #[serde(default)]
    pub routing_table: Vec<DumpEntry>,
    /// Non-zero when another page follows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DumpPage {
    pub fn has_more(&self) -> bool {
        self.more.is_some_and(|m| m != 0)
    }

    /// Error reported by the daemon, ignoring the "none" marker
    pub fn daemon_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| *e != NO_ERROR)
    }
}

/// Reply to `RouterModule_pingNode`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReply {
    /// Round trip in milliseconds
    #[serde(default)]
    pub ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PingReply {
    pub fn is_ok(&self) -> bool {
        self.error.as_deref().map_or(true, |e| e == NO_ERROR)
    }
}
