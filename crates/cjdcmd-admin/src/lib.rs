//! cjdns admin interface boundary
//!
//! Defines the requests the CLI makes of the daemon and assembles the paged
//! routing table dump into a [`cjdcmd_routing::Routes`] table. Transports
//! implement [`AdminClient`]; [`SnapshotClient`] replays a saved dump.

pub mod client;
pub mod error;
pub mod snapshot;
pub mod types;

pub use client::{dump_routing_table, AdminClient, MAX_DUMP_PAGES};
pub use error::{AdminError, Result};
pub use snapshot::{Snapshot, SnapshotClient, DEFAULT_PAGE_SIZE};
pub use types::{DumpEntry, DumpPage, PingReply};
