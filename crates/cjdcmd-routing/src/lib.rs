//! cjdns routing table analysis
//!
//! Pure, synchronous operations over a routing table already fetched from
//! the daemon:
//! - Switch label parsing, formatting and containment tests
//! - Hop paths from self to a target (traceroute)
//! - One-hop neighbours of any node (peer discovery)
//! - Tree rendering of the whole table
//!
//! Nothing here performs I/O. Every operation accepts an empty table and
//! returns an empty result for it.

pub mod error;
pub mod names;
pub mod path;
pub mod route;
pub mod target;
pub mod tree;

pub use error::{Result, RoutingError};
pub use names::{HostnameCache, NoLookup, ReverseLookup};
pub use path::Path;
pub use route::{LinkThreshold, Route, Routes, MAGIC_LINK_CONSTANT};
pub use target::{Target, TargetQuery};
pub use tree::{partition_by_containment, render_tree, Connector, TreeLine};
