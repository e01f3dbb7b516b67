//! cjdcmd - administration client for the cjdns mesh routing daemon
//!
//! Fetches the daemon's routing table through an
//! [`cjdcmd_admin::AdminClient`] and answers questions about it: every
//! route to a node, the hops on the way there, a node's direct peers, and
//! a tree view of the whole table.

pub mod commands;
pub mod config;
pub mod logging;
pub mod nmap;
pub mod output;
pub mod resolve;

pub use commands::Context;
pub use config::Config;
pub use resolve::{HostsFile, Resolver};
