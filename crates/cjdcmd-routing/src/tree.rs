//! Tree rendering of the routing table
//!
//! Every path in the table extends the path of the node it transits, so
//! sorting by path and grouping by containment recovers the shape of the
//! routing tree rooted at self.

use crate::names::{HostnameCache, ReverseLookup};
use crate::path::Path;
use crate::route::Route;
use std::fmt;

/// Box-drawing connector in front of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// The local node
    Root,
    /// Non-last sibling without children
    Branch,
    /// Non-last sibling with children
    BranchWithChildren,
    /// Last sibling without children
    Last,
    /// Last sibling with children
    LastWithChildren,
}

impl Connector {
    fn new(is_last: bool, has_children: bool) -> Self {
        match (is_last, has_children) {
            (false, false) => Connector::Branch,
            (false, true) => Connector::BranchWithChildren,
            (true, false) => Connector::Last,
            (true, true) => Connector::LastWithChildren,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::Root => "┐",
            Connector::Branch => "├─",
            Connector::BranchWithChildren => "├┬",
            Connector::Last => "└─",
            Connector::LastWithChildren => "└┬",
        }
    }
}

/// One rendered row of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub path: Path,
    /// Columns inherited from the enclosing branches
    pub indent: String,
    pub connector: Connector,
    /// Hostname, or the address when it does not resolve
    pub name: String,
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connector {
            Connector::Root => write!(f, "{}{}", self.path, self.connector.as_str()),
            _ => write!(
                f,
                "{}{}{} {}",
                self.path,
                self.indent,
                self.connector.as_str(),
                self.name
            ),
        }
    }
}

/// Split a path-sorted slice into containment groups.
///
/// Each group starts with an entry not behind any earlier group head and
/// holds every later entry behind it, so the head is a child of the
/// current root and the rest of the group is that child's subtree. Every
/// entry lands in exactly one group.
pub fn partition_by_containment<'a>(routes: &[&'a Route]) -> Vec<Vec<&'a Route>> {
    let mut claimed = vec![false; routes.len()];
    let mut groups = Vec::new();

    for (i, here) in routes.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;

        let mut group = vec![*here];
        for (j, there) in routes.iter().enumerate().skip(i + 1) {
            if !claimed[j] && there.path.is_behind(here.path) {
                claimed[j] = true;
                group.push(*there);
            }
        }

        groups.push(group);
    }

    groups
}

/// Render `routes` as a tree rooted at the lowest path.
///
/// `stop_level` limits the depth: `0` renders everything, `1` only the
/// root, `2` the root and its children, and so on.
pub fn render_tree<L: ReverseLookup>(
    routes: &[Route],
    stop_level: usize,
    names: &HostnameCache<L>,
) -> Vec<TreeLine> {
    let mut sorted: Vec<&Route> = routes.iter().collect();
    sorted.sort_by_key(|r| r.path);

    let Some((root, rest)) = sorted.split_first() else {
        return Vec::new();
    };

    let mut lines = vec![TreeLine {
        path: root.path,
        indent: String::new(),
        connector: Connector::Root,
        name: names.display_name(&root.ip),
    }];
    render_level(rest, "", 0, stop_level, names, &mut lines);
    lines
}

fn render_level<L: ReverseLookup>(
    routes: &[&Route],
    indent: &str,
    level: usize,
    stop_level: usize,
    names: &HostnameCache<L>,
    lines: &mut Vec<TreeLine>,
) {
    let level = level + 1;
    if level == stop_level {
        return;
    }

    let groups = partition_by_containment(routes);
    let last = groups.len().saturating_sub(1);

    for (k, group) in groups.iter().enumerate() {
        let Some((here, subtree)) = group.split_first() else {
            continue;
        };
        let is_last = k == last;

        lines.push(TreeLine {
            path: here.path,
            indent: indent.to_string(),
            connector: Connector::new(is_last, !subtree.is_empty()),
            name: names.display_name(&here.ip),
        });

        if !subtree.is_empty() {
            let column = if is_last { " " } else { "│" };
            let child_indent = format!("{indent}{column}");
            render_level(subtree, &child_indent, level, stop_level, names, lines);
        }
    }
}
