//! Docroot lookup.
//!
//! # Responsibilities
//! - Parse the `host:path;host:path` hostmap into an ordered table
//! - Resolve a host to its docroot
//! - Return an explicit no-match rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction; shared through the config snapshot
//! - Table order is definition order, which decides between suffix patterns
//! - Precedence: exact, then first matching suffix, then wildcard

use std::path::{Path, PathBuf};

use crate::routing::matcher::HostPattern;

/// Ordered mapping of host patterns to docroots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    entries: Vec<(HostPattern, PathBuf)>,
}

impl RoutingTable {
    /// Parse a hostmap string such as `example.com:/srv/a;.example.org:/srv/b;:/srv/default`.
    ///
    /// Empty segments are skipped and segments without a `:` are dropped.
    /// The root is everything after the first `:`. A repeated key replaces the
    /// earlier root but keeps the earlier position.
    pub fn parse(hostmap: &str) -> Self {
        let mut table = Self::default();
        for item in hostmap.split(';').filter(|item| !item.is_empty()) {
            match item.split_once(':') {
                Some((host, root)) => table.insert(HostPattern::parse(host), PathBuf::from(root)),
                None => tracing::warn!(entry = %item, "Dropping hostmap entry without a path"),
            }
        }
        table
    }

    fn insert(&mut self, pattern: HostPattern, root: PathBuf) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == pattern) {
            Some(entry) => entry.1 = root,
            None => self.entries.push((pattern, root)),
        }
    }

    /// Resolve a lower-cased host to its docroot.
    pub fn resolve(&self, host: &str) -> Option<&Path> {
        let exact = self.entries.iter().find(|(pattern, _)| {
            matches!(pattern, HostPattern::Exact(_)) && pattern.matches(host)
        });
        let suffix = || {
            self.entries.iter().find(|(pattern, _)| {
                matches!(pattern, HostPattern::Suffix(_)) && pattern.matches(host)
            })
        };
        let wildcard = || {
            self.entries
                .iter()
                .find(|(pattern, _)| *pattern == HostPattern::Wildcard)
        };

        exact
            .or_else(suffix)
            .or_else(wildcard)
            .map(|(_, root)| root.as_path())
    }

    /// All entries in table order.
    pub fn entries(&self) -> &[(HostPattern, PathBuf)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_malformed_entries() {
        let table = RoutingTable::parse("a.com:/srv/a;broken;;B.COM:/srv/b");
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("a.com"), Some(Path::new("/srv/a")));
        assert_eq!(table.resolve("b.com"), Some(Path::new("/srv/b")));
    }

    #[test]
    fn test_root_keeps_everything_after_first_colon() {
        let table = RoutingTable::parse("a.com:/srv/with:colon");
        assert_eq!(table.resolve("a.com"), Some(Path::new("/srv/with:colon")));
    }

    #[test]
    fn test_exact_beats_suffix_and_wildcard() {
        let table = RoutingTable::parse(":/srv/default;.example.com:/srv/suffix;img.example.com:/srv/exact");
        assert_eq!(table.resolve("img.example.com"), Some(Path::new("/srv/exact")));
        assert_eq!(table.resolve("cdn.example.com"), Some(Path::new("/srv/suffix")));
        assert_eq!(table.resolve("other.org"), Some(Path::new("/srv/default")));
    }

    #[test]
    fn test_first_suffix_in_table_order_wins() {
        let table = RoutingTable::parse(".example.com:/srv/first;.img.example.com:/srv/second");
        assert_eq!(table.resolve("a.img.example.com"), Some(Path::new("/srv/first")));
    }

    #[test]
    fn test_no_route_without_wildcard() {
        let table = RoutingTable::parse("a.com:/srv/a;.b.com:/srv/b");
        assert_eq!(table.resolve("c.com"), None);
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn test_duplicate_key_replaces_in_place() {
        let table = RoutingTable::parse(".x.com:/one;.com:/two;.x.com:/three");
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("a.x.com"), Some(Path::new("/three")));
        assert_eq!(table.entries()[0].0, HostPattern::Suffix(".x.com".into()));
    }

    #[test]
    fn test_colon_in_key_position_belongs_to_root() {
        let table = RoutingTable::parse("a.com:/srv/a;a.com:8080:/srv/b");
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("a.com"), Some(Path::new("8080:/srv/b")));
    }
}
