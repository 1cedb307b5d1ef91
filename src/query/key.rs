//! Hierarchical cache keys with prefix matching

use std::fmt;

/// Identity of a cached read
///
/// Keys are ordered segments. Invalidation matches by prefix, so
/// `["companies"]` covers every `["companies", "list", ..]` entry while
/// `["company", "7"]` covers only that record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Single-segment key
    pub fn root(segment: &str) -> Self {
        Self(vec![segment.to_string()])
    }

    /// Appends a segment
    pub fn with(mut self, segment: impl fmt::Display) -> Self {
        self.0.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when every segment of `prefix` matches the start of this key
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching() {
        let list = QueryKey::root("companies").with("list").with("status=").with(1);
        assert!(list.starts_with(&QueryKey::root("companies")));
        assert!(list.starts_with(&list));
        assert!(!list.starts_with(&QueryKey::root("company")));
        assert!(!QueryKey::root("companies").starts_with(&list));
    }

    #[test]
    fn test_detail_keys_do_not_overlap() {
        let seven = QueryKey::new(["company", "7"]);
        let seventy = QueryKey::new(["company", "70"]);
        assert!(!seventy.starts_with(&seven));
    }

    #[test]
    fn test_display() {
        assert_eq!(QueryKey::new(["sales-status", "3"]).to_string(), "[sales-status, 3]");
    }
}
