/// A tag token split into an optional parent and a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPath<'a> {
    pub parent: Option<&'a str>,
    pub child: &'a str,
}

impl TagPath<'_> {
    /// `parent/child` or just `child`
    pub fn full_name(&self) -> String {
        match self.parent {
            Some(parent) => format!("{}/{}", parent, self.child),
            None => self.child.to_string(),
        }
    }

    /// True when there is nothing to resolve (the token was only slashes)
    pub fn is_empty(&self) -> bool {
        self.child.is_empty()
    }
}

/// Split a tag token on its first `/`.
///
/// Only two levels are honoured: anything after a second `/` is dropped.
/// Empty segments collapse, so `/x` and `x/` both resolve to a single
/// top-level `x`.
pub fn parse_hierarchy(token: &str) -> TagPath<'_> {
    let mut parts = token.split('/');
    let first = parts.next().unwrap_or("");
    let second = parts.next();

    match second {
        None => TagPath {
            parent: None,
            child: first,
        },
        Some(child) if first.is_empty() => TagPath {
            parent: None,
            child,
        },
        Some("") => TagPath {
            parent: None,
            child: first,
        },
        Some(child) => TagPath {
            parent: Some(first),
            child,
        },
    }
}
