//! Canonical schema paths
//!
//! Paths address a node of a schema tree: `.` is the root, `.spec` a named
//! property, `.[]` the item schema of an array and `.*` the schema of an
//! object's additional properties. Segments nest, e.g. `.spec.ports.[].name`.
//!
//! Internally the root is the empty string so that children can be built by
//! plain concatenation; [`display`] turns it into `.`.

pub const ROOT: &str = ".";

/// Path of the named property below `parent`
pub fn property(parent: &str, name: &str) -> String {
    format!("{parent}.{name}")
}

/// Path of the array item schema below `parent`
pub fn items(parent: &str) -> String {
    format!("{parent}.[]")
}

/// Path of the additional properties schema below `parent`
pub fn additional_properties(parent: &str) -> String {
    format!("{parent}.*")
}

/// Render an internal path, mapping the root to `.`
pub fn display(path: &str) -> &str {
    if path.is_empty() { ROOT } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_dot() {
        assert_eq!(display(""), ".");
    }

    #[test]
    fn test_nested_paths() {
        assert_eq!(display(&items("")), ".[]");
        assert_eq!(display(&property(&items(""), "foo")), ".[].foo");
        assert_eq!(display(&additional_properties(&property("", "labels"))), ".labels.*");
    }
}
