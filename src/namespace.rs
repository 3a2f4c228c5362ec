//! Namespace scope management.
//!
//! Scopes form a parent-chained arena: each open element either shares the
//! scope of its parent or, once it declares a binding, owns a fresh scope
//! whose parent is the enclosing one. Lookup walks the parent chain from
//! the innermost scope outward. The arena lives for the duration of a
//! parse; [`Tag`]s hold plain indices into it.
//!
//! [`Tag`]: crate::Tag

/// The reserved URI the `xml` prefix is always bound to.
pub(crate) const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// The reserved URI the `xmlns` prefix is always bound to.
pub(crate) const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Index of the pre-seeded root scope.
pub(crate) const ROOT_SCOPE: usize = 0;

#[derive(Debug)]
struct Scope {
    parent: Option<usize>,
    /// Bindings in declaration order. The empty prefix is the default
    /// namespace.
    bindings: Vec<(String, String)>,
}

/// The arena of namespace scopes of one parse.
#[derive(Debug)]
pub(crate) struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Creates an arena whose root scope carries the two reserved
    /// bindings.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                bindings: vec![
                    ("xml".to_string(), XML_URI.to_string()),
                    ("xmlns".to_string(), XMLNS_URI.to_string()),
                ],
            }],
        }
    }

    /// Drops every scope except the pre-seeded root.
    pub fn clear(&mut self) {
        self.scopes.truncate(1);
    }

    /// Opens a child scope of `parent` and returns its index.
    pub fn push_child(&mut self, parent: usize) -> usize {
        self.scopes.push(Scope {
            parent: Some(parent),
            bindings: Vec::new(),
        });
        self.scopes.len() - 1
    }

    /// Declares or overrides `prefix → uri` in `scope`.
    pub fn bind(&mut self, scope: usize, prefix: &str, uri: &str) {
        let bindings = &mut self.scopes[scope].bindings;
        match bindings.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, bound)) => *bound = uri.to_string(),
            None => bindings.push((prefix.to_string(), uri.to_string())),
        }
    }

    /// Resolves `prefix` by walking from `scope` towards the root.
    ///
    /// An empty URI 'removes' a binding for the extent of its scope, so it
    /// resolves to `None` exactly like an unbound prefix.
    pub fn resolve<'a>(&'a self, scope: usize, prefix: &str) -> Option<&'a str> {
        let mut current = Some(scope);
        while let Some(index) = current {
            let scope = &self.scopes[index];
            if let Some((_, uri)) = scope.bindings.iter().find(|(p, _)| p == prefix) {
                return if uri.is_empty() { None } else { Some(uri) };
            }
            current = scope.parent;
        }
        None
    }

    /// The bindings declared by `scope` itself, in declaration order.
    pub fn own_bindings(&self, scope: usize) -> &[(String, String)] {
        &self.scopes[scope].bindings
    }
}

/// Splits a qualified name into `(prefix, local)`.
///
/// An attribute named exactly `xmlns` declares the default namespace and
/// is special-cased to `("xmlns", "")`.
pub(crate) fn qualified_name(name: &str, attribute: bool) -> (&str, &str) {
    if attribute && name == "xmlns" {
        return ("xmlns", "");
    }
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_is_seeded() {
        let arena = ScopeArena::new();
        assert_eq!(arena.resolve(ROOT_SCOPE, "xml"), Some(XML_URI));
        assert_eq!(arena.resolve(ROOT_SCOPE, "xmlns"), Some(XMLNS_URI));
        assert_eq!(arena.resolve(ROOT_SCOPE, "p"), None);
    }

    #[test]
    fn lookup_walks_parents() {
        let mut arena = ScopeArena::new();
        let outer = arena.push_child(ROOT_SCOPE);
        arena.bind(outer, "a", "urn:outer");
        let inner = arena.push_child(outer);
        arena.bind(inner, "b", "urn:inner");

        assert_eq!(arena.resolve(inner, "a"), Some("urn:outer"));
        assert_eq!(arena.resolve(inner, "b"), Some("urn:inner"));
        assert_eq!(arena.resolve(outer, "b"), None);
    }

    #[test]
    fn inner_binding_shadows() {
        let mut arena = ScopeArena::new();
        let outer = arena.push_child(ROOT_SCOPE);
        arena.bind(outer, "p", "urn:one");
        let inner = arena.push_child(outer);
        arena.bind(inner, "p", "urn:two");

        assert_eq!(arena.resolve(inner, "p"), Some("urn:two"));
        assert_eq!(arena.resolve(outer, "p"), Some("urn:one"));
    }

    #[test]
    fn empty_uri_unbinds() {
        let mut arena = ScopeArena::new();
        let outer = arena.push_child(ROOT_SCOPE);
        arena.bind(outer, "p", "urn:one");
        let inner = arena.push_child(outer);
        arena.bind(inner, "p", "");

        assert_eq!(arena.resolve(inner, "p"), None);
    }

    #[test]
    fn qualified_names() {
        assert_eq!(qualified_name("p:x", true), ("p", "x"));
        assert_eq!(qualified_name("x", true), ("", "x"));
        assert_eq!(qualified_name("xmlns", true), ("xmlns", ""));
        assert_eq!(qualified_name("xmlns", false), ("", "xmlns"));
        assert_eq!(qualified_name("xmlns:p", true), ("xmlns", "p"));
    }
}
