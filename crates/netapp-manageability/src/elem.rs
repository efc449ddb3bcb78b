//! The labeled element tree exchanged with the server.
//!
//! Every request and every response is a tree of [`Elem`] nodes. A node has a
//! name and either text content or an ordered list of children. Sibling names
//! may repeat; repetition is how the protocol encodes lists.

/// One node of an element tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Elem {
    name: String,
    content: Option<String>,
    children: Vec<Elem>,
}

impl Elem {
    /// Create an empty element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            children: Vec::new(),
        }
    }

    /// Create a leaf element holding `content`.
    pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Some(content.into()),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content, if any was set.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Set the text content. Content and children are exclusive, so any
    /// existing children are dropped.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.children.clear();
        self.content = Some(content.into());
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> &[Elem] {
        &self.children
    }

    /// Append a child. Appending clears any text content.
    pub fn child_add(&mut self, child: Elem) {
        self.content = None;
        self.children.push(child);
    }

    /// Append every child from `children`, preserving their order.
    pub fn extend_children(&mut self, children: impl IntoIterator<Item = Elem>) {
        let before = self.children.len();
        self.children.extend(children);
        if self.children.len() > before {
            self.content = None;
        }
    }

    /// Append a leaf child named `name` holding `content`.
    pub fn child_add_string(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.child_add(Elem::with_content(name, content));
    }

    /// First child named `name`.
    pub fn child_get(&self, name: &str) -> Option<&Elem> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Content of the first child named `name`. A child without content
    /// reads as the empty string.
    pub fn child_get_string(&self, name: &str) -> Option<&str> {
        self.child_get(name).map(|c| c.content().unwrap_or(""))
    }

    /// Content of the first child named `name`, parsed as an integer.
    pub fn child_get_int(&self, name: &str) -> Option<i64> {
        self.child_get_string(name)
            .and_then(|s| s.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_and_children_are_exclusive() {
        let mut e = Elem::with_content("volume", "vol0");
        e.child_add(Elem::new("name"));
        assert_eq!(e.content(), None);
        assert!(e.has_children());

        e.set_content("vol1");
        assert!(!e.has_children());
        assert_eq!(e.content(), Some("vol1"));
    }

    #[test]
    fn test_child_getters() {
        let mut e = Elem::new("results");
        e.child_add_string("size-total", " 1024 ");
        e.child_add_string("name", "vol0");
        e.child_add_string("name", "vol1");
        e.child_add(Elem::new("empty"));

        assert_eq!(e.child_get_string("name"), Some("vol0"));
        assert_eq!(e.child_get_int("size-total"), Some(1024));
        assert_eq!(e.child_get_int("name"), None);
        assert_eq!(e.child_get_string("empty"), Some(""));
        assert_eq!(e.child_get("missing"), None);
    }

    #[test]
    fn test_extend_children_empty_keeps_content() {
        let mut e = Elem::with_content("a", "x");
        e.extend_children(Vec::new());
        assert_eq!(e.content(), Some("x"));
    }
}
