//! Owned XML element tree.
//!
//! `roxmltree` borrows the input text, so responses are copied into an owned
//! tree once and the body can be dropped. Element names are local names;
//! the service's default namespace is ignored.

/// An XML element with its trimmed text content and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<Self>,
}

impl XmlElement {
    /// Parse a document and return its root element.
    ///
    /// # Errors
    ///
    /// Returns `roxmltree::Error` if the input is not well-formed XML.
    pub fn parse(body: &str) -> Result<Self, roxmltree::Error> {
        let document = roxmltree::Document::parse(body)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let text: String = node
            .children()
            .filter(roxmltree::Node::is_text)
            .filter_map(|child| child.text())
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            text: text.trim().to_string(),
            children: node
                .children()
                .filter(roxmltree::Node::is_element)
                .map(Self::from_node)
                .collect(),
        }
    }

    /// Local element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text directly inside this element, trimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// First child element called `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Follow `path` through first-matching children.
    ///
    /// The path is relative to this element; an empty path returns `self`.
    #[must_use]
    pub fn path(&self, path: &[&str]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |element, segment| element.child(segment))
    }

    /// Text at `path`, or an empty string if any segment is missing.
    #[must_use]
    pub fn text_at(&self, path: &[&str]) -> &str {
        self.path(path).map_or("", Self::text)
    }
}
