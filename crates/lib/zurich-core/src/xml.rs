//! Owned, namespace-aware XML element tree.
//!
//! `roxmltree` documents borrow their input; the records adapter converts
//! them into this tree so a parsed response can outlive the HTTP body.

use roxmltree::{Document, Node};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Text before the first child element, as in `ElementTree`.
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parses a document and returns its root element.
    ///
    /// # Errors
    /// Returns the `roxmltree` error for malformed input.
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(xml)?;
        Ok(Self::from_node(doc.root_element()))
    }

    fn from_node(node: Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        Self {
            namespace: tag.namespace().map(str::to_string),
            name: tag.name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            text: node.text().map(str::to_string),
            children: node
                .children()
                .filter(Node::is_element)
                .map(Self::from_node)
                .collect(),
        }
    }

    /// True when the element has this local name in this namespace. An empty
    /// namespace matches elements without one.
    #[must_use]
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref().unwrap_or_default() == namespace
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child matching `namespace` and `name`.
    #[must_use]
    pub fn find(&self, namespace: &str, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.is(namespace, name))
    }

    /// All direct children matching `namespace` and `name`, in document order.
    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |child| child.is(namespace, name))
    }

    /// Follows a path of `(namespace, name)` steps, taking the first match
    /// at each step.
    #[must_use]
    pub fn find_path(&self, path: &[(&str, &str)]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, (namespace, name)| node.find(namespace, name))
    }

    /// All elements reached by `path`, expanding every match at each step.
    #[must_use]
    pub fn find_all_path(&self, path: &[(&str, &str)]) -> Vec<&Self> {
        path.iter().fold(vec![self], |nodes, (namespace, name)| {
            nodes
                .into_iter()
                .flat_map(|node| node.children.iter())
                .filter(|child| child.is(namespace, name))
                .collect()
        })
    }
}
