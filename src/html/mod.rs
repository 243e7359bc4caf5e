//! Mutable HTML fragment produced by a conversion
//!
//! The fragment is a kuchiki DOM whose root is a `div` container sitting in
//! a minimal document body, so selectors such as `body p` keep matching.
//! Each conversion owns its fragment exclusively and passes it by `&mut`
//! through filtering, inlining and rendering.

mod filter;

pub use filter::filter;

use kuchiki::iter::NodeIterator;
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

use crate::error::{Error, Result};

/// Container wrapping the converted HTML.
#[derive(Debug)]
pub struct Fragment {
    // Holds the tree above `root` alive; parents are weak references
    _document: NodeRef,
    root: NodeRef,
}

impl Fragment {
    /// Parse `html` into a new fragment.
    ///
    /// The content is parsed in body context, the way `innerHTML` would
    /// parse it, then moved under the container.
    pub fn parse(html: &str) -> Result<Self> {
        let shell = kuchiki::parse_html()
            .one("<!DOCTYPE html><html><head></head><body><div></div></body></html>".to_string());
        let root = shell
            .select_first("body > div")
            .map_err(|()| Error::Conversion("fragment container missing".to_string()))?
            .as_node()
            .clone();

        let content = kuchiki::parse_html().one(format!(
            "<!DOCTYPE html><html><head></head><body>{}</body></html>",
            html
        ));
        let body = content
            .select_first("body")
            .map_err(|()| Error::Conversion("parsed HTML has no body".to_string()))?;

        // Collect first: append() detaches each child from the parsed body
        let children: Vec<NodeRef> = body.as_node().children().collect();
        for child in children {
            root.append(child);
        }

        Ok(Self {
            _document: shell,
            root,
        })
    }

    /// The container node.
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// The container and every element below it, in document order.
    pub fn elements(&self) -> Vec<NodeDataRef<ElementData>> {
        self.root.inclusive_descendants().elements().collect()
    }

    /// Serialized children of the container.
    pub fn inner_html(&self) -> Result<String> {
        let mut output = Vec::new();
        for child in self.root.children() {
            child.serialize(&mut output)?;
        }
        String::from_utf8(output)
            .map_err(|e| Error::Conversion(format!("serialized HTML is not UTF-8: {}", e)))
    }

    /// Text content of the fragment, without markup.
    pub fn text(&self) -> String {
        self.root.text_contents()
    }

    /// Current `style` attribute of the container.
    pub fn root_style(&self) -> Option<String> {
        self.root
            .as_element()
            .and_then(|element| element.attributes.borrow().get("style").map(String::from))
    }

    /// Replace, or with `None` remove, the container's `style` attribute.
    pub fn set_root_style(&mut self, style: Option<String>) {
        if let Some(element) = self.root.as_element() {
            let mut attrs = element.attributes.borrow_mut();
            match style {
                Some(style) => {
                    attrs.insert("style", style);
                }
                None => {
                    attrs.remove("style");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_html_round_trip() {
        let fragment = Fragment::parse("<p>Hello <b>world</b></p>").unwrap();
        assert_eq!(fragment.inner_html().unwrap(), "<p>Hello <b>world</b></p>");
    }

    #[test]
    fn test_root_is_container_div() {
        let fragment = Fragment::parse("<p>a</p>").unwrap();
        let root = fragment.root().as_element().unwrap();
        assert_eq!(&*root.name.local, "div");
        assert_eq!(fragment.elements().len(), 2);
    }

    #[test]
    fn test_style_elements_stay_in_fragment() {
        let fragment = Fragment::parse("<style>p{}</style><p>a</p>").unwrap();
        assert!(fragment.inner_html().unwrap().starts_with("<style>"));
    }

    #[test]
    fn test_text_content() {
        let fragment = Fragment::parse("<p>a <i>b</i></p>").unwrap();
        assert_eq!(fragment.text(), "a b");
    }

    #[test]
    fn test_root_style() {
        let mut fragment = Fragment::parse("<p>a</p>").unwrap();
        assert_eq!(fragment.root_style(), None);
        fragment.set_root_style(Some("padding: 2em;".to_string()));
        assert_eq!(fragment.root_style().as_deref(), Some("padding: 2em;"));
        fragment.set_root_style(None);
        assert_eq!(fragment.root_style(), None);
        assert_eq!(fragment.inner_html().unwrap(), "<p>a</p>");
    }

    #[test]
    fn test_body_selectors_match() {
        let fragment = Fragment::parse("<p>a</p>").unwrap();
        let matches = fragment.root().select("body p").unwrap().count();
        assert_eq!(matches, 1);
    }
}
