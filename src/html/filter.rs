//! Selector-based removal of generated HTML

use kuchiki::iter::NodeIterator;
use log::{debug, warn};

use super::Fragment;
use crate::error::{Error, Result};

/// Remove every element below the container matching `selector`, with its
/// subtree. Returns how many elements were removed.
///
/// An empty selector removes nothing. A selector that does not compile is
/// reported as [`Error::Selector`] and the fragment is left untouched.
pub fn filter(selector: &str, fragment: &mut Fragment) -> Result<usize> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Ok(0);
    }

    // Must collect before detaching: detach() invalidates the traversal
    let matches: Vec<_> = fragment
        .root()
        .descendants()
        .select(selector)
        .map_err(|()| {
            warn!("Invalid filter selector '{}', skipping filter", selector);
            Error::Selector {
                selector: selector.to_string(),
            }
        })?
        .collect();

    for element in &matches {
        element.as_node().detach();
    }

    debug!("Filter '{}' removed {} elements", selector, matches.len());
    Ok(matches.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_matching_subtrees() {
        let mut fragment =
            Fragment::parse("<p>keep</p><div class=\"note\"><p>drop</p></div><p class=\"note\">x</p>")
                .unwrap();
        let removed = filter(".note", &mut fragment).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(fragment.inner_html().unwrap(), "<p>keep</p>");
    }

    #[test]
    fn test_nested_matches() {
        let mut fragment = Fragment::parse("<div><div>a</div></div><p>b</p>").unwrap();
        assert_eq!(filter("div", &mut fragment).unwrap(), 2);
        assert_eq!(fragment.inner_html().unwrap(), "<p>b</p>");
    }

    #[test]
    fn test_container_is_never_removed() {
        let mut fragment = Fragment::parse("<p>a</p>").unwrap();
        filter("div", &mut fragment).unwrap();
        assert_eq!(fragment.inner_html().unwrap(), "<p>a</p>");
    }

    #[test]
    fn test_invalid_selector_leaves_fragment_unchanged() {
        let mut fragment = Fragment::parse("<div id=\"content\"><p>a</p></div>").unwrap();
        let before = fragment.inner_html().unwrap();

        let result = filter("div[", &mut fragment);
        assert!(matches!(result, Err(Error::Selector { .. })));
        assert_eq!(fragment.inner_html().unwrap(), before);
    }

    #[test]
    fn test_empty_selector_is_noop() {
        let mut fragment = Fragment::parse("<p>a</p>").unwrap();
        assert_eq!(filter("   ", &mut fragment).unwrap(), 0);
        assert_eq!(fragment.inner_html().unwrap(), "<p>a</p>");
    }
}
