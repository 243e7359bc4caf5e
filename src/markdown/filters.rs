//! Text cleanup applied before parsing

use regex::Regex;
use std::sync::OnceLock;

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)%%.+?%%").expect("comment pattern is valid"))
}

/// Strip `%%comment%%` spans, which may cross lines.
///
/// An opening `%%` without a closing one leaves the rest of the text as is.
pub fn filter_comments(text: &str, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    comment_regex().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_inline_comment() {
        assert_eq!(filter_comments("keep %%drop%% keep", true), "keep  keep");
    }

    #[test]
    fn test_removes_multiline_comment() {
        assert_eq!(filter_comments("a\n%%\nhidden\n%%\nb", true), "a\n\nb");
    }

    #[test]
    fn test_non_greedy() {
        assert_eq!(filter_comments("%%x%% y %%z%%", true), " y ");
    }

    #[test]
    fn test_unterminated_is_kept() {
        assert_eq!(filter_comments("a %%b c", true), "a %%b c");
    }

    #[test]
    fn test_disabled() {
        assert_eq!(filter_comments("a %%b%%", false), "a %%b%%");
    }
}
