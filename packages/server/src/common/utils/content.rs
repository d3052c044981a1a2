/// Pure utility functions for content manipulation
///
/// These functions contain NO side effects - they take inputs and return
/// outputs without touching the store or performing I/O.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
}

/// Strip HTML tags from user-supplied rich text.
///
/// Used to measure the real length of a group description before the
/// minimum-length check; the markup itself must not count.
pub fn remove_html_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_tags() {
        assert_eq!(remove_html_tags("<p>Hello</p>"), "Hello");
    }

    #[test]
    fn strips_nested_markup() {
        assert_eq!(
            remove_html_tags("<p>We are <strong>open</strong> to all.</p>"),
            "We are open to all."
        );
    }

    #[test]
    fn keeps_plain_text_untouched() {
        assert_eq!(remove_html_tags("no markup here"), "no markup here");
    }

    #[test]
    fn empty_markup_measures_zero() {
        assert_eq!(remove_html_tags("<p></p><br/>"), "");
    }
}
