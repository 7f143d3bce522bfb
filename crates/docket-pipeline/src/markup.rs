//! Small HTML helpers shared by the readiness poller and the extractor.
//!
//! `scraper::Html` is not `Send`, so documents are parsed and dropped inside
//! these synchronous functions and never held across an `.await`.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "head", "title", "template"];

/// Collapse every whitespace run to a single space and trim.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Inner markup of the first element matching `selector`.
#[must_use]
pub fn first_inner_html(markup: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(markup);
    let inner = document.select(selector).next().map(|el| el.inner_html());
    inner
}

/// Outer markup of the first element matching `selector`.
#[must_use]
pub fn first_outer_html(markup: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(markup);
    let outer = document.select(selector).next().map(|el| el.html());
    outer
}

/// Visible text nodes of a fragment or document, each whitespace-normalized,
/// blanks dropped, in document order.
#[must_use]
pub fn text_nodes(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    let mut out = Vec::new();
    collect_text(document.root_element(), &mut out);
    out
}

/// Visible text of a page, one normalized line per text node.
#[must_use]
pub fn visible_text(markup: &str) -> String {
    text_nodes(markup).join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    if HIDDEN_ELEMENTS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let line = normalize_whitespace(text);
                if !line.is_empty() {
                    out.push(line);
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Case \n\t Status  "), "Case Status");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let html = r"<html><head><title>eCourts</title><script>var x = 1;</script></head>
            <body><p>Case   Status</p><style>p{}</style><div>Disposed</div></body></html>";
        assert_eq!(visible_text(html), "Case Status\nDisposed");
    }

    #[test]
    fn test_first_inner_and_outer_html() {
        let html = r#"<div id="a"><span>one</span></div><div id="a">two</div>"#;
        let selector = Selector::parse("#a").expect("valid selector");
        assert_eq!(
            first_inner_html(html, &selector).as_deref(),
            Some("<span>one</span>")
        );
        assert_eq!(
            first_outer_html(html, &selector).as_deref(),
            Some(r#"<div id="a"><span>one</span></div>"#)
        );

        let missing = Selector::parse("#b").expect("valid selector");
        assert!(first_inner_html(html, &missing).is_none());
    }
}
