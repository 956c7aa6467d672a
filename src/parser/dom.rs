//! Thin query layer over `scraper`: post-body lookup, newline-preserving text
//! extraction, and harvesting of the emphasized spans that mark suspected
//! definitions.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

static ENTRY_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.entry-content, div.asset-body").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

pub fn selector(css: &str) -> Selector {
    // Selectors in this crate are compile-time literals.
    Selector::parse(css).unwrap()
}

/// The post body: `div.entry-content` on WordPress/Blogspot sources,
/// `div.asset-body` on LiveJournal.
pub fn entry_content(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&ENTRY_CONTENT).next()
}

pub fn title_text(doc: &Html) -> Option<String> {
    doc.select(&TITLE).next().map(element_text)
}

/// Concatenated text of an element, the way bs4's `.text` reads: no extra
/// separators beyond what the document contains.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Element text with `<br>` rendered as a newline and block-level elements
/// terminated by one, so line-oriented extractors can split on `\n`.
pub fn text_with_breaks(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    walk_text(*el, &mut out, &[]);
    out
}

/// Same as [`text_with_breaks`], but subtrees whose tag name is in `skip` are
/// left out entirely (e.g. per-clue tables on pages where the answers live in
/// the surrounding prose).
pub fn text_with_breaks_excluding(el: ElementRef<'_>, skip: &[&str]) -> String {
    let mut out = String::new();
    walk_text(*el, &mut out, skip);
    out
}

fn walk_text(node: NodeRef<'_, Node>, out: &mut String, skip: &[&str]) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => out.push_str(&t),
            Node::Element(e) => {
                let name = e.name();
                if skip.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                walk_text(child, out, skip);
                if is_block_tag(name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "tr" | "table" | "ul"
    )
}

/// Non-blank, trimmed lines of an element's break-preserving text.
pub fn text_lines(el: ElementRef<'_>) -> Vec<String> {
    text_with_breaks(el)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Texts of all elements matching `sel` under `root`, in document order.
pub fn select_texts(root: ElementRef<'_>, sel: &Selector) -> Vec<String> {
    root.select(sel).map(element_text).collect()
}

/// Texts of every descendant element (any tag), in document order. Mirrors
/// bs4's `find_all()` over a paragraph: nested spans contribute both their
/// parent's full text and their own.
pub fn descendant_element_texts(el: ElementRef<'_>) -> Vec<(String, String)> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .map(|d| (d.value().name().to_string(), element_text(d)))
        .collect()
}

/// Tag names of all descendant elements, for "does this paragraph contain a
/// span and a strong" checks.
pub fn descendant_tag_names(el: ElementRef<'_>) -> Vec<String> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .map(|d| d.value().name().to_string())
        .collect()
}

/// Suspected-definition fragments under `root`: `<u>` tags first, then each
/// extra selector's matches in turn. The per-selector grouping (rather than
/// one interleaved document-order pass) matches how the aligner has always
/// been fed.
pub fn suspected_definition_texts(root: ElementRef<'_>, extra: &[&Selector]) -> Vec<String> {
    static U: LazyLock<Selector> = LazyLock::new(|| Selector::parse("u").unwrap());
    let mut texts = select_texts(root, &U);
    for sel in extra {
        texts.extend(select_texts(root, sel));
    }
    texts
}

/// First outbound link whose href matches `pattern`.
pub fn first_href_matching(doc: &Html, pattern: &Regex) -> Option<String> {
    doc.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| pattern.is_match(href))
        .map(str::to_string)
}

/// Root element of a full document, for shape code that wants "the whole
/// page" as a selection scope.
pub fn root_element(doc: &Html) -> ElementRef<'_> {
    doc.root_element()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_with_breaks_renders_br_and_blocks() {
        let doc = Html::parse_document(
            "<div><p>one<br>two</p><p>three</p></div>",
        );
        let div = doc.select(&selector("div")).next().unwrap();
        let text = text_with_breaks(div);
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn excluding_skips_subtrees() {
        let doc = Html::parse_document(
            "<div><table><tr><td>clue</td></tr></table><p>ANSWER - note</p></div>",
        );
        let div = doc.select(&selector("div")).next().unwrap();
        let text = text_with_breaks_excluding(div, &["table"]);
        assert!(text.contains("ANSWER"));
        assert!(!text.contains("clue"));
    }

    #[test]
    fn entry_content_matches_both_conventions() {
        let wp = Html::parse_document(r#"<div class="entry-content"><p>x</p></div>"#);
        assert!(entry_content(&wp).is_some());
        let lj = Html::parse_document(r#"<div class="asset-body"><p>x</p></div>"#);
        assert!(entry_content(&lj).is_some());
    }

    #[test]
    fn definition_texts_put_u_tags_first() {
        let doc = Html::parse_document(
            r#"<div><span style="text-decoration: underline">later</span><u>first</u></div>"#,
        );
        let underline = selector(r#"span[style*="underline"]"#);
        let texts = suspected_definition_texts(root_element(&doc), &[&underline]);
        assert_eq!(texts, vec!["first".to_string(), "later".to_string()]);
    }

    #[test]
    fn descendant_texts_are_document_order() {
        let doc = Html::parse_document(
            r#"<p><span>Avoid newspaper <u>Avoid</u></span><strong>SHUN</strong></p>"#,
        );
        let p = doc.select(&selector("p")).next().unwrap();
        let texts = descendant_element_texts(p);
        assert_eq!(texts[0].0, "span");
        assert!(texts[0].1.starts_with("Avoid newspaper"));
        assert_eq!(texts.last().unwrap().1, "SHUN");
    }
}
