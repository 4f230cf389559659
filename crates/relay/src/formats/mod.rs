// ABOUTME: Text helpers shared by the extractors.
// ABOUTME: HTML-to-text, title lookup, paragraph text, entity decoding, and comment wrapping.

//! Text conversion helpers.
//!
//! Everything here is pure: it takes markup or text and returns text, so the
//! extractors can be tested without any network.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Column width for wrapped comment bodies.
pub const WRAP_WIDTH: usize = 80;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static MULTI_NL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").unwrap());

/// Title sources in priority order: (selector, attribute or None for text).
const TITLE_SOURCES: &[(&str, Option<&str>)] = &[
    ("title", None),
    ("meta[property='og:title']", Some("content")),
    ("meta[name='title']", Some("content")),
    ("h1", None),
];

/// Block elements whose text forms the article body.
const PARAGRAPH_SELECTOR: &str = "p, h2, h3, li, blockquote, pre";

/// Convert HTML to plain text by extracting text nodes.
///
/// Treats `<br>` as newline, collapses runs of horizontal whitespace and
/// blank lines, and trims the result.
pub fn html_to_text(html: &str) -> String {
    let preprocessed = BR_RE.replace_all(html, "\n");
    let document = Html::parse_fragment(&preprocessed);
    let raw_text: String = document.root_element().text().collect::<Vec<_>>().join(" ");
    let normalized = HSPACE_RE.replace_all(&raw_text, " ");
    let collapsed = MULTI_NL_RE.replace_all(&normalized, "\n");
    collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Extract the page title: `<title>`, `og:title`, `meta[name=title]`, then `<h1>`.
pub fn extract_title(doc: &Html) -> Option<String> {
    TITLE_SOURCES
        .iter()
        .find_map(|(sel, attr)| first_value(doc, sel, *attr))
}

/// Read the `content` of a `meta[property=...]` tag.
pub fn meta_property(doc: &Html, property: &str) -> Option<String> {
    first_value(doc, &format!("meta[property='{}']", property), Some("content"))
}

fn first_value(doc: &Html, selector: &str, attr: Option<&str>) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).find_map(|el| {
        let value = match attr {
            Some(name) => el.value().attr(name).map(str::to_string),
            None => Some(el.text().collect::<String>()),
        }?;
        let normalized = normalize_whitespace(&value);
        (!normalized.is_empty()).then_some(normalized)
    })
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the paragraph-level blocks under `root`, joined with blank lines.
///
/// Without any paragraphs the plain text of `root` is used.
pub fn block_text(root: ElementRef) -> String {
    let paragraphs = match Selector::parse(PARAGRAPH_SELECTOR) {
        Ok(sel) => root
            .select(&sel)
            .filter(|p| !has_block_ancestor_within(p, &root))
            .map(|p| normalize_whitespace(&p.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>(),
        Err(_) => Vec::new(),
    };
    if paragraphs.is_empty() {
        html_to_text(&root.inner_html())
    } else {
        paragraphs.join("\n\n")
    }
}

/// [`block_text`] of an HTML fragment, such as readability output.
pub fn fragment_text(html: &str) -> String {
    block_text(Html::parse_fragment(html).root_element())
}

/// [`block_text`] of the whole `<body>`.
pub fn body_text(doc: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next());
    block_text(body.unwrap_or_else(|| doc.root_element()))
}

/// True when `el` sits inside another paragraph-level element below `container`
/// (a `<p>` inside a `<li>`), so its text is not emitted twice.
fn has_block_ancestor_within(el: &ElementRef, container: &ElementRef) -> bool {
    for ancestor in el.ancestors() {
        if ancestor.id() == container.id() {
            return false;
        }
        if let Some(parent) = ElementRef::wrap(ancestor) {
            if matches!(
                parent.value().name(),
                "p" | "li" | "blockquote" | "pre" | "h2" | "h3"
            ) {
                return true;
            }
        }
    }
    false
}

/// Decode HTML entities, including doubly-escaped ones (`&amp;#39;`).
pub fn decode_entities(s: &str) -> String {
    const NAMED: &[(&str, &str)] = &[
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
        ("&nbsp;", " "),
        ("&ndash;", "–"),
        ("&mdash;", "—"),
        ("&lsquo;", "\u{2018}"),
        ("&rsquo;", "\u{2019}"),
        ("&ldquo;", "\u{201C}"),
        ("&rdquo;", "\u{201D}"),
        ("&hellip;", "…"),
    ];

    let mut result = s.to_string();
    for (entity, replacement) in NAMED {
        result = result.replace(entity, replacement);
    }

    NUMERIC_ENTITY_RE
        .replace_all(&result, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
                _ => None,
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Remove anything that looks like a tag.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Join the non-empty trimmed lines of `body` with single spaces and wrap the
/// result to [`WRAP_WIDTH`] columns.
pub fn rewrap(body: &str) -> String {
    let joined = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    textwrap::fill(&joined, WRAP_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_to_text_collapses_whitespace() {
        let text = html_to_text("<div>Hello   <b>world</b><br>next\n\n\nline</div>");
        assert_eq!(text, "Hello world\nnext\nline");
    }

    #[test]
    fn title_prefers_title_tag() {
        let doc = Html::parse_document(
            "<html><head><title> Page  Title </title><meta property='og:title' content='OG'></head></html>",
        );
        assert_eq!(extract_title(&doc), Some("Page Title".to_string()));
    }

    #[test]
    fn title_falls_back_to_og_then_h1() {
        let doc = Html::parse_document(
            "<html><head><meta property='og:title' content='OG Title'></head><body><h1>H</h1></body></html>",
        );
        assert_eq!(extract_title(&doc), Some("OG Title".to_string()));

        let doc = Html::parse_document("<html><body><h1>Heading</h1></body></html>");
        assert_eq!(extract_title(&doc), Some("Heading".to_string()));

        let doc = Html::parse_document("<html><body><p>x</p></body></html>");
        assert_eq!(extract_title(&doc), None);
    }

    #[test]
    fn fragment_text_joins_paragraphs() {
        assert_eq!(
            fragment_text("<div><p>First  paragraph.</p><p>Second paragraph.</p></div>"),
            "First paragraph.\n\nSecond paragraph."
        );
    }

    #[test]
    fn block_text_does_not_repeat_nested_blocks() {
        assert_eq!(fragment_text("<ul><li><p>Item one</p></li></ul>"), "Item one");
    }

    #[test]
    fn body_text_falls_back_to_plain_text() {
        let doc = Html::parse_document("<html><body><div>Just text</div></body></html>");
        assert_eq!(body_text(&doc), "Just text");
    }

    #[test]
    fn decode_entities_named_numeric_and_double() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#169; &#xA9;"), "© ©");
        assert_eq!(decode_entities("I&amp;#39;m"), "I'm");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<font color=\"#fff\">hi</font> there"), "hi there");
    }

    #[test]
    fn rewrap_joins_and_wraps() {
        let body = "  first line  \n\n second line \n";
        assert_eq!(rewrap(body), "first line second line");

        let long = "word ".repeat(30);
        let wrapped = rewrap(&long);
        assert!(wrapped.lines().count() > 1);
        assert!(wrapped.lines().all(|l| l.chars().count() <= WRAP_WIDTH));
    }
}
