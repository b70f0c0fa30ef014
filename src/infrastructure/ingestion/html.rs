//! HTML text and link extraction

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// Visible text and outgoing links of one HTML page
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    pub title: Option<String>,
    pub text: String,
    pub links: Vec<Url>,
}

const SKIPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "head", "nav", "footer", "template", "svg",
];

/// Elements whose text starts on its own line
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "aside", "h1", "h2", "h3", "h4", "h5",
    "h6", "ul", "ol", "li", "dl", "dt", "dd", "table", "thead", "tbody", "tfoot", "tr", "td",
    "th", "caption", "pre", "form", "fieldset", "figure", "figcaption", "br", "hr", "blockquote",
];

/// Parse `html`, resolving relative links against `base`
pub fn extract_page(html: &str, base: &Url) -> HtmlPage {
    let document = Html::parse_document(html);

    HtmlPage {
        title: extract_title(&document),
        text: extract_text(&document),
        links: extract_links(&document, base),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next());

    let mut text = String::new();
    match body {
        Some(body) => collect_text(&body, &mut text),
        None => collect_text(&document.root_element(), &mut text),
    }

    normalize_text(&text)
}

fn collect_text(element: &ElementRef, out: &mut String) {
    for node in element.children() {
        if let Some(el) = ElementRef::wrap(node) {
            let tag = el.value().name();

            if SKIPPED_TAGS.contains(&tag) {
                continue;
            }

            let is_block = BLOCK_TAGS.contains(&tag);
            if is_block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }

            collect_text(&el, out);

            if is_block {
                out.push('\n');
            }
        } else if let Some(txt) = node.value().as_text() {
            out.push_str(txt);
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_links(document: &Html, base: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<Url> = Vec::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let Ok(mut url) = base.join(href.trim()) else {
            continue;
        };

        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }

        url.set_fragment(None);
        if !links.contains(&url) {
            links.push(url);
        }
    }

    links
}
