//! Web page text extraction

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::config::FetchConfig;
use crate::error::Result;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));

static CONTENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, li").expect("valid content selector")
});

/// Elements whose text never counts as page content
const DISCARDED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Fetches web pages and reduces them to their readable text
pub struct WebExtractor {
    client: Client,
}

impl WebExtractor {
    /// Create a new extractor with the configured timeout
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page and extract its text.
    ///
    /// Network failures and non-success statuses are logged and yield an
    /// empty string, which callers treat as "no content".
    pub async fn extract(&self, url: &str) -> String {
        match self.fetch(url).await {
            Ok(html) => html_to_text(&html),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                String::new()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        tracing::debug!("Fetched {} ({})", url, response.status());
        Ok(response.text().await?)
    }
}

/// Reduce an HTML document to its title, headings, paragraphs and list items.
///
/// A fragment is the concatenation of its visible text nodes, each trimmed at
/// both ends; whitespace inside a node is kept. Empty fragments are dropped and
/// the rest joined with newlines in document order, title first.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    let title = document
        .select(&TITLE_SELECTOR)
        .find(|el| !is_discarded(el))
        .map(element_text);
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        parts.push(title);
    }

    for element in document.select(&CONTENT_SELECTOR) {
        if is_discarded(&element) {
            continue;
        }
        let text = element_text(element);
        if !text.is_empty() {
            parts.push(text);
        }
    }

    parts.join("\n")
}

fn is_discarded_name(name: &str) -> bool {
    DISCARDED_ELEMENTS.contains(&name)
}

/// True when the element sits inside a script, style or noscript element
fn is_discarded(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|el| is_discarded_name(el.name()))
}

/// Visible text of an element: every text node trimmed, empty ones skipped
fn element_text(element: ElementRef) -> String {
    let mut fragment = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(|a| a.value().as_element())
            .any(|el| is_discarded_name(el.name()));
        if !hidden {
            fragment.push_str(text.trim());
        }
    }

    fragment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_order_and_filtering() {
        let html = r#"<!DOCTYPE html>
<html>
<head>
  <title>  Acme Tools </title>
  <style>p { color: red; }</style>
  <script>var p = "<p>not content</p>";</script>
</head>
<body>
  <h1>Welcome</h1>
  <p>We sell <b>hammers</b>
     and nails.</p>
  <p>   </p>
  <ul><li>Hammers</li><li>Nails</li></ul>
  <div>Loose text is ignored</div>
  <h3>Contact</h3>
  <noscript><p>Enable JavaScript</p></noscript>
</body>
</html>"#;

        assert_eq!(
            html_to_text(html),
            "Acme Tools\nWelcome\nWe sellhammersand nails.\nHammers\nNails\nContact"
        );
    }

    #[test]
    fn test_whitespace_inside_text_node_is_kept() {
        let html = "<title></title><p>  Line one\n   line two  </p><pre><p>a\tb</p></pre>";
        assert_eq!(html_to_text(html), "Line one\n   line two\na\tb");
    }

    #[test]
    fn test_html_without_title() {
        assert_eq!(html_to_text("<p>Only a paragraph</p>"), "Only a paragraph");
        assert_eq!(html_to_text("<div>nothing selectable</div>"), "");
    }

    #[test]
    fn test_nested_elements_each_contribute() {
        let text = html_to_text("<ul><li><p>Inner</p></li></ul>");
        assert_eq!(text, "Inner\nInner");
    }

    #[tokio::test]
    async fn test_connection_error_yields_empty_text() {
        let extractor = WebExtractor::new(&FetchConfig::default()).unwrap();
        // Port 9 (discard) on loopback is not expected to accept HTTP
        let text = extractor.extract("http://127.0.0.1:9/").await;
        assert_eq!(text, "");
    }
}
