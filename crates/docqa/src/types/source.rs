//! Sources (files or web pages) and the file types we can extract from

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Supported document file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft PowerPoint presentation (.pptx)
    Pptx,
    /// Microsoft Word document (.docx)
    Docx,
}

impl FileType {
    /// Every supported type, in the order they are advertised
    pub const ALL: [FileType; 3] = [FileType::Pdf, FileType::Pptx, FileType::Docx];

    /// Detect file type from extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
            Self::Docx => "docx",
        }
    }
}

/// A single file or web page designated for extraction and question answering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Local document
    File(PathBuf),
    /// Web page
    Url(String),
}

impl Source {
    /// True when the input names a web page rather than a path
    pub fn is_url(input: &str) -> bool {
        input.starts_with("http://") || input.starts_with("https://")
    }

    /// Identifier stored in the result document: the file name, or the URL as given
    pub fn identifier(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            Self::Url(url) => url.clone(),
        }
    }

    /// Stem of the output file: the file stem, or a slug of the URL
    pub fn output_key(&self) -> String {
        match self {
            Self::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string()),
            Self::Url(url) => slugify_url(url),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Derive a filesystem-safe stem from a URL.
///
/// The host (including any port) has dots replaced by underscores and is
/// followed by the path with slashes replaced by underscores. Anything outside
/// `[A-Za-z0-9_]` is then dropped and surrounding underscores trimmed. An empty
/// result becomes `link`.
pub fn slugify_url(url: &str) -> String {
    let (netloc, path) = split_url(url);
    let raw = format!("{}{}", netloc.replace('.', "_"), path.replace('/', "_"));

    let slug: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let slug = slug.trim_matches('_');

    if slug.is_empty() {
        "link".to_string()
    } else {
        slug.to_string()
    }
}

/// Split a URL into its network location and path, ignoring query and fragment
fn split_url(url: &str) -> (&str, &str) {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => return ("", strip_query(url)),
    };

    let rest = strip_query(rest);
    match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    }
}

fn strip_query(s: &str) -> &str {
    match s.find(['?', '#']) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_extension("PPTX"), Some(FileType::Pptx));
        assert_eq!(FileType::from_extension("Docx"), Some(FileType::Docx));
        assert_eq!(FileType::from_extension("doc"), None);
        assert_eq!(FileType::from_path(Path::new("deck.PpTx")), Some(FileType::Pptx));
        assert_eq!(FileType::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_slugify_url() {
        assert_eq!(slugify_url("https://example.com/a/b"), "example_com_a_b");
        assert_eq!(slugify_url("https://x.y/"), "x_y");
        assert_eq!(slugify_url("https://x.y"), "x_y");
        assert_eq!(slugify_url("http://shop.example.org/products/item-42?ref=home#top"), "shop_example_org_products_item42");
        assert_eq!(slugify_url("https://localhost:8080/docs/"), "localhost8080_docs");
    }

    #[test]
    fn test_slugify_url_falls_back_to_link() {
        assert_eq!(slugify_url("https://.../!!!/"), "link");
        assert_eq!(slugify_url("https://"), "link");
    }

    #[test]
    fn test_source_keys() {
        let file = Source::File(PathBuf::from("/tmp/in/Quarterly Report.pdf"));
        assert_eq!(file.identifier(), "Quarterly Report.pdf");
        assert_eq!(file.output_key(), "Quarterly Report");

        let url = Source::Url("https://example.com/a/b".to_string());
        assert_eq!(url.identifier(), "https://example.com/a/b");
        assert_eq!(url.output_key(), "example_com_a_b");
    }

    #[test]
    fn test_is_url() {
        assert!(Source::is_url("https://example.com"));
        assert!(Source::is_url("http://example.com"));
        assert!(!Source::is_url("ftp://example.com"));
        assert!(!Source::is_url("./docs"));
    }
}
