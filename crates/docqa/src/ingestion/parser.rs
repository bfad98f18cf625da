//! Multi-format file parser

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::FileType;

/// Parsed document with extracted text
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Per-unit text (one entry per page, shape or paragraph) in document order
    pub segments: Vec<String>,
}

impl ParsedDocument {
    fn new(file_type: FileType, segments: Vec<String>) -> Self {
        Self { file_type, segments }
    }

    /// Segments joined by newlines
    pub fn text(&self) -> String {
        self.segments.join("\n")
    }
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Read and parse a file from disk
    pub fn parse_path(path: &Path) -> Result<ParsedDocument> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        // Reject before reading so an unsupported file is never opened
        Self::file_type_for(&filename)?;

        let data = std::fs::read(path)
            .map_err(|e| Error::file_parse(&filename, format!("unable to read file: {}", e)))?;
        Self::parse(&filename, &data)
    }

    /// Parse a file based on its extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        match Self::file_type_for(filename)? {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Pptx => Self::parse_pptx(filename, data),
            FileType::Docx => Self::parse_docx(filename, data),
        }
    }

    fn file_type_for(filename: &str) -> Result<FileType> {
        let extension = Path::new(filename)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        FileType::from_extension(&extension).ok_or_else(|| {
            if extension.is_empty() {
                Error::UnsupportedFileType("(no extension)".to_string())
            } else {
                Error::UnsupportedFileType(format!(".{}", extension))
            }
        })
    }

    /// Parse PDF document, one segment per page
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let pages: Vec<String> = doc
            .get_pages()
            .keys()
            .map(|&page_number| match doc.extract_text(&[page_number]) {
                Ok(text) => clean_pdf_text(&text),
                Err(e) => {
                    tracing::debug!("No text on page {} of {}: {}", page_number, filename, e);
                    String::new()
                }
            })
            .collect();

        if !pages.is_empty() && pages.iter().all(|p| p.trim().is_empty()) {
            // lopdf cannot decode some font encodings; pdf-extract often can
            tracing::debug!("Page extraction of {} produced no text, trying pdf-extract", filename);
            match pdf_extract::extract_text_from_mem(data) {
                Ok(text) if !text.trim().is_empty() => {
                    return Ok(ParsedDocument::new(FileType::Pdf, vec![clean_pdf_text(&text)]));
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("pdf-extract failed on {}: {}", filename, e),
            }
        }

        Ok(ParsedDocument::new(FileType::Pdf, pages))
    }

    /// Parse PowerPoint presentation (.pptx), one segment per text-bearing shape
    fn parse_pptx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut shapes = Vec::new();
        for slide_name in Self::pptx_slide_order(&mut archive) {
            let xml = read_zip_entry(&mut archive, &slide_name)?;
            shapes.extend(extract_shape_texts(&xml));
        }

        Ok(ParsedDocument::new(FileType::Pptx, shapes))
    }

    /// Slide part names in presentation order.
    ///
    /// Follows the slide id list of `ppt/presentation.xml`; when that cannot be
    /// resolved, falls back to the numeric order of `ppt/slides/slideN.xml`.
    fn pptx_slide_order<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Vec<String> {
        let ordered = read_zip_entry(archive, "ppt/presentation.xml")
            .ok()
            .zip(read_zip_entry(archive, "ppt/_rels/presentation.xml.rels").ok())
            .map(|(presentation, rels)| {
                let targets = relationship_targets(&rels);
                slide_relationship_ids(&presentation)
                    .iter()
                    .filter_map(|id| targets.get(id))
                    .map(|target| resolve_part_name("ppt", target))
                    .filter(|name| archive.index_for_name(name).is_some())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        if !ordered.is_empty() {
            return ordered;
        }

        let mut slide_names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();

        slide_names.sort_by_key(|name| {
            name.trim_start_matches("ppt/slides/slide")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(0)
        });
        slide_names
    }

    /// Parse DOCX document, one segment per body paragraph
    fn parse_docx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let paragraphs = doc
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(p) => {
                    let mut text = String::new();
                    collect_paragraph_text(&p.children, &mut text);
                    Some(text)
                }
                // Tables and other block content are not paragraphs of the body
                _ => None,
            })
            .collect();

        Ok(ParsedDocument::new(FileType::Docx, paragraphs))
    }
}

fn collect_paragraph_text(children: &[docx_rs::ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => {
                for child in &run.children {
                    match child {
                        docx_rs::RunChild::Text(t) => out.push_str(&t.text),
                        docx_rs::RunChild::Tab(_) => out.push('\t'),
                        docx_rs::RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            docx_rs::ParagraphChild::Hyperlink(link) => collect_paragraph_text(&link.children, out),
            _ => {}
        }
    }
}

/// Strip NUL characters and trailing blank space left by PDF text operators
fn clean_pdf_text(text: &str) -> String {
    text.replace('\0', "").trim_end().to_string()
}

fn read_zip_entry<R: Read + Seek>(archive: &mut zip::ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| Error::file_parse(name, e.to_string()))?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Resolve a relationship target against the folder of its source part
fn resolve_part_name(base_dir: &str, target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}/{}", base_dir, target),
    }
}

fn attribute(e: &BytesStart, local_name: &[u8], prefixed: bool) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.local_name().as_ref() == local_name && attr.key.prefix().is_some() == prefixed {
            attr.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// Relationship ids of `<p:sldId r:id="...">` entries in presentation order
fn slide_relationship_ids(presentation_xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(presentation_xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sldId" => {
                if let Some(id) = attribute(&e, b"id", true) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("Malformed presentation.xml: {}", e);
                break;
            }
            _ => {}
        }
    }

    ids
}

/// Relationship id to target mapping from a `.rels` part
fn relationship_targets(rels_xml: &str) -> HashMap<String, String> {
    let mut reader = Reader::from_str(rels_xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id", false), attribute(&e, b"Target", false)) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("Malformed relationships part: {}", e);
                break;
            }
            _ => {}
        }
    }

    targets
}

/// Text of every shape with a text body, in document order.
///
/// A shape's text is its paragraphs joined by newlines; line breaks inside a
/// paragraph also become newlines. Shapes nested in group shapes are read in
/// place, so grouped text boxes are not lost. A shape without a text body
/// (a plain rectangle, for instance) contributes no segment at all.
fn extract_shape_texts(slide_xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(slide_xml);

    let mut shapes = Vec::new();
    let mut in_shape = false;
    let mut has_text_body = false;
    let mut in_text = false;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sp" => {
                    in_shape = true;
                    has_text_body = false;
                    paragraphs.clear();
                }
                b"txBody" if in_shape => has_text_body = true,
                b"p" if has_text_body => current.clear(),
                b"t" if has_text_body => in_text = true,
                b"br" if has_text_body => current.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" if has_text_body => paragraphs.push(String::new()),
                b"br" if has_text_body => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" if has_text_body => paragraphs.push(std::mem::take(&mut current)),
                b"sp" if in_shape => {
                    if has_text_body {
                        shapes.push(paragraphs.join("\n"));
                    }
                    in_shape = false;
                    has_text_body = false;
                    paragraphs.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("Malformed slide XML: {}", e);
                break;
            }
            _ => {}
        }
    }

    shapes
}
