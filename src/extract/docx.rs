//! DOCX text extraction: `word/document.xml` → one line per paragraph.
//!
//! A DOCX file is a zip container; the body lives in `word/document.xml` as
//! WordprocessingML. Paragraphs are `w:p`, text runs carry their characters
//! in `w:t`. Each paragraph's runs are concatenated without separators and
//! paragraphs are joined with `\n`. Paragraphs with no text are skipped.
//!
//! Elements are matched by resolved namespace, not by prefix, so a document
//! that binds the WordprocessingML namespace to something other than `w:`
//! still extracts.

use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::io::{Cursor, Read};
use tracing::debug;

/// WordprocessingML main namespace.
pub const WORDPROCESSING_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// Extract paragraph text from DOCX bytes.
///
/// Every failure (not a zip, entry missing, malformed XML) collapses into
/// [`ExtractError::EmptyOrCorrupt`]; the underlying parser error is only
/// kept as detail text.
pub fn extract_docx(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let corrupt = |detail: String| ExtractError::EmptyOrCorrupt {
        filename: filename.to_string(),
        detail,
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| corrupt(format!("not a zip archive: {e}")))?;

    let mut xml = Vec::new();
    archive
        .by_name(DOCUMENT_ENTRY)
        .map_err(|e| corrupt(format!("missing {DOCUMENT_ENTRY}: {e}")))?
        .read_to_end(&mut xml)
        .map_err(|e| corrupt(format!("unreadable {DOCUMENT_ENTRY}: {e}")))?;

    let xml = std::str::from_utf8(&xml)
        .map_err(|e| corrupt(format!("{DOCUMENT_ENTRY} is not UTF-8: {e}")))?;

    let text = paragraphs_from_xml(xml).map_err(corrupt)?.join("\n");
    debug!("DOCX '{}' → {} chars", filename, text.len());
    Ok(text)
}

fn is_w(ns: &ResolveResult<'_>, local: &[u8], want: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(n)) if *n == WORDPROCESSING_NS) && local == want
}

/// Walk the document and collect non-empty paragraph lines in document order.
///
/// A paragraph nested inside another (text boxes) contributes its text to
/// every enclosing paragraph as well as producing its own line, listed after
/// the outer one.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = NsReader::from_str(xml);

    // Paragraph texts in order of their start tags, and the indices of the
    // ones currently open.
    let mut paragraphs: Vec<String> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut text_depth = 0usize;
    // Every element, so a document cut off mid-way is caught at EOF.
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| format!("XML error: {e}"))?;

        match event {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                let local = e.local_name();
                if is_w(&ns, local.as_ref(), b"p") {
                    open.push(paragraphs.len());
                    paragraphs.push(String::new());
                } else if is_w(&ns, local.as_ref(), b"t") {
                    text_depth += 1;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                let local = e.local_name();
                if is_w(&ns, local.as_ref(), b"p") {
                    open.pop();
                } else if is_w(&ns, local.as_ref(), b"t") {
                    text_depth = text_depth.saturating_sub(1);
                }
            }
            Event::Text(t) if text_depth > 0 && !open.is_empty() => {
                let run = t.unescape().map_err(|e| format!("bad text run: {e}"))?;
                for &idx in &open {
                    paragraphs[idx].push_str(&run);
                }
            }
            Event::CData(c) if text_depth > 0 && !open.is_empty() => {
                let run = String::from_utf8_lossy(&c);
                for &idx in &open {
                    paragraphs[idx].push_str(&run);
                }
            }
            Event::Empty(_) => saw_root = true,
            Event::Eof if depth > 0 || !saw_root => {
                return Err("unexpected end of document".to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    paragraphs.retain(|p| !p.is_empty());
    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zw = zip::ZipWriter::new(&mut buf);
            for (name, content) in entries {
                zw.start_file(*name, SimpleFileOptions::default()).unwrap();
                zw.write_all(content.as_bytes()).unwrap();
            }
            zw.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn runs_concatenate_and_paragraphs_join() {
        let xml = document_xml(
            r#"<w:p><w:r><w:t>Time to </w:t></w:r><w:r><w:t>fill</w:t></w:r></w:p>
               <w:p><w:r><w:t>Automation &amp; more</w:t></w:r></w:p>"#,
        );
        let bytes = zip_with(&[(DOCUMENT_ENTRY, &xml)]);
        let text = extract_docx("brd.docx", &bytes).unwrap();
        assert_eq!(text, "Time to fill\nAutomation & more");
    }

    #[test]
    fn empty_paragraphs_are_skipped() {
        let xml = document_xml(r#"<w:p/><w:p><w:r><w:t>Only</w:t></w:r></w:p><w:p><w:r/></w:p>"#);
        let bytes = zip_with(&[(DOCUMENT_ENTRY, &xml)]);
        assert_eq!(extract_docx("brd.docx", &bytes).unwrap(), "Only");
    }

    #[test]
    fn other_prefix_same_namespace() {
        let xml = r#"<x:document xmlns:x="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><x:body><x:p><x:r><x:t>Uptime</x:t></x:r></x:p></x:body></x:document>"#;
        let bytes = zip_with(&[(DOCUMENT_ENTRY, xml)]);
        assert_eq!(extract_docx("brd.docx", &bytes).unwrap(), "Uptime");
    }

    #[test]
    fn foreign_namespace_is_ignored() {
        let xml = r#"<document xmlns:w="urn:not-word"><w:p><w:t>Hidden</w:t></w:p></document>"#;
        let bytes = zip_with(&[(DOCUMENT_ENTRY, xml)]);
        assert_eq!(extract_docx("brd.docx", &bytes).unwrap(), "");
    }

    #[test]
    fn missing_entry_is_corrupt() {
        let bytes = zip_with(&[("word/other.xml", "<x/>")]);
        let err = extract_docx("brd.docx", &bytes).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyOrCorrupt { .. }), "got: {err:?}");
    }

    #[test]
    fn not_a_zip_is_corrupt() {
        let err = extract_docx("brd.docx", b"plain text, not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::EmptyOrCorrupt { .. }));
    }

    #[test]
    fn malformed_xml_is_corrupt() {
        let bytes = zip_with(&[(DOCUMENT_ENTRY, "<w:document><w:p></w:r></w:document>")]);
        let err = extract_docx("brd.docx", &bytes).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyOrCorrupt { .. }));
    }

    #[test]
    fn truncated_xml_is_corrupt() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>uptime"#;
        let bytes = zip_with(&[(DOCUMENT_ENTRY, xml)]);
        let err = extract_docx("brd.docx", &bytes).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyOrCorrupt { .. }), "got: {err:?}");
    }

    #[test]
    fn document_without_root_is_corrupt() {
        let bytes = zip_with(&[(DOCUMENT_ENTRY, "<?xml version=\"1.0\"?>\n")]);
        let err = extract_docx("brd.docx", &bytes).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyOrCorrupt { .. }), "got: {err:?}");
    }

    #[test]
    fn nested_paragraph_text_counts_for_both() {
        let xml = document_xml(
            r#"<w:p><w:r><w:t>Outer </w:t></w:r><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:p>"#,
        );
        let bytes = zip_with(&[(DOCUMENT_ENTRY, &xml)]);
        assert_eq!(extract_docx("brd.docx", &bytes).unwrap(), "Outer inner\ninner");
    }
}
