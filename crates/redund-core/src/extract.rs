//! Source formats and text extraction.
//!
//! Turns the bytes of a supported file into decoded text ready for
//! [`crate::analysis::analyze`]. Every failure here is scoped to a single
//! input; callers decide whether to keep going.

use std::borrow::Cow;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::LazyLock;

use camino::Utf8Path;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use rtf_parser::document::RtfDocument;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};
use crate::markdown;

/// HTML comments.
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

/// Script and style elements, including their contents.
static HTML_RAW_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid regex")
});

/// Any remaining tag.
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Named and numeric character references.
static HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

/// The kind of text a source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Plain UTF-8 text.
    Text,
    /// CommonMark / GitHub-flavored markdown.
    Markdown,
    /// An HTML document or fragment.
    Html,
    /// A Word (OOXML) document.
    Docx,
    /// A Rich Text Format document.
    Rtf,
}

impl SourceKind {
    /// Detect the kind from a file extension (without the dot, any case).
    pub fn from_extension(extension: &str) -> ExtractResult<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            "docx" => Ok(Self::Docx),
            "rtf" => Ok(Self::Rtf),
            other => Err(ExtractError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    /// Detect the kind from a file name or path.
    pub fn from_path(path: &Utf8Path) -> ExtractResult<Self> {
        Self::from_extension(path.extension().unwrap_or_default())
    }

    /// Returns the kind as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Docx => "docx",
            Self::Rtf => "rtf",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased extension of `path` without the dot, or `""`.
pub fn extension_label(path: &Utf8Path) -> String {
    path.extension().unwrap_or_default().to_ascii_lowercase()
}

/// Decode raw bytes of the given kind into analyzable text.
pub fn extract_bytes(kind: SourceKind, bytes: &[u8]) -> ExtractResult<String> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptyFile);
    }
    match kind {
        SourceKind::Text => decode_utf8(bytes).map(str::to_string),
        SourceKind::Markdown => decode_utf8(bytes).map(markdown::to_plain_lines),
        SourceKind::Html => decode_utf8(bytes).map(html_to_text),
        SourceKind::Docx => docx_to_text(bytes),
        SourceKind::Rtf => decode_utf8(bytes).and_then(rtf_to_text),
    }
}

/// UTF-8 content with any byte order mark removed.
fn decode_utf8(bytes: &[u8]) -> ExtractResult<&str> {
    let content = std::str::from_utf8(bytes).map_err(|_| ExtractError::InvalidUtf8)?;
    Ok(content.strip_prefix('\u{feff}').unwrap_or(content))
}

fn malformed(format: &'static str, err: impl fmt::Display) -> ExtractError {
    ExtractError::Malformed {
        format,
        message: err.to_string(),
    }
}

/// Read and extract a file.
///
/// The kind comes from the extension. When `max_chars` is set, files too
/// large to possibly fit (more than four bytes per allowed character) are
/// rejected before being read.
#[tracing::instrument(skip(max_chars), fields(path = %path))]
pub fn read_source(path: &Utf8Path, max_chars: Option<usize>) -> ExtractResult<String> {
    let kind = SourceKind::from_path(path)?;

    // Preflight: check file size via metadata before reading into memory.
    let metadata = std::fs::metadata(path.as_std_path()).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(limit) = max_chars {
        let bytes = metadata.len();
        if bytes > (limit as u64).saturating_mul(4) {
            return Err(ExtractError::TooLarge { bytes, limit });
        }
    }

    let bytes = std::fs::read(path.as_std_path()).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(kind = %kind, bytes = bytes.len(), "source read");
    extract_bytes(kind, &bytes)
}

/// Strip markup from HTML, keeping the text and its line breaks.
///
/// Comments, `<script>` and `<style>` content are dropped; the remaining
/// tags are removed without inserting separators.
pub fn html_to_text(html: &str) -> String {
    let without_comments = HTML_COMMENT.replace_all(html, "");
    let without_raw = HTML_RAW_TEXT.replace_all(&without_comments, "");
    let without_tags = HTML_TAG.replace_all(&without_raw, "");
    decode_entities(&without_tags).into_owned()
}

/// Text of a Word document, one line per paragraph.
///
/// Reads `word/document.xml` from the package. Text runs are joined as-is,
/// tabs become spaces and explicit breaks start a new line.
pub fn docx_to_text(bytes: &[u8]) -> ExtractResult<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| malformed("docx", e))?;
    let mut part = archive
        .by_name("word/document.xml")
        .map_err(|e| malformed("docx", e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| malformed("docx", e))?;
    wordml_to_text(&xml)
}

fn wordml_to_text(xml: &str) -> ExtractResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| malformed("docx", e))? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => out.push(' '),
                // An empty paragraph still occupies a line.
                b"br" | b"cr" | b"p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| malformed("docx", e))?;
                out.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    Ok(out)
}

/// Plain text of an RTF document.
pub fn rtf_to_text(content: &str) -> ExtractResult<String> {
    let is_rtf = content
        .trim_start()
        .strip_prefix('{')
        .is_some_and(|rest| rest.trim_start().starts_with("\\rtf"));
    if !is_rtf {
        return Err(malformed("rtf", "missing {\\rtf header"));
    }
    let document = RtfDocument::try_from(content).map_err(|e| malformed("rtf", e))?;
    Ok(document.get_text())
}

fn decode_entities(text: &str) -> Cow<'_, str> {
    HTML_ENTITY.replace_all(text, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        decode_entity(name).map_or_else(|| caps[0].to_string(), |ch| ch.to_string())
    })
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "rsquo" | "lsquo" => Some('\''),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn detects_kind_from_extension() {
        assert_eq!(SourceKind::from_extension("txt").unwrap(), SourceKind::Text);
        assert_eq!(SourceKind::from_extension("MD").unwrap(), SourceKind::Markdown);
        assert_eq!(SourceKind::from_extension("htm").unwrap(), SourceKind::Html);
        assert_eq!(SourceKind::from_extension("DOCX").unwrap(), SourceKind::Docx);
        assert_eq!(SourceKind::from_extension("rtf").unwrap(), SourceKind::Rtf);
        assert_eq!(
            SourceKind::from_path(Utf8Path::new("notes/page.HTML")).unwrap(),
            SourceKind::Html
        );
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = SourceKind::from_extension("pptx").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat { ref extension } if extension == "pptx"));
        assert!(err.to_string().contains("unsupported file type"));
        assert!(SourceKind::from_path(Utf8Path::new("README")).is_err());
    }

    #[test]
    fn text_strips_bom() {
        assert_eq!(
            extract_bytes(SourceKind::Text, "\u{feff}Hello".as_bytes()).unwrap(),
            "Hello"
        );
    }

    #[test]
    fn html_strips_tags_and_scripts() {
        let html = "<html><head><style>p { color: red; }</style>\
                    <script type=\"text/javascript\">var x = 1;</script></head>\
                    <body><!-- hidden note --><p>Fish &amp; chips</p>\n<p>Line&nbsp;two &#39;ok&#x27;</p></body></html>";
        let text = html_to_text(html);
        assert_eq!(text, "Fish & chips\nLine two 'ok'");
    }

    #[test]
    fn unknown_entities_are_kept() {
        assert_eq!(html_to_text("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn extract_bytes_rejects_bad_input() {
        assert!(matches!(
            extract_bytes(SourceKind::Text, b""),
            Err(ExtractError::EmptyFile)
        ));
        assert!(matches!(
            extract_bytes(SourceKind::Text, &[0xff, 0xfe, 0x00]),
            Err(ExtractError::InvalidUtf8)
        ));
    }

    #[test]
    fn read_source_reads_markdown() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("doc.md")).unwrap();
        std::fs::write(&path, "# Title\n\nBody text here.").unwrap();

        let text = read_source(&path, None).unwrap();
        assert_eq!(text, "Title\nBody text here.");
    }

    #[test]
    fn read_source_preflights_size() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("big.txt")).unwrap();
        std::fs::write(&path, "x".repeat(100)).unwrap();

        let err = read_source(&path, Some(10)).unwrap_err();
        assert!(matches!(err, ExtractError::TooLarge { bytes: 100, limit: 10 }));
        assert!(read_source(&path, Some(25)).is_ok());
    }

    #[test]
    fn read_source_missing_file() {
        let err = read_source(Utf8Path::new("/definitely/not/here.txt"), None).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    const CAT_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>The cat sat on the old </w:t></w:r><w:r><w:t xml:space="preserve">wooden mat quietly.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Something else happened here today.</w:t></w:r></w:p>
    <w:p><w:r><w:t>The cat sat on the old wooden mat quietly.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        use std::io::Write;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn read_source_reads_docx() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("story.docx")).unwrap();
        std::fs::write(&path, docx_bytes(CAT_DOCUMENT)).unwrap();

        let text = read_source(&path, None).unwrap();
        assert_eq!(
            text,
            "The cat sat on the old wooden mat quietly.\n\
             Something else happened here today.\n\
             The cat sat on the old wooden mat quietly."
        );
        let report = crate::analysis::analyze(&text);
        assert_eq!(report.sentences[0].lines, vec![1, 3]);
        assert_eq!(report.total_repeated, 24);
    }

    #[test]
    fn docx_tabs_breaks_and_empty_paragraphs() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:r><w:t>Fish &amp; chips</w:t><w:tab/><w:t>tonight</w:t><w:br/><w:t>again</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:r><w:instrText>PAGE</w:instrText><w:t>Last</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(
            extract_bytes(SourceKind::Docx, &docx_bytes(xml)).unwrap(),
            "Fish & chips tonight\nagain\n\nLast"
        );
    }

    #[test]
    fn corrupt_docx_is_an_error() {
        let err = extract_bytes(SourceKind::Docx, b"this is not a zip archive").unwrap_err();
        assert!(matches!(err, ExtractError::Malformed { format: "docx", .. }));
        assert!(err.to_string().contains("could not read docx document"));

        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("broken.docx")).unwrap();
        std::fs::write(&path, [0x50, 0x4b, 0x03, 0x04, 0xde, 0xad]).unwrap();
        assert!(matches!(
            read_source(&path, None),
            Err(ExtractError::Malformed { format: "docx", .. })
        ));
    }

    #[test]
    fn docx_without_document_part_is_an_error() {
        use std::io::Write;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("notes.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            extract_bytes(SourceKind::Docx, &bytes),
            Err(ExtractError::Malformed { format: "docx", .. })
        ));
    }

    #[test]
    fn read_source_reads_rtf() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("letter.rtf")).unwrap();
        std::fs::write(
            &path,
            r"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard The cat sat on the old wooden mat quietly.\par}",
        )
        .unwrap();

        let text = read_source(&path, None).unwrap();
        assert!(text.contains("The cat sat on the old wooden mat quietly."));
        assert!(!text.contains("\\pard"));
    }

    #[test]
    fn rtf_without_header_is_an_error() {
        let err = extract_bytes(SourceKind::Rtf, b"Just plain text.").unwrap_err();
        assert!(matches!(err, ExtractError::Malformed { format: "rtf", .. }));
        assert!(err.to_string().contains("could not read rtf document"));
        assert!(matches!(
            extract_bytes(SourceKind::Rtf, &[0xff, 0xfe]),
            Err(ExtractError::InvalidUtf8)
        ));
    }

    #[test]
    fn extension_label_lowercases() {
        assert_eq!(extension_label(Utf8Path::new("a/B.TXT")), "txt");
        assert_eq!(extension_label(Utf8Path::new("Makefile")), "");
    }
}
