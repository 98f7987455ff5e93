//! Markdown processing utilities.
//!
//! Uses pulldown-cmark for proper CommonMark parsing rather than regex-based
//! stripping. Unlike a flat prose dump, the output keeps one line per block
//! and per source line break, so line numbers in repetition reports still
//! point at something meaningful.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Convert markdown to plain text lines.
///
/// Removes:
/// - Code blocks (fenced and indented)
/// - HTML blocks and inline HTML
/// - YAML frontmatter
/// - Image alt text
/// - Emphasis, link and table markup
///
/// Keeps:
/// - Paragraph, heading, list item and blockquote text
/// - Inline code text (it is part of the sentence)
/// - Link text (the visible part)
/// - Table cells, one row per line
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn to_plain_lines(text: &str) -> String {
    // Handle YAML frontmatter before parsing (pulldown-cmark doesn't know about it)
    let text = strip_frontmatter(text);

    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(text, options);

    let mut result = String::with_capacity(text.len());
    let mut skip_depth: usize = 0;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::Image { .. } | Tag::HtmlBlock) => {
                skip_depth += 1;
            }
            Event::End(TagEnd::CodeBlock | TagEnd::Image | TagEnd::HtmlBlock) => {
                skip_depth = skip_depth.saturating_sub(1);
            }

            // Containers start on a fresh line so nested items stay separate.
            Event::Start(
                Tag::List(_) | Tag::Item | Tag::BlockQuote(_) | Tag::FootnoteDefinition(_),
            ) if skip_depth == 0 => {
                end_line(&mut result);
            }

            Event::Text(t) | Event::Code(t) if skip_depth == 0 => {
                result.push_str(&t);
            }
            Event::SoftBreak | Event::HardBreak if skip_depth == 0 => {
                end_line(&mut result);
            }

            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::TableHead
                | TagEnd::TableRow,
            ) if skip_depth == 0 => {
                end_line(&mut result);
            }
            Event::End(TagEnd::TableCell) if skip_depth == 0 => {
                result.push(' ');
            }

            _ => {}
        }
    }

    let trimmed_len = result.trim_end().len();
    result.truncate(trimmed_len);
    result
}

/// Terminate the current line unless it is already terminated.
fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Strip YAML frontmatter delimited by `---` lines.
fn strip_frontmatter(text: &str) -> &str {
    let trimmed = text.trim_start();
    if !trimmed.starts_with("---") {
        return text;
    }

    // Find the closing `---`
    let after_opening = &trimmed[3..];
    let Some(close_pos) = after_opening.find("\n---") else {
        return text;
    };

    // Skip past the closing `---` and its newline
    let remainder = &after_opening[close_pos + 4..];
    remainder.strip_prefix('\n').unwrap_or(remainder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_code_blocks() {
        let input = "Some text.\n\n```rust\nlet x = 1;\n```\n\nMore text.";
        let result = to_plain_lines(input);
        assert!(!result.contains("let x"));
        assert_eq!(result, "Some text.\nMore text.");
    }

    #[test]
    fn removes_frontmatter() {
        let input = "---\nstatus: accepted\ndate: 2026-02-07\n---\n\nSome text.";
        let result = to_plain_lines(input);
        assert!(!result.contains("status"));
        assert_eq!(result, "Some text.");
    }

    #[test]
    fn keeps_headings_on_their_own_lines() {
        let input = "# Header\n\nSome text.\n\n## Subheader\n\nMore text.";
        let result = to_plain_lines(input);
        assert_eq!(result, "Header\nSome text.\nSubheader\nMore text.");
    }

    #[test]
    fn soft_breaks_become_lines() {
        let input = "First line of a paragraph\nsecond line of it.";
        assert_eq!(
            to_plain_lines(input),
            "First line of a paragraph\nsecond line of it."
        );
    }

    #[test]
    fn preserves_link_text() {
        let input = "Check [this link](https://example.com) for details.";
        let result = to_plain_lines(input);
        assert_eq!(result, "Check this link for details.");
    }

    #[test]
    fn keeps_inline_code_text() {
        let input = "Use `foo()` to do things.";
        assert_eq!(to_plain_lines(input), "Use foo() to do things.");
    }

    #[test]
    fn removes_emphasis_markers() {
        let input = "This is **bold** and *italic* text.";
        assert_eq!(to_plain_lines(input), "This is bold and italic text.");
    }

    #[test]
    fn list_items_are_lines() {
        let input = "- first item here\n- second item here\n";
        assert_eq!(to_plain_lines(input), "first item here\nsecond item here");
    }

    #[test]
    fn nested_list_items_are_separate_lines() {
        let input = "- The cat sat on the old wooden mat quietly.\n  - The cat sat on the old wooden mat quietly.\n";
        let result = to_plain_lines(input);
        assert_eq!(
            result,
            "The cat sat on the old wooden mat quietly.\nThe cat sat on the old wooden mat quietly."
        );

        let report = crate::analysis::analyze(&result);
        assert_eq!(report.sentences.len(), 1);
        assert_eq!(report.sentences[0].lines, vec![1, 2]);
        assert_eq!(report.total_repeated, 24);
    }

    #[test]
    fn blockquote_inside_item_starts_new_line() {
        let input = "- Item text here\n\n  > Quoted text here\n";
        assert_eq!(to_plain_lines(input), "Item text here\nQuoted text here");
    }

    #[test]
    fn table_rows_are_lines() {
        let input = "Text before.\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\nText after.";
        let result = to_plain_lines(input);
        assert!(result.starts_with("Text before.\n"));
        assert!(result.ends_with("\nText after."));
        assert_eq!(result.lines().count(), 4);
    }

    #[test]
    fn drops_image_alt_text() {
        let input = "Look ![a diagram](d.png) here.";
        assert_eq!(to_plain_lines(input), "Look  here.");
    }

    #[test]
    fn preserves_blockquote_text() {
        let input = "> This is a quote.\n\nRegular text.";
        assert_eq!(to_plain_lines(input), "This is a quote.\nRegular text.");
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(to_plain_lines("").is_empty());
    }
}
