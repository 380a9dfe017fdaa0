//! Comment Ranges
//!
//! Original comments are not part of the tree: they ride along in the trivia
//! in front of (or behind) a node's first token. These helpers scan the raw
//! source buffer to find them, the same way the renderer finds the gap text
//! it copies verbatim.

use serde::{Deserialize, Serialize};

/// Kind of comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKind {
    SingleLine, // // comment
    MultiLine,  // /* comment */
}

/// A comment in the source text, as a half-open byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRange {
    pub pos: u32,
    pub end: u32,
    pub kind: CommentKind,
    /// Whether a line break follows the comment before the next token.
    pub has_trailing_newline: bool,
}

impl CommentRange {
    /// Get the comment text from source.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        let start = self.pos as usize;
        let end = self.end as usize;
        if end <= source.len() && start < end {
            &source[start..end]
        } else {
            ""
        }
    }

    /// Whether this is a `/** ... */` documentation comment.
    pub fn is_jsdoc(&self, source: &str) -> bool {
        self.kind == CommentKind::MultiLine && is_jsdoc_text(self.text(source))
    }
}

/// Check whether raw comment text is a JSDoc comment.
///
/// `/**/` is an empty block comment and `/*** ... */` is a banner, neither
/// is documentation.
pub fn is_jsdoc_text(text: &str) -> bool {
    text.len() >= 5 && text.starts_with("/**") && !text.starts_with("/***") && text.ends_with("*/")
}

/// Check if a character is a line break.
fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r' || ch == '\u{2028}' || ch == '\u{2029}'
}

/// Check if a character is whitespace (but not a line break).
fn is_whitespace_single_line(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\u{000B}' || ch == '\u{000C}' || ch == '\u{FEFF}'
}

/// UTF-8 safe helper to get the character at a byte position.
fn char_at(text: &str, pos: usize) -> Option<char> {
    text.get(pos..).and_then(|rest| rest.chars().next())
}

/// Scan a `/* ... */` comment starting at `start` (which points at `/`).
/// Returns the end offset and whether the comment spans a line break.
/// Unclosed comments run to the end of the text.
fn scan_multi_line(text: &str, start: usize) -> (usize, bool) {
    let body_start = start + 2;
    let body = text.as_bytes().get(body_start..).unwrap_or(&[]);
    let end = match memchr::memmem::find(body, b"*/") {
        Some(offset) => body_start + offset + 2,
        None => text.len(),
    };
    let spans_lines = text[start..end].chars().any(is_line_break);
    (end, spans_lines)
}

/// Scan a `// ...` comment starting at `start`; returns the end offset
/// (exclusive of the line break).
fn scan_single_line(text: &str, start: usize) -> usize {
    let mut i = start + 2;
    while let Some(c) = char_at(text, i) {
        if is_line_break(c) {
            break;
        }
        i += c.len_utf8();
    }
    i
}

/// Skip whitespace and comments forward from `pos`, returning the offset of
/// the first token character (or the end of the text).
///
/// A shebang line is treated as trivia when it starts the file.
pub fn skip_trivia(text: &str, pos: usize) -> usize {
    let len = text.len();
    let mut i = pos.min(len);

    if i == 0 && text.starts_with("#!") {
        i = scan_single_line(text, 0);
    }

    while let Some(ch) = char_at(text, i) {
        if is_whitespace_single_line(ch) || is_line_break(ch) {
            i += ch.len_utf8();
            continue;
        }
        if ch == '/' && i + 1 < len {
            match text.as_bytes()[i + 1] {
                b'/' => {
                    i = scan_single_line(text, i);
                    continue;
                }
                b'*' => {
                    i = scan_multi_line(text, i).0;
                    continue;
                }
                _ => {}
            }
        }
        break;
    }
    i
}

/// Get leading comments starting at `pos`: every comment between `pos` and
/// the next token, possibly on preceding lines.
pub fn get_leading_comment_ranges(text: &str, pos: usize) -> Vec<CommentRange> {
    let mut comments = Vec::new();
    let len = text.len();
    let mut i = pos.min(len);

    // Skip shebang at the start of file
    if i == 0 && text.starts_with("#!") {
        i = scan_single_line(text, 0);
    }

    let mut pending: Option<CommentRange> = None;

    while let Some(ch) = char_at(text, i) {
        if is_whitespace_single_line(ch) {
            i += ch.len_utf8();
            continue;
        }

        // Line breaks mark comment boundaries
        if is_line_break(ch) {
            i += ch.len_utf8();
            if ch == '\r' && text.as_bytes().get(i) == Some(&b'\n') {
                i += 1;
            }
            if let Some(mut p) = pending.take() {
                p.has_trailing_newline = true;
                comments.push(p);
            }
            continue;
        }

        if ch == '/' && i + 1 < len {
            let next_byte = text.as_bytes()[i + 1];
            if next_byte == b'/' || next_byte == b'*' {
                if let Some(p) = pending.take() {
                    comments.push(p);
                }
                let start = i;
                let kind = if next_byte == b'/' {
                    i = scan_single_line(text, start);
                    CommentKind::SingleLine
                } else {
                    i = scan_multi_line(text, start).0;
                    CommentKind::MultiLine
                };
                pending = Some(CommentRange {
                    pos: start as u32,
                    end: i as u32,
                    kind,
                    has_trailing_newline: false,
                });
                continue;
            }
        }

        // Non-whitespace, non-comment: the token starts here
        break;
    }

    if let Some(p) = pending {
        comments.push(p);
    }

    comments
}

/// Get trailing comments starting at `pos`: comments on the same line after
/// a token, before the next line break.
pub fn get_trailing_comment_ranges(text: &str, pos: usize) -> Vec<CommentRange> {
    let mut comments = Vec::new();
    let len = text.len();
    let mut i = pos.min(len);

    while let Some(ch) = char_at(text, i) {
        if is_whitespace_single_line(ch) {
            i += ch.len_utf8();
            continue;
        }
        if is_line_break(ch) {
            break;
        }
        if ch == '/' && i + 1 < len {
            let next_byte = text.as_bytes()[i + 1];
            if next_byte == b'/' {
                let start = i;
                i = scan_single_line(text, start);
                comments.push(CommentRange {
                    pos: start as u32,
                    end: i as u32,
                    kind: CommentKind::SingleLine,
                    has_trailing_newline: i < len,
                });
                continue;
            } else if next_byte == b'*' {
                let start = i;
                let (end, spans_lines) = scan_multi_line(text, start);
                i = end;
                comments.push(CommentRange {
                    pos: start as u32,
                    end: end as u32,
                    kind: CommentKind::MultiLine,
                    has_trailing_newline: spans_lines,
                });
                // A multi-line comment that spans lines ends the trailing run
                if spans_lines {
                    break;
                }
                continue;
            }
        }
        break;
    }

    comments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_trivia_skips_comments_and_whitespace() {
        let text = "  // one\n /* two */\n  let x;";
        assert_eq!(&text[skip_trivia(text, 0)..], "let x;");
    }

    #[test]
    fn test_skip_trivia_no_trivia() {
        assert_eq!(skip_trivia("abc", 0), 0);
        assert_eq!(skip_trivia("abc", 3), 3);
    }

    #[test]
    fn test_skip_trivia_shebang() {
        let text = "#!/usr/bin/env node\nfoo();";
        assert_eq!(&text[skip_trivia(text, 0)..], "foo();");
    }

    #[test]
    fn test_leading_comment_ranges() {
        let text = "/** @fileoverview x */\n// note\nlet a;";
        let ranges = get_leading_comment_ranges(text, 0);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].text(text), "/** @fileoverview x */");
        assert!(ranges[0].is_jsdoc(text));
        assert!(ranges[0].has_trailing_newline);
        assert_eq!(ranges[1].text(text), "// note");
        assert_eq!(ranges[1].kind, CommentKind::SingleLine);
    }

    #[test]
    fn test_leading_comment_same_line() {
        let text = "/* a */ /* b */ x";
        let ranges = get_leading_comment_ranges(text, 0);
        assert_eq!(ranges.len(), 2);
        assert!(!ranges[0].has_trailing_newline);
        assert_eq!(ranges[1].text(text), "/* b */");
    }

    #[test]
    fn test_trailing_comment_ranges_stop_at_newline() {
        let text = "x; // tail\n// next line";
        let ranges = get_trailing_comment_ranges(text, 2);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].text(text), "// tail");
    }

    #[test]
    fn test_unclosed_comment_runs_to_end() {
        let text = "/* never closed";
        let ranges = get_leading_comment_ranges(text, 0);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].end as usize, text.len());
    }

    #[test]
    fn test_is_jsdoc_text() {
        assert!(is_jsdoc_text("/** doc */"));
        assert!(!is_jsdoc_text("/* plain */"));
        assert!(!is_jsdoc_text("/**/"));
        assert!(!is_jsdoc_text("/*** banner */"));
    }
}
