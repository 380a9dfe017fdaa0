//! JSDoc Comment Model
//!
//! A documentation comment is an ordered list of [`Tag`]s. Parsing is
//! tolerant: text that is not a `/** ... */` comment yields `None`, and tags
//! that would restate information the type checker already knows are dropped
//! with a warning instead of failing.
//!
//! Serialization is the right inverse of parsing: `parse(serialize(tags))`
//! returns `tags` for any tag list produced by [`parse`].

use crate::comments::is_jsdoc_text;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Tags that only restate what the static types already say. They are
/// removed from parsed comments and reported as redundant.
pub const REDUNDANT_TAGS: &[&str] = &[
    "augments",
    "class",
    "constructs",
    "constructor",
    "enum",
    "extends",
    "field",
    "function",
    "implements",
    "interface",
    "lends",
    "namespace",
    "private",
    "protected",
    "public",
    "record",
    "static",
    "template",
    "this",
    "type",
    "typedef",
];

/// Tags that take an inline `{type}` payload. Closurize derives those types
/// from the checker, so a hand-written payload is dropped.
pub const TYPED_TAGS: &[&str] = &["const", "define", "export", "param", "return"];

/// Tags marking a comment as the file-level overview comment.
pub const FILEOVERVIEW_MARKERS: &[&str] = &["fileoverview", "externs", "modName", "mods", "pintomodule"];

/// One directive within a documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name without `@`; `None` for the leading free-text block.
    pub tag_name: Option<String>,
    /// Parameter name (`@param` only).
    pub parameter_name: Option<String>,
    /// Type payload, written as `{type}`.
    pub type_expr: Option<String>,
    /// Optional parameter, written as `{type=}`.
    pub optional: bool,
    /// Rest parameter, written as `{...type}`.
    pub rest: bool,
    /// Destructured parameter (the name is synthesized by the caller).
    pub destructuring: bool,
    /// Free text following the tag.
    pub text: Option<String>,
}

impl Tag {
    /// Create a tag with just a name.
    pub fn named(name: &str) -> Tag {
        Tag {
            tag_name: Some(name.to_string()),
            ..Tag::default()
        }
    }

    /// Create a tag with a name and a `{type}` payload.
    pub fn typed(name: &str, type_expr: &str) -> Tag {
        Tag {
            tag_name: Some(name.to_string()),
            type_expr: Some(type_expr.to_string()),
            ..Tag::default()
        }
    }

    /// Builder: attach free text.
    pub fn with_text(mut self, text: &str) -> Tag {
        self.text = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        self
    }

    /// Builder: attach a parameter name.
    pub fn with_parameter(mut self, name: &str) -> Tag {
        self.parameter_name = Some(name.to_string());
        self
    }

    pub fn name(&self) -> &str {
        self.tag_name.as_deref().unwrap_or("")
    }

    pub fn is(&self, name: &str) -> bool {
        self.tag_name.as_deref() == Some(name)
    }
}

/// Result of parsing a documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComment {
    pub tags: Vec<Tag>,
    /// Non-fatal findings, e.g. redundant tags that were dropped.
    pub warnings: Vec<String>,
}

impl ParsedComment {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.is(name))
    }

    /// Whether this comment carries one of the fileoverview markers.
    pub fn is_fileoverview(&self) -> bool {
        self.tags
            .iter()
            .any(|t| FILEOVERVIEW_MARKERS.contains(&t.name()))
    }
}

/// Parse raw comment text (including delimiters).
///
/// Returns `None` for anything that is not a `/** ... */` comment, so callers
/// can feed every comment they find through here.
pub fn parse(text: &str) -> Option<ParsedComment> {
    if !is_jsdoc_text(text) {
        return None;
    }
    Some(parse_contents(&text[3..text.len() - 2]))
}

/// Parse the body of a documentation comment (without `/**` and `*/`).
pub fn parse_contents(body: &str) -> ParsedComment {
    let mut parsed = ParsedComment::default();
    // Continuation lines of a dropped tag are dropped with it.
    let mut skipping = false;

    for line in clean_lines(body) {
        if let Some((raw_name, rest)) = split_tag_line(line) {
            skipping = false;
            let name = if raw_name == "returns" { "return" } else { raw_name };
            let mut text = rest.to_string();
            let mut type_expr = None;

            if REDUNDANT_TAGS.contains(&name) {
                parsed.warnings.push(format!(
                    "@{name} annotations are redundant with TypeScript equivalents"
                ));
                skipping = true;
                continue;
            } else if TYPED_TAGS.contains(&name) {
                if let Some((_, remainder)) = split_braced(&text) {
                    parsed.warnings.push(format!(
                        "the type annotation on @{name} is redundant with its TypeScript type, remove the {{...}} part"
                    ));
                    text = remainder.trim_start().to_string();
                }
            } else if name == "suppress" {
                match split_braced(&text) {
                    Some((inner, remainder)) => {
                        type_expr = Some(inner.to_string());
                        text = remainder.trim_start().to_string();
                    }
                    None => parsed
                        .warnings
                        .push(format!("malformed @{name} tag: \"{text}\"")),
                }
            }

            let mut tag = Tag::named(name);
            if name == "param" {
                let (param, remainder) = match text.split_once(char::is_whitespace) {
                    Some((param, remainder)) => (param.to_string(), remainder.to_string()),
                    None => (text.clone(), String::new()),
                };
                if !param.is_empty() {
                    tag.parameter_name = Some(param);
                }
                text = remainder;
            }
            tag.type_expr = type_expr;
            tag.text = non_empty(text);
            parsed.tags.push(tag);
        } else if skipping {
            continue;
        } else if let Some(last) = parsed.tags.last_mut() {
            let mut text = last.text.take().unwrap_or_default();
            text.push('\n');
            text.push_str(line);
            last.text = Some(text);
        } else {
            parsed.tags.push(Tag {
                text: Some(line.to_string()),
                ..Tag::default()
            });
        }
    }

    for tag in &mut parsed.tags {
        tag.text = tag.text.take().and_then(|t| non_empty(t.trim_end().to_string()));
    }
    parsed
}

/// Strip comment decoration (leading whitespace, one `*`, one space) from
/// every line and drop blank lines at either end.
fn clean_lines(body: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = body
        .split('\n')
        .map(|line| {
            let line = line.trim_end();
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line)
        })
        .collect();
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Split `@name rest` into its parts, or `None` if the line is not a tag.
fn split_tag_line(line: &str) -> Option<(&str, &str)> {
    let after_at = line.trim_start().strip_prefix('@')?;
    let name_end = after_at
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(after_at.len());
    if name_end == 0 {
        return None;
    }
    let (name, rest) = after_at.split_at(name_end);
    Some((name, rest.trim_start_matches(' ')))
}

/// Split a leading `{...}` group (brace-balanced) from `text`.
fn split_braced(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[1..i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Render one tag as it appears after the ` *` line prefix.
fn tag_to_string(tag: &Tag) -> String {
    let mut out = String::new();
    if let Some(name) = &tag.tag_name {
        out.push_str(" @");
        out.push_str(name);
    }
    if let Some(type_expr) = &tag.type_expr {
        out.push_str(" {");
        if tag.rest {
            out.push_str("...");
        }
        out.push_str(type_expr);
        if tag.optional {
            out.push('=');
        }
        out.push('}');
    }
    if let Some(param) = &tag.parameter_name {
        out.push(' ');
        out.push_str(param);
    }
    if let Some(text) = &tag.text {
        out.push(' ');
        out.push_str(text);
    }
    out
}

/// Serialize the body of a comment: everything between `/*` and `*/`.
///
/// A single tag without line breaks stays on one line (`* @this {Foo} `);
/// anything else gets one ` * ` line per tag. Exact duplicate tags are
/// emitted once.
fn serialize_body(tags: &[Tag]) -> String {
    if let [tag] = tags {
        let line = tag_to_string(tag);
        if !line.contains('\n') {
            return format!("*{line} ");
        }
    }
    let mut out = String::from("*\n");
    let mut emitted: FxHashSet<&Tag> = FxHashSet::default();
    for tag in tags {
        if !emitted.insert(tag) {
            continue;
        }
        out.push_str(" *");
        out.push_str(&tag_to_string(tag).replace('\n', "\n * "));
        out.push('\n');
    }
    out.push(' ');
    out
}

/// Serialize tags into a complete `/** ... */` comment.
pub fn serialize(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    format!("/*{}*/", serialize_body(tags))
}

/// Serialize tags into synthesized-comment text: the comment body without
/// the `/*` and `*/` delimiters, which the renderer adds back.
pub fn serialize_synthesized(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    serialize_body(tags)
}

/// Ensure a `@suppress {...}` tag exists and lists every value in
/// `suppressions`. Existing values are kept in order; missing values are
/// appended. Returns whether the tags changed.
pub fn add_suppressions(tags: &mut Vec<Tag>, suppressions: &[String], default_text: &str) -> bool {
    let tag = match tags.iter().position(|t| t.is("suppress")) {
        Some(index) => &mut tags[index],
        None => {
            tags.push(Tag::named("suppress").with_text(default_text));
            let last = tags.len() - 1;
            &mut tags[last]
        }
    };

    let mut values: Vec<String> = tag
        .type_expr
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let before = values.len();
    for suppression in suppressions {
        if !values.iter().any(|v| v == suppression) {
            values.push(suppression.clone());
        }
    }
    let joined = values.join(",");
    let changed = values.len() != before || tag.type_expr.as_deref() != Some(joined.as_str());
    tag.type_expr = Some(joined);
    changed
}
