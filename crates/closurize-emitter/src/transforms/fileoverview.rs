//! Fileoverview merger.
//!
//! Closure reads file-level directives from the file's `@fileoverview`
//! comment. This pass makes sure that comment exists and that its
//! `@suppress {...}` list carries the configured suppressions, keeping every
//! value that is already there.

use super::{FileTransform, RewritePass};
use crate::transform_context::{SynthesizedComment, TransformContext};
use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree};
use closurize_common::comments::{self, CommentRange};
use closurize_common::diagnostics::diagnostic_codes;
use closurize_common::jsdoc::{self, Tag};
use closurize_common::Diagnostic;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileoverviewOptions {
    /// Values that must appear in `@suppress {...}`.
    pub suppressions: Vec<String>,
    /// Text of a newly created `@fileoverview` tag.
    pub overview_text: String,
    /// Text of a newly created `@suppress` tag.
    pub suppress_text: String,
}

impl Default for FileoverviewOptions {
    fn default() -> Self {
        FileoverviewOptions {
            suppressions: vec!["checkTypes".to_string()],
            overview_text: "added by closurize".to_string(),
            suppress_text: "checked by tsc".to_string(),
        }
    }
}

/// Where a file-level comment lives.
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// `ctx.leading_comments(owner)[index]`
    Synthesized { owner: NodeIndex, index: usize },
    /// Original comment text, possibly already replaced by an earlier pass.
    Source(CommentRange),
}

struct FileComment {
    slot: Slot,
    text: String,
}

impl FileComment {
    fn pos(&self) -> u32 {
        match self.slot {
            Slot::Synthesized { .. } => 0,
            Slot::Source(range) => range.pos,
        }
    }

    fn len(&self) -> u32 {
        match self.slot {
            Slot::Synthesized { .. } => 0,
            Slot::Source(range) => range.end - range.pos,
        }
    }
}

pub struct FileoverviewMerger {
    options: FileoverviewOptions,
}

impl FileoverviewMerger {
    pub fn new(options: FileoverviewOptions) -> Self {
        FileoverviewMerger { options }
    }

    pub fn options(&self) -> &FileoverviewOptions {
        &self.options
    }

    /// Comments at the top of the file, in output order: a placeholder
    /// statement's comments, the original comments before the first
    /// statement, then comments synthesized onto the first statement.
    fn file_comments(tree: &SyntaxTree, ctx: &TransformContext) -> Vec<FileComment> {
        let mut found = Vec::new();
        let synthesized = |owner: NodeIndex, found: &mut Vec<FileComment>| {
            for (index, comment) in ctx.leading_comments(owner).iter().enumerate() {
                found.push(FileComment {
                    slot: Slot::Synthesized { owner, index },
                    text: comment.to_source(),
                });
            }
        };

        for &placeholder in ctx.prepended(tree.root) {
            if tree.kind(placeholder) == SyntaxKind::NotEmittedStatement {
                synthesized(placeholder, &mut found);
            }
        }

        let first = tree.statements().first().copied();
        let limit = first.map_or(tree.text().len() as u32, |s| tree.token_start(s));
        for range in comments::get_leading_comment_ranges(tree.text(), 0) {
            if range.end > limit {
                break;
            }
            let text = ctx
                .replacement(range.pos, range.end)
                .unwrap_or_else(|| range.text(tree.text()));
            found.push(FileComment {
                slot: Slot::Source(range),
                text: text.to_string(),
            });
        }

        if let Some(first) = first {
            synthesized(first, &mut found);
        }
        found
    }

    fn create_overview(&self, file: &mut FileTransform<'_>) {
        let root = file.tree.root;
        let existing = file
            .ctx
            .prepended(root)
            .iter()
            .copied()
            .find(|&s| file.tree.kind(s) == SyntaxKind::NotEmittedStatement);
        let placeholder = match existing {
            Some(placeholder) => placeholder,
            None => {
                let placeholder = file
                    .tree
                    .add_synthetic(SyntaxKind::NotEmittedStatement, None, Vec::new());
                file.ctx.prepend_statement(root, placeholder);
                placeholder
            }
        };

        let mut tags = vec![Tag::named("fileoverview").with_text(&self.options.overview_text)];
        jsdoc::add_suppressions(&mut tags, &self.options.suppressions, &self.options.suppress_text);
        debug!("adding fileoverview comment");
        file.ctx
            .add_leading_comment(placeholder, SynthesizedComment::jsdoc(&tags, true));
    }
}

impl Default for FileoverviewMerger {
    fn default() -> Self {
        Self::new(FileoverviewOptions::default())
    }
}

impl RewritePass for FileoverviewMerger {
    fn name(&self) -> &'static str {
        "fileoverview"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.tree.file_name))]
    fn run(&self, file: &mut FileTransform<'_>) {
        let candidates = Self::file_comments(file.tree, file.ctx);

        // The last overview comment wins, as in Closure itself.
        let mut found = None;
        for (i, candidate) in candidates.iter().enumerate().rev() {
            if let Some(parsed) = jsdoc::parse(&candidate.text) {
                if parsed.is_fileoverview() {
                    found = Some((i, parsed));
                    break;
                }
            }
        }

        let Some((chosen, parsed)) = found else {
            self.create_overview(file);
            return;
        };

        for earlier in &candidates[..chosen] {
            if jsdoc::parse(&earlier.text).is_some_and(|p| p.is_fileoverview()) {
                file.diagnostics.push(Diagnostic::warning(
                    file.tree.file_name.clone(),
                    earlier.pos(),
                    earlier.len(),
                    "duplicate file level comment",
                    diagnostic_codes::DUPLICATE_FILEOVERVIEW,
                ));
            }
        }

        let candidate = &candidates[chosen];
        let mut tags = parsed.tags;
        if !jsdoc::add_suppressions(&mut tags, &self.options.suppressions, &self.options.suppress_text) {
            trace!("fileoverview comment already carries the suppressions");
            return;
        }
        for warning in parsed.warnings {
            file.diagnostics.push(Diagnostic::warning(
                file.tree.file_name.clone(),
                candidate.pos(),
                candidate.len(),
                warning,
                diagnostic_codes::JSDOC_TAG_WARNING,
            ));
        }

        debug!(pos = candidate.pos(), "merging suppressions into fileoverview comment");
        match candidate.slot {
            Slot::Source(range) => {
                file.ctx
                    .replace_text(range.pos, range.end, jsdoc::serialize(&tags));
            }
            Slot::Synthesized { owner, index } => {
                if let Some(comment) = file.ctx.leading_comments_mut(owner).get_mut(index) {
                    comment.text = jsdoc::serialize_synthesized(&tags);
                }
            }
        }
    }
}
