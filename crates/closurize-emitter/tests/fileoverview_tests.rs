//! Tests for the fileoverview merger

use closurize_ast::{SyntaxKind, SyntaxTree, TreeBuilder};
use closurize_common::diagnostics::diagnostic_codes;
use closurize_common::{Diagnostic, Tag};
use closurize_emitter::transforms::{FileTransform, FileoverviewMerger, FileoverviewOptions, RewritePass};
use closurize_emitter::{SynthesizedComment, TransformContext, render_file};

const ADDED: &str =
    "/**\n * @fileoverview added by closurize\n * @suppress {checkTypes} checked by tsc\n */\n";

/// `prefix` followed by `let x = 1;\n`.
fn build(prefix: &str) -> SyntaxTree {
    let source = format!("{prefix}let x = 1;\n");
    let mut b = TreeBuilder::new(&source);
    b.node(SyntaxKind::VariableStatement, |b| {
        b.node(SyntaxKind::VariableDeclarationList, |b| {
            b.punct("let");
            b.node(SyntaxKind::VariableDeclaration, |b| {
                b.ident("x");
                b.punct("=");
                b.token(SyntaxKind::NumericLiteral, "1");
            });
        });
        b.punct(";");
    });
    b.finish("x.ts")
}

fn run_passes(
    tree: &mut SyntaxTree,
    ctx: &mut TransformContext,
    times: usize,
) -> (Vec<Diagnostic>, String) {
    let mut diagnostics = Vec::new();
    let merger = FileoverviewMerger::default();
    for _ in 0..times {
        merger.run(&mut FileTransform::new(tree, ctx, &mut diagnostics));
    }
    let output = render_file(tree, ctx)
        .expect("render succeeds")
        .expect("not a declaration file");
    (diagnostics, output)
}

#[test]
fn test_creates_overview_when_missing() {
    let mut tree = build("");
    let mut ctx = TransformContext::new();
    let (diagnostics, output) = run_passes(&mut tree, &mut ctx, 1);
    assert!(diagnostics.is_empty());
    assert_eq!(output, format!("{ADDED}let x = 1;\n"));
}

#[test]
fn test_created_overview_is_idempotent() {
    let mut tree = build("");
    let mut ctx = TransformContext::new();
    let (_, once) = run_passes(&mut tree, &mut ctx, 1);
    let (_, twice) = run_passes(&mut tree, &mut ctx, 1);
    assert_eq!(once, twice);
    assert_eq!(ctx.prepended(tree.root).len(), 1);
}

#[test]
fn test_merges_into_existing_suppress_list() {
    let mut tree = build("/**\n * @fileoverview Utilities.\n * @suppress {visibility} legacy\n */\n\n");
    let mut ctx = TransformContext::new();
    let (_, output) = run_passes(&mut tree, &mut ctx, 2);
    assert_eq!(
        output,
        "/**\n * @fileoverview Utilities.\n * @suppress {visibility,checkTypes} legacy\n */\n\nlet x = 1;\n"
    );
}

#[test]
fn test_appends_suppress_tag() {
    let mut tree = build("/** @fileoverview Utilities. */\n");
    let mut ctx = TransformContext::new();
    let (_, output) = run_passes(&mut tree, &mut ctx, 1);
    assert_eq!(
        output,
        "/**\n * @fileoverview Utilities.\n * @suppress {checkTypes} checked by tsc\n */\nlet x = 1;\n"
    );
}

#[test]
fn test_existing_suppression_is_left_byte_identical() {
    let source = "/** @fileoverview x\n    @suppress {checkTypes}  */\n";
    let mut tree = build(source);
    let mut ctx = TransformContext::new();
    let (_, output) = run_passes(&mut tree, &mut ctx, 1);
    assert!(ctx.is_empty());
    assert_eq!(output, tree.text());
}

#[test]
fn test_last_overview_wins() {
    let mut tree = build("/** @fileoverview first */\n/** @externs */\n");
    let mut ctx = TransformContext::new();
    let (diagnostics, output) = run_passes(&mut tree, &mut ctx, 1);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::DUPLICATE_FILEOVERVIEW);
    assert_eq!(diagnostics[0].start, 0);
    assert_eq!(
        output,
        "/** @fileoverview first */\n/**\n * @externs\n * @suppress {checkTypes} checked by tsc\n */\nlet x = 1;\n"
    );
}

#[test]
fn test_plain_doc_comment_is_not_an_overview() {
    let mut tree = build("/** Doc. */\n");
    let mut ctx = TransformContext::new();
    let (_, output) = run_passes(&mut tree, &mut ctx, 1);
    assert_eq!(output, format!("{ADDED}/** Doc. */\nlet x = 1;\n"));
}

#[test]
fn test_synthesized_overview_on_first_statement() {
    let mut tree = build("");
    let first = tree.statements()[0];
    let mut ctx = TransformContext::new();
    ctx.add_leading_comment(
        first,
        SynthesizedComment::jsdoc(&[Tag::named("fileoverview").with_text("moved")], true),
    );
    let (_, output) = run_passes(&mut tree, &mut ctx, 2);
    assert!(ctx.prepended(tree.root).is_empty());
    assert_eq!(
        output,
        "/**\n * @fileoverview moved\n * @suppress {checkTypes} checked by tsc\n */\nlet x = 1;\n"
    );
}

#[test]
fn test_custom_suppressions() {
    let mut tree = build("/** @fileoverview x @suppress {checkTypes} */\n");
    let mut ctx = TransformContext::new();
    let mut diagnostics = Vec::new();
    let merger = FileoverviewMerger::new(FileoverviewOptions {
        suppressions: vec!["checkTypes".to_string(), "extraRequire".to_string()],
        ..FileoverviewOptions::default()
    });
    merger.run(&mut FileTransform::new(&mut tree, &mut ctx, &mut diagnostics));
    let output = render_file(&tree, &ctx).expect("render").expect("output");
    assert!(output.contains("@suppress {checkTypes,extraRequire}"));
}
