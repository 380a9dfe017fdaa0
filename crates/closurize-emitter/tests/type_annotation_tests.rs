//! Tests for the type annotation pass

use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree, TreeBuilder};
use closurize_common::Diagnostic;
use closurize_common::diagnostics::diagnostic_codes;
use closurize_emitter::checker::{NodeRef, SymbolTable};
use closurize_emitter::transforms::{FileTransform, RewritePass, TypeAnnotator};
use closurize_emitter::{TransformContext, render_file};

struct Built {
    tree: SyntaxTree,
    function: NodeIndex,
    parameters: Vec<NodeIndex>,
    declaration: NodeIndex,
}

/// `{doc}function add(a, b = 1) { return a + b; }\nconst n = add(1);\n`
fn build(doc: &str) -> Built {
    let source = format!("{doc}function add(a, b = 1) {{ return a + b; }}\nconst n = add(1);\n");
    let mut b = TreeBuilder::new(&source);
    let mut parameters = Vec::new();
    let function = b.node(SyntaxKind::FunctionDeclaration, |b| {
        b.punct("function");
        b.ident("add");
        b.punct("(");
        parameters.push(b.node(SyntaxKind::Parameter, |b| {
            b.ident("a");
        }));
        b.punct(",");
        parameters.push(b.node(SyntaxKind::Parameter, |b| {
            b.ident("b");
            b.punct("=");
            b.token(SyntaxKind::NumericLiteral, "1");
        }));
        b.punct(")");
        b.node(SyntaxKind::Block, |b| {
            b.punct("{");
            b.node(SyntaxKind::ReturnStatement, |b| {
                b.punct("return");
                b.node(SyntaxKind::BinaryExpression, |b| {
                    b.ident("a");
                    b.punct("+");
                    b.ident("b");
                });
                b.punct(";");
            });
            b.punct("}");
        });
    });
    let mut declaration = NodeIndex::NONE;
    b.node(SyntaxKind::VariableStatement, |b| {
        b.node(SyntaxKind::VariableDeclarationList, |b| {
            b.punct("const");
            declaration = b.node(SyntaxKind::VariableDeclaration, |b| {
                b.ident("n");
                b.punct("=");
                b.node(SyntaxKind::CallExpression, |b| {
                    b.ident("add");
                    b.punct("(");
                    b.token(SyntaxKind::NumericLiteral, "1");
                    b.punct(")");
                });
            });
        });
        b.punct(";");
    });
    Built {
        tree: b.finish("add.ts"),
        function,
        parameters,
        declaration,
    }
}

fn oracle_for(built: &Built) -> SymbolTable {
    let file = built.tree.file_id;
    let mut table = SymbolTable::new();
    for &parameter in &built.parameters {
        table.set_type(NodeRef::new(file, parameter), "number");
    }
    table.set_return_type(NodeRef::new(file, built.function), "number");
    table.set_type(NodeRef::new(file, built.declaration), "number");
    table
}

fn annotate(built: &mut Built) -> (Vec<Diagnostic>, String) {
    let oracle = oracle_for(built);
    let mut ctx = TransformContext::new();
    let mut diagnostics = Vec::new();
    TypeAnnotator::new(&oracle).run(&mut FileTransform::new(
        &mut built.tree,
        &mut ctx,
        &mut diagnostics,
    ));
    let output = render_file(&built.tree, &ctx)
        .expect("render succeeds")
        .expect("not a declaration file");
    (diagnostics, output)
}

#[test]
fn test_adds_comments_without_existing_doc() {
    let mut built = build("");
    let (diagnostics, output) = annotate(&mut built);
    assert!(diagnostics.is_empty());
    assert_eq!(
        output,
        "/**\n * @param {number} a\n * @param {number=} b\n * @return {number}\n */\nfunction add(a, b = 1) { return a + b; }\n/** @type {number} */ const n = add(1);\n"
    );
}

#[test]
fn test_merges_into_existing_doc() {
    let mut built = build("/**\n * Adds.\n * @param b the increment\n */\n");
    let (diagnostics, output) = annotate(&mut built);
    assert!(diagnostics.is_empty());
    assert_eq!(
        output,
        "/**\n * Adds.\n * @param {number} a\n * @param {number=} b the increment\n * @return {number}\n */\nfunction add(a, b = 1) { return a + b; }\n/** @type {number} */ const n = add(1);\n"
    );
}

#[test]
fn test_redundant_type_payload_is_reported() {
    let mut built = build("/** @param {string} a */\n");
    let (diagnostics, output) = annotate(&mut built);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::JSDOC_TAG_WARNING);
    assert!(output.contains(" * @param {number} a\n"));
    assert!(!output.contains("string"));
}

#[test]
fn test_fileoverview_is_not_a_declaration_doc() {
    let mut built = build("/** @fileoverview Math. */\n");
    let (_, output) = annotate(&mut built);
    assert!(output.starts_with("/** @fileoverview Math. */\n/**\n * @param {number} a\n"));
}

#[test]
fn test_no_types_no_changes() {
    let built = build("");
    let oracle = SymbolTable::new();
    let annotator = TypeAnnotator::new(&oracle);
    assert!(annotator.type_tags(&built.tree, built.function).is_empty());
}
