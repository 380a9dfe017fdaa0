//! Tests for the downlevel-call annotator

use closurize_ast::{NodeIndex, SyntaxKind, SyntaxTree, TreeBuilder};
use closurize_common::Diagnostic;
use closurize_emitter::transforms::{
    ContextTypes, DownlevelCallAnnotator, FileTransform, RewritePass, collect_context_types,
};
use closurize_emitter::{TransformContext, render_file};

/// `callee(this, void 0, void 0, function* () { return value; })`, returning
/// the call and the function literal.
fn awaiter_call(b: &mut TreeBuilder, callee: &str, value: &str) -> (NodeIndex, NodeIndex) {
    let mut function = NodeIndex::NONE;
    let call = b.node(SyntaxKind::CallExpression, |b| {
        b.ident(callee);
        b.punct("(");
        b.token(SyntaxKind::ThisKeyword, "this");
        for _ in 0..2 {
            b.punct(",");
            b.node(SyntaxKind::VoidExpression, |b| {
                b.punct("void");
                b.token(SyntaxKind::NumericLiteral, "0");
            });
        }
        b.punct(",");
        function = b.node(SyntaxKind::FunctionExpression, |b| {
            b.punct("function");
            b.punct("*");
            b.punct("(");
            b.punct(")");
            b.node(SyntaxKind::Block, |b| {
                b.punct("{");
                b.node(SyntaxKind::ReturnStatement, |b| {
                    b.punct("return");
                    b.token(SyntaxKind::NumericLiteral, value);
                    b.punct(";");
                });
                b.punct("}");
            });
        });
        b.punct(")");
    });
    (call, function)
}

fn return_awaiter(b: &mut TreeBuilder, callee: &str, value: &str) -> NodeIndex {
    let mut function = NodeIndex::NONE;
    b.node(SyntaxKind::Block, |b| {
        b.punct("{");
        b.node(SyntaxKind::ReturnStatement, |b| {
            b.punct("return");
            function = awaiter_call(b, callee, value).1;
            b.punct(";");
        });
        b.punct("}");
    });
    function
}

const LOWERED: &str = "class K {\n  m() {\n    return __awaiter(this, void 0, void 0, function* () { return 1; });\n  }\n}\nfunction f() {\n  return __awaiter(this, void 0, void 0, function* () { return 2; });\n}\n";

/// Two lowered async functions: method `K.m` and free function `f`.
fn build_lowered() -> (SyntaxTree, NodeIndex, NodeIndex) {
    let mut b = TreeBuilder::new(LOWERED);
    let mut method_body = NodeIndex::NONE;
    let mut free_body = NodeIndex::NONE;
    b.node(SyntaxKind::ClassDeclaration, |b| {
        b.punct("class");
        b.ident("K");
        b.punct("{");
        let method = b.node(SyntaxKind::MethodDeclaration, |b| {
            b.ident("m");
            b.punct("(");
            b.punct(")");
            method_body = return_awaiter(b, "__awaiter", "1");
        });
        b.set_original(method_body, method);
        b.punct("}");
    });
    let free = b.node(SyntaxKind::FunctionDeclaration, |b| {
        b.punct("function");
        b.ident("f");
        b.punct("(");
        b.punct(")");
        free_body = return_awaiter(b, "__awaiter", "2");
    });
    b.set_original(free_body, free);
    (b.finish("lowered.ts"), method_body, free_body)
}

fn annotate(tree: &mut SyntaxTree, context_types: &ContextTypes) -> (TransformContext, String) {
    let mut ctx = TransformContext::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let pass = DownlevelCallAnnotator::new(context_types);
    let mut file = FileTransform::new(tree, &mut ctx, &mut diagnostics);
    pass.run(&mut file);
    pass.run(&mut file);
    let output = render_file(tree, &ctx)
        .expect("render succeeds")
        .expect("not a declaration file");
    (ctx, output)
}

#[test]
fn test_only_mapped_declaration_is_annotated() {
    let (mut tree, method_body, free_body) = build_lowered();
    let context_types = collect_context_types(&tree);
    assert_eq!(context_types.len(), 1);

    let (ctx, output) = annotate(&mut tree, &context_types);
    assert_eq!(ctx.leading_comments(method_body).len(), 1);
    assert!(ctx.leading_comments(free_body).is_empty());
    assert_eq!(
        output,
        LOWERED.replace(
            "function* () { return 1; }",
            "/** @this {K} */ function* () { return 1; }"
        )
    );
}

#[test]
fn test_empty_mapping_changes_nothing() {
    let (mut tree, _, _) = build_lowered();
    let (ctx, output) = annotate(&mut tree, &ContextTypes::default());
    assert!(ctx.is_empty());
    assert_eq!(output, LOWERED);
}

#[test]
fn test_other_callee_is_ignored() {
    let source = "class K {\n  m() { return helper(this, void 0, void 0, function* () { return 1; }); }\n}\n";
    let mut b = TreeBuilder::new(source);
    b.node(SyntaxKind::ClassDeclaration, |b| {
        b.punct("class");
        b.ident("K");
        b.punct("{");
        let mut body = NodeIndex::NONE;
        let method = b.node(SyntaxKind::MethodDeclaration, |b| {
            b.ident("m");
            b.punct("(");
            b.punct(")");
            body = return_awaiter(b, "helper", "1");
        });
        b.set_original(body, method);
        b.punct("}");
    });
    let mut tree = b.finish("helper.ts");
    let context_types = collect_context_types(&tree);
    let (ctx, output) = annotate(&mut tree, &context_types);
    assert!(ctx.is_empty());
    assert_eq!(output, source);
}

#[test]
fn test_synthesized_awaiter_inside_method() {
    // The lowering step replaced the method body with a synthesized block and
    // moved the original body into the generator.
    let source = "class K {\n  m() { return 1; }\n}\n";
    let mut b = TreeBuilder::new(source);
    let mut function = NodeIndex::NONE;
    b.node(SyntaxKind::ClassDeclaration, |b| {
        b.punct("class");
        b.ident("K");
        b.punct("{");
        let method = b.node(SyntaxKind::MethodDeclaration, |b| {
            b.ident("m");
            b.punct("(");
            b.punct(")");
            b.synthetic_node(SyntaxKind::Block, |b| {
                b.synthetic_token(SyntaxKind::Token, " { ");
                b.synthetic_node(SyntaxKind::ReturnStatement, |b| {
                    b.synthetic_token(SyntaxKind::Token, "return ");
                    b.synthetic_node(SyntaxKind::CallExpression, |b| {
                        b.synthetic_token(SyntaxKind::Identifier, "__awaiter");
                        b.synthetic_token(SyntaxKind::Token, "(");
                        b.synthetic_token(SyntaxKind::ThisKeyword, "this");
                        b.synthetic_token(SyntaxKind::Token, ", ");
                        b.synthetic_token(SyntaxKind::VoidExpression, "void 0");
                        b.synthetic_token(SyntaxKind::Token, ", ");
                        b.synthetic_token(SyntaxKind::VoidExpression, "void 0");
                        b.synthetic_token(SyntaxKind::Token, ", ");
                        function = b.synthetic_node(SyntaxKind::FunctionExpression, |b| {
                            b.synthetic_token(SyntaxKind::Token, "function* ()");
                            b.node(SyntaxKind::Block, |b| {
                                b.punct("{");
                                b.node(SyntaxKind::ReturnStatement, |b| {
                                    b.punct("return");
                                    b.token(SyntaxKind::NumericLiteral, "1");
                                    b.punct(";");
                                });
                                b.punct("}");
                            });
                        });
                        b.synthetic_token(SyntaxKind::Token, ")");
                    });
                    b.synthetic_token(SyntaxKind::Token, ";");
                });
                b.synthetic_token(SyntaxKind::Token, " }");
            });
        });
        b.set_original(function, method);
        b.punct("}");
    });
    let mut tree = b.finish("synthetic.ts");
    let context_types = collect_context_types(&tree);
    assert_eq!(
        DownlevelCallAnnotator::awaiter_body(&tree, tree.arena.parent(function)),
        function
    );

    let (_, output) = annotate(&mut tree, &context_types);
    assert_eq!(
        output,
        "class K {\n  m() { return __awaiter(this, void 0, void 0, /** @this {K} */ function* () { return 1; }); }\n}\n"
    );
}
