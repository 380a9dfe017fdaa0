//! Tests for tree construction, queries and dumps

use closurize_ast::{FileId, NodeIndex, SyntaxKind, SyntaxTree, TreeBuilder, TreeDump, TreeDumpError};

fn build_var_statement() -> (SyntaxTree, NodeIndex, NodeIndex) {
    let source = "/** doc */\nlet answer = 42;\n";
    let mut b = TreeBuilder::new(source);
    let mut name = NodeIndex::NONE;
    let stmt = b.node(SyntaxKind::VariableStatement, |b| {
        b.node(SyntaxKind::VariableDeclarationList, |b| {
            b.punct("let");
            b.node(SyntaxKind::VariableDeclaration, |b| {
                name = b.ident("answer");
                b.punct("=");
                b.token(SyntaxKind::NumericLiteral, "42");
            });
        });
        b.punct(";");
    });
    (b.finish("answer.ts"), stmt, name)
}

#[test]
fn test_builder_ranges_include_leading_trivia() {
    let (tree, stmt, name) = build_var_statement();
    let node = tree.node(stmt).expect("statement");
    assert_eq!(node.pos, 0);
    assert_eq!(&tree.text()[tree.token_start(stmt) as usize..node.end as usize], "let answer = 42;");
    assert_eq!(tree.node_text(name), "answer");
    assert_eq!(tree.identifier_text(name), Some("answer"));
    assert_eq!(tree.identifier_text(stmt), None);
}

#[test]
fn test_statements_exclude_end_of_file() {
    let (tree, stmt, _) = build_var_statement();
    assert_eq!(tree.statements(), vec![stmt]);
    let children = tree.arena.children(tree.root);
    assert_eq!(tree.kind(*children.last().expect("eof")), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_leading_comment_ranges() {
    let (tree, stmt, _) = build_var_statement();
    let ranges = tree.leading_comment_ranges(stmt);
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].text(tree.text()), "/** doc */");
}

#[test]
fn test_parent_and_enclosing_function() {
    let source = "function f() { return g; }";
    let mut b = TreeBuilder::new(source);
    let mut g = NodeIndex::NONE;
    let func = b.node(SyntaxKind::FunctionDeclaration, |b| {
        b.punct("function");
        b.ident("f");
        b.punct("(");
        b.punct(")");
        b.node(SyntaxKind::Block, |b| {
            b.punct("{");
            b.node(SyntaxKind::ReturnStatement, |b| {
                b.punct("return");
                g = b.ident("g");
                b.punct(";");
            });
            b.punct("}");
        });
    });
    let tree = b.finish("f.ts");
    assert_eq!(tree.enclosing_function_like(g), func);
    assert_eq!(tree.arena.ancestors(g).last(), Some(tree.root));
}

#[test]
fn test_original_node_follows_chain() {
    let source = "x;";
    let mut b = TreeBuilder::new(source);
    let mut original = NodeIndex::NONE;
    b.node(SyntaxKind::ExpressionStatement, |b| {
        original = b.ident("x");
        b.punct(";");
    });
    let first = b.synthetic_token(SyntaxKind::Identifier, "x");
    let second = b.synthetic_token(SyntaxKind::Identifier, "x");
    b.set_original(second, first);
    b.set_original(first, original);
    let tree = b.finish("x.ts");

    assert_eq!(tree.original_of(second), first);
    assert_eq!(tree.original_node(second), original);
    assert_eq!(tree.original_node(original), original);
    assert!(tree.arena.is_synthetic(second));
    assert_eq!(tree.node_text(second), "x");
    assert_eq!(tree.token_start(second), closurize_ast::SYNTHETIC_POS);
}

#[test]
fn test_declaration_file_detection() {
    let b = TreeBuilder::new("declare const x: number;");
    let tree = b.finish("lib.d.ts");
    assert!(tree.is_declaration_file());
    let b = TreeBuilder::new("");
    assert!(!b.finish("lib.ts").is_declaration_file());
}

#[test]
fn test_dump_round_trip_preserves_structure() {
    let (tree, stmt, name) = build_var_statement();
    let json = TreeDump::from_tree(&tree).to_json().expect("serialize");
    let loaded = TreeDump::from_json(&json)
        .expect("deserialize")
        .into_tree(FileId(3))
        .expect("valid dump");

    assert_eq!(loaded.file_id, FileId(3));
    assert_eq!(loaded.root, tree.root);
    assert_eq!(loaded.arena.parent(name), tree.arena.parent(name));
    assert_eq!(loaded.node_text(stmt), tree.node_text(stmt));
}

#[test]
fn test_dump_rejects_dangling_child() {
    let (tree, _, _) = build_var_statement();
    let mut dump = TreeDump::from_tree(&tree);
    dump.nodes[0].children.push(NodeIndex(999));
    match dump.into_tree(FileId(0)) {
        Err(TreeDumpError::DanglingIndex { target, .. }) => assert_eq!(target, 999),
        other => panic!("expected dangling index error, got {other:?}"),
    }
}

#[test]
fn test_dump_rejects_range_past_end() {
    let (tree, _, _) = build_var_statement();
    let mut dump = TreeDump::from_tree(&tree);
    dump.nodes[0].end = 10_000;
    assert!(matches!(dump.into_tree(FileId(0)), Err(TreeDumpError::BadRange { .. })));
}
