//! Syntax kinds.
//!
//! The tree is concrete: punctuation and keywords that carry no meaning of
//! their own are leaves of kind `Token`, so a tree covers its text without
//! gaps. Passes look at the meaningful children only (see
//! `NodeArena::node_children`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    Unknown,

    // Leaves
    Token,
    Identifier,
    PrivateIdentifier,
    StringLiteral,
    NumericLiteral,
    TemplateLiteral,
    RegularExpressionLiteral,
    ThisKeyword,
    SuperKeyword,
    NullKeyword,
    TrueKeyword,
    FalseKeyword,
    EndOfFileToken,

    // Expressions
    ArrayLiteralExpression,
    ObjectLiteralExpression,
    PropertyAssignment,
    PropertyAccessExpression,
    ElementAccessExpression,
    CallExpression,
    NewExpression,
    ParenthesizedExpression,
    FunctionExpression,
    ArrowFunction,
    ClassExpression,
    BinaryExpression,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    VoidExpression,
    AwaitExpression,
    YieldExpression,
    ConditionalExpression,
    Decorator,

    // Statements
    Block,
    VariableStatement,
    VariableDeclarationList,
    VariableDeclaration,
    EmptyStatement,
    ExpressionStatement,
    IfStatement,
    ReturnStatement,
    ThrowStatement,
    /// Synthesized statement that emits nothing but its attached comments.
    NotEmittedStatement,

    // Declarations
    FunctionDeclaration,
    ClassDeclaration,
    MethodDeclaration,
    PropertyDeclaration,
    GetAccessor,
    SetAccessor,
    Constructor,
    Parameter,
    ObjectBindingPattern,
    ArrayBindingPattern,
    BindingElement,
    TypeNode,

    // Modules
    ImportDeclaration,
    ImportClause,
    NamespaceImport,
    NamedImports,
    ImportSpecifier,
    ExportDeclaration,
    NamedExports,
    ExportSpecifier,
    ExportAssignment,

    SourceFile,
}

impl SyntaxKind {
    /// Leaves carry their own text; everything else is composed of children.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            SyntaxKind::Token
                | SyntaxKind::Identifier
                | SyntaxKind::PrivateIdentifier
                | SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::TemplateLiteral
                | SyntaxKind::RegularExpressionLiteral
                | SyntaxKind::ThisKeyword
                | SyntaxKind::SuperKeyword
                | SyntaxKind::NullKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::EndOfFileToken
        )
    }

    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::Constructor
        )
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression)
    }

    /// Class members that have a `this` of the enclosing class type.
    pub fn is_class_member_function(self) -> bool {
        matches!(
            self,
            SyntaxKind::MethodDeclaration
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::Constructor
        )
    }

    /// Statements that emit no code of their own.
    pub fn is_placeholder_statement(self) -> bool {
        matches!(self, SyntaxKind::NotEmittedStatement | SyntaxKind::EmptyStatement)
    }

    pub fn is_binding_pattern(self) -> bool {
        matches!(self, SyntaxKind::ObjectBindingPattern | SyntaxKind::ArrayBindingPattern)
    }
}
