//! Type oracle interface.
//!
//! Passes that need semantic information (symbol resolution, declared and
//! return types, declaration comments) ask a `TypeOracle`. The TypeScript
//! front end answers these questions; `SymbolTable` is an in-memory oracle
//! loaded from the front end's JSON dump and used by tests.

use closurize_ast::{FileId, NodeIndex, SyntaxTree};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identity of a node across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub file: FileId,
    pub node: NodeIndex,
}

impl NodeRef {
    pub fn new(file: FileId, node: NodeIndex) -> Self {
        NodeRef { file, node }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SymbolFlags: u32 {
        const VARIABLE = 1 << 0;
        const FUNCTION = 1 << 1;
        const CLASS = 1 << 2;
        const METHOD = 1 << 3;
        const PROPERTY = 1 << 4;
        const PARAMETER = 1 << 5;
        const MODULE = 1 << 6;
        /// Import or re-export binding; resolve with `aliased_symbol`.
        const ALIAS = 1 << 7;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub name: String,
    #[serde(default)]
    pub flags: SymbolFlags,
    #[serde(default)]
    pub declarations: Vec<NodeRef>,
    /// Direct target of an alias symbol.
    #[serde(default)]
    pub aliased: Option<SymbolId>,
}

impl Symbol {
    pub fn new(name: &str, flags: SymbolFlags) -> Self {
        Symbol {
            name: name.to_string(),
            flags,
            declarations: Vec::new(),
            aliased: None,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.flags.contains(SymbolFlags::ALIAS)
    }
}

pub trait TypeOracle {
    /// Symbol an identifier refers to.
    fn symbol_at_location(&self, file: FileId, node: NodeIndex) -> Option<SymbolId>;

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// Final, non-alias target of an alias symbol, following re-exports.
    fn aliased_symbol(&self, id: SymbolId) -> Option<SymbolId>;

    /// Text of the comments leading a declaration, joined by newlines.
    fn leading_comment_text(&self, declaration: NodeRef) -> Option<&str>;

    /// Closure type expression for a declaration's declared or inferred
    /// type (parameters, variables).
    fn type_text(&self, file: FileId, node: NodeIndex) -> Option<&str>;

    /// Closure type expression for a function's return type.
    fn return_type_text(&self, file: FileId, node: NodeIndex) -> Option<&str>;
}

/// JSON form of a `SymbolTable`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolTableDump {
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    /// Identifier location -> symbol index.
    #[serde(default)]
    pub locations: Vec<(NodeRef, SymbolId)>,
    #[serde(default)]
    pub types: Vec<(NodeRef, String)>,
    #[serde(default)]
    pub return_types: Vec<(NodeRef, String)>,
    #[serde(default)]
    pub leading_comments: Vec<(NodeRef, String)>,
}

/// In-memory `TypeOracle`.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    locations: FxHashMap<NodeRef, SymbolId>,
    types: FxHashMap<NodeRef, String>,
    return_types: FxHashMap<NodeRef, String>,
    leading_comments: FxHashMap<NodeRef, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Record that the identifier at `location` refers to `symbol`.
    pub fn bind(&mut self, location: NodeRef, symbol: SymbolId) {
        self.locations.insert(location, symbol);
    }

    pub fn set_type(&mut self, at: NodeRef, type_text: &str) {
        self.types.insert(at, type_text.to_string());
    }

    pub fn set_return_type(&mut self, at: NodeRef, type_text: &str) {
        self.return_types.insert(at, type_text.to_string());
    }

    pub fn set_leading_comment(&mut self, declaration: NodeRef, text: &str) {
        self.leading_comments.insert(declaration, text.to_string());
    }

    /// Fill in declaration comments from a tree's source text, for every
    /// declaration in that file that has none recorded yet.
    pub fn index_leading_comments(&mut self, tree: &SyntaxTree) {
        let mut found = Vec::new();
        for symbol in &self.symbols {
            for &declaration in &symbol.declarations {
                if declaration.file != tree.file_id || self.leading_comments.contains_key(&declaration) {
                    continue;
                }
                let ranges = tree.leading_comment_ranges(declaration.node);
                if ranges.is_empty() {
                    continue;
                }
                let text: Vec<&str> = ranges.iter().map(|r| r.text(tree.text())).collect();
                found.push((declaration, text.join("\n")));
            }
        }
        self.leading_comments.extend(found);
    }

    pub fn from_dump(dump: SymbolTableDump) -> Self {
        SymbolTable {
            symbols: dump.symbols,
            locations: dump.locations.into_iter().collect(),
            types: dump.types.into_iter().collect(),
            return_types: dump.return_types.into_iter().collect(),
            leading_comments: dump.leading_comments.into_iter().collect(),
        }
    }

    pub fn to_dump(&self) -> SymbolTableDump {
        fn sorted<V: Clone>(map: &FxHashMap<NodeRef, V>) -> Vec<(NodeRef, V)> {
            let mut entries: Vec<_> = map.iter().map(|(k, v)| (*k, v.clone())).collect();
            entries.sort_by_key(|(k, _)| *k);
            entries
        }
        SymbolTableDump {
            symbols: self.symbols.clone(),
            locations: sorted(&self.locations),
            types: sorted(&self.types),
            return_types: sorted(&self.return_types),
            leading_comments: sorted(&self.leading_comments),
        }
    }
}

impl TypeOracle for SymbolTable {
    fn symbol_at_location(&self, file: FileId, node: NodeIndex) -> Option<SymbolId> {
        self.locations.get(&NodeRef::new(file, node)).copied()
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    fn aliased_symbol(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = self.symbol(id)?.aliased?;
        // Bounded by the symbol count so a malformed cycle terminates.
        for _ in 0..self.symbols.len() {
            let symbol = self.symbol(current)?;
            if !symbol.is_alias() {
                return Some(current);
            }
            current = symbol.aliased?;
        }
        None
    }

    fn leading_comment_text(&self, declaration: NodeRef) -> Option<&str> {
        self.leading_comments.get(&declaration).map(String::as_str)
    }

    fn type_text(&self, file: FileId, node: NodeIndex) -> Option<&str> {
        self.types.get(&NodeRef::new(file, node)).map(String::as_str)
    }

    fn return_type_text(&self, file: FileId, node: NodeIndex) -> Option<&str> {
        self.return_types
            .get(&NodeRef::new(file, node))
            .map(String::as_str)
    }
}
