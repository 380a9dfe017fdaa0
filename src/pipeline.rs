//! Whole-program driver.
//!
//! `Program` owns the trees of one run, the type oracle, the module manifest
//! and the pass switches. `emit` processes files one at a time: it records
//! the file's module and imports in the manifest, runs the enabled rewrite
//! passes in their fixed order and renders the result.

use crate::module_manifest::ModuleManifest;
use crate::module_names::{module_name_for_path, module_name_for_specifier};
use anyhow::{Context, Result};
use closurize_ast::{FileId, NodeIndex, SyntaxKind, SyntaxTree, TreeDump};
use closurize_common::Diagnostic;
use closurize_common::diagnostics::diagnostic_codes;
use closurize_emitter::checker::{SymbolTable, SymbolTableDump, TypeOracle};
use closurize_emitter::transforms::{
    ContextTypes, DownlevelCallAnnotator, FileTransform, FileoverviewMerger, FileoverviewOptions,
    RewritePass, TypeAnnotator, WrapperUnwrapper, collect_context_types,
};
use closurize_emitter::{TransformContext, render_file};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, debug_span, warn};

/// Which passes run, and how.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub unwrap_wrappers: bool,
    pub downlevel_calls: bool,
    pub type_annotations: bool,
    pub fileoverview: bool,
    pub fileoverview_options: FileoverviewOptions,
    /// Module names are file paths relative to this directory.
    pub root_dir: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            unwrap_wrappers: true,
            downlevel_calls: true,
            type_annotations: true,
            fileoverview: true,
            fileoverview_options: FileoverviewOptions::default(),
            root_dir: PathBuf::new(),
        }
    }
}

/// A context type supplied by the front end for a declaration the local
/// class scan cannot see (for example an object literal method).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextTypeEntry {
    pub file_name: String,
    pub node: NodeIndex,
    pub type_text: String,
}

/// JSON input of one run, written by the TypeScript front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDump {
    pub files: Vec<TreeDump>,
    #[serde(default)]
    pub symbols: SymbolTableDump,
    #[serde(default)]
    pub context_types: Vec<ContextTypeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub file_name: String,
    /// `None` for declaration files and files that failed to render.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EmitResult {
    pub outputs: Vec<EmittedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EmitResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub struct Program {
    files: Vec<SyntaxTree>,
    oracle: Box<dyn TypeOracle>,
    context_types: FxHashMap<FileId, ContextTypes>,
    manifest: ModuleManifest,
    options: PipelineOptions,
}

impl Program {
    pub fn new(
        files: Vec<SyntaxTree>,
        oracle: Box<dyn TypeOracle>,
        options: PipelineOptions,
    ) -> Self {
        Program {
            files,
            oracle,
            context_types: FxHashMap::default(),
            manifest: ModuleManifest::new(),
            options,
        }
    }

    /// Load a front end dump. File ids follow the order of `dump.files`.
    pub fn from_dump(dump: ProgramDump, options: PipelineOptions) -> Result<Self> {
        let mut files = Vec::with_capacity(dump.files.len());
        for (index, file) in dump.files.into_iter().enumerate() {
            let file_name = file.file_name.clone();
            let tree = file
                .into_tree(FileId(index as u32))
                .with_context(|| format!("invalid tree for {file_name}"))?;
            files.push(tree);
        }

        let mut symbols = SymbolTable::from_dump(dump.symbols);
        for tree in &files {
            symbols.index_leading_comments(tree);
        }

        let ids: FxHashMap<&str, FileId> = files
            .iter()
            .map(|tree| (tree.file_name.as_str(), tree.file_id))
            .collect();
        let mut context_types: FxHashMap<FileId, ContextTypes> = FxHashMap::default();
        for entry in dump.context_types {
            let Some(&file_id) = ids.get(entry.file_name.as_str()) else {
                warn!(file = %entry.file_name, "context type for unknown file");
                continue;
            };
            context_types
                .entry(file_id)
                .or_default()
                .insert(entry.node, entry.type_text);
        }

        let mut program = Program::new(files, Box::new(symbols), options);
        program.context_types = context_types;
        Ok(program)
    }

    /// Add context types on top of the ones collected from class scopes.
    pub fn set_context_types(&mut self, file: FileId, types: ContextTypes) {
        self.context_types.insert(file, types);
    }

    pub fn files(&self) -> &[SyntaxTree] {
        &self.files
    }

    pub fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    #[tracing::instrument(level = "debug", skip_all, fields(files = self.files.len()))]
    pub fn emit(&mut self) -> EmitResult {
        let mut result = EmitResult::default();
        for tree in &mut self.files {
            register_file(&mut self.manifest, &self.options.root_dir, tree);
            let text = emit_file(
                tree,
                self.oracle.as_ref(),
                self.context_types.get(&tree.file_id),
                &self.options,
                &mut result.diagnostics,
            );
            result.outputs.push(EmittedFile {
                file_name: tree.file_name.clone(),
                text,
            });
        }

        if let Err(err) = self.manifest.dependency_order() {
            let file = err.cycle.first().cloned().unwrap_or_default();
            result.diagnostics.push(Diagnostic::warning(
                file,
                0,
                0,
                err.to_string(),
                diagnostic_codes::MODULE_CYCLE,
            ));
        }
        result
    }
}

/// Record the file's module and every module it imports or re-exports from.
fn register_file(manifest: &mut ModuleManifest, root_dir: &Path, tree: &SyntaxTree) {
    let path = Path::new(&tree.file_name);
    manifest.add_module(&tree.file_name, &module_name_for_path(root_dir, path));
    for specifier in module_specifiers(tree) {
        let module = module_name_for_specifier(root_dir, path, &specifier);
        manifest.add_referenced_module(&tree.file_name, &module);
    }
}

/// Specifiers of top-level `import ... from "x"`, `import "x"` and
/// `export ... from "x"` statements, in source order.
pub fn module_specifiers(tree: &SyntaxTree) -> Vec<String> {
    tree.statements()
        .into_iter()
        .filter(|&statement| {
            matches!(
                tree.kind(statement),
                SyntaxKind::ImportDeclaration | SyntaxKind::ExportDeclaration
            )
        })
        .filter_map(|statement| {
            let literal = tree
                .arena
                .child_of_kind(statement, SyntaxKind::StringLiteral);
            if literal.is_none() {
                return None;
            }
            let text = tree.node_text(literal);
            let unquoted = text
                .strip_prefix(['"', '\''])
                .and_then(|t| t.strip_suffix(['"', '\'']))
                .unwrap_or(text);
            Some(unquoted.to_string())
        })
        .collect()
}

fn emit_file(
    tree: &mut SyntaxTree,
    oracle: &dyn TypeOracle,
    supplied: Option<&ContextTypes>,
    options: &PipelineOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let _span = debug_span!("emit_file", file = %tree.file_name).entered();
    if tree.is_declaration_file() {
        debug!("skipping declaration file");
        return None;
    }

    let mut context_types = collect_context_types(tree);
    if let Some(supplied) = supplied {
        context_types.extend(supplied.iter().map(|(node, text)| (*node, text.clone())));
    }

    let unwrapper = WrapperUnwrapper::new();
    let downlevel = DownlevelCallAnnotator::new(&context_types);
    let types = TypeAnnotator::new(oracle);
    let fileoverview = FileoverviewMerger::new(options.fileoverview_options.clone());

    // The fileoverview merger goes last: earlier passes may add comments in
    // front of the first statement.
    let mut passes: Vec<&dyn RewritePass> = Vec::new();
    if options.unwrap_wrappers {
        passes.push(&unwrapper);
    }
    if options.downlevel_calls {
        passes.push(&downlevel);
    }
    if options.type_annotations {
        passes.push(&types);
    }
    if options.fileoverview {
        passes.push(&fileoverview);
    }

    let mut ctx = TransformContext::new();
    let mut file = FileTransform::new(tree, &mut ctx, diagnostics);
    for pass in passes {
        let _pass = debug_span!("pass", name = pass.name()).entered();
        pass.run(&mut file);
    }

    match render_file(tree, &ctx) {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %tree.file_name, %err, "render failed");
            diagnostics.push(Diagnostic::error(
                tree.file_name.clone(),
                0,
                0,
                format!("Cannot render {}: {err}", tree.file_name),
                diagnostic_codes::RENDER_FAILED,
            ));
            None
        }
    }
}
