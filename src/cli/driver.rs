use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::args::CliArgs;
use crate::cli::config::{ClosurizeConfig, load_config, resolve_options};
use crate::pipeline::{EmittedFile, Program, ProgramDump};
use closurize_common::Diagnostic;

/// Outcome of one CLI run.
#[derive(Debug, Default)]
pub struct RunResult {
    pub diagnostics: Vec<Diagnostic>,
    /// Rendered files. Declaration files and failed files have no text.
    pub outputs: Vec<EmittedFile>,
    /// Paths written under `--outDir`.
    pub emitted_files: Vec<PathBuf>,
    /// Source text per input file, for diagnostic locations.
    pub sources: Vec<(String, Arc<str>)>,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub fn read_program_dump(path: &Path) -> Result<ProgramDump> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    let dump = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse program dump: {}", path.display()))?;
    Ok(dump)
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let config = match &args.config {
        Some(path) => load_config(&cwd.join(path))?,
        None => ClosurizeConfig::default(),
    };
    let options = resolve_options(&config, args, cwd);
    debug!(?options, "resolved pipeline options");

    let dump = read_program_dump(&cwd.join(&args.input))?;
    let mut program = Program::from_dump(dump, options)?;
    let emitted = program.emit();

    let mut result = RunResult {
        diagnostics: emitted.diagnostics,
        sources: program
            .files()
            .iter()
            .map(|tree| (tree.file_name.clone(), tree.shared_text()))
            .collect(),
        ..RunResult::default()
    };

    if let Some(out_dir) = &args.out_dir {
        let out_dir = cwd.join(out_dir);
        for output in &emitted.outputs {
            let Some(text) = &output.text else {
                continue;
            };
            let target = out_dir.join(output_path(&program.options().root_dir, &output.file_name));
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(&target, text)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(file = %target.display(), "wrote output");
            result.emitted_files.push(target);
        }
    }

    if let Some(manifest_path) = &args.manifest {
        let manifest_path = cwd.join(manifest_path);
        let json = serde_json::to_string_pretty(&program.manifest().entries())
            .context("failed to serialize module manifest")?;
        std::fs::write(&manifest_path, json)
            .with_context(|| format!("failed to write manifest: {}", manifest_path.display()))?;
    }

    result.outputs = emitted.outputs;
    Ok(result)
}

/// Where a file lands under the output directory: its path relative to the
/// root directory, with `..` and absolute prefixes dropped so nothing is
/// written outside the output directory.
pub fn output_path(root_dir: &Path, file_name: &str) -> PathBuf {
    let path = Path::new(file_name);
    let relative = path.strip_prefix(root_dir).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
