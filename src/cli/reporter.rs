use colored::Colorize;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use closurize_common::{Diagnostic, DiagnosticCategory};

/// Formats diagnostics as `file:line:column - category CZcode: message`.
/// Offsets are turned into line and column numbers using the source texts
/// registered with `add_source`; files without a registered source are
/// reported by name only.
pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, Arc<str>>,
    line_starts: FxHashMap<String, Vec<u32>>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: FxHashMap::default(),
            line_starts: FxHashMap::default(),
        }
    }

    pub fn add_source(&mut self, file: &str, text: Arc<str>) {
        self.line_starts.remove(file);
        self.sources.insert(file.to_string(), text);
    }

    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        out
    }

    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let location = match self.position_for(&diagnostic.file, diagnostic.start) {
            Some((line, column)) => format!("{}:{line}:{column}", diagnostic.file),
            None if diagnostic.file.is_empty() => "<unknown>".to_string(),
            None => diagnostic.file.clone(),
        };
        let location = if self.color {
            location.cyan().to_string()
        } else {
            location
        };

        let mut output = location;
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);
        output
    }

    /// One-line summary, e.g. `Found 2 errors and 1 warning.`
    pub fn summary(&self, diagnostics: &[Diagnostic]) -> String {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Warning)
            .count();
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        let text = format!(
            "Found {} and {}.",
            plural(errors, "error"),
            plural(warnings, "warning")
        );
        if self.color && errors > 0 {
            text.red().to_string()
        } else {
            text
        }
    }

    /// 1-based line and column of `offset`.
    fn position_for(&mut self, file: &str, offset: u32) -> Option<(u32, u32)> {
        let source = self.sources.get(file)?;
        let starts = self
            .line_starts
            .entry(file.to_string())
            .or_insert_with(|| line_starts(source));
        let line = starts.partition_point(|&start| start <= offset).max(1) - 1;
        let line_start = starts[line] as usize;
        let end = (offset as usize).min(source.len());
        let column = source
            .get(line_start..end)
            .map(|text| text.chars().count())
            .unwrap_or(0);
        Some((line as u32 + 1, column as u32 + 1))
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.to_string();
        if !self.color {
            return label;
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }
        let label = format!("CZ{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

fn line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0];
    starts.extend(
        text.bytes()
            .enumerate()
            .filter(|&(_, byte)| byte == b'\n')
            .map(|(i, _)| i as u32 + 1),
    );
    starts
}
