//! Module names derived from file paths.
//!
//! A file's module name is its path relative to the root directory with the
//! extension removed, path separators turned into `.`, and any character
//! outside `[A-Za-z0-9_$.]` replaced by `_`. `src/ui/date-picker.ts` under
//! root `src` becomes `ui.date_picker`.

use std::path::{Component, Path, PathBuf};

/// Extensions stripped from file names, longest first so `.d.ts` wins over
/// `.ts`.
const EXTENSIONS: &[&str] = &[
    ".d.mts", ".d.cts", ".d.ts", ".tsx", ".mts", ".cts", ".ts", ".jsx", ".mjs", ".cjs", ".js",
];

pub fn module_name_for_path(root_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root_dir).unwrap_or(path);
    let mut text = relative.to_string_lossy().replace('\\', "/");
    if let Some(ext) = EXTENSIONS.iter().find(|ext| text.ends_with(*ext)) {
        text.truncate(text.len() - ext.len());
    }
    text.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(sanitize_segment)
        .collect::<Vec<_>>()
        .join(".")
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Resolve a relative import specifier against the importing file.
/// Non-relative specifiers (packages) yield `None`.
pub fn resolve_specifier(importer: &Path, specifier: &str) -> Option<PathBuf> {
    if !is_relative_specifier(specifier) {
        return None;
    }
    let base = importer.parent().unwrap_or(Path::new(""));
    Some(normalize(&base.join(specifier)))
}

/// Module name a file refers to with `specifier`. Package specifiers are
/// kept as written.
pub fn module_name_for_specifier(root_dir: &Path, importer: &Path, specifier: &str) -> String {
    match resolve_specifier(importer, specifier) {
        Some(path) => module_name_for_path(root_dir, &path),
        None => specifier.to_string(),
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_for_path() {
        let root = Path::new("src");
        assert_eq!(module_name_for_path(root, Path::new("src/a.ts")), "a");
        assert_eq!(
            module_name_for_path(root, Path::new("src/ui/date-picker.tsx")),
            "ui.date_picker"
        );
        assert_eq!(
            module_name_for_path(root, Path::new("src/types/api.d.ts")),
            "types.api"
        );
        assert_eq!(module_name_for_path(root, Path::new("lib/x.js")), "lib.x");
        assert_eq!(module_name_for_path(Path::new(""), Path::new("a/$b.ts")), "a.$b");
    }

    #[test]
    fn test_resolve_specifier() {
        let importer = Path::new("src/ui/button.ts");
        assert_eq!(
            resolve_specifier(importer, "./icon"),
            Some(PathBuf::from("src/ui/icon"))
        );
        assert_eq!(
            resolve_specifier(importer, "../util/strings"),
            Some(PathBuf::from("src/util/strings"))
        );
        assert_eq!(resolve_specifier(importer, "lodash"), None);
    }

    #[test]
    fn test_module_name_for_specifier() {
        let root = Path::new("src");
        let importer = Path::new("src/ui/button.ts");
        assert_eq!(
            module_name_for_specifier(root, importer, "../util/strings"),
            "util.strings"
        );
        assert_eq!(
            module_name_for_specifier(root, importer, "@angular/core"),
            "@angular/core"
        );
    }
}
