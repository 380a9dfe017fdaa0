use super::reporter::Reporter;
use closurize_common::Diagnostic;
use closurize_common::diagnostics::diagnostic_codes;
use std::sync::Arc;

#[test]
fn formats_location_from_registered_source() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("a.js", Arc::from("let x;\n/** @type */\nlet y;\n"));
    let diagnostic = Diagnostic::warning(
        "a.js",
        11,
        5,
        "redundant tag",
        diagnostic_codes::JSDOC_TAG_WARNING,
    );
    assert_eq!(
        reporter.format_diagnostic(&diagnostic),
        "a.js:2:5 - warning CZ9001: redundant tag"
    );
}

#[test]
fn unknown_source_reports_file_name_only() {
    let mut reporter = Reporter::new(false);
    let diagnostic = Diagnostic::error("b.js", 0, 0, "cannot render", diagnostic_codes::RENDER_FAILED);
    assert_eq!(
        reporter.render(&[diagnostic]),
        "b.js - error CZ9003: cannot render\n"
    );
}

#[test]
fn summary_counts_categories() {
    let reporter = Reporter::new(false);
    let diagnostics = vec![
        Diagnostic::error("a.js", 0, 0, "x", 1),
        Diagnostic::warning("a.js", 0, 0, "y", 2),
        Diagnostic::warning("a.js", 0, 0, "z", 3),
    ];
    assert_eq!(reporter.summary(&diagnostics), "Found 1 error and 2 warnings.");
}
