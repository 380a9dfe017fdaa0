//! Logging for the `closurize` binary.
//!
//! Logging is off unless `CLOSURIZE_LOG` or `RUST_LOG` holds a filter
//! directive. `CLOSURIZE_LOG_FORMAT` picks how events are written to stderr:
//! `text` for one line per event, `tree` to nest each pass under the file it
//! runs on, or `json` for machine consumption.
//!
//! ```bash
//! # Which statements each pass rewrote
//! CLOSURIZE_LOG=debug CLOSURIZE_LOG_FORMAT=tree closurize program.json
//!
//! # Every splice the renderer makes
//! CLOSURIZE_LOG="closurize_emitter::printer=trace" closurize program.json
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Spans for files and passes become indented blocks.
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `CLOSURIZE_LOG` wins over `RUST_LOG`. `None` when neither is set.
fn log_filter() -> Option<EnvFilter> {
    match std::env::var("CLOSURIZE_LOG") {
        Ok(directives) => Some(EnvFilter::builder().parse_lossy(directives)),
        Err(_) if std::env::var_os("RUST_LOG").is_some() => Some(EnvFilter::from_default_env()),
        Err(_) => None,
    }
}

/// Install the global subscriber. Stdout carries rewritten files, so every
/// format writes to stderr.
pub fn init_tracing() {
    let Some(filter) = log_filter() else {
        return;
    };
    let format = LogFormat::parse(&std::env::var("CLOSURIZE_LOG_FORMAT").unwrap_or_default());

    match format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("fancy"), LogFormat::Text);
    }
}
