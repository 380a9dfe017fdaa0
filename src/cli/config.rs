use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::cli::args::CliArgs;
use crate::pipeline::PipelineOptions;

/// Boolean options accept `true` as well as `"true"`, the way hand-edited
/// config files often spell them.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// Contents of a closurize config file. Unset fields keep their defaults.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClosurizeConfig {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub unwrap_wrappers: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub downlevel_calls: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub type_annotations: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub fileoverview: Option<bool>,
    /// Values required in the file overview's `@suppress {...}`.
    #[serde(default)]
    pub suppressions: Option<Vec<String>>,
    /// Text of a newly created `@fileoverview` tag.
    #[serde(default)]
    pub fileoverview_text: Option<String>,
    /// Relative to the config file.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
}

pub fn parse_config(source: &str) -> Result<ClosurizeConfig> {
    let config = serde_json::from_str(source).context("failed to parse config JSON")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<ClosurizeConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config =
        parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))?;
    if let Some(root_dir) = config.root_dir.take() {
        let base = path.parent().unwrap_or(Path::new(""));
        config.root_dir = Some(base.join(root_dir));
    }
    Ok(config)
}

/// Pipeline options from the config file, with command line flags applied on
/// top. A `--noX` flag always wins over the file.
pub fn resolve_options(config: &ClosurizeConfig, args: &CliArgs, cwd: &Path) -> PipelineOptions {
    let mut options = PipelineOptions::default();

    options.unwrap_wrappers = config.unwrap_wrappers.unwrap_or(true) && !args.no_unwrap;
    options.downlevel_calls = config.downlevel_calls.unwrap_or(true) && !args.no_downlevel;
    options.type_annotations = config.type_annotations.unwrap_or(true) && !args.no_types;
    options.fileoverview = config.fileoverview.unwrap_or(true) && !args.no_fileoverview;

    if let Some(suppressions) = &config.suppressions {
        options.fileoverview_options.suppressions = suppressions.clone();
    }
    if let Some(text) = &config.fileoverview_text {
        options.fileoverview_options.overview_text = text.clone();
    }

    options.root_dir = match (&args.root_dir, &config.root_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => dir.clone(),
        (None, None) => cwd.to_path_buf(),
    };
    options
}
