use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the closurize binary.
#[derive(Parser, Debug)]
#[command(
    name = "closurize",
    version,
    about = "Annotate typed TypeScript output with Closure JSDoc and remove wrapper scaffolding"
)]
pub struct CliArgs {
    /// Program dump written by the TypeScript front end.
    pub input: PathBuf,

    /// Directory for rewritten files. Without it, files are printed to stdout.
    #[arg(short = 'o', long = "outDir", alias = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Module names are file paths relative to this directory.
    #[arg(long = "rootDir", alias = "root-dir")]
    pub root_dir: Option<PathBuf>,

    /// Write the module manifest (JSON) to this file.
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Keep wrapper IIFEs around classes.
    #[arg(long = "noUnwrap", alias = "no-unwrap")]
    pub no_unwrap: bool,

    /// Do not add or merge the file overview comment.
    #[arg(long = "noFileoverview", alias = "no-fileoverview")]
    pub no_fileoverview: bool,

    /// Do not annotate `__awaiter` bodies with `@this`.
    #[arg(long = "noDownlevel", alias = "no-downlevel")]
    pub no_downlevel: bool,

    /// Do not add type annotations.
    #[arg(long = "noTypes", alias = "no-types")]
    pub no_types: bool,

    /// Colorize diagnostics. Defaults to whether stderr is a terminal.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub pretty: Option<bool>,
}
