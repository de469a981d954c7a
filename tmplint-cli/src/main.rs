//! tmplint CLI - checks structured-logging message templates in call-site dumps.
//!
//! Features:
//! - Recursive discovery of `*.callsites.json` dumps
//! - Rayon-powered parallel analysis
//! - Incremental caching for faster re-analysis
//! - Plain text or JSON reports, CI-friendly exit codes

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use tmplint_core::{
    init_structured_logging, load_config, print_json, print_plain, report, AnalysisResult,
    Tmplint,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Static checker for logging message templates")]
pub struct Cli {
    /// Directory containing call-site dumps
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Dump path patterns to ignore
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Additional logging types to inspect (fully qualified names)
    #[arg(long = "surface-type", value_name = "TYPE")]
    surface_types: Vec<String>,

    /// Directory names to skip while scanning
    #[arg(long = "exclude-dir", value_name = "DIR")]
    exclude_dirs: Vec<String>,

    /// Disable the incremental cache
    #[arg(long)]
    no_cache: bool,

    /// Write the JSON report to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<String>,
}

/// Validates report output paths.
///
/// Rejects absolute paths, `..` components and null bytes.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    if p
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

/// Assemble the analysis from CLI flags layered over `tmplint.toml`.
fn build_analysis(cli: &Cli, root: &Path) -> Result<(Tmplint, bool)> {
    let config = load_config(root)?;

    let mut tmplint = Tmplint::new(root)
        .with_cache(!cli.no_cache)
        .exclude_dirs(cli.exclude_dirs.iter().cloned())
        .ignore_patterns(cli.ignore.iter().cloned())
        .surface_types(cli.surface_types.iter().cloned());

    let mut json = cli.json;
    if let Some(cfg) = &config {
        tmplint = tmplint.apply_config(cfg);
        json |= cfg.wants_json();
    }

    Ok((tmplint, json))
}

fn write_report(path: &str, result: &AnalysisResult) -> Result<()> {
    let out = validate_output_path(path)?;
    let json = serde_json::to_string_pretty(&report::to_json(result))?;
    fs::write(&out, json).with_context(|| format!("Failed to write report: {}", out.display()))?;
    eprintln!("Report written to {}", out.display());
    Ok(())
}

fn run(cli: &Cli) -> Result<AnalysisResult> {
    let root = Path::new(&cli.path);
    let (tmplint, json) = build_analysis(cli, root)?;
    let result = tmplint
        .analyze()
        .with_context(|| format!("Failed to analyze dumps under: {}", cli.path))?;

    if let Some(path) = &cli.output {
        write_report(path, &result)?;
    } else if json {
        print_json(&result);
    } else {
        print_plain(&result);
    }

    Ok(result)
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] tmplint internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
        std::process::exit(2);
    }));

    // JSON to stderr, respects RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();
    let result = run(&cli)?;

    std::process::exit(if result.is_clean() { 0 } else { 1 });
}
