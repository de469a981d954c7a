//! Builder pattern API for tmplint analysis.
//!
//! ```rust,ignore
//! use tmplint_core::prelude::*;
//!
//! let result = Tmplint::new("/path/to/dumps")
//!     .with_cache(true)
//!     .surface_types(["Acme.Logging.LogFacade"])
//!     .analyze()?;
//!
//! for d in &result.diagnostics {
//!     println!("{d}");
//! }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::analyzer::TemplateAnalyzer;
use crate::cache::{self, DumpAnalysis};
use crate::config::TmplintConfig;
use crate::diagnostic::Diagnostic;
use crate::dump::{gather_dump_files_with_excludes, is_ignored};
use crate::error::TmplintError;
use crate::surface::LoggingSurface;

/// Builder for configuring a template check over a directory of dumps.
#[derive(Debug, Clone)]
pub struct Tmplint {
    /// Root directory to scan for call-site dumps
    root: PathBuf,

    /// Whether to use the incremental cache
    use_cache: bool,

    /// Directory names pruned during discovery
    excluded_dirs: Vec<String>,

    /// Dump paths containing any of these are skipped
    ignored_patterns: Vec<String>,

    /// Types added to the built-in logging surface
    extra_surface_types: Vec<String>,
}

impl Tmplint {
    /// Create a new analysis builder for the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            use_cache: true,
            excluded_dirs: Vec::new(),
            ignored_patterns: Vec::new(),
            extra_surface_types: Vec::new(),
        }
    }

    /// Enable or disable incremental caching.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Add directories to exclude from scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Add patterns for dump paths to ignore.
    pub fn ignore_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add logging types to inspect besides the built-in ones.
    pub fn surface_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_surface_types.extend(types.into_iter().map(Into::into));
        self
    }

    /// Merge settings from a loaded `tmplint.toml`.
    pub fn apply_config(self, config: &TmplintConfig) -> Self {
        self.ignore_patterns(config.ignore_patterns().iter().cloned())
            .surface_types(config.extra_surface_types().iter().cloned())
    }

    /// The logging surface this configuration analyzes against.
    pub fn surface(&self) -> LoggingSurface {
        LoggingSurface::default().with_types(self.extra_surface_types.iter().cloned())
    }

    /// Run the analysis and return results.
    pub fn analyze(&self) -> Result<AnalysisResult> {
        if !self.root.is_dir() {
            return Err(TmplintError::invalid_argument(format!(
                "not a directory: {}",
                self.root.display()
            ))
            .into());
        }

        let excludes: Vec<&str> = self.excluded_dirs.iter().map(String::as_str).collect();
        let files: Vec<PathBuf> = gather_dump_files_with_excludes(&self.root, &excludes)
            .context("Failed to gather call-site dumps")?
            .into_iter()
            .filter(|f| {
                let relative = f.strip_prefix(&self.root).unwrap_or(f);
                !is_ignored(relative, &self.ignored_patterns)
            })
            .collect();

        let analyzer = TemplateAnalyzer::new(self.surface());
        let old_cache = if self.use_cache {
            cache::load_cache(&self.root, analyzer.surface())
        } else {
            None
        };

        let (dumps, new_cache) = cache::incremental_analyze(&analyzer, &files, old_cache);

        if self.use_cache {
            if let Err(e) = cache::save_cache(&self.root, &new_cache) {
                warn!(error = %e, "failed to save cache");
            }
        }

        let result = AnalysisResult::from_dumps(files.len(), dumps);
        info!(
            dump_files = result.stats.dump_files,
            call_sites = result.stats.call_sites,
            invalid_templates = result.stats.invalid_templates,
            "analysis complete"
        );
        Ok(result)
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Dumps found after ignore filtering
    pub dump_files: usize,
    /// Dumps that were read successfully
    pub analyzed_files: usize,
    /// Dumps served from the cache
    pub cached_files: usize,
    pub call_sites: usize,
    pub invalid_templates: usize,
}

/// Result of a complete analysis.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// All diagnostics, sorted by location
    pub diagnostics: Vec<Diagnostic>,
    /// Per-dump results, in path order
    pub dumps: Vec<DumpAnalysis>,
    pub stats: AnalysisStats,
}

impl AnalysisResult {
    fn from_dumps(dump_files: usize, mut dumps: Vec<DumpAnalysis>) -> Self {
        dumps.sort_by(|a, b| a.path.cmp(&b.path));

        let mut diagnostics: Vec<Diagnostic> = dumps
            .iter()
            .flat_map(|d| d.diagnostics.iter().cloned())
            .collect();
        diagnostics.sort_by(|a, b| a.location.cmp(&b.location).then_with(|| a.text.cmp(&b.text)));

        let stats = AnalysisStats {
            dump_files,
            analyzed_files: dumps.len(),
            cached_files: dumps.iter().filter(|d| d.cached).count(),
            call_sites: dumps.iter().map(|d| d.call_sites).sum(),
            invalid_templates: diagnostics.len(),
        };

        Self {
            diagnostics,
            dumps,
            stats,
        }
    }

    /// True if no invalid template was found.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
