//! tmplint-core: static validation of structured-logging message templates.
//!
//! Flags log message templates whose placeholder braces are malformed, e.g.
//! `logger.LogInformation("{UserId")`, before they fail at runtime.
//!
//! # How it works
//!
//! For every invocation handed in by a host adapter:
//!
//! 1. calls whose declaring type is not on the [`LoggingSurface`] are ignored;
//! 2. the template-bearing parameter is located (`message`, `messageFormat`,
//!    `formatString`, or `state` of `BeginScope`) and its argument bound;
//! 3. the argument is folded to literal text through constant `+` trees;
//! 4. the text is checked by [`is_valid_message_template`] and an `AA0008`
//!    diagnostic is reported at the argument when it fails.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tmplint_core::prelude::*;
//!
//! let analyzer = TemplateAnalyzer::new(LoggingSurface::default());
//! let mut diagnostics = Vec::new();
//! for call in &dump.call_sites {
//!     analyzer.analyze_call_site(call, &mut diagnostics);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`template`]: brace validator and template hole parser
//! - [`resolve`]: template parameter discovery and constant folding
//! - [`analyzer`]: per-call-site outcome classification
//! - [`model`]: host-neutral call-site description
//! - [`surface`]: the logging types under inspection
//! - [`diagnostic`]: rule descriptor, diagnostics and the reporting sink
//! - [`dump`]: discovery and loading of call-site dump files
//! - [`cache`]: SHA-256 keyed incremental cache
//! - [`builder`]: fluent configuration and orchestration
//! - [`error`]: typed error handling

pub mod analyzer;
pub mod builder;
pub mod cache;
pub mod config;
pub mod diagnostic;
pub mod dump;
pub mod error;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod surface;
pub mod template;

// Analysis
pub use analyzer::{NotApplicable, Outcome, TemplateAnalyzer};
pub use resolve::{
    bound_argument, find_template_parameter, parameter_role, resolve_call_site, resolve_text,
    ParameterRole, Resolution,
};
pub use template::{is_valid_message_template, Hole, TemplateError, TemplateFormatter};

// Model
pub use model::{
    Argument, CallSite, CallSiteDump, ConstantValue, Expr, Location, MethodSignature, ParamId,
    ParamType, Parameter, TemplateExpression,
};
pub use surface::{type_names, LoggingSurface};

// Diagnostics
pub use diagnostic::{Diagnostic, DiagnosticDescriptor, DiagnosticSink, Severity, INVALID_TEMPLATE_RULE};

// Error types
pub use error::{IoResultExt, TmplintError, TmplintResult};

// Builder API
pub use builder::{AnalysisResult, AnalysisStats, Tmplint};

// Cache
pub use cache::{
    incremental_analyze, load_cache, save_cache, CacheMetadata, CachedDump,
    DumpAnalysis, TmplintCache,
};

// Configuration
pub use config::{load_config, OutputConfig, SurfaceConfig, TmplintConfig};

// Dump discovery
pub use dump::{gather_dump_files, gather_dump_files_with_excludes, is_dump_file, load_dump, parse_dump};

// Logging
pub use logging::init_structured_logging;

// Reporting
pub use report::{format_plain, print_json, print_plain};
