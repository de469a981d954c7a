//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use tmplint_core::prelude::*;
//! ```

// Core analysis types
pub use crate::analyzer::{Outcome, TemplateAnalyzer};
pub use crate::diagnostic::{Diagnostic, DiagnosticSink};
pub use crate::error::{TmplintError, TmplintResult};
pub use crate::surface::LoggingSurface;
pub use crate::template::is_valid_message_template;

// Host model
pub use crate::model::{
    Argument, CallSite, Expr, Location, MethodSignature, ParamType, Parameter, TemplateExpression,
};

// Builder API
pub use crate::builder::{AnalysisResult, Tmplint};

// Configuration
pub use crate::config::{load_config, TmplintConfig};
