//! The set of logging API types whose member calls are inspected.

use std::collections::BTreeSet;

/// Well-known type names of `Microsoft.Extensions.Logging`.
pub mod type_names {
    pub const ILOGGER: &str = "Microsoft.Extensions.Logging.ILogger";
    pub const LOGGER_EXTENSIONS: &str = "Microsoft.Extensions.Logging.LoggerExtensions";
    pub const LOGGER_MESSAGE: &str = "Microsoft.Extensions.Logging.LoggerMessage";
}

/// Type identities whose member calls are in scope for analysis.
///
/// Built once per analysis session and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSurface {
    types: BTreeSet<String>,
}

impl LoggingSurface {
    /// The logger interface, its extension helpers and the logger-message factory.
    pub fn microsoft_extensions_logging() -> Self {
        Self::from_types([
            type_names::ILOGGER,
            type_names::LOGGER_EXTENSIONS,
            type_names::LOGGER_MESSAGE,
        ])
    }

    /// A surface made of exactly the given type names.
    pub fn from_types(types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Add further types (e.g. an in-house logging facade).
    pub fn with_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, declaring_type: &str) -> bool {
        self.types.contains(declaring_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }
}

impl Default for LoggingSurface {
    fn default() -> Self {
        Self::microsoft_extensions_logging()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_surface() {
        let surface = LoggingSurface::default();
        assert_eq!(surface.len(), 3);
        assert!(surface.contains(type_names::ILOGGER));
        assert!(surface.contains(type_names::LOGGER_EXTENSIONS));
        assert!(surface.contains(type_names::LOGGER_MESSAGE));
        assert!(!surface.contains("System.Console"));
    }

    #[test]
    fn test_match_is_exact() {
        let surface = LoggingSurface::default();
        assert!(!surface.contains("ILogger"));
        assert!(!surface.contains("Microsoft.Extensions.Logging.ILogger`1"));
    }

    #[test]
    fn test_with_types() {
        let surface = LoggingSurface::default().with_types(["Acme.Log"]);
        assert_eq!(surface.len(), 4);
        assert!(surface.contains("Acme.Log"));
        assert_eq!(surface.iter().next(), Some("Acme.Log"));
    }
}
