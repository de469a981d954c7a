//! Diagnostic descriptor, reported diagnostics and the host-facing sink.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Location;

/// How seriously a host should treat a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hidden => "hidden",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Static metadata of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Message with a single `{0}` slot for the offending text
    pub message_format: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub enabled_by_default: bool,
    pub description: &'static str,
}

impl DiagnosticDescriptor {
    /// Fill the `{0}` slot of the message format.
    pub fn format_message(&self, argument: &str) -> String {
        self.message_format.replacen("{0}", argument, 1)
    }
}

/// The only rule this crate reports.
pub const INVALID_TEMPLATE_RULE: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "AA0008",
    title: "Invalid logging message template",
    message_format: "Logging message template is invalid: '{0}'",
    category: "Usage",
    severity: Severity::Error,
    enabled_by_default: true,
    description: "Placeholders in a logging message template must be opened and closed \
                  with single braces and may not nest; literal braces must be doubled.",
};

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
    /// The resolved template text the diagnostic is about
    pub text: String,
}

impl Diagnostic {
    /// An invalid-template diagnostic at `location` carrying `text`.
    pub fn invalid_template(location: Location, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            rule_id: INVALID_TEMPLATE_RULE.id.to_string(),
            severity: INVALID_TEMPLATE_RULE.severity,
            message: INVALID_TEMPLATE_RULE.format_message(&text),
            location,
            text,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.location, self.severity, self.rule_id, self.message
        )
    }
}

/// Receives diagnostics from the analyzer.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_template_diagnostic() {
        let d = Diagnostic::invalid_template(Location::new("Program.cs", 9, 44, 7), "{{One}");
        assert_eq!(d.rule_id, "AA0008");
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.text, "{{One}");
        assert_eq!(d.message, "Logging message template is invalid: '{{One}'");
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::invalid_template(Location::new("Program.cs", 9, 44, 3), "{");
        assert_eq!(
            d.to_string(),
            "Program.cs:9:44: error[AA0008]: Logging message template is invalid: '{'"
        );
    }

    #[test]
    fn test_format_message_fills_only_first_slot() {
        // The argument itself may contain "{0}"
        assert_eq!(
            INVALID_TEMPLATE_RULE.format_message("{0}{"),
            "Logging message template is invalid: '{0}{'"
        );
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(Diagnostic::invalid_template(Location::new("a.cs", 1, 1, 1), "}"));
        assert_eq!(sink.len(), 1);
    }
}
