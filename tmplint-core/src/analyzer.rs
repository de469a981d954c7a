//! Per-compilation template analysis.
//!
//! A [`TemplateAnalyzer`] is created once per analysis session from the
//! logging surface and then handed every invocation in the program. It holds
//! no mutable state, so call sites may be analyzed from any number of threads.
//!
//! Outcomes other than [`Outcome::Invalid`] are absorbed here; only invalid
//! templates reach the [`DiagnosticSink`].

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::model::{CallSite, TemplateExpression};
use crate::resolve::{resolve_call_site, Resolution};
use crate::surface::LoggingSurface;
use crate::template::{is_valid_message_template, TemplateFormatter};

/// Why a call site was skipped without a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotApplicable {
    /// Declaring type is not on the logging surface.
    OutsideSurface,
    /// The target method has no template-bearing parameter.
    NoTemplateParameter,
    /// Nothing is bound to the template-bearing parameter.
    ArgumentNotBound,
    /// The resolved text could not be turned into a formatter.
    FormatterRejected,
}

/// Verdict for one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotApplicable(NotApplicable),
    /// Template argument is not statically known.
    Unresolvable,
    Valid,
    Invalid(Diagnostic),
}

impl Outcome {
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Invalid(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_diagnostic(self) -> Option<Diagnostic> {
        match self {
            Self::Invalid(d) => Some(d),
            _ => None,
        }
    }
}

/// Checks the message templates of logging calls.
#[derive(Debug, Clone, Default)]
pub struct TemplateAnalyzer {
    surface: LoggingSurface,
}

impl TemplateAnalyzer {
    /// Register the analysis for one session with its logging surface.
    pub fn new(surface: LoggingSurface) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &LoggingSurface {
        &self.surface
    }

    /// Classify one call site without reporting anything.
    pub fn classify<E: TemplateExpression>(&self, call: &CallSite<E>) -> Outcome {
        let method = &call.method;
        if !self.surface.contains(&method.declaring_type) {
            return Outcome::NotApplicable(NotApplicable::OutsideSurface);
        }

        let (text, expression) = match resolve_call_site(call) {
            Resolution::NoTemplateParameter => {
                return Outcome::NotApplicable(NotApplicable::NoTemplateParameter)
            }
            Resolution::Unbound => return Outcome::NotApplicable(NotApplicable::ArgumentNotBound),
            Resolution::Unresolvable { expression } => {
                trace!(
                    method = %method.name,
                    location = %expression.location(),
                    "template argument is not a constant"
                );
                return Outcome::Unresolvable;
            }
            Resolution::Resolved { text, expression } => (text, expression),
        };

        let formatter = match TemplateFormatter::new(text) {
            Ok(f) => f,
            Err(e) => {
                debug!(
                    method = %method.name,
                    location = %expression.location(),
                    error = %e,
                    "skipping template the formatter rejects"
                );
                return Outcome::NotApplicable(NotApplicable::FormatterRejected);
            }
        };

        if is_valid_message_template(Some(formatter.original_format())) {
            Outcome::Valid
        } else {
            Outcome::Invalid(Diagnostic::invalid_template(
                expression.location().clone(),
                formatter.original_format(),
            ))
        }
    }

    /// Analyze one call site, reporting an invalid template to `sink`.
    ///
    /// Returns true if a diagnostic was reported.
    pub fn analyze_call_site<E, S>(&self, call: &CallSite<E>, sink: &mut S) -> bool
    where
        E: TemplateExpression,
        S: DiagnosticSink + ?Sized,
    {
        match self.classify(call).into_diagnostic() {
            Some(diagnostic) => {
                sink.report(diagnostic);
                true
            }
            None => false,
        }
    }

    /// Analyze many call sites in parallel. Diagnostics keep input order.
    pub fn analyze_all<E>(&self, calls: &[CallSite<E>]) -> Vec<Diagnostic>
    where
        E: TemplateExpression + Sync,
    {
        calls
            .par_iter()
            .filter_map(|call| self.classify(call).into_diagnostic())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Argument, ConstantValue, Expr, Location, MethodSignature, ParamType, Parameter,
    };
    use crate::surface::type_names;

    fn loc(col: u32) -> Location {
        Location::new("Program.cs", 9, col, 3)
    }

    fn other(name: &str, ty: &str) -> Parameter {
        Parameter::new(name, ParamType::Other(ty.to_string()))
    }

    fn define_scope(template: Expr) -> CallSite {
        CallSite::new(
            MethodSignature::new(
                type_names::LOGGER_MESSAGE,
                "DefineScope",
                vec![Parameter::string("formatString")],
            ),
            vec![Argument::bound(0, template)],
        )
    }

    fn log_information(template: Expr) -> CallSite {
        CallSite::new(
            MethodSignature::new(
                type_names::LOGGER_EXTENSIONS,
                "LogInformation",
                vec![
                    other("logger", "ILogger"),
                    Parameter::string("message"),
                    other("args", "object[]"),
                ],
            ),
            vec![
                Argument::bound(0, Expr::other("local", loc(9))),
                Argument::bound(1, template),
            ],
        )
    }

    #[test]
    fn test_invalid_constant_reports_once_at_argument() {
        let analyzer = TemplateAnalyzer::default();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let reported = analyzer.analyze_call_site(&define_scope(Expr::string("{{One}", loc(40))), &mut sink);
        assert!(reported);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].location, loc(40));
        assert_eq!(sink[0].text, "{{One}");
    }

    #[test]
    fn test_valid_constant() {
        let analyzer = TemplateAnalyzer::default();
        let outcome = analyzer.classify(&define_scope(Expr::string(
            "Some logged value: {One}}} with an escaped brace",
            loc(40),
        )));
        assert_eq!(outcome, Outcome::Valid);
    }

    #[test]
    fn test_concatenation_is_validated_as_one_unit() {
        let analyzer = TemplateAnalyzer::default();
        // Each half is invalid on its own, the whole is fine
        let fine = Expr::add(Expr::string("{One", loc(30)), Expr::string("}", loc(40)), loc(30));
        assert_eq!(analyzer.classify(&log_information(fine)), Outcome::Valid);

        let broken = Expr::add(Expr::string("{One}", loc(30)), Expr::string("{", loc(40)), loc(30));
        let d = analyzer.classify(&log_information(broken)).into_diagnostic().unwrap();
        assert_eq!(d.text, "{One}{");
        assert_eq!(d.location, loc(30));
    }

    #[test]
    fn test_variable_template_is_unresolvable() {
        let analyzer = TemplateAnalyzer::default();
        let call = log_information(Expr::other("local", loc(30)));
        assert_eq!(analyzer.classify(&call), Outcome::Unresolvable);

        let mut sink: Vec<Diagnostic> = Vec::new();
        assert!(!analyzer.analyze_call_site(&call, &mut sink));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_outside_surface_is_never_inspected() {
        let analyzer = TemplateAnalyzer::default();
        let call = CallSite::new(
            MethodSignature::new("System.Console", "WriteLine", vec![Parameter::string("message")]),
            vec![Argument::bound(0, Expr::string("{", loc(20)))],
        );
        assert_eq!(
            analyzer.classify(&call),
            Outcome::NotApplicable(NotApplicable::OutsideSurface)
        );
    }

    #[test]
    fn test_every_level_method() {
        let analyzer = TemplateAnalyzer::default();
        for name in [
            "LogInformation",
            "LogDebug",
            "LogTrace",
            "LogWarning",
            "LogError",
            "LogCritical",
        ] {
            let mut call = log_information(Expr::string("{", loc(30)));
            call.method.name = name.to_string();
            assert!(
                analyzer.classify(&call).diagnostic().is_some(),
                "{name} should be inspected"
            );
        }
    }

    #[test]
    fn test_log_with_level() {
        let analyzer = TemplateAnalyzer::default();
        let call = CallSite::new(
            MethodSignature::new(
                type_names::LOGGER_EXTENSIONS,
                "Log",
                vec![
                    other("logger", "ILogger"),
                    other("logLevel", "LogLevel"),
                    Parameter::string("message"),
                ],
            ),
            vec![
                Argument::bound(0, Expr::other("local", loc(1))),
                Argument::bound(1, Expr::other("member_access", loc(12))),
                Argument::bound(2, Expr::string("{", loc(30))),
            ],
        );
        let d = analyzer.classify(&call).into_diagnostic().unwrap();
        assert_eq!(d.location.column, 30);
    }

    #[test]
    fn test_logger_message_define_with_event_id() {
        let analyzer = TemplateAnalyzer::default();
        let call = CallSite::new(
            MethodSignature::new(
                type_names::LOGGER_MESSAGE,
                "Define",
                vec![
                    other("logLevel", "LogLevel"),
                    other("eventId", "EventId"),
                    Parameter::string("formatString"),
                ],
            ),
            vec![
                Argument::bound(0, Expr::other("member_access", loc(1))),
                Argument::bound(1, Expr::other("object_creation", loc(20))),
                Argument::bound(2, Expr::string("{", loc(40))),
            ],
        );
        assert!(analyzer.classify(&call).diagnostic().is_some());
    }

    #[test]
    fn test_begin_scope_on_ilogger() {
        let analyzer = TemplateAnalyzer::default();
        let call = CallSite::new(
            MethodSignature::new(type_names::ILOGGER, "BeginScope", vec![Parameter::string("state")]),
            vec![Argument::bound(0, Expr::string("{Param", loc(20)))],
        );
        assert!(analyzer.classify(&call).diagnostic().is_some());
    }

    #[test]
    fn test_no_template_parameter() {
        let analyzer = TemplateAnalyzer::default();
        let call: CallSite = CallSite::new(
            MethodSignature::new(type_names::ILOGGER, "IsEnabled", vec![other("logLevel", "LogLevel")]),
            vec![],
        );
        assert_eq!(
            analyzer.classify(&call),
            Outcome::NotApplicable(NotApplicable::NoTemplateParameter)
        );
    }

    #[test]
    fn test_alignment_text_does_not_hide_report() {
        let analyzer = TemplateAnalyzer::default();
        for template in ["{Value,wide} {", "{Id,x:y}}{", "{Elapsed,-8:0.00}}"] {
            let d = analyzer
                .classify(&define_scope(Expr::string(template, loc(40))))
                .into_diagnostic();
            assert_eq!(d.map(|d| d.text), Some(template.to_string()), "{template}");
        }
        assert_eq!(
            analyzer.classify(&define_scope(Expr::string("{Value,wide}", loc(40)))),
            Outcome::Valid
        );
    }

    #[test]
    fn test_null_constant_is_not_reported() {
        let analyzer = TemplateAnalyzer::default();
        let null = Expr::Constant {
            value: ConstantValue::Null,
            location: loc(40),
        };
        assert_eq!(analyzer.classify(&define_scope(null)), Outcome::Unresolvable);
    }

    #[test]
    fn test_custom_surface() {
        let analyzer = TemplateAnalyzer::new(LoggingSurface::from_types(["Acme.Log"]));
        let call = CallSite::new(
            MethodSignature::new("Acme.Log", "Write", vec![Parameter::string("messageFormat")]),
            vec![Argument::bound(0, Expr::string("}", loc(5)))],
        );
        assert!(analyzer.classify(&call).diagnostic().is_some());
        assert_eq!(
            analyzer.classify(&define_scope(Expr::string("}", loc(5)))),
            Outcome::NotApplicable(NotApplicable::OutsideSurface)
        );
    }

    #[test]
    fn test_analyze_all_keeps_order() {
        let analyzer = TemplateAnalyzer::default();
        let calls: Vec<CallSite> = (0..64u32)
            .map(|i| {
                let text = if i % 3 == 0 { "{" } else { "{ok}" };
                define_scope(Expr::string(text, loc(i + 1)))
            })
            .collect();
        let diagnostics = analyzer.analyze_all(&calls);
        assert_eq!(diagnostics.len(), 22);
        let columns: Vec<u32> = diagnostics.iter().map(|d| d.location.column).collect();
        let mut sorted = columns.clone();
        sorted.sort_unstable();
        assert_eq!(columns, sorted);
    }

    #[test]
    fn test_analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateAnalyzer>();
    }
}
