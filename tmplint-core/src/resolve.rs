//! Template argument discovery and static text resolution.
//!
//! Given a call on the logging surface:
//! 1. find the template-bearing parameter of the target method,
//! 2. find the argument bound to that parameter (by identity, not position),
//! 3. fold the argument to literal text through constant `+` trees.
//!
//! Anything that cannot be folded is left alone: dynamically built templates
//! are out of reach for a static check.

use crate::model::{CallSite, MethodSignature, ParamId, Parameter, TemplateExpression};

/// Parameter names that carry a message template.
pub const TEMPLATE_PARAMETER_NAMES: &[&str] = &["message", "messageFormat", "formatString"];

/// `logger.BeginScope("{Param}")` binds to the generic `BeginScope<TState>(TState state)`,
/// whose `state` parameter is the template once instantiated with `string`.
pub const BEGIN_SCOPE_METHOD: &str = "BeginScope";
pub const SCOPE_STATE_PARAMETER: &str = "state";

/// Role a parameter plays in template analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    TemplateBearing,
    Ordinary,
}

/// Classify one parameter of `method`.
pub fn parameter_role(method: &MethodSignature, parameter: &Parameter) -> ParameterRole {
    if !parameter.ty.is_string() {
        return ParameterRole::Ordinary;
    }

    let name = parameter.name.as_str();
    if TEMPLATE_PARAMETER_NAMES.contains(&name)
        || (method.name == BEGIN_SCOPE_METHOD && name == SCOPE_STATE_PARAMETER)
    {
        ParameterRole::TemplateBearing
    } else {
        ParameterRole::Ordinary
    }
}

/// Find the template-bearing parameter. When several match, the last one wins.
pub fn find_template_parameter(method: &MethodSignature) -> Option<ParamId> {
    method
        .parameters
        .iter()
        .enumerate()
        .filter(|(_, p)| parameter_role(method, p) == ParameterRole::TemplateBearing)
        .map(|(i, _)| ParamId(i))
        .last()
}

/// The expression bound to `parameter`, if any.
pub fn bound_argument<E>(call: &CallSite<E>, parameter: ParamId) -> Option<&E> {
    call.arguments
        .iter()
        .find(|arg| arg.parameter == Some(parameter))
        .and_then(|arg| arg.value.as_ref())
}

enum Step<'a, E> {
    Resolve(&'a E),
    /// Join the last `n` resolved values.
    Concat(usize),
}

/// Statically resolve `expr` to literal text.
///
/// Constant strings resolve to their value; a `+` resolves to the
/// concatenation of its operands if all of them resolve. Everything else is
/// unresolvable. Uses an explicit work stack, so arbitrarily deep
/// concatenation chains cost linear time and no call-stack depth.
pub fn resolve_text<E: TemplateExpression>(expr: &E) -> Option<String> {
    let mut work = vec![Step::Resolve(expr)];
    let mut values: Vec<String> = Vec::new();

    while let Some(step) = work.pop() {
        match step {
            Step::Resolve(e) => {
                if let Some(text) = e.constant_string() {
                    values.push(text.to_string());
                } else if let Some(operands) = e.concat_operands() {
                    work.push(Step::Concat(operands.len()));
                    work.extend(operands.into_iter().rev().map(Step::Resolve));
                } else {
                    return None;
                }
            }
            Step::Concat(n) => {
                let start = values.len().checked_sub(n)?;
                let joined: String = values.drain(start..).collect();
                values.push(joined);
            }
        }
    }

    values.pop()
}

/// Result of resolving a call site's template argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a, E> {
    /// The method has no template-bearing parameter.
    NoTemplateParameter,
    /// No argument is bound to the template-bearing parameter.
    Unbound,
    /// The argument's text is not statically known.
    Unresolvable { expression: &'a E },
    /// Literal template text and the expression it came from.
    Resolved { text: String, expression: &'a E },
}

/// Run discovery, binding and folding for one call site.
///
/// Does not check the logging surface; callers decide which calls qualify.
pub fn resolve_call_site<E: TemplateExpression>(call: &CallSite<E>) -> Resolution<'_, E> {
    let Some(parameter) = find_template_parameter(&call.method) else {
        return Resolution::NoTemplateParameter;
    };
    let Some(expression) = bound_argument(call, parameter) else {
        return Resolution::Unbound;
    };

    match resolve_text(expression) {
        Some(text) => Resolution::Resolved { text, expression },
        None => Resolution::Unresolvable { expression },
    }
}
