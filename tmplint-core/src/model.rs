//! Host-neutral description of the call sites under analysis.
//!
//! A host adapter walks its own syntax/semantic model and fills these types
//! in, either in memory or as JSON call-site dumps (see [`crate::dump`]).
//! Everything here is read-only input to the analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source span of an expression or call. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// Span length in characters (0 if unknown)
    #[serde(default)]
    pub length: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32, length: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            length,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Parameter type as far as template analysis cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// The host language's built-in string type
    String,
    /// Any other type, by display name
    Other(String),
}

impl ParamType {
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }
}

/// Identity of a parameter: its ordinal in the declaring method's parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }
}

/// The method an invocation binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    /// Fully qualified name of the declaring type
    pub declaring_type: String,
    pub parameters: Vec<Parameter>,
}

impl MethodSignature {
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            parameters,
        }
    }

    pub fn parameter(&self, id: ParamId) -> Option<&Parameter> {
        self.parameters.get(id.0)
    }
}

/// Compile-time constant value of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConstantValue {
    String(String),
    /// Non-string constant (number, enum member, ...), by display text
    Other(String),
    Null,
}

/// Argument expression tree, reduced to the shapes the resolver understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Expression with a compile-time constant value (literal, const field, folded expression)
    Constant {
        value: ConstantValue,
        location: Location,
    },
    /// String `+`. A left-nested chain `a + b + c` is a single node with
    /// operands in source order.
    Concat {
        operands: Vec<Expr>,
        location: Location,
    },
    /// Anything else: locals, calls, interpolations, ...
    Other {
        /// Host's name for the expression shape, for diagnostics and logs
        syntax: String,
        location: Location,
    },
}

impl Expr {
    pub fn string(value: impl Into<String>, location: Location) -> Self {
        Self::Constant {
            value: ConstantValue::String(value.into()),
            location,
        }
    }

    /// `left + right`, appended to `left` when it already is a concatenation.
    pub fn add(left: Expr, right: Expr, location: Location) -> Self {
        let mut operands = match left {
            Self::Concat { operands, .. } => operands,
            other => vec![other],
        };
        operands.push(right);
        Self::Concat { operands, location }
    }

    pub fn concat(operands: Vec<Expr>, location: Location) -> Self {
        Self::Concat { operands, location }
    }

    pub fn other(syntax: impl Into<String>, location: Location) -> Self {
        Self::Other {
            syntax: syntax.into(),
            location,
        }
    }
}

/// What the resolver needs to know about an argument expression.
///
/// Implement this for the host's own expression type to run the analysis
/// without converting into [`Expr`].
pub trait TemplateExpression {
    /// Value of the expression if it is a compile-time constant string.
    fn constant_string(&self) -> Option<&str>;

    /// Operands, in source order, if the expression is a string addition.
    /// A binary `+` has two.
    fn concat_operands(&self) -> Option<Vec<&Self>>;

    /// Where the expression sits in source, for diagnostic anchoring.
    fn location(&self) -> &Location;
}

impl TemplateExpression for Expr {
    fn constant_string(&self) -> Option<&str> {
        match self {
            Self::Constant {
                value: ConstantValue::String(s),
                ..
            } => Some(s),
            _ => None,
        }
    }

    fn concat_operands(&self) -> Option<Vec<&Self>> {
        match self {
            Self::Concat { operands, .. } => Some(operands.iter().collect()),
            _ => None,
        }
    }

    fn location(&self) -> &Location {
        match self {
            Self::Constant { location, .. }
            | Self::Concat { location, .. }
            | Self::Other { location, .. } => location,
        }
    }
}

/// An argument of an invocation with the parameter it binds to.
///
/// Either side may be absent (e.g. an unbound `params` array or an omitted
/// optional argument), in which case the argument never binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument<E = Expr> {
    pub parameter: Option<ParamId>,
    pub value: Option<E>,
}

impl<E> Argument<E> {
    pub fn bound(parameter: usize, value: E) -> Self {
        Self {
            parameter: Some(ParamId(parameter)),
            value: Some(value),
        }
    }
}

/// One invocation in the program under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite<E = Expr> {
    pub method: MethodSignature,
    pub arguments: Vec<Argument<E>>,
    /// Location of the whole invocation
    pub location: Option<Location>,
}

impl<E> CallSite<E> {
    pub fn new(method: MethodSignature, arguments: Vec<Argument<E>>) -> Self {
        Self {
            method,
            arguments,
            location: None,
        }
    }
}

/// All call sites recorded for one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteDump {
    /// Compilation (project/assembly) name
    #[serde(default)]
    pub compilation: String,
    #[serde(default)]
    pub call_sites: Vec<CallSite>,
}
