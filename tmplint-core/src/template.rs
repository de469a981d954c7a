//! Message template validation and hole parsing.
//!
//! A message template is a format string with named placeholders delimited by
//! single braces (`{Name}`). Doubled braces (`{{`, `}}`) stand for a literal
//! brace character.
//!
//! Two independent views of a template live here:
//!
//! - [`is_valid_message_template`]: the brace-balance check used to flag
//!   malformed templates. A two-state machine (placeholder open / closed) with
//!   one character of lookahead to recognise doubled braces.
//! - [`TemplateFormatter`]: the lenient hole parser a runtime log-values
//!   formatter would build over the same text. It never rejects unbalanced
//!   braces and copies alignment and format text verbatim.

use thiserror::Error;

/// Is the message template valid?
///
/// Valid means: no unclosed placeholder, no closing brace without an opening
/// one, and no unescaped brace inside an open placeholder. `None` (a missing
/// template) is never valid.
///
/// Returns as soon as an invalid transition is seen. Invalid transitions are
/// absorbing, so scanning the rest of the input could not change the verdict.
pub fn is_valid_message_template(message_template: Option<&str>) -> bool {
    let Some(template) = message_template else {
        return false;
    };

    // Braces are ASCII, so byte scanning never splits a multi-byte char that matters.
    let bytes = template.as_bytes();
    let mut index = 0;
    let mut open = false;

    while let Some(&current) = bytes.get(index) {
        let doubled = bytes.get(index + 1) == Some(&current);
        match current {
            b'{' => {
                if doubled {
                    index += 1;
                } else if open {
                    return false;
                } else {
                    open = true;
                }
            }
            b'}' => {
                if open {
                    open = false;
                } else if doubled {
                    index += 1;
                } else {
                    return false;
                }
            }
            _ => {}
        }
        index += 1;
    }

    !open
}

/// Errors raised while building a [`TemplateFormatter`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A located hole does not fall on character boundaries of the text.
    #[error("placeholder at bytes {start}..{end} is not a slice of the template")]
    HoleOutOfBounds { start: usize, end: usize },
}

/// One `{Name[,alignment][:format]}` hole of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hole {
    /// Placeholder name, as written (may be empty).
    pub name: String,
    /// Alignment text after `,`, unparsed.
    pub alignment: Option<String>,
    /// Format specifier after `:`.
    pub format: Option<String>,
}

/// Parsed view of a template: the original text plus its named holes.
///
/// Parsing mirrors how structured loggers locate holes at render time: the
/// opening brace of a hole is the last of an odd-length run of `{`, the closing
/// brace the first of an odd-length run of `}`. Text without a matching closer
/// is left as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFormatter {
    original_format: String,
    holes: Vec<Hole>,
}

impl TemplateFormatter {
    /// Parse `format` into holes.
    pub fn new(format: impl Into<String>) -> Result<Self, TemplateError> {
        let original_format = format.into();
        let holes = parse_holes(&original_format)?;
        Ok(Self {
            original_format,
            holes,
        })
    }

    /// The template text exactly as supplied.
    pub fn original_format(&self) -> &str {
        &self.original_format
    }

    /// All holes, in order of appearance.
    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Placeholder names, in order of appearance.
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.holes.iter().map(|h| h.name.as_str())
    }
}

fn parse_holes(format: &str) -> Result<Vec<Hole>, TemplateError> {
    let bytes = format.as_bytes();
    let end = bytes.len();
    let mut holes = Vec::new();
    let mut scan = 0;

    while scan < end {
        let open = find_brace_index(bytes, b'{', scan, end);
        if open == end {
            break;
        }
        let close = find_brace_index(bytes, b'}', open, end);
        if close == end {
            break;
        }

        let body = format
            .get(open + 1..close)
            .ok_or(TemplateError::HoleOutOfBounds {
                start: open + 1,
                end: close,
            })?;
        holes.push(parse_hole(body));
        scan = close + 1;
    }

    Ok(holes)
}

/// Locate the brace that delimits a hole, skipping even-length (escaped) runs.
///
/// Returns `end` when no such brace exists.
fn find_brace_index(bytes: &[u8], brace: u8, start: usize, end: usize) -> usize {
    let mut brace_index = end;
    let mut run = 0usize;

    for (index, &byte) in bytes.iter().enumerate().take(end).skip(start) {
        if run > 0 && byte != brace {
            if run % 2 == 0 {
                run = 0;
                brace_index = end;
            } else {
                break;
            }
        } else if byte == brace {
            // '}' keeps the first of the run, '{' the last.
            if brace != b'}' || run == 0 {
                brace_index = index;
            }
            run += 1;
        }
    }

    brace_index
}

/// Split a hole body at the first `,` or `:`. Nothing after the name is
/// interpreted, matching what the runtime formatter copies into its
/// composite format.
fn parse_hole(body: &str) -> Hole {
    let Some(split) = body.find([',', ':']) else {
        return Hole {
            name: body.to_string(),
            alignment: None,
            format: None,
        };
    };

    let (name, rest) = body.split_at(split);
    let (alignment, format) = match rest.strip_prefix(',') {
        Some(after) => match after.split_once(':') {
            Some((alignment, format)) => (Some(alignment), Some(format)),
            None => (Some(after), None),
        },
        None => (None, rest.strip_prefix(':')),
    };

    Hole {
        name: name.to_string(),
        alignment: alignment.map(str::to_string),
        format: format.map(str::to_string),
    }
}
