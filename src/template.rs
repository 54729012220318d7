//! Path template interpolation
//!
//! Stream paths carry `{placeholder}` segments such as
//! `/v1/organizations/{organization_name}/groups`. Placeholders are filled
//! from a [`Context`]; any placeholder the context cannot resolve is an
//! error and no request is made.
//!
//! Rendering yields raw path segments. A substituted value always stays
//! inside its own segment: the URL layer percent-encodes `/`, `?`, `#` and
//! friends when the segments are appended.

use crate::context::{value_to_string, Context};
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching template placeholders: {name}
static TEMPLATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}").unwrap());

/// Render a path template into unencoded segments
pub fn render_segments(template: &str, ctx: &Context) -> Result<Vec<String>> {
    let mut missing = Vec::new();

    let segments: Vec<String> = template
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            TEMPLATE_REGEX
                .replace_all(segment, |cap: &regex::Captures<'_>| {
                    let name = &cap[1];
                    match ctx.get(name) {
                        Some(value) => value_to_string(value),
                        None => {
                            missing.push(name.to_string());
                            String::new()
                        }
                    }
                })
                .into_owned()
        })
        .collect();

    if missing.is_empty() {
        Ok(segments)
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains template placeholders
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all placeholder names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}
