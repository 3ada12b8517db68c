//! `{{ .key }}` placeholder substitution over raw manifest text.
//!
//! Substitution runs once over the whole file before YAML parsing, so a
//! placeholder may stand anywhere in the document, map keys included.

use std::collections::BTreeMap;

use crate::error::{ArgumentError, TemplateError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Prefix for environment variables consulted by [`EnvFallback`].
pub const ENV_VAR_PREFIX: &str = "RKT_LAUNCH_VAR_";

/// A source of template variable values.
pub trait VariableSource {
    /// Returns the value bound to `key`, if any.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Variables supplied explicitly, usually through `--var KEY=VALUE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    vars: BTreeMap<String, String>,
}

impl RenderContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `value`, replacing any earlier binding.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Builds a context from `KEY=VALUE` strings.
    ///
    /// Only the first `=` separates key from value, so values may contain
    /// further `=` characters. Later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentError::MalformedVariable` when an entry has no `=` or
    /// an empty key.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = BTreeMap::new();
        for assignment in assignments {
            let raw = assignment.as_ref();
            let Some((key, value)) = raw.split_once('=') else {
                return Err(ArgumentError::MalformedVariable {
                    raw: raw.to_owned(),
                });
            };
            let trimmed_key = key.trim();
            if trimmed_key.is_empty() {
                return Err(ArgumentError::MalformedVariable {
                    raw: raw.to_owned(),
                });
            }
            vars.insert(trimmed_key.to_owned(), value.to_owned());
        }
        Ok(Self { vars })
    }
}

impl VariableSource for RenderContext {
    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Explicit variables first, then `RKT_LAUNCH_VAR_<KEY>` from the environment.
///
/// The environment key is the template key upper-cased with `-` and `.`
/// replaced by `_`.
pub struct EnvFallback<'a, E: mockable::Env> {
    context: &'a RenderContext,
    env: &'a E,
}

impl<'a, E: mockable::Env> EnvFallback<'a, E> {
    /// Layers `env` beneath `context`.
    #[must_use]
    pub const fn new(context: &'a RenderContext, env: &'a E) -> Self {
        Self { context, env }
    }

    /// Environment variable name consulted for `key`.
    #[must_use]
    pub fn env_var_name(key: &str) -> String {
        let suffix: String = key
            .chars()
            .map(|c| match c {
                '-' | '.' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        format!("{ENV_VAR_PREFIX}{suffix}")
    }
}

impl<E: mockable::Env> VariableSource for EnvFallback<'_, E> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.context
            .lookup(key)
            .or_else(|| self.env.string(&Self::env_var_name(key)))
    }
}

/// Replaces every `{{ .key }}` in `text` with its bound value.
///
/// # Errors
///
/// Returns `TemplateError::MissingKey` for the first placeholder whose key is
/// unbound, and `TemplateError::Malformed` for an unterminated `{{` or a body
/// that is not a `.key` reference.
pub fn resolve(text: &str, vars: &dyn VariableSource) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    let mut consumed = 0;

    while let Some(start) = rest.find(OPEN) {
        let (before, from_open) = rest.split_at(start);
        output.push_str(before);
        let offset = consumed + start;

        let after_open = from_open.get(OPEN.len()..).unwrap_or_default();
        let Some(end) = after_open.find(CLOSE) else {
            return Err(malformed(text, offset));
        };
        let (body, after_body) = after_open.split_at(end);
        let Some(key) = placeholder_key(body) else {
            return Err(malformed(text, offset));
        };

        let Some(value) = vars.lookup(key) else {
            let (line, column) = position(text, offset);
            return Err(TemplateError::MissingKey {
                key: key.to_owned(),
                line,
                column,
            });
        };
        output.push_str(&value);

        rest = after_body.get(CLOSE.len()..).unwrap_or_default();
        consumed = text.len() - rest.len();
    }

    output.push_str(rest);
    Ok(output)
}

/// Extracts `key` from a ` .key ` placeholder body.
fn placeholder_key(body: &str) -> Option<&str> {
    let key = body.trim().strip_prefix('.')?;
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(key)
}

fn malformed(text: &str, offset: usize) -> TemplateError {
    let (line, column) = position(text, offset);
    let snippet = text
        .get(offset..)
        .unwrap_or_default()
        .lines()
        .next()
        .unwrap_or_default()
        .to_owned();
    TemplateError::Malformed {
        snippet,
        line,
        column,
    }
}

/// One-based line and column of a byte offset.
fn position(text: &str, offset: usize) -> (usize, usize) {
    let prefix = text.get(..offset).unwrap_or(text);
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map_or(0, |idx| idx + 1);
    let column = prefix.get(line_start..).map_or(0, |s| s.chars().count()) + 1;
    (line, column)
}
