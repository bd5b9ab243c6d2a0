// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rendering of custom env var templates
//!
//! Templates use minijinja syntax with strict undefined handling. Leading
//! dots in expressions (`{{ .status.host }}`) are accepted and stripped, and
//! `marshal` renders any sub-tree as compact JSON, either as a function
//! (`{{ marshal(status) }}`) or as a filter (`{{ status | marshal }}`).

use crate::error::TemplateError;
use crate::types::CustomEnvVar;
use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub struct CustomEnvParser {
    env: Environment<'static>,
}

impl Default for CustomEnvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomEnvParser {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_function("marshal", marshal);
        env.add_filter("marshal", marshal);
        Self { env }
    }

    /// Render a single template against `context`.
    pub fn render(
        &self,
        template: &CustomEnvVar,
        context: &serde_json::Value,
    ) -> Result<String, TemplateError> {
        let normalized = normalize_leading_dots(&template.value);
        self.env
            .render_str(&normalized, context)
            .map_err(|source| TemplateError {
                name: template.name.clone(),
                source,
            })
    }

    /// Render every template in order; the first failure aborts.
    #[instrument(skip_all, fields(templates = templates.len()))]
    pub fn parse(
        &self,
        templates: &[CustomEnvVar],
        context: &serde_json::Value,
    ) -> Result<BTreeMap<String, String>, TemplateError> {
        let mut rendered = BTreeMap::new();
        for template in templates {
            let value = self.render(template, context)?;
            debug!("Rendered custom env var {}", template.name);
            rendered.insert(template.name.clone(), value);
        }
        Ok(rendered)
    }
}

/// Compact JSON text of any value.
///
/// Usage: `{{ marshal(status) }}` or `{{ status | marshal }}`
fn marshal(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot marshal value: {}", e),
        )
    })
}

/// Strip the leading dot of field references inside `{{ ... }}`, so
/// `{{ .status.host }}` reads as `{{ status.host }}`. Quoted strings are kept.
fn normalize_leading_dots(template: &str) -> String {
    let mut result = String::with_capacity(template.len());
    let mut remaining = template;

    while let Some(start) = remaining.find("{{") {
        result.push_str(&remaining[..start + 2]);
        remaining = &remaining[start + 2..];

        let end = remaining.find("}}").unwrap_or(remaining.len());
        result.push_str(&strip_expression_dots(&remaining[..end]));
        remaining = &remaining[end..];
    }

    result.push_str(remaining);
    result
}

fn strip_expression_dots(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = expression.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '.' => {
                let at_start = match prev {
                    None => true,
                    Some(p) => p.is_whitespace() || "(|,-".contains(p),
                };
                let starts_ident = chars
                    .peek()
                    .is_some_and(|n| n.is_alphabetic() || *n == '_');
                if at_start && starts_ident {
                    continue;
                }
            }
            None => {}
        }
        out.push(c);
        prev = Some(c);
    }
    out
}
