// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Path based access into untyped object trees.

use crate::error::{BinderError, FieldAccessError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};
use std::fmt;

/// An ordered list of field names, `spec.image.name` style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<String>);

impl Path {
    /// Split a dotted path. Empty segments are dropped, so `""` is the root path.
    pub fn new(dotted: &str) -> Self {
        Path(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A new path with `other` appended.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Path(segments)
    }

    /// The path without its first segment.
    pub fn tail(&self) -> Path {
        Path(self.0.iter().skip(1).cloned().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// How leaves are decoded after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    Identity,
    Base64,
}

impl Decoder {
    /// Decode a single leaf. Base64 payloads that are not UTF-8 become a
    /// [`binary`] leaf.
    pub fn decode(self, value: &Value) -> Result<Value> {
        match self {
            Decoder::Identity => Ok(value.clone()),
            Decoder::Base64 => {
                let Some(encoded) = value.as_str() else {
                    return Err(BinderError::Decode(format!(
                        "expected base64 string, found {}",
                        kind_of(value)
                    )));
                };
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| BinderError::Decode(format!("invalid base64: {}", e)))?;
                Ok(match String::from_utf8(bytes) {
                    Ok(text) => Value::String(text),
                    Err(e) => binary(e.as_bytes()),
                })
            }
        }
    }
}

/// Key of the single-entry mapping holding non UTF-8 bytes, base64 encoded.
pub const BINARY_TAG: &str = "$binary";

/// A leaf carrying raw bytes through JSON trees.
pub fn binary(bytes: &[u8]) -> Value {
    let mut map = Map::new();
    map.insert(BINARY_TAG.to_string(), Value::String(STANDARD.encode(bytes)));
    Value::Object(map)
}

/// The bytes of a [`binary`] leaf, `None` for any other value.
pub fn as_binary(value: &Value) -> Option<Vec<u8>> {
    let map = value.as_object().filter(|m| m.len() == 1)?;
    let encoded = map.get(BINARY_TAG)?.as_str()?;
    STANDARD.decode(encoded).ok()
}

/// Name of the variant, used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Descend through mappings one segment at a time.
pub fn get<'a>(tree: &'a Value, path: &Path) -> Result<&'a Value> {
    let mut current = tree;
    for (idx, segment) in path.segments().iter().enumerate() {
        current = current
            .as_object()
            .and_then(|m| m.get(segment))
            .ok_or_else(|| {
                FieldAccessError::NotFound(path.segments()[..=idx].join("."))
            })?;
    }
    Ok(current)
}

/// Like [`get`] but requires a string leaf.
pub fn get_str<'a>(tree: &'a Value, path: &Path) -> Result<&'a str> {
    get(tree, path)?.as_str().ok_or_else(|| {
        FieldAccessError::TypeMismatch {
            path: path.to_string(),
            expected: "string",
        }
        .into()
    })
}

/// Extract the value at `path` and run `decoder` over it. Mappings are decoded
/// element-wise, anything else is treated as a single leaf.
pub fn extract(tree: &Value, path: &Path, decoder: Decoder) -> Result<Value> {
    match get(tree, path)? {
        Value::Object(map) => {
            let mut decoded = Map::with_capacity(map.len());
            for (k, v) in map {
                decoded.insert(k.clone(), decoder.decode(v)?);
            }
            Ok(Value::Object(decoded))
        }
        leaf => decoder.decode(leaf),
    }
}

/// Build the smallest tree holding `value` at `path`. The root path returns
/// the value itself.
pub fn compose(value: Value, path: &Path) -> Value {
    path.segments().iter().rev().fold(value, |acc, segment| {
        let mut map = Map::new();
        map.insert(segment.clone(), acc);
        Value::Object(map)
    })
}

/// Set `value` at `path`, creating intermediate mappings. Fails when an
/// intermediate field exists but is not a mapping.
pub fn set(tree: &mut Value, path: &Path, value: Value) -> Result<()> {
    let Some((last, parents)) = path.segments().split_last() else {
        *tree = value;
        return Ok(());
    };
    let mut current = tree;
    for (idx, segment) in parents.iter().enumerate() {
        let map = current.as_object_mut().ok_or_else(|| FieldAccessError::TypeMismatch {
            path: path.segments()[..idx].join("."),
            expected: "mapping",
        })?;
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let map = current.as_object_mut().ok_or_else(|| FieldAccessError::TypeMismatch {
        path: parents.join("."),
        expected: "mapping",
    })?;
    map.insert(last.clone(), value);
    Ok(())
}
