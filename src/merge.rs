// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tree merges used to accumulate handler results.

use crate::error::MergeTypeError;
use crate::nested::kind_of;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sequences {
    Replace,
    Append,
}

/// Merge raw data into an object snapshot. Incoming values override existing
/// leaves (a scalar may become a subtree) and sequences are replaced wholesale.
/// Replacing an existing mapping with a non-mapping is rejected.
pub fn merge_object(existing: &Value, incoming: &Value) -> Result<Value, MergeTypeError> {
    merge_at(existing, incoming, Sequences::Replace, &mut Vec::new())
}

/// Merge resolved data into an env-var tree. Scalars are overridden and
/// sequences are concatenated, previous elements first.
pub fn merge_env(existing: &Value, incoming: &Value) -> Result<Value, MergeTypeError> {
    merge_at(existing, incoming, Sequences::Append, &mut Vec::new())
}

fn merge_at(
    existing: &Value,
    incoming: &Value,
    sequences: Sequences,
    path: &mut Vec<String>,
) -> Result<Value, MergeTypeError> {
    match (existing, incoming) {
        (Value::Object(left), Value::Object(right)) => {
            let mut merged: Map<String, Value> = left.clone();
            for (key, value) in right {
                let next = match left.get(key) {
                    Some(current) => {
                        path.push(key.clone());
                        let merged_value = merge_at(current, value, sequences, path)?;
                        path.pop();
                        merged_value
                    }
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Ok(Value::Object(merged))
        }
        (Value::Null, _) | (_, Value::Null) => Ok(incoming.clone()),
        // a snapshot leaf may be replaced by any resolved value, never a subtree by a leaf
        (left, _) if sequences == Sequences::Replace && !left.is_object() => Ok(incoming.clone()),
        (Value::Array(left), Value::Array(right)) if sequences == Sequences::Append => {
            Ok(Value::Array(left.iter().chain(right).cloned().collect()))
        }
        (left, right) if is_scalar(left) && is_scalar(right) => Ok(right.clone()),
        (left, right) => Err(MergeTypeError {
            path: path.join("."),
            existing: kind_of(left),
            incoming: kind_of(right),
        }),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}
