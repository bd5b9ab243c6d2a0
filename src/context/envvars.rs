// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Flattening of env var trees into prefixed variable names.

use crate::nested::as_binary;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flatten `tree` depth-first into `PREFIX_PATH` keys. Empty prefixes are
/// dropped, null leaves are skipped and binary leaves keep their raw bytes.
pub fn build_env_vars(tree: &Value, prefixes: &[&str]) -> BTreeMap<String, Vec<u8>> {
    let mut out = BTreeMap::new();
    let mut path: Vec<String> = prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect();
    flatten(tree, &mut path, &mut out);
    out
}

fn flatten(value: &Value, path: &mut Vec<String>, out: &mut BTreeMap<String, Vec<u8>>) {
    if let Some(bytes) = as_binary(value) {
        out.insert(env_key(path), bytes);
        return;
    }
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (k, v) in map {
                path.push(k.clone());
                flatten(v, path, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (idx, v) in items.iter().enumerate() {
                path.push(idx.to_string());
                flatten(v, path, out);
                path.pop();
            }
        }
        Value::String(s) => {
            out.insert(env_key(path), s.clone().into_bytes());
        }
        leaf => {
            out.insert(env_key(path), leaf.to_string().into_bytes());
        }
    }
}

fn env_key(path: &[String]) -> String {
    path.join("_").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nested::binary;
    use serde_json::json;

    fn text(vars: &BTreeMap<String, Vec<u8>>, key: &str) -> String {
        String::from_utf8(vars[key].clone()).unwrap()
    }

    #[test]
    fn test_build_env_vars() {
        let tree = json!({
            "secret": { "user": "admin", "password": "secret" },
            "dbConnectionIP": "172.30.0.10",
        });

        let vars = build_env_vars(&tree, &["SERVICE_BINDING", "Database"]);

        assert_eq!(vars.len(), 3);
        assert_eq!(text(&vars, "SERVICE_BINDING_DATABASE_SECRET_USER"), "admin");
        assert_eq!(text(&vars, "SERVICE_BINDING_DATABASE_SECRET_PASSWORD"), "secret");
        assert_eq!(text(&vars, "SERVICE_BINDING_DATABASE_DBCONNECTIONIP"), "172.30.0.10");
    }

    #[test]
    fn test_empty_global_prefix() {
        let tree = json!({ "secret": { "user": "admin" } });
        let vars = build_env_vars(&tree, &["", "P"]);
        assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["P_SECRET_USER"]);
    }

    #[test]
    fn test_scalars_sequences_and_nulls() {
        let tree = json!({
            "port": 5432,
            "tls": true,
            "hosts": ["a", "b"],
            "unset": null,
        });

        let vars = build_env_vars(&tree, &["DB"]);

        assert_eq!(text(&vars, "DB_PORT"), "5432");
        assert_eq!(text(&vars, "DB_TLS"), "true");
        assert_eq!(text(&vars, "DB_HOSTS_0"), "a");
        assert_eq!(text(&vars, "DB_HOSTS_1"), "b");
        assert!(!vars.contains_key("DB_UNSET"));
    }

    #[test]
    fn test_binary_leaves_keep_raw_bytes() {
        let tree = json!({ "secret": { "keystore": binary(&[0xfe, 0xed, 0x00]), "user": "admin" } });

        let vars = build_env_vars(&tree, &["DB"]);

        assert_eq!(vars["DB_SECRET_KEYSTORE"], vec![0xfe, 0xed, 0x00]);
        assert_eq!(text(&vars, "DB_SECRET_USER"), "admin");
        assert_eq!(vars.len(), 2);
    }
}
