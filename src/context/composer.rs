// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Composing service contexts into the final binding payload.

use crate::context::custom_env::CustomEnvParser;
use crate::context::envvars::build_env_vars;
use crate::context::service::ServiceContext;
use crate::error::Result;
use crate::merge::merge_object;
use crate::nested::{self, Path};
use crate::types::CustomEnvVar;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Payload of the generated binding secret.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingOutput {
    pub env_vars: BTreeMap<String, Vec<u8>>,
    /// Keys to project as files rather than scalar variables
    pub volume_keys: Vec<String>,
}

/// Replace characters that cannot appear in template identifiers.
pub fn sanitize(segment: &str) -> String {
    segment.replace(['.', '-'], "_")
}

/// Build the env var payload for `contexts`, then render `templates` against
/// the snapshots of all services.
#[instrument(skip(contexts, templates), fields(contexts = contexts.len(), templates = templates.len()))]
pub fn process_service_contexts(
    global_prefix: &str,
    contexts: &[ServiceContext],
    templates: &[CustomEnvVar],
) -> Result<BindingOutput> {
    let mut output = BindingOutput::default();
    let mut literal = json!({});
    let mut sanitized = json!({});

    for ctx in contexts {
        let gvk = ctx.gvk();
        let name = ctx.name();
        let prefix = ctx.env_var_prefix.as_deref().unwrap_or(&gvk.kind);

        // later contexts overwrite colliding keys
        output
            .env_vars
            .extend(build_env_vars(&ctx.env_vars, &[global_prefix, prefix]));
        for key in &ctx.volume_keys {
            if !output.volume_keys.contains(key) {
                output.volume_keys.push(key.clone());
            }
        }

        let segments = [gvk.version.as_str(), gvk.group.as_str(), gvk.kind.as_str(), name];
        nested::set(&mut literal, &Path::from_segments(segments), ctx.service.clone())?;
        let sanitized_path = Path::from_segments(segments.map(sanitize));
        nested::set(&mut sanitized, &sanitized_path, ctx.service.clone())?;
    }

    if !templates.is_empty() {
        let context: Value = merge_object(&literal, &sanitized)?;
        let rendered = CustomEnvParser::new().parse(templates, &context)?;
        for (name, value) in rendered {
            output
                .env_vars
                .insert(custom_key(global_prefix, &name), value.into_bytes());
        }
    }

    debug!(
        "Composed {} env vars and {} volume keys",
        output.env_vars.len(),
        output.volume_keys.len()
    );
    Ok(output)
}

fn custom_key(global_prefix: &str, name: &str) -> String {
    if global_prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", global_prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BinderError;
    use crate::test_utils::database_cr;

    fn db_context(prefix: Option<&str>) -> ServiceContext {
        let mut service = database_cr("testing", "db-testing");
        service["status"]["dbCredentials"] = json!({ "user": "admin", "password": "secret" });
        ServiceContext {
            service,
            env_vars: json!({ "secret": { "user": "admin" }, "dbConnectionIP": "172.30.0.10" }),
            volume_keys: vec!["secret.password".to_string()],
            env_var_prefix: prefix.map(str::to_string),
        }
    }

    fn env(output: &BindingOutput, key: &str) -> String {
        String::from_utf8(output.env_vars[key].clone()).unwrap()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("postgresql.baiju.dev"), "postgresql_baiju_dev");
        assert_eq!(sanitize("db-testing"), "db_testing");
        assert_eq!(sanitize("Database"), "Database");
    }

    #[test]
    fn test_explicit_prefix() {
        let output = process_service_contexts("", &[db_context(Some("P"))], &[]).unwrap();

        assert_eq!(env(&output, "P_SECRET_USER"), "admin");
        assert_eq!(env(&output, "P_DBCONNECTIONIP"), "172.30.0.10");
        assert_eq!(output.volume_keys, vec!["secret.password"]);
        assert!(!output.env_vars.keys().any(|k| k.contains("PASSWORD")));
    }

    #[test]
    fn test_kind_is_default_prefix() {
        let output =
            process_service_contexts("SERVICE_BINDING", &[db_context(None)], &[]).unwrap();
        assert_eq!(env(&output, "SERVICE_BINDING_DATABASE_SECRET_USER"), "admin");
    }

    #[test]
    fn test_empty_explicit_prefix_is_omitted() {
        let output = process_service_contexts("", &[db_context(Some(""))], &[]).unwrap();
        assert_eq!(env(&output, "SECRET_USER"), "admin");
    }

    #[test]
    fn test_last_context_wins_on_collision() {
        let mut second = db_context(Some("P"));
        second.env_vars = json!({ "secret": { "user": "other" } });

        let output =
            process_service_contexts("", &[db_context(Some("P")), second], &[]).unwrap();

        assert_eq!(env(&output, "P_SECRET_USER"), "other");
        assert_eq!(output.volume_keys, vec!["secret.password"]);
    }

    #[test]
    fn test_custom_env_vars() {
        let templates = vec![
            CustomEnvVar {
                name: "JDBC_URL".to_string(),
                value: "jdbc:postgresql://{{ .v1alpha1.postgresql_baiju_dev.Database.db_testing.status.dbConnectionIP }}:{{ v1alpha1.postgresql_baiju_dev.Database.db_testing.status.dbConnectionPort }}".to_string(),
            },
            CustomEnvVar {
                name: "CREDS".to_string(),
                value: "{{ marshal(v1alpha1.postgresql_baiju_dev.Database.db_testing.status.dbCredentials) }}".to_string(),
            },
        ];

        let output = process_service_contexts("SB", &[db_context(Some("P"))], &templates).unwrap();

        assert_eq!(env(&output, "SB_JDBC_URL"), "jdbc:postgresql://172.30.0.10:5432");
        assert_eq!(env(&output, "SB_CREDS"), r#"{"password":"secret","user":"admin"}"#);
        assert_eq!(env(&output, "SB_P_SECRET_USER"), "admin");
    }

    #[test]
    fn test_templates_index_literal_names() {
        let templates = vec![CustomEnvVar {
            name: "HOST".to_string(),
            value: r#"{{ v1alpha1["postgresql.baiju.dev"].Database["db-testing"].status.dbConnectionIP }}"#.to_string(),
        }];

        let output = process_service_contexts("", &[db_context(None)], &templates).unwrap();

        assert_eq!(env(&output, "HOST"), "172.30.0.10");
    }

    #[test]
    fn test_binary_env_values_are_kept() {
        let mut ctx = db_context(Some("P"));
        ctx.env_vars = json!({ "secret": { "keystore": nested::binary(&[0xfe, 0xed, 0x00, 0x02]) } });

        let output = process_service_contexts("", &[ctx], &[]).unwrap();

        assert_eq!(output.env_vars["P_SECRET_KEYSTORE"], vec![0xfe, 0xed, 0x00, 0x02]);
    }

    #[test]
    fn test_template_failure_aborts() {
        let templates = vec![CustomEnvVar {
            name: "BROKEN".to_string(),
            value: "{{ v1alpha1.nothing }}".to_string(),
        }];

        let err = process_service_contexts("", &[db_context(None)], &templates).unwrap_err();

        match err {
            BinderError::Template(e) => assert_eq!(e.name, "BROKEN"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
