// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Building service contexts from backing service selectors.

use crate::annotations::{classify, BindingType, Handler};
use crate::error::Result;
use crate::kubernetes::{
    api_version, find_crd_description, find_owned_resources, find_service, find_service_crd,
    object, ClusterReader,
};
use crate::merge::{merge_env, merge_object};
use crate::types::BackingServiceSelector;
use kube::core::{GroupVersionKind, GroupVersionResource};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// The resolved contribution of one service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceContext {
    /// The service object with resolved raw data merged in
    pub service: Value,
    /// Nested tree of values to expose as environment variables
    pub env_vars: Value,
    /// Output paths to project as files
    pub volume_keys: Vec<String>,
    pub env_var_prefix: Option<String>,
}

impl ServiceContext {
    pub fn gvk(&self) -> GroupVersionKind {
        object::gvk(&self.service)
    }

    pub fn name(&self) -> &str {
        object::name(&self.service)
    }
}

/// Options controlling a resolution pass over selectors.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub include_owned_resources: bool,
    pub owned_resource_types: Vec<GroupVersionResource>,
}

/// Build service contexts for every selector, in selector order. Contexts of
/// owned resources follow the context of their owner.
#[instrument(skip(reader, selectors, options), fields(selectors = selectors.len()))]
pub async fn build_service_contexts<R: ClusterReader>(
    reader: &R,
    default_namespace: &str,
    selectors: &[BackingServiceSelector],
    options: &BuildOptions,
) -> Result<Vec<ServiceContext>> {
    let mut contexts = Vec::new();

    for selector in selectors {
        let ns = selector.namespace_or(default_namespace);
        let gvk = selector.gvk();
        let (gvr, obj) = find_service(reader, ns, &gvk, &selector.resource_ref).await?;

        let svc_ctx = build_service_context(
            reader,
            ns,
            &gvk,
            &gvr,
            obj,
            selector.env_var_prefix.clone(),
        )
        .await?;
        let owner_name = svc_ctx.name().to_string();
        let owner_uid = object::uid(&svc_ctx.service).to_string();
        let owned_prefix = svc_ctx
            .env_var_prefix
            .clone()
            .unwrap_or_else(|| selector.kind.clone());
        contexts.push(svc_ctx);

        if !options.include_owned_resources {
            continue;
        }

        let owned = find_owned_resources(
            reader,
            ns,
            &options.owned_resource_types,
            &owner_name,
            &owner_uid,
        )
        .await?;
        for resource in owned {
            let owned_gvk =
                GroupVersionKind::gvk(&resource.gvr.group, &resource.gvr.version, &resource.kind);
            let owned_ctx = build_service_context(
                reader,
                ns,
                &owned_gvk,
                &resource.gvr,
                resource.object,
                Some(owned_prefix.clone()),
            )
            .await?;
            contexts.push(owned_ctx);
        }
    }

    info!("Built {} service contexts", contexts.len());
    Ok(contexts)
}

/// Effective binding annotations of `obj`: descriptor derived annotations,
/// overridden by CRD annotations, overridden by the object's own.
#[instrument(skip(reader, obj), fields(name = %object::name(obj)))]
pub async fn collect_annotations<R: ClusterReader>(
    reader: &R,
    namespace: &str,
    gvk: &GroupVersionKind,
    gvr: &GroupVersionResource,
    obj: &Value,
) -> Result<BTreeMap<String, String>> {
    let mut anns = BTreeMap::new();

    if let Some(crd) = find_service_crd(reader, gvr).await? {
        if let Some(description) =
            find_crd_description(reader, namespace, gvk, object::name(&crd)).await?
        {
            anns.extend(description.to_annotations());
        }
        anns.extend(object::annotations(&crd));
    }
    anns.extend(object::annotations(obj));

    Ok(anns)
}

/// Run every binding annotation of `obj` and accumulate the results.
/// Annotations that do not classify are skipped; any other failure aborts.
#[instrument(skip(reader, obj, env_var_prefix), fields(kind = %gvk.kind, name = %object::name(&obj)))]
pub async fn build_service_context<R: ClusterReader>(
    reader: &R,
    namespace: &str,
    gvk: &GroupVersionKind,
    gvr: &GroupVersionResource,
    obj: Value,
    env_var_prefix: Option<String>,
) -> Result<ServiceContext> {
    let anns = collect_annotations(reader, namespace, gvk, gvr, &obj).await?;

    let mut service = obj.clone();
    // list responses may omit the type fields
    if let Some(fields) = service.as_object_mut() {
        if fields.get("kind").and_then(Value::as_str).unwrap_or_default().is_empty() {
            fields.insert("apiVersion".to_string(), json!(api_version(&gvk.group, &gvk.version)));
            fields.insert("kind".to_string(), json!(gvk.kind));
        }
    }
    let mut env_vars = json!({});
    let mut volume_keys: Vec<String> = Vec::new();

    for (key, value) in &anns {
        let spec = match classify(key, value) {
            Ok(spec) => spec,
            Err(e) => {
                debug!("Skipping annotation {}: {}", key, e);
                continue;
            }
        };

        let resolved = Handler::build(reader, &obj, spec).await?.handle()?;
        service = merge_object(&service, &resolved.raw_data)?;

        if resolved.binding_type == BindingType::VolumeMount {
            if !volume_keys.contains(&resolved.path) {
                volume_keys.push(resolved.path);
            }
        } else {
            env_vars = merge_env(&env_vars, &resolved.data)?;
        }
    }

    Ok(ServiceContext {
        service,
        env_vars,
        volume_keys,
        env_var_prefix,
    })
}
