// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::resources::DEFAULT_OWNED;
use anyhow::{bail, Context, Result};
use kube::core::GroupVersionResource;
use std::env;
use std::path::PathBuf;

/// Binder configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// YAML file holding the ServiceBindingRequest to resolve
    pub binding_request_file: PathBuf,
    /// Namespace used when the request does not carry one
    pub default_namespace: String,
    /// Overrides the request's detectBindingResources flag when set
    pub detect_binding_resources: Option<bool>,
    pub owned_resource_types: Vec<GroupVersionResource>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let binding_request_file = lookup("BINDING_REQUEST_FILE")
            .map(PathBuf::from)
            .context("BINDING_REQUEST_FILE environment variable not set")?;
        let default_namespace =
            lookup("DEFAULT_NAMESPACE").unwrap_or_else(|| "default".to_string());
        let detect_binding_resources = lookup("DETECT_BINDING_RESOURCES")
            .map(|v| v.trim().parse::<bool>())
            .transpose()
            .context("DETECT_BINDING_RESOURCES must be true or false")?;

        let owned_resource_types = match lookup("OWNED_RESOURCE_TYPES") {
            Some(types) => types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(parse_gvr)
                .collect::<Result<Vec<_>>>()?,
            None => DEFAULT_OWNED
                .iter()
                .map(|(g, v, r)| GroupVersionResource::gvr(g, v, r))
                .collect(),
        };

        Ok(Config {
            binding_request_file,
            default_namespace,
            detect_binding_resources,
            owned_resource_types,
        })
    }
}

/// Parse `group/version/resource`, or `version/resource` for the core group.
pub fn parse_gvr(s: &str) -> Result<GroupVersionResource> {
    let parts: Vec<&str> = s.split('/').collect();
    match parts.as_slice() {
        [version, resource] if !version.is_empty() && !resource.is_empty() => {
            Ok(GroupVersionResource::gvr("", version, resource))
        }
        [group, version, resource]
            if !group.is_empty() && !version.is_empty() && !resource.is_empty() =>
        {
            Ok(GroupVersionResource::gvr(group, version, resource))
        }
        _ => bail!("invalid resource type '{}', expected group/version/resource", s),
    }
}
