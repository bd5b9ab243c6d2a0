// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::core::GroupVersionKind;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apps.openshift.io", version = "v1alpha1", kind = "ServiceBindingRequest")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingRequestSpec {
    /// Prefix prepended to every generated environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var_prefix: Option<String>,
    /// Templated environment variables rendered after all services are resolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_env_var: Vec<CustomEnvVar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backing_service_selector: Option<BackingServiceSelector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backing_service_selectors: Vec<BackingServiceSelector>,
    /// Also bind resources owned by the backing services
    #[serde(default)]
    pub detect_binding_resources: bool,
}

/// Identifies one backing service instance.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackingServiceSelector {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    pub resource_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var_prefix: Option<String>,
}

impl BackingServiceSelector {
    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }

    /// The selector namespace, or `default_ns` when unset or empty
    pub fn namespace_or<'a>(&'a self, default_ns: &'a str) -> &'a str {
        self.namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(default_ns)
    }
}

/// A named template evaluated against the aggregated service context.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct CustomEnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl ServiceBindingRequest {
    /// The legacy single selector followed by the selector list
    pub fn selectors(&self) -> Vec<BackingServiceSelector> {
        self.spec
            .backing_service_selector
            .iter()
            .chain(self.spec.backing_service_selectors.iter())
            .cloned()
            .collect()
    }

    /// The global prefix, empty when unset
    pub fn env_var_prefix(&self) -> &str {
        self.spec.env_var_prefix.as_deref().unwrap_or_default()
    }

    pub fn namespace_or_default(&self, default_ns: &str) -> String {
        self.namespace().unwrap_or_else(|| default_ns.to_string())
    }
}
