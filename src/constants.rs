// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Binding annotation keys and values
pub mod annotations {
    /// Every binding annotation key starts with this prefix
    pub const PREFIX: &str = "servicebindingoperator.redhat.io/";
    /// Binding categories accepted in `binding:<type>:...`
    pub const BINDING_TYPES: &[&str] = &["env", "volumemount"];

    pub const ATTRIBUTE: &str = "binding:env:attribute";
    pub const SECRET: &str = "binding:env:object:secret";
    pub const CONFIGMAP: &str = "binding:env:object:configmap";
    pub const VOLUMEMOUNT_SECRET: &str = "binding:volumemount:secret";
}

/// OLM descriptor markers that translate into binding annotations
pub mod descriptors {
    pub const PREFIX: &str = "urn:alm:descriptor:servicebinding";
}

/// Well known resources read during a resolution pass
pub mod resources {
    pub const CRD_GROUP: &str = "apiextensions.k8s.io";
    pub const CRD_VERSION: &str = "v1";
    pub const CRD_RESOURCE: &str = "customresourcedefinitions";

    pub const CSV_GROUP: &str = "operators.coreos.com";
    pub const CSV_VERSION: &str = "v1alpha1";
    pub const CSV_RESOURCE: &str = "clusterserviceversions";

    /// Owned resource types inspected when none are configured
    pub const DEFAULT_OWNED: &[(&str, &str, &str)] = &[
        ("", "v1", "configmaps"),
        ("", "v1", "secrets"),
        ("", "v1", "services"),
        ("route.openshift.io", "v1", "routes"),
    ];
}
