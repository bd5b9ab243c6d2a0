// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! OLM CRD descriptions and their translation into binding annotations.

use crate::constants::{annotations, descriptors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An owned CRD entry of a ClusterServiceVersion
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrdDescription {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub spec_descriptors: Vec<Descriptor>,
    #[serde(default)]
    pub status_descriptors: Vec<Descriptor>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub path: String,
    #[serde(default, rename = "x-descriptors")]
    pub x_descriptors: Vec<String>,
}

impl CrdDescription {
    /// Binding annotations described by this CRD description. Status
    /// descriptors are applied first, so spec descriptors win on collision.
    pub fn to_annotations(&self) -> BTreeMap<String, String> {
        let mut anns = BTreeMap::new();
        for d in &self.status_descriptors {
            load_descriptor(&mut anns, "status", d);
        }
        for d in &self.spec_descriptors {
            load_descriptor(&mut anns, "spec", d);
        }
        anns
    }
}

fn load_descriptor(anns: &mut BTreeMap<String, String>, root: &str, descriptor: &Descriptor) {
    for x in &descriptor.x_descriptors {
        let Some(rest) = x.strip_prefix(descriptors::PREFIX) else {
            continue;
        };
        if !rest.is_empty() && !rest.starts_with(':') {
            continue;
        }
        let parts: Vec<&str> = rest.split(':').filter(|p| !p.is_empty()).collect();
        let (value, item) = match parts.as_slice() {
            [] => (annotations::ATTRIBUTE, None),
            ["secret", item @ ..] => (annotations::SECRET, item.first()),
            ["configmap", item @ ..] => (annotations::CONFIGMAP, item.first()),
            ["volumemount", "secret", item @ ..] => (annotations::VOLUMEMOUNT_SECRET, item.first()),
            _ => continue,
        };
        let mut key = format!("{}{}.{}", annotations::PREFIX, root, descriptor.path);
        if let Some(item) = item {
            key.push('-');
            key.push_str(item);
        }
        anns.insert(key, value.to_string());
    }
}
