// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Locating backing services, their CRDs, OLM descriptions and owned resources.

use crate::constants::resources;
use crate::error::Result;
use crate::kubernetes::{gvr_name, object, ClusterReader};
use crate::types::CrdDescription;
use kube::core::{GroupVersionKind, GroupVersionResource};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// An object found through an owner reference.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedResource {
    pub gvr: GroupVersionResource,
    pub kind: String,
    pub object: Value,
}

/// Find the backing service instance named `name`.
#[instrument(skip(reader), fields(kind = %gvk.kind))]
pub async fn find_service<R: ClusterReader>(
    reader: &R,
    namespace: &str,
    gvk: &GroupVersionKind,
    name: &str,
) -> Result<(GroupVersionResource, Value)> {
    let gvr = reader.resource_for(gvk).await?;
    let obj = reader.get(&gvr, Some(namespace), name).await?;
    Ok((gvr, obj))
}

/// The CRD name serving `gvr`, `None` for the core group.
pub fn crd_name(gvr: &GroupVersionResource) -> Option<String> {
    (!gvr.group.is_empty()).then(|| format!("{}.{}", gvr.resource, gvr.group))
}

fn crds() -> GroupVersionResource {
    GroupVersionResource::gvr(
        resources::CRD_GROUP,
        resources::CRD_VERSION,
        resources::CRD_RESOURCE,
    )
}

fn csvs() -> GroupVersionResource {
    GroupVersionResource::gvr(
        resources::CSV_GROUP,
        resources::CSV_VERSION,
        resources::CSV_RESOURCE,
    )
}

/// Find the CRD serving `gvr`. A missing CRD is not an error.
#[instrument(skip(reader), fields(gvr = %gvr_name(gvr)))]
pub async fn find_service_crd<R: ClusterReader>(
    reader: &R,
    gvr: &GroupVersionResource,
) -> Result<Option<Value>> {
    let Some(name) = crd_name(gvr) else {
        return Ok(None);
    };
    match reader.get(&crds(), None, &name).await {
        Ok(crd) => Ok(Some(crd)),
        Err(e) if e.is_not_found() => {
            debug!("CRD {} not found", name);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Search the ClusterServiceVersions of `namespace` for the description of
/// the CRD named `crd_name` at `gvk`'s version and kind.
#[instrument(skip(reader), fields(kind = %gvk.kind))]
pub async fn find_crd_description<R: ClusterReader>(
    reader: &R,
    namespace: &str,
    gvk: &GroupVersionKind,
    crd_name: &str,
) -> Result<Option<CrdDescription>> {
    let csv_list = match reader.list(&csvs(), namespace).await {
        Ok(list) => list,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };

    for csv in &csv_list {
        let Some(owned) = csv["spec"]["customresourcedefinitions"]["owned"].as_array() else {
            continue;
        };
        for entry in owned {
            let description: CrdDescription = match serde_json::from_value(entry.clone()) {
                Ok(d) => d,
                Err(e) => {
                    warn!(
                        "Skipping malformed CRD description in {}: {}",
                        object::name(csv),
                        e
                    );
                    continue;
                }
            };
            if description.name == crd_name
                && description.version == gvk.version
                && (description.kind.is_empty() || description.kind == gvk.kind)
            {
                debug!("Found CRD description in {}", object::name(csv));
                return Ok(Some(description));
            }
        }
    }

    Ok(None)
}

/// List objects of the given types owned by the named object. Types the
/// cluster does not serve are skipped.
#[instrument(skip(reader, owned_types))]
pub async fn find_owned_resources<R: ClusterReader>(
    reader: &R,
    namespace: &str,
    owned_types: &[GroupVersionResource],
    owner_name: &str,
    owner_uid: &str,
) -> Result<Vec<OwnedResource>> {
    let mut owned = Vec::new();

    for gvr in owned_types {
        let items = match reader.list(gvr, namespace).await {
            Ok(items) => items,
            Err(e) if e.is_not_found() => {
                debug!("Skipping {}: {}", gvr_name(gvr), e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let matching: Vec<Value> = items
            .into_iter()
            .filter(|obj| object::is_owned_by(obj, owner_name, owner_uid))
            .collect();
        if matching.is_empty() {
            continue;
        }

        let kind = reader.kind_for(gvr).await?;
        owned.extend(matching.into_iter().map(|obj| OwnedResource {
            gvr: gvr.clone(),
            kind: kind.clone(),
            object: obj,
        }));
    }

    debug!("Found {} owned resources", owned.len());
    Ok(owned)
}
