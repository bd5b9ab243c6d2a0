// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fetching resources referenced from a backing service.

use crate::error::Result;
use crate::kubernetes::{gvr_name, object, ClusterReader};
use crate::nested::{self, Path};
use kube::core::GroupVersionResource;
use serde_json::Value;
use tracing::{debug, instrument};

/// A resource named by a field of its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedResource {
    pub kind: String,
    pub object: Value,
}

/// Resolve the name stored at `reference` in `owner`, then read the named
/// resource from `namespace`, or the owner's namespace when `None`.
#[instrument(skip(reader, owner), fields(owner = %object::name(owner), gvr = %gvr_name(gvr)))]
pub async fn fetch_related<R: ClusterReader>(
    reader: &R,
    owner: &Value,
    reference: &Path,
    gvr: &GroupVersionResource,
    namespace: Option<&str>,
) -> Result<RelatedResource> {
    let name = nested::get_str(owner, reference)?;
    let ns = namespace
        .or_else(|| object::namespace(owner))
        .unwrap_or_default();

    debug!("Fetching related resource {}/{}", ns, name);
    let obj = reader.get(gvr, Some(ns), name).await?;
    let kind = reader.kind_for(gvr).await?;

    Ok(RelatedResource { kind, object: obj })
}
