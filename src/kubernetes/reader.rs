// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read-only access to cluster objects as untyped trees.

use crate::error::{BinderError, FetchError, Result};
use kube::api::{ApiResource, DynamicObject, ListParams};
use kube::core::{GroupVersion, GroupVersionKind, GroupVersionResource};
use kube::{Api, Client};
use serde_json::Value;
use tracing::{debug, instrument};

/// The cluster operations a resolution pass depends on.
///
/// Objects are returned as plain JSON trees, the way the API server sends them.
#[allow(async_fn_in_trait)]
pub trait ClusterReader {
    /// Get a single object. `namespace` is `None` for cluster scoped resources.
    async fn get(
        &self,
        gvr: &GroupVersionResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value>;

    /// List all objects of a type in a namespace.
    async fn list(&self, gvr: &GroupVersionResource, namespace: &str) -> Result<Vec<Value>>;

    /// Map a resource to its kind, e.g. `v1/secrets` to `Secret`.
    async fn kind_for(&self, gvr: &GroupVersionResource) -> Result<String>;

    /// Map a kind to the resource serving it.
    async fn resource_for(&self, gvk: &GroupVersionKind) -> Result<GroupVersionResource>;
}

/// `group/version`, or just `version` for the core group
pub fn api_version(group: &str, version: &str) -> String {
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{}/{}", group, version)
    }
}

/// Human readable `group/version/resource`
pub fn gvr_name(gvr: &GroupVersionResource) -> String {
    format!("{}/{}", api_version(&gvr.group, &gvr.version), gvr.resource)
}

/// [`ClusterReader`] backed by the API server.
#[derive(Clone)]
pub struct KubeClusterReader {
    client: Client,
}

impl KubeClusterReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, gvr: &GroupVersionResource, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = ApiResource {
            group: gvr.group.clone(),
            version: gvr.version.clone(),
            api_version: api_version(&gvr.group, &gvr.version),
            kind: String::new(),
            plural: gvr.resource.clone(),
        };
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

fn to_value(obj: DynamicObject) -> Result<Value> {
    serde_json::to_value(obj)
        .map_err(|e| BinderError::Decode(format!("Failed to serialize object: {}", e)))
}

impl ClusterReader for KubeClusterReader {
    #[instrument(skip(self), fields(gvr = %gvr_name(gvr)))]
    async fn get(
        &self,
        gvr: &GroupVersionResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value> {
        match self.api(gvr, namespace).get(name).await {
            Ok(obj) => to_value(obj),
            Err(kube::Error::Api(err)) if err.code == 404 => Err(FetchError::NotFound {
                resource: gvr.resource.clone(),
                namespace: namespace.unwrap_or_default().to_string(),
                name: name.to_string(),
            }
            .into()),
            Err(e) => Err(FetchError::Transport(e).into()),
        }
    }

    #[instrument(skip(self), fields(gvr = %gvr_name(gvr)))]
    async fn list(&self, gvr: &GroupVersionResource, namespace: &str) -> Result<Vec<Value>> {
        match self
            .api(gvr, Some(namespace))
            .list(&ListParams::default())
            .await
        {
            Ok(list) => {
                debug!("Listed {} objects", list.items.len());
                list.items.into_iter().map(to_value).collect()
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                Err(FetchError::UnknownResource(gvr_name(gvr)).into())
            }
            Err(e) => Err(FetchError::Transport(e).into()),
        }
    }

    #[instrument(skip(self), fields(gvr = %gvr_name(gvr)))]
    async fn kind_for(&self, gvr: &GroupVersionResource) -> Result<String> {
        let gv = GroupVersion::gv(&gvr.group, &gvr.version);
        let group = kube::discovery::pinned_group(&self.client, &gv)
            .await
            .map_err(|e| discovery_error(e, gvr_name(gvr)))?;

        group
            .versioned_resources(&gvr.version)
            .into_iter()
            .find(|(ar, _)| ar.plural == gvr.resource)
            .map(|(ar, _)| ar.kind)
            .ok_or_else(|| FetchError::UnknownResource(gvr_name(gvr)).into())
    }

    #[instrument(skip(self))]
    async fn resource_for(&self, gvk: &GroupVersionKind) -> Result<GroupVersionResource> {
        let (ar, _) = kube::discovery::pinned_kind(&self.client, gvk)
            .await
            .map_err(|e| {
                discovery_error(
                    e,
                    format!("{}/{}", api_version(&gvk.group, &gvk.version), gvk.kind),
                )
            })?;
        Ok(GroupVersionResource::gvr(&ar.group, &ar.version, &ar.plural))
    }
}

fn discovery_error(err: kube::Error, what: String) -> BinderError {
    match err {
        kube::Error::Api(ref e) if e.code == 404 => FetchError::UnknownResource(what).into(),
        kube::Error::Discovery(_) => FetchError::UnknownResource(what).into(),
        other => FetchError::Transport(other).into(),
    }
}
