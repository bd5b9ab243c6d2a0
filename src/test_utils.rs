// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and cluster contents.

use crate::error::{FetchError, Result};
use crate::kubernetes::{gvr_name, ClusterReader};
use base64::{engine::general_purpose::STANDARD, Engine};
use http::{Request, Response};
use kube::client::Body;
use kube::core::{GroupVersionKind, GroupVersionResource};
use kube::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("resource", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

type GvrKey = (String, String, String);

fn key(gvr: &GroupVersionResource) -> GvrKey {
    (gvr.group.clone(), gvr.version.clone(), gvr.resource.clone())
}

/// In-memory [`ClusterReader`] holding a fixed set of objects.
#[derive(Default)]
pub struct FakeCluster {
    objects: Vec<(GvrKey, Option<String>, String, Value)>,
    kinds: HashMap<GvrKey, String>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
            .with_kind("", "v1", "secrets", "Secret")
            .with_kind("", "v1", "configmaps", "ConfigMap")
            .with_kind("", "v1", "services", "Service")
            .with_kind(
                "apiextensions.k8s.io",
                "v1",
                "customresourcedefinitions",
                "CustomResourceDefinition",
            )
            .with_kind(
                "operators.coreos.com",
                "v1alpha1",
                "clusterserviceversions",
                "ClusterServiceVersion",
            )
            .with_kind("postgresql.baiju.dev", "v1alpha1", "databases", "Database")
    }

    /// Register a resource/kind pair served by the cluster.
    pub fn with_kind(mut self, group: &str, version: &str, resource: &str, kind: &str) -> Self {
        self.kinds.insert(
            (group.to_string(), version.to_string(), resource.to_string()),
            kind.to_string(),
        );
        self
    }

    /// Store an object; name and namespace are read from its metadata.
    pub fn with_object(mut self, group: &str, version: &str, resource: &str, obj: Value) -> Self {
        let namespace = obj["metadata"]["namespace"].as_str().map(str::to_string);
        let name = obj["metadata"]["name"].as_str().unwrap_or_default().to_string();
        self.objects.push((
            (group.to_string(), version.to_string(), resource.to_string()),
            namespace,
            name,
            obj,
        ));
        self
    }
}

impl ClusterReader for FakeCluster {
    async fn get(
        &self,
        gvr: &GroupVersionResource,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value> {
        let k = key(gvr);
        self.objects
            .iter()
            .find(|(g, ns, n, _)| *g == k && ns.as_deref() == namespace && n == name)
            .map(|(_, _, _, obj)| obj.clone())
            .ok_or_else(|| {
                FetchError::NotFound {
                    resource: gvr.resource.clone(),
                    namespace: namespace.unwrap_or_default().to_string(),
                    name: name.to_string(),
                }
                .into()
            })
    }

    async fn list(&self, gvr: &GroupVersionResource, namespace: &str) -> Result<Vec<Value>> {
        let k = key(gvr);
        if !self.kinds.contains_key(&k) {
            return Err(FetchError::UnknownResource(gvr_name(gvr)).into());
        }
        Ok(self
            .objects
            .iter()
            .filter(|(g, ns, _, _)| *g == k && ns.as_deref() == Some(namespace))
            .map(|(_, _, _, obj)| obj.clone())
            .collect())
    }

    async fn kind_for(&self, gvr: &GroupVersionResource) -> Result<String> {
        self.kinds
            .get(&key(gvr))
            .cloned()
            .ok_or_else(|| FetchError::UnknownResource(gvr_name(gvr)).into())
    }

    async fn resource_for(&self, gvk: &GroupVersionKind) -> Result<GroupVersionResource> {
        self.kinds
            .iter()
            .find(|((g, v, _), kind)| *g == gvk.group && *v == gvk.version && **kind == gvk.kind)
            .map(|((g, v, r), _)| GroupVersionResource::gvr(g, v, r))
            .ok_or_else(|| FetchError::UnknownResource(gvk.kind.clone()).into())
    }
}

pub fn b64(s: &str) -> String {
    STANDARD.encode(s)
}

/// A Database custom resource pointing at a credentials secret and a config map
pub fn database_cr(namespace: &str, name: &str) -> Value {
    json!({
        "apiVersion": "postgresql.baiju.dev/v1alpha1",
        "kind": "Database",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("{}-uid", name),
        },
        "spec": {
            "imageName": "postgres",
            "image": {
                "name": "postgres",
                "third": { "something": "somevalue" }
            },
            "dbConfigMap": format!("{}-config", name),
        },
        "status": {
            "dbCredentials": "db-credentials",
            "dbConnectionIP": "172.30.0.10",
            "dbConnectionPort": 5432,
        }
    })
}

pub fn secret(namespace: &str, name: &str, data: &[(&str, &str)]) -> Value {
    let data: serde_json::Map<String, Value> = data
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(b64(v))))
        .collect();
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": { "name": name, "namespace": namespace },
        "data": data,
    })
}

/// A secret whose items are arbitrary bytes
pub fn binary_secret(namespace: &str, name: &str, data: &[(&str, &[u8])]) -> Value {
    let data: serde_json::Map<String, Value> = data
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(STANDARD.encode(v))))
        .collect();
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": { "name": name, "namespace": namespace },
        "data": data,
    })
}

pub fn configmap(namespace: &str, name: &str, data: &[(&str, &str)]) -> Value {
    let data: serde_json::Map<String, Value> = data
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": { "name": name, "namespace": namespace },
        "data": data,
    })
}

pub fn database_crd(annotations: Value) -> Value {
    json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "CustomResourceDefinition",
        "metadata": {
            "name": "databases.postgresql.baiju.dev",
            "annotations": annotations,
        },
        "spec": {
            "group": "postgresql.baiju.dev",
            "names": { "kind": "Database", "plural": "databases" }
        }
    })
}

pub fn database_csv(namespace: &str, description: Value) -> Value {
    json!({
        "apiVersion": "operators.coreos.com/v1alpha1",
        "kind": "ClusterServiceVersion",
        "metadata": { "name": "db-operator.v0.1.0", "namespace": namespace },
        "spec": {
            "customresourcedefinitions": { "owned": [description] }
        }
    })
}

/// Mark `obj` as owned by the named object.
pub fn owned_by(mut obj: Value, owner_kind: &str, owner_name: &str, owner_uid: &str) -> Value {
    obj["metadata"]["ownerReferences"] = json!([{
        "apiVersion": "postgresql.baiju.dev/v1alpha1",
        "kind": owner_kind,
        "name": owner_name,
        "uid": owner_uid,
    }]);
    obj
}
