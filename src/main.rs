// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::{Client, ResourceExt};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use binder::config::Config;
use binder::kubernetes::KubeClusterReader;
use binder::resolver::resolve;
use binder::types::ServiceBindingRequest;

/// What a resolution pass would write back: the binding secret and the keys
/// to mount as files.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BindingReport {
    secret: Secret,
    volume_keys: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting binder");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: default_namespace={}, owned_resource_types={}",
        config.default_namespace,
        config.owned_resource_types.len()
    );

    let raw = std::fs::read_to_string(&config.binding_request_file).with_context(|| {
        format!(
            "Failed to read {}",
            config.binding_request_file.display()
        )
    })?;
    let request: ServiceBindingRequest =
        serde_yaml::from_str(&raw).context("Failed to parse ServiceBindingRequest")?;

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let reader = KubeClusterReader::new(client);
    let output = resolve(&reader, &request, &config)
        .await
        .with_context(|| format!("Failed to resolve {}", request.name_any()))?;

    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(request.name_any()),
            namespace: Some(request.namespace_or_default(&config.default_namespace)),
            ..Default::default()
        },
        data: Some(
            output
                .env_vars
                .into_iter()
                .map(|(k, v)| (k, ByteString(v)))
                .collect(),
        ),
        ..Default::default()
    };
    let report = BindingReport {
        secret,
        volume_keys: output.volume_keys,
    };

    print!("{}", serde_yaml::to_string(&report)?);
    Ok(())
}
