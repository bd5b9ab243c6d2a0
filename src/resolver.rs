// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One resolution pass over a ServiceBindingRequest.

use crate::config::Config;
use crate::context::{build_service_contexts, process_service_contexts, BindingOutput, BuildOptions};
use crate::error::Result;
use crate::kubernetes::ClusterReader;
use crate::types::ServiceBindingRequest;
use kube::ResourceExt;
use tracing::{info, instrument};

/// Resolve every backing service of `request` into the binding payload.
/// Nothing is written to the cluster; a failure discards the whole pass.
#[instrument(skip_all, fields(request = %request.name_any()))]
pub async fn resolve<R: ClusterReader>(
    reader: &R,
    request: &ServiceBindingRequest,
    config: &Config,
) -> Result<BindingOutput> {
    let namespace = request.namespace_or_default(&config.default_namespace);
    let options = BuildOptions {
        include_owned_resources: config
            .detect_binding_resources
            .unwrap_or(request.spec.detect_binding_resources),
        owned_resource_types: config.owned_resource_types.clone(),
    };

    let contexts =
        build_service_contexts(reader, &namespace, &request.selectors(), &options).await?;
    let output = process_service_contexts(
        request.env_var_prefix(),
        &contexts,
        &request.spec.custom_env_var,
    )?;

    info!(
        "Resolved {} env vars and {} volume keys",
        output.env_vars.len(),
        output.volume_keys.len()
    );
    Ok(output)
}
