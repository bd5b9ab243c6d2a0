// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Binding handlers turning a classified annotation into resolved data.

use crate::annotations::binding::{BindingSpec, BindingType, RelatedTarget};
use crate::error::{BinderError, Result};
use crate::kubernetes::{fetch_related, ClusterReader, RelatedResource};
use crate::nested::{self, Decoder, Path};
use serde_json::Value;
use tracing::{debug, instrument};

/// The outcome of one handled annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue {
    /// The value placed at the output path, merged into the env var tree
    pub data: Value,
    pub binding_type: BindingType,
    /// Dotted output path, e.g. `secret.user`
    pub path: String,
    /// The value placed at the source path, merged into the object snapshot
    pub raw_data: Value,
}

/// A handler ready to run. Related resources are fetched at construction.
#[derive(Debug, Clone)]
pub enum Handler {
    Attribute {
        spec: BindingSpec,
        resource: Value,
    },
    Resource {
        spec: BindingSpec,
        related: RelatedResource,
        input_root: Path,
        decoder: Decoder,
    },
}

impl Handler {
    /// Build the handler for `spec`, reading the related resource from the
    /// owner's namespace when the binding needs one.
    #[instrument(
        skip(reader, owner, spec),
        fields(binding = %spec.binding_type, value = %spec.value, reference = %spec.resource_reference_path)
    )]
    pub async fn build<R: ClusterReader>(reader: &R, owner: &Value, spec: BindingSpec) -> Result<Self> {
        if spec.resource_reference_path.is_empty() {
            return Err(BinderError::InvalidArgument(
                "resource reference path is empty".to_string(),
            ));
        }

        match spec.binding_type.related() {
            None => Ok(Handler::Attribute {
                spec,
                resource: owner.clone(),
            }),
            Some(RelatedTarget {
                gvr,
                input_root,
                decoder,
            }) => {
                let related =
                    fetch_related(reader, owner, &spec.resource_reference_path, &gvr, None).await?;
                Ok(Handler::Resource {
                    spec,
                    related,
                    input_root,
                    decoder,
                })
            }
        }
    }

    pub fn handle(&self) -> Result<ResolvedValue> {
        match self {
            Handler::Attribute { spec, resource } => handle_attribute(spec, resource),
            Handler::Resource {
                spec,
                related,
                input_root,
                decoder,
            } => handle_resource(spec, related, input_root, *decoder),
        }
    }
}

fn handle_attribute(spec: &BindingSpec, resource: &Value) -> Result<ResolvedValue> {
    let input_path = spec.resource_reference_path.join(&spec.source_path);
    let val = nested::extract(resource, &input_path, Decoder::Identity)?;

    // `status.dbConnectionIP` is exposed as `dbConnectionIP`
    let output_path = if !spec.source_path.is_empty() {
        spec.source_path.clone()
    } else if spec.resource_reference_path.len() > 1 {
        spec.resource_reference_path.tail()
    } else {
        spec.resource_reference_path.clone()
    };

    debug!("Resolved attribute {} as {}", input_path, output_path);
    Ok(ResolvedValue {
        data: nested::compose(val.clone(), &output_path),
        binding_type: spec.binding_type,
        path: output_path.to_string(),
        raw_data: nested::compose(val, &input_path),
    })
}

fn handle_resource(
    spec: &BindingSpec,
    related: &RelatedResource,
    input_root: &Path,
    decoder: Decoder,
) -> Result<ResolvedValue> {
    let input_path = input_root.join(&spec.source_path);
    let val = nested::extract(&related.object, &input_path, decoder)?;

    let output_path = Path::from_segments([related.kind.to_lowercase()]).join(&spec.source_path);
    let raw_data_path = spec.resource_reference_path.join(&spec.source_path);

    debug!(
        "Resolved {} {} as {}",
        related.kind, input_path, output_path
    );
    Ok(ResolvedValue {
        data: nested::compose(val.clone(), &output_path),
        binding_type: spec.binding_type,
        path: output_path.to_string(),
        raw_data: nested::compose(val, &raw_data_path),
    })
}
