// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Classification of binding annotations.

use crate::constants::annotations;
use crate::error::ClassificationError;
use crate::nested::{Decoder, Path};
use kube::core::GroupVersionResource;
use std::fmt;
use tracing::trace;

/// The closed set of supported bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// A field of the backing service itself
    EnvAttribute,
    /// Items of a Secret named by a field of the backing service
    EnvObjectSecret,
    /// Items of a ConfigMap named by a field of the backing service
    EnvObjectConfigMap,
    /// Secret items projected as files instead of environment variables
    VolumeMount,
}

/// Where a binding reads its data from when it is not the owning object.
#[derive(Debug, Clone)]
pub struct RelatedTarget {
    pub gvr: GroupVersionResource,
    pub input_root: Path,
    pub decoder: Decoder,
}

/// Annotation value prefixes mapped to their binding type.
const HANDLERS: &[(&str, BindingType)] = &[
    (annotations::ATTRIBUTE, BindingType::EnvAttribute),
    (annotations::SECRET, BindingType::EnvObjectSecret),
    (annotations::CONFIGMAP, BindingType::EnvObjectConfigMap),
    (annotations::VOLUMEMOUNT_SECRET, BindingType::VolumeMount),
];

impl BindingType {
    /// The related resource read by this binding, `None` for attributes.
    pub fn related(self) -> Option<RelatedTarget> {
        let (resource, decoder) = match self {
            BindingType::EnvAttribute => return None,
            BindingType::EnvObjectSecret | BindingType::VolumeMount => ("secrets", Decoder::Base64),
            BindingType::EnvObjectConfigMap => ("configmaps", Decoder::Identity),
        };
        Some(RelatedTarget {
            gvr: GroupVersionResource::gvr("", "v1", resource),
            input_root: Path::new("data"),
            decoder,
        })
    }
}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingType::EnvAttribute => "attribute",
            BindingType::EnvObjectSecret => "object-secret-item",
            BindingType::EnvObjectConfigMap => "object-configmap-item",
            BindingType::VolumeMount => "volume-mount",
        };
        f.write_str(name)
    }
}

/// A classified binding annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingSpec {
    pub binding_type: BindingType,
    pub resource_reference_path: Path,
    /// Empty when the whole referenced value is bound
    pub source_path: Path,
    /// The raw annotation value
    pub value: String,
}

/// Extract the binding category from `binding:<category>:...`.
pub fn binding_category(value: &str) -> Result<&str, ClassificationError> {
    let category = value
        .strip_prefix("binding:")
        .and_then(|rest| rest.split_once(':'))
        .map(|(category, _)| category)
        .ok_or_else(|| ClassificationError::MalformedValue(value.to_string()))?;

    if !annotations::BINDING_TYPES.contains(&category) {
        return Err(ClassificationError::UnknownBindingType(category.to_string()));
    }
    Ok(category)
}

/// Find the handler for a value, along with a trailing item such as `user`
/// in `binding:env:object:secret:user`.
fn lookup_handler(value: &str) -> Option<(BindingType, Option<&str>)> {
    HANDLERS.iter().find_map(|(prefix, binding_type)| {
        let rest = value.strip_prefix(prefix)?;
        match rest.strip_prefix(':') {
            None if rest.is_empty() => Some((*binding_type, None)),
            Some(item) if !item.is_empty() && *binding_type != BindingType::EnvAttribute => {
                Some((*binding_type, Some(item)))
            }
            _ => None,
        }
    })
}

/// Parse a `<prefix>/<reference-path>[-<source-path>]` key and a
/// `binding:<type>:...` value into a [`BindingSpec`].
pub fn classify(key: &str, value: &str) -> Result<BindingSpec, ClassificationError> {
    let body = key
        .strip_prefix(annotations::PREFIX)
        .ok_or_else(|| ClassificationError::InvalidPrefix(key.to_string()))?;

    binding_category(value)?;
    let (binding_type, item) = lookup_handler(value)
        .ok_or_else(|| ClassificationError::HandlerNotFound(value.to_string()))?;

    let (reference, source) = match body.split_once('-') {
        Some((reference, source)) if !source.is_empty() && source != reference => {
            (reference, Some(source))
        }
        Some((reference, _)) => (reference, None),
        None => (body, None),
    };

    let source_path = match source.or(item) {
        // related resource items are keys of a flat data map and may contain dots
        Some(source) if binding_type.related().is_some() => Path::from_segments([source]),
        Some(source) => Path::new(source),
        None => Path::default(),
    };

    let spec = BindingSpec {
        binding_type,
        resource_reference_path: Path::new(reference),
        source_path,
        value: value.to_string(),
    };
    trace!(
        "Classified {} as {} (reference={}, source={})",
        key,
        spec.binding_type,
        spec.resource_reference_path,
        spec.source_path
    );
    Ok(spec)
}
