// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

/// Reasons an annotation pair could not be turned into a binding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("annotation key '{0}' does not carry the binding prefix")]
    InvalidPrefix(String),

    #[error("annotation value '{0}' does not match binding:<type>:...")]
    MalformedValue(String),

    #[error("unknown binding type '{0}'")]
    UnknownBindingType(String),

    #[error("no handler found for annotation value '{0}'")]
    HandlerNotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldAccessError {
    #[error("field '{0}' not found")]
    NotFound(String),

    #[error("field '{path}' is not a {expected}")]
    TypeMismatch { path: String, expected: &'static str },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{resource} '{namespace}/{name}' not found")]
    NotFound {
        resource: String,
        namespace: String,
        name: String,
    },

    #[error("resource type '{0}' is not served by the cluster")]
    UnknownResource(String),

    #[error("cluster request failed: {0}")]
    Transport(#[source] kube::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot merge {incoming} into {existing} at '{path}'")]
pub struct MergeTypeError {
    pub path: String,
    pub existing: &'static str,
    pub incoming: &'static str,
}

#[derive(Error, Debug)]
#[error("custom env var '{name}' failed to render: {source}")]
pub struct TemplateError {
    pub name: String,
    #[source]
    pub source: minijinja::Error,
}

#[derive(Error, Debug)]
pub enum BinderError {
    #[error("Invalid annotation: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Field access failed: {0}")]
    FieldAccess(#[from] FieldAccessError),

    #[error("Failed to decode value: {0}")]
    Decode(String),

    #[error("Failed to fetch related resource: {0}")]
    Fetch(#[from] FetchError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeTypeError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),
}

impl BinderError {
    /// Classification failures only affect the annotation being processed.
    pub fn is_skippable(&self) -> bool {
        matches!(self, BinderError::Classification(_))
    }

    /// True when the error stems from a missing cluster object.
    pub fn is_not_found(&self) -> bool {
        match self {
            BinderError::Fetch(FetchError::NotFound { .. } | FetchError::UnknownResource(_)) => {
                true
            }
            BinderError::KubeError(kube::Error::Api(err)) => err.code == 404,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BinderError>;
