// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes read access: the cluster reader, related resource fetching and lookups.

pub mod lookup;
pub mod object;
pub mod reader;
pub mod related;

pub use lookup::{find_crd_description, find_owned_resources, find_service, find_service_crd, OwnedResource};
pub use reader::{api_version, gvr_name, ClusterReader, KubeClusterReader};
pub use related::{fetch_related, RelatedResource};
