// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource shapes consumed by a resolution pass.

pub mod binding_request;
pub mod descriptor;

pub use binding_request::{BackingServiceSelector, CustomEnvVar, ServiceBindingRequest};
pub use descriptor::{CrdDescription, Descriptor};
