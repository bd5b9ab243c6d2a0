// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Binding annotations: classification and handlers.

pub mod binding;
pub mod handler;

pub use binding::{classify, BindingSpec, BindingType};
pub use handler::{Handler, ResolvedValue};
