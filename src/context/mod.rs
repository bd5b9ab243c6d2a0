// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service contexts and their composition into env vars.

pub mod composer;
pub mod custom_env;
pub mod envvars;
pub mod service;

pub use composer::{process_service_contexts, BindingOutput};
pub use custom_env::CustomEnvParser;
pub use envvars::build_env_vars;
pub use service::{build_service_context, build_service_contexts, BuildOptions, ServiceContext};
