// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Omnigate gateway assembly.
//!
//! Deployments hand their storage, engine transport and connectors to
//! [`Runtime::assemble`]; the `omnigate` binary uses [`runtime::check`] to
//! start the config-derived parts on their own.

pub mod runtime;

pub use runtime::{CheckReport, Collaborators, Runtime};
