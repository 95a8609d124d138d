// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for NDD crates.
//!
//! # Modules
//!
//! - [`particles`] - In-memory particle table with the usual EM species
//! - [`registry`] - Process registry fake that records every registration
//! - [`steps`] - Step builder for driving hit collectors
//! - [`fixtures`] - Ready-made detector configurations
#![forbid(unsafe_code)]

pub mod fixtures;
pub mod particles;
pub mod registry;
pub mod steps;

pub use fixtures::{all_sources_config, mismatched_sources_config, source_position};
pub use particles::{standard_particles, InMemoryParticleCatalog};
pub use registry::RecordingProcessRegistry;
pub use steps::StepBuilder;
