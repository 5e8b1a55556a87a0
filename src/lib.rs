//! Vortex Linker library - deploy Vortex-managed mods as symlinks.
//!
//! This library exposes the core functionality of the `vxl` CLI for use in tests
//! and other tools that need to read the Vortex state store.
//!
//! # Modules
//!
//! - `store`: locating, snapshotting and iterating the LevelDB state store
//! - `registry`: decoding `###` keys into a per-game mod registry
//! - `translate`: Wine drive paths to host paths
//! - `deploy`: planning, linking and cleaning up mod symlinks
//! - `fs`: filesystem seam with a real and an in-memory implementation
//! - `inspect`: read-only reports over the registry and raw store
//! - `error`: Error types with user-recoverable hints
//! - `output`: Output mode abstraction (robot/human)
//! - `config`: Configuration file handling
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod fs;
pub mod inspect;
pub mod logging;
pub mod output;
pub mod registry;
pub mod store;
pub mod theme;
pub mod translate;
