//! Specforge - incremental artifact generation
//!
//! Turns declarative spec manifests into SDK bindings, API schemas,
//! and spec documents, regenerating only what changed since the last
//! run.

pub mod cache;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod generator;
pub mod generators;
pub mod hash;
pub mod kinds;
pub mod orchestrator;
pub mod plan;
pub mod resource;
pub mod router;
pub mod spec;
pub mod step;

pub use error::{SpecforgeError, SpecforgeResult};
