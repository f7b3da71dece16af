//! # glue-codegen
//!
//! C# glue generator for ClassDB reflection snapshots. It turns a dump of the
//! engine's classes, methods, properties, signals, enums and constants into
//! the `GodotSharp` and `GodotSharpEditor` source trees, together with the
//! native call shims that cross the managed/native boundary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use glue_codegen::{BindingsGenerator, ClassDb};
//!
//! let db = ClassDb::load("api_snapshot.json")?;
//! BindingsGenerator::new().write_cs_api(&db, "modules/mono/glue/GodotSharp")?;
//! ```
//!
//! Generation is a single pass: the snapshot is populated into a
//! [`TypeRegistry`], internal calls are deduplicated into an [`IcallTable`],
//! and the emitters render one file per class plus the project-level files.
//! The first inconsistency aborts the run with a [`GlueError`].

mod builtins;
mod defaults;
mod defs;
pub mod emit;
mod error;
mod generator;
mod icalls;
mod markup;
mod naming;
mod populate;
pub mod project;
pub mod reflection;
mod registry;
mod template;
pub mod types;

#[cfg(test)]
mod testing;

pub use defs::API_SOLUTION_NAME;
pub use error::{GlueError, Result};
pub use generator::BindingsGenerator;
pub use icalls::IcallTable;
pub use markup::{bbcode_to_text, bbcode_to_xml};
pub use populate::PopulateConfig;
pub use project::{FsWriter, MemoryWriter, SaveText};
pub use reflection::{ApiType, ClassDb};
pub use registry::{validate_api_visibility, TypeRegistry};
