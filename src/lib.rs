//! Requirements documentation builder
//!
//! Requirements are YAML records at two levels (high-level and software),
//! architecture diagrams are PlantUML sources. Both are turned into a set of
//! cross-linked HTML pages.

pub mod domain;
pub use domain::{
    Config, Field, Level, LinkTable, Problem, RequirementRecord, Status, Validated, validate,
};

/// PlantUML diagram encoding and rendering.
pub mod diagram;
pub use diagram::{RenderClient, RenderResult};

/// Filesystem access to the documentation sources and build output.
pub mod storage;
pub use storage::{Directory, LoadError};

/// HTML page generation.
pub mod site;

mod build;
pub use build::{Build, BuildReport, Checked, DiagramOutcome, DiagramState, check};
