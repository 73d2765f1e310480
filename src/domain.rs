//! Domain models for requirements documentation.
//!
//! This module contains the requirement records, their validation and the
//! cross-reference table linking the two requirement levels.

/// Requirement records and hierarchy levels.
pub mod requirement;
pub use requirement::{Field, Level, RequirementRecord, Status};

mod config;
pub use config::{Config, ConfigError, DiagramEntry, RenderConfig};

mod problem;
pub use problem::Problem;

/// Validation of raw requirement records.
pub mod validate;
pub use validate::{Validated, validate};

/// Cross-references between high-level and software requirements.
pub mod links;
pub use links::{Anchor, LinkTable};
