use std::path::PathBuf;

use crate::domain::Field;

/// A problem found while building the documentation.
///
/// Problems never abort a build. They are accumulated in discovery order
/// and reported once the build has finished.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Problem {
    /// An input file could not be read or parsed.
    #[error("Could not load {}: {reason}", .path.display())]
    Load {
        /// The file that failed to load.
        path: PathBuf,
        /// Why loading failed.
        reason: String,
    },

    /// The document is not a list of entries.
    #[error("{level} YAML must be a list of items.")]
    NotAList {
        /// Label of the requirement level.
        level: String,
    },

    /// An entry in the list is not a mapping.
    #[error("{level}[{index}] must be a mapping/dict.")]
    NotAMapping {
        /// Label of the requirement level.
        level: String,
        /// Position of the entry in the input list.
        index: usize,
    },

    /// An entry is missing one or more required fields.
    #[error("{level}[{index}] missing required fields: {}.", join(.fields))]
    MissingFields {
        /// Label of the requirement level.
        level: String,
        /// Position of the entry in the input list.
        index: usize,
        /// Every missing field, in schema order.
        fields: Vec<Field>,
    },

    /// A field holds a list or mapping where a scalar is expected.
    #[error("{level}[{index}] field '{field}' must be a single value.")]
    InvalidField {
        /// Label of the requirement level.
        level: String,
        /// Position of the entry in the input list.
        index: usize,
        /// The offending field.
        field: Field,
    },

    /// An entry reuses the id of an earlier entry.
    #[error("{level} duplicate id '{id}'.")]
    DuplicateId {
        /// Label of the requirement level.
        level: String,
        /// The repeated id.
        id: String,
    },

    /// An entry has a status outside the known set. The entry is kept.
    #[error("{level} '{id}' has unknown status '{status}'.")]
    UnknownStatus {
        /// Label of the requirement level.
        level: String,
        /// The id of the entry.
        id: String,
        /// The status as written.
        status: String,
    },

    /// Software requirements refining a high-level id that does not exist.
    #[error(
        "Dangling software requirements (no matching high-level refines): {}",
        .ids.join(", ")
    )]
    DanglingReferences {
        /// The ids of the dangling software requirements.
        ids: Vec<String>,
    },

    /// A build artifact could not be written.
    #[error("Could not write {}: {reason}", .path.display())]
    Write {
        /// The output path.
        path: PathBuf,
        /// Why writing failed.
        reason: String,
    },
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.key())
        .collect::<Vec<_>>()
        .join(", ")
}
