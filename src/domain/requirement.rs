use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;

/// A single requirement, at either the high-level or the software level.
///
/// Records are only ever constructed by [`validate`](crate::validate), so the
/// required fields are known to be present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementRecord {
    pub(crate) id: NonEmptyString,
    pub(crate) name: NonEmptyString,
    pub(crate) status: Status,
    pub(crate) description: NonEmptyString,
    pub(crate) refines: Option<NonEmptyString>,
}

impl RequirementRecord {
    /// The identifier, unique within the record's level.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// The short name of the requirement.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The lifecycle status.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// The free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// The id of the high-level requirement this one refines, if any.
    #[must_use]
    pub fn refines(&self) -> Option<&str> {
        self.refines.as_ref().map(NonEmptyString::as_str)
    }
}

/// The lifecycle status of a requirement.
///
/// Parsing is case-insensitive. Values outside the known set are preserved
/// as [`Status::Other`] so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Not yet ready for review.
    Draft,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    InReview,
    /// Done.
    Finished,
    /// An unrecognised status, kept verbatim.
    Other(String),
}

impl Status {
    /// Whether this is one of the recognised statuses.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// A lowercase, hyphenated form suitable for CSS class names.
    ///
    /// For example, `in progress` becomes `in-progress`.
    #[must_use]
    pub fn slug(&self) -> String {
        self.to_string()
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "draft" => Self::Draft,
            "in progress" => Self::InProgress,
            "in review" => Self::InReview,
            "finished" => Self::Finished,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("draft"),
            Self::InProgress => f.write_str("in progress"),
            Self::InReview => f.write_str("in review"),
            Self::Finished => f.write_str("finished"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// A field of a requirement record, as named in the YAML input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `id`
    Id,
    /// `name`
    Name,
    /// `status`
    Status,
    /// `refines`
    Refines,
    /// `description`
    Description,
}

impl Field {
    /// The YAML key for this field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Status => "status",
            Self::Refines => "refines",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One of the two levels of the requirement hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Parent-level requirements that define the overall project scope.
    HighLevel,
    /// Child-level requirements, each refining a high-level requirement.
    Software,
}

impl Level {
    /// Human-readable label used in problem messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighLevel => "High-level",
            Self::Software => "Software",
        }
    }

    /// The fields an entry at this level must define.
    #[must_use]
    pub const fn required_fields(self) -> &'static [Field] {
        match self {
            Self::HighLevel => &[Field::Id, Field::Name, Field::Status, Field::Description],
            Self::Software => &[
                Field::Id,
                Field::Name,
                Field::Status,
                Field::Refines,
                Field::Description,
            ],
        }
    }

    /// The name of the page listing requirements at this level.
    #[must_use]
    pub const fn page(self) -> &'static str {
        match self {
            Self::HighLevel => "high_level",
            Self::Software => "software",
        }
    }

    /// The page title for this level.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::HighLevel => "High-Level Requirements",
            Self::Software => "Software Requirements",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
