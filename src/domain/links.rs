use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    fmt,
};

use nonempty::NonEmpty;
use tracing::instrument;

use crate::domain::{Level, RequirementRecord};

/// A link target: the card of one requirement on its level's page.
///
/// Displays as `<page>.html#<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor {
    level: Level,
    id: String,
}

impl Anchor {
    /// Creates an anchor for the requirement `id` at `level`.
    #[must_use]
    pub fn new(level: Level, id: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
        }
    }

    /// The id of the linked requirement.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The level of the linked requirement.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.html#{}", self.level.page(), self.id)
    }
}

/// Cross-references between high-level (parent) and software (child)
/// requirements.
///
/// Built once from two validated lists and never modified afterwards.
///
/// - every software requirement whose `refines` names a known high-level id
///   has a forward link to it, and appears in exactly one reverse list;
/// - every other software requirement is reported once as dangling.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkTable {
    /// Child id -> parent anchor.
    forward: HashMap<String, Anchor>,
    /// Parent id -> child anchors, in child-list order.
    reverse: HashMap<String, NonEmpty<Anchor>>,
    /// Child ids with no matching parent, in child-list order.
    dangling: Vec<String>,
}

impl LinkTable {
    /// Links `children` to `parents` through each child's `refines` field.
    #[instrument(level = "debug", skip_all, fields(parents = parents.len(), children = children.len()))]
    pub fn build(parents: &[RequirementRecord], children: &[RequirementRecord]) -> Self {
        let parent_ids: HashSet<&str> = parents.iter().map(RequirementRecord::id).collect();

        let mut table = Self::default();

        for child in children {
            let Some(parent) = child.refines().filter(|id| parent_ids.contains(id)) else {
                table.dangling.push(child.id().to_string());
                continue;
            };

            table.forward.insert(
                child.id().to_string(),
                Anchor::new(Level::HighLevel, parent),
            );

            let anchor = Anchor::new(Level::Software, child.id());
            match table.reverse.entry(parent.to_string()) {
                Entry::Occupied(mut entry) => entry.get_mut().push(anchor),
                Entry::Vacant(entry) => {
                    entry.insert(NonEmpty::new(anchor));
                }
            }
        }

        tracing::debug!(
            linked = table.forward.len(),
            dangling = table.dangling.len(),
            "built link table"
        );

        table
    }

    /// The high-level requirement refined by the software requirement
    /// `child_id`, if it exists.
    #[must_use]
    pub fn parent_of(&self, child_id: &str) -> Option<&Anchor> {
        self.forward.get(child_id)
    }

    /// The software requirements refining the high-level requirement
    /// `parent_id`.
    ///
    /// Returns `None` if nothing refines it.
    #[must_use]
    pub fn refined_by(&self, parent_id: &str) -> Option<&NonEmpty<Anchor>> {
        self.reverse.get(parent_id)
    }

    /// Software requirement ids whose `refines` matches no high-level id.
    #[must_use]
    pub fn dangling(&self) -> &[String] {
        &self.dangling
    }

    /// Whether the software requirement `child_id` is dangling.
    #[must_use]
    pub fn is_dangling(&self, child_id: &str) -> bool {
        self.dangling.iter().any(|id| id == child_id)
    }
}
