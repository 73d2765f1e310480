use std::collections::HashSet;

use non_empty_string::NonEmptyString;
use serde_yaml::{Mapping, Value};
use tracing::instrument;

use crate::domain::{Field, Problem, RequirementRecord, Status};

/// The outcome of validating one level's raw records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validated {
    /// The accepted records, in input order.
    pub records: Vec<RequirementRecord>,
    /// Every problem found, in discovery order.
    pub problems: Vec<Problem>,
}

impl Validated {
    fn report(&mut self, problem: Problem) {
        tracing::error!("{problem}");
        self.problems.push(problem);
    }
}

/// Validate the raw records of one requirement level.
///
/// `raw` is the parsed YAML document, or `None` if it failed to load (the
/// caller is responsible for reporting that). `label` names the level in
/// problem messages, and `required` lists the fields every entry must define.
/// `id`, `name`, `status` and `description` are needed to build a record at
/// all, so an entry lacking one of them is always rejected.
///
/// Every entry is visited; problems are accumulated rather than returned
/// early:
///
/// - entries that are not mappings, that lack a required field, or whose id
///   repeats an earlier accepted entry are dropped. Ids are compared as text,
///   so `7` and `'7'` are the same id;
/// - a list or mapping in a required field drops the entry, while one in an
///   optional field is treated as absent;
/// - entries with an unrecognised status are kept, with a problem noting the
///   status.
#[instrument(level = "debug", skip(raw))]
pub fn validate(raw: Option<&Value>, label: &str, required: &[Field]) -> Validated {
    let mut validated = Validated::default();

    let Some(raw) = raw else {
        return validated;
    };

    let Value::Sequence(entries) = raw else {
        validated.report(Problem::NotAList {
            level: label.to_string(),
        });
        return validated;
    };

    let mut seen_ids = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let Value::Mapping(mapping) = entry else {
            validated.report(Problem::NotAMapping {
                level: label.to_string(),
                index,
            });
            continue;
        };

        let (raw_entry, mut invalid) = RawEntry::read(mapping);
        // A nested value in an optional field is dropped, not rejected.
        invalid.retain(|field| required.contains(field) || CORE_FIELDS.contains(field));

        let missing: Vec<Field> = required
            .iter()
            .copied()
            .filter(|field| raw_entry.get(*field).is_none() && !invalid.contains(field))
            .collect();

        let rejected = !missing.is_empty() || !invalid.is_empty();
        if !missing.is_empty() {
            validated.report(Problem::MissingFields {
                level: label.to_string(),
                index,
                fields: missing,
            });
        }
        for field in invalid {
            validated.report(Problem::InvalidField {
                level: label.to_string(),
                index,
                field,
            });
        }
        if rejected {
            continue;
        }

        let record = match raw_entry.into_record() {
            Ok(record) => record,
            Err(fields) => {
                validated.report(Problem::MissingFields {
                    level: label.to_string(),
                    index,
                    fields,
                });
                continue;
            }
        };

        if !seen_ids.insert(record.id().to_string()) {
            validated.report(Problem::DuplicateId {
                level: label.to_string(),
                id: record.id().to_string(),
            });
            continue;
        }

        if let Status::Other(status) = record.status() {
            validated.report(Problem::UnknownStatus {
                level: label.to_string(),
                id: record.id().to_string(),
                status: status.clone(),
            });
        }

        validated.records.push(record);
    }

    tracing::debug!(
        accepted = validated.records.len(),
        total = entries.len(),
        "validated {label} requirements"
    );

    validated
}

/// Fields without which no record can be built.
const CORE_FIELDS: [Field; 4] = [Field::Id, Field::Name, Field::Status, Field::Description];

/// The known fields of one entry, before the required ones are checked.
#[derive(Debug, Default)]
struct RawEntry {
    id: Option<NonEmptyString>,
    name: Option<NonEmptyString>,
    status: Option<NonEmptyString>,
    refines: Option<NonEmptyString>,
    description: Option<NonEmptyString>,
}

impl RawEntry {
    /// Reads the known fields, returning the fields whose value is not a
    /// scalar alongside.
    fn read(mapping: &Mapping) -> (Self, Vec<Field>) {
        let mut entry = Self::default();
        let mut invalid = Vec::new();

        for field in [
            Field::Id,
            Field::Name,
            Field::Status,
            Field::Refines,
            Field::Description,
        ] {
            match scalar(mapping.get(field.key())) {
                Scalar::Present(value) => *entry.slot(field) = Some(value),
                Scalar::Missing => {}
                Scalar::Invalid => invalid.push(field),
            }
        }

        (entry, invalid)
    }

    fn slot(&mut self, field: Field) -> &mut Option<NonEmptyString> {
        match field {
            Field::Id => &mut self.id,
            Field::Name => &mut self.name,
            Field::Status => &mut self.status,
            Field::Refines => &mut self.refines,
            Field::Description => &mut self.description,
        }
    }

    const fn get(&self, field: Field) -> Option<&NonEmptyString> {
        match field {
            Field::Id => self.id.as_ref(),
            Field::Name => self.name.as_ref(),
            Field::Status => self.status.as_ref(),
            Field::Refines => self.refines.as_ref(),
            Field::Description => self.description.as_ref(),
        }
    }

    /// Builds the record, or returns the fields a record cannot do without.
    fn into_record(self) -> Result<RequirementRecord, Vec<Field>> {
        match (self.id, self.name, self.status, self.description) {
            (Some(id), Some(name), Some(status), Some(description)) => Ok(RequirementRecord {
                id,
                name,
                status: status.as_str().parse().unwrap_or_else(|never| match never {}),
                description,
                refines: self.refines,
            }),
            (id, name, status, description) => Err([
                (Field::Id, id.is_none()),
                (Field::Name, name.is_none()),
                (Field::Status, status.is_none()),
                (Field::Description, description.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect()),
        }
    }
}

enum Scalar {
    Missing,
    Present(NonEmptyString),
    Invalid,
}

/// Interprets a field value. Null and blank strings count as missing;
/// numbers and booleans are taken in their string form.
fn scalar(value: Option<&Value>) -> Scalar {
    let text = match value {
        None | Some(Value::Null) => return Scalar::Missing,
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Tagged(tagged)) => return scalar(Some(&tagged.value)),
        Some(Value::Sequence(_) | Value::Mapping(_)) => return Scalar::Invalid,
    };

    if text.trim().is_empty() {
        return Scalar::Missing;
    }

    NonEmptyString::new(text).map_or(Scalar::Missing, Scalar::Present)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Level;

    fn yaml(input: &str) -> Value {
        serde_yaml::from_str(input).unwrap()
    }

    fn high_level(input: &str) -> Validated {
        let level = Level::HighLevel;
        validate(Some(&yaml(input)), level.label(), level.required_fields())
    }

    fn software(input: &str) -> Validated {
        let level = Level::Software;
        validate(Some(&yaml(input)), level.label(), level.required_fields())
    }

    #[test]
    fn absent_input_yields_nothing() {
        let validated = validate(None, "High-level", Level::HighLevel.required_fields());
        assert!(validated.records.is_empty());
        assert!(validated.problems.is_empty());
    }

    #[test]
    fn non_list_document_is_a_single_problem() {
        let validated = high_level("id: HL-1\nname: Not a list\n");
        assert!(validated.records.is_empty());
        assert_eq!(
            validated.problems,
            vec![Problem::NotAList {
                level: "High-level".to_string()
            }]
        );
    }

    #[test]
    fn missing_description_rejects_entry() {
        let validated = high_level(
            r"
- id: HL-1
  name: Login
  status: draft
",
        );
        assert!(validated.records.is_empty());
        assert_eq!(
            validated.problems,
            vec![Problem::MissingFields {
                level: "High-level".to_string(),
                index: 0,
                fields: vec![Field::Description],
            }]
        );
    }

    #[test]
    fn all_missing_fields_are_named() {
        let validated = software(
            r"
- id: SW-1
  name: ''
  status: ~
",
        );
        assert_eq!(
            validated.problems,
            vec![Problem::MissingFields {
                level: "Software".to_string(),
                index: 0,
                fields: vec![
                    Field::Name,
                    Field::Status,
                    Field::Refines,
                    Field::Description
                ],
            }]
        );
    }

    #[test]
    fn duplicate_id_keeps_first() {
        let validated = high_level(
            r"
- id: HL-1
  name: First
  status: draft
  description: The original.
- id: HL-1
  name: Second
  status: finished
  description: The copy.
",
        );
        assert_eq!(validated.records.len(), 1);
        assert_eq!(validated.records[0].name(), "First");
        assert_eq!(
            validated.problems,
            vec![Problem::DuplicateId {
                level: "High-level".to_string(),
                id: "HL-1".to_string(),
            }]
        );
    }

    #[test]
    fn mixed_case_status_is_accepted() {
        let validated = high_level(
            r"
- id: HL-1
  name: Login
  status: Finished
  description: Users can log in.
",
        );
        assert!(validated.problems.is_empty());
        assert_eq!(validated.records[0].status(), &Status::Finished);
    }

    #[test]
    fn unknown_status_is_kept_with_problem() {
        let validated = high_level(
            r"
- id: HL-1
  name: Login
  status: Blocked
  description: Users can log in.
",
        );
        assert_eq!(validated.records.len(), 1);
        assert_eq!(
            validated.problems,
            vec![Problem::UnknownStatus {
                level: "High-level".to_string(),
                id: "HL-1".to_string(),
                status: "Blocked".to_string(),
            }]
        );
    }

    #[test]
    fn non_mapping_entries_are_skipped() {
        let validated = high_level(
            r"
- just a string
- id: HL-2
  name: Logout
  status: draft
  description: Users can log out.
",
        );
        assert_eq!(validated.records.len(), 1);
        assert_eq!(validated.records[0].id(), "HL-2");
        assert_eq!(
            validated.problems,
            vec![Problem::NotAMapping {
                level: "High-level".to_string(),
                index: 0,
            }]
        );
    }

    #[test]
    fn scalar_values_are_stringified_and_extra_fields_ignored() {
        let validated = software(
            r"
- id: 7
  name: Numeric id
  status: in progress
  refines: 1
  description: Works.
  owner: someone
",
        );
        assert!(validated.problems.is_empty());
        let record = &validated.records[0];
        assert_eq!(record.id(), "7");
        assert_eq!(record.refines(), Some("1"));
        assert_eq!(record.status(), &Status::InProgress);
    }

    #[test]
    fn nested_values_are_rejected() {
        let validated = high_level(
            r"
- id: HL-1
  name: [not, a, name]
  status: draft
  description: Something.
",
        );
        assert!(validated.records.is_empty());
        assert_eq!(
            validated.problems,
            vec![Problem::InvalidField {
                level: "High-level".to_string(),
                index: 0,
                field: Field::Name,
            }]
        );
    }

    #[test]
    fn nested_optional_field_is_ignored() {
        let validated = high_level(
            r"
- id: HL-1
  name: Login
  status: draft
  description: ok
  refines: [a, b]
",
        );
        assert!(validated.problems.is_empty());
        assert_eq!(validated.records.len(), 1);
        assert_eq!(validated.records[0].refines(), None);
    }

    #[test]
    fn nested_required_refines_is_rejected() {
        let validated = software(
            r"
- id: SW-1
  name: Login
  status: draft
  description: ok
  refines: {id: HL-1}
",
        );
        assert!(validated.records.is_empty());
        assert_eq!(
            validated.problems,
            vec![Problem::InvalidField {
                level: "Software".to_string(),
                index: 0,
                field: Field::Refines,
            }]
        );
    }

    #[test]
    fn numeric_and_string_ids_compare_by_text() {
        let validated = high_level(
            r"
- id: 7
  name: Number
  status: draft
  description: Numeric id.
- id: '7'
  name: Text
  status: draft
  description: Quoted id.
",
        );
        assert_eq!(validated.records.len(), 1);
        assert_eq!(validated.records[0].name(), "Number");
        assert_eq!(
            validated.problems,
            vec![Problem::DuplicateId {
                level: "High-level".to_string(),
                id: "7".to_string(),
            }]
        );
    }

    #[test]
    fn validation_continues_after_problems() {
        let validated = software(
            r"
- id: SW-1
  name: One
  status: draft
  description: Missing refines.
- 42
- id: SW-2
  name: Two
  status: draft
  refines: HL-1
  description: Fine.
- id: SW-2
  name: Two again
  status: draft
  refines: HL-1
  description: Duplicate.
- id: SW-3
  name: Three
  status: draft
  refines: HL-1
  description: Fine too.
",
        );
        let ids: Vec<_> = validated.records.iter().map(RequirementRecord::id).collect();
        assert_eq!(ids, vec!["SW-2", "SW-3"]);
        assert_eq!(validated.problems.len(), 3);
    }

    #[test]
    fn core_fields_are_required_even_if_not_listed() {
        let validated = validate(
            Some(&yaml("- id: X-1\n  status: draft\n  description: No name.\n")),
            "Custom",
            &[Field::Id],
        );
        assert!(validated.records.is_empty());
        assert_eq!(
            validated.problems,
            vec![Problem::MissingFields {
                level: "Custom".to_string(),
                index: 0,
                fields: vec![Field::Name],
            }]
        );
    }
}
