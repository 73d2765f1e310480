//! This bench measures encoding diagram sources into render tokens, and
//! validating and linking a large generated requirement set.

#![allow(missing_docs)]

use std::fmt::Write;

use criterion::{Criterion, criterion_group, criterion_main};
use reqdocs::{Level, LinkTable, diagram, validate};

/// A sequence diagram with `messages` arrows
fn diagram_source(messages: usize) -> String {
    let mut source = String::from("@startuml\nactor User\nparticipant Rover\n");
    for i in 0..messages {
        writeln!(source, "User -> Rover : command {i}").unwrap();
        writeln!(source, "Rover --> User : ack {i}").unwrap();
    }
    source.push_str("@enduml\n");
    source
}

/// `parents` high-level records, each refined by two software records
fn requirements(parents: usize) -> (serde_yaml::Value, serde_yaml::Value) {
    let mut high_level = String::new();
    let mut software = String::new();
    for i in 1..=parents {
        writeln!(
            high_level,
            "- id: HL-{i}\n  name: Requirement {i}\n  status: draft\n  description: Parent {i}."
        )
        .unwrap();
        for j in 1..=2 {
            writeln!(
                software,
                "- id: SW-{i}-{j}\n  name: Requirement {i}.{j}\n  status: finished\n  refines: HL-{i}\n  description: Child {j} of {i}."
            )
            .unwrap();
        }
    }
    (
        serde_yaml::from_str(&high_level).unwrap(),
        serde_yaml::from_str(&software).unwrap(),
    )
}

fn encode(c: &mut Criterion) {
    let small = diagram_source(5);
    let large = diagram_source(500);

    c.bench_function("encode small diagram", |b| {
        b.iter(|| diagram::encode(&small));
    });
    c.bench_function("encode large diagram", |b| {
        b.iter(|| diagram::encode(&large));
    });
}

fn validate_and_link(c: &mut Criterion) {
    let (high_level, software) = requirements(500);

    c.bench_function("validate and link 1500 requirements", |b| {
        b.iter(|| {
            let parents = validate(
                Some(&high_level),
                Level::HighLevel.label(),
                Level::HighLevel.required_fields(),
            );
            let children = validate(
                Some(&software),
                Level::Software.label(),
                Level::Software.required_fields(),
            );
            LinkTable::build(&parents.records, &children.records)
        });
    });
}

criterion_group!(benches, encode, validate_and_link);
criterion_main!(benches);
