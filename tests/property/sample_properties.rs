//! Sample sequence mapper properties

use proptest::prelude::*;
use scopeseq::sample::map_sample;
use scopeseq::standards::{SampleAssignment, Standard, StandardsTable};

fn standards() -> StandardsTable {
    StandardsTable::new(
        (1..=6)
            .map(|i| Standard::new(format!("S{}", i), format!("description {}", i)))
            .collect(),
    )
    .unwrap()
}

fn assignments_strategy() -> impl Strategy<Value = Vec<SampleAssignment>> {
    prop::collection::vec(("S[1-8]", "(Alpha|Beta|Gamma|Delta)"), 0..25).prop_map(|rows| {
        rows.into_iter()
            .map(|(id, title)| SampleAssignment::new(id, title))
            .collect()
    })
}

/// Groups come out sorted by title, and shuffling the input only reorders members.
#[test]
fn test_map_sample_is_shuffle_invariant() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let table = standards();

    runner
        .run(
            &assignments_strategy().prop_flat_map(|rows| {
                let shuffled = Just(rows.clone()).prop_shuffle();
                (Just(rows), shuffled)
            }),
            |(rows, shuffled)| {
                let original = map_sample(&table, &rows);
                let reordered = map_sample(&table, &shuffled);

                let titles: Vec<&str> = original.iter().map(|u| u.unit_title.as_str()).collect();
                let mut sorted = titles.clone();
                sorted.sort();
                sorted.dedup();
                prop_assert_eq!(&titles, &sorted);

                prop_assert_eq!(original.len(), reordered.len());
                for (a, b) in original.iter().zip(reordered.iter()) {
                    prop_assert_eq!(&a.unit_title, &b.unit_title);
                    let mut members_a: Vec<(&String, &String)> =
                        a.standards.iter().zip(a.descriptions.iter()).collect();
                    let mut members_b: Vec<(&String, &String)> =
                        b.standards.iter().zip(b.descriptions.iter()).collect();
                    members_a.sort();
                    members_b.sort();
                    prop_assert_eq!(members_a, members_b);
                }

                Ok(())
            },
        )
        .unwrap();
}

/// Every assignment yields exactly one member; unknown ids get an empty description.
#[test]
fn test_map_sample_keeps_every_assignment() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let table = standards();

    runner
        .run(&assignments_strategy(), |rows| {
            let units = map_sample(&table, &rows);
            let members: usize = units.iter().map(|u| u.standards.len()).sum();
            prop_assert_eq!(members, rows.len());

            for unit in &units {
                prop_assert_eq!(unit.standards.len(), unit.descriptions.len());
                for (id, description) in unit.standards.iter().zip(unit.descriptions.iter()) {
                    prop_assert_eq!(description.is_empty(), !table.contains_id(id));
                }
            }
            Ok(())
        })
        .unwrap();
}
