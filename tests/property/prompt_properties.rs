//! Request builder properties

use proptest::prelude::*;
use scopeseq::prompt::{build_prompt, GenerationConfig, SAMPLE_FRAMING, THEME_DIRECTIVE};
use scopeseq::standards::{Standard, StandardsTable};
use scopeseq::units::{parse_units, ParseOutcome};

fn standards_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[A-Z]{1,3}\\.[0-9]{1,2}", "[a-z][a-z ]{0,30}[a-z]"), 1..20)
}

fn table(rows: &[(String, String)]) -> StandardsTable {
    StandardsTable::new(
        rows.iter()
            .map(|(id, description)| Standard::new(id.clone(), description.clone()))
            .collect(),
    )
    .unwrap()
}

/// Every standard appears as "{id}: {description}", in table order.
#[test]
fn test_prompt_lists_every_standard_in_order() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(standards_strategy(), proptest::option::of(1u32..12), any::<bool>()),
            |(rows, unit_count, group_by_theme)| {
                let config = GenerationConfig {
                    unit_count,
                    group_by_theme,
                };
                let prompt = build_prompt(&table(&rows), None, &config);

                let mut cursor = 0;
                for (id, description) in &rows {
                    let line = format!("{}: {}", id, description);
                    let found = prompt[cursor..].find(&line);
                    prop_assert!(found.is_some(), "missing or out of order: {}", line);
                    cursor += found.unwrap_or(0) + line.len();
                }

                prop_assert_eq!(prompt.contains(THEME_DIRECTIVE), group_by_theme);
                prop_assert!(!prompt.contains(SAMPLE_FRAMING));
                if let Some(n) = unit_count {
                    let directive = format!("Create exactly {} instructional units.", n);
                    prop_assert!(prompt.contains(&directive));
                }

                Ok(())
            },
        )
        .unwrap();
}

/// Identical inputs give identical requests.
#[test]
fn test_prompt_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&standards_strategy(), |rows| {
            let config = GenerationConfig {
                unit_count: Some(4),
                group_by_theme: true,
            };
            let first = build_prompt(&table(&rows), None, &config);
            let second = build_prompt(&table(&rows), None, &config);
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

/// Arbitrary text never panics the parser, and failures keep the text verbatim.
#[test]
fn test_parse_units_never_panics() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<String>(), |raw| {
            if let ParseOutcome::Failed(failure) = parse_units(&raw) {
                prop_assert_eq!(failure.raw, raw);
            }
            Ok(())
        })
        .unwrap();
}
