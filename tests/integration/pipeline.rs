//! End-to-end pipeline tests: files on disk, a scripted provider, parsed units.

use super::test_utils::{
    write_file, RejectingProvider, ScriptedProvider, FRACTIONS_CSV, SAMPLE_CSV, STANDARDS_CSV,
    TWO_UNIT_REPLY,
};
use scopeseq::error::SequenceError;
use scopeseq::export::export_units_csv;
use scopeseq::prompt::{GenerationConfig, SAMPLE_FRAMING};
use scopeseq::provider::{MessageRole, ProviderConfig};
use scopeseq::sample::map_sample;
use scopeseq::sequencer::{RequestSettings, Sequencer};
use scopeseq::standards::{load_sample_assignments, StandardsTable};
use scopeseq::units::{validate_units, ParseOutcome, UnitIssue};
use tempfile::TempDir;

fn settings() -> RequestSettings {
    RequestSettings::from_config(&ProviderConfig::default())
}

#[tokio::test]
async fn test_single_unit_request_without_sample() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);
    let standards = StandardsTable::load(&path).unwrap();

    let reply = r#"[{"unit_title":"U1","standards":["S1","S2"],"description":"d","duration_weeks":2}]"#;
    let (provider, seen) = ScriptedProvider::new(reply);
    let sequencer = Sequencer::new(Box::new(provider), settings());

    let config = GenerationConfig {
        unit_count: Some(1),
        group_by_theme: false,
    };
    let generation = sequencer.generate(&standards, None, &config).await.unwrap();

    assert!(generation.prompt.contains("S1: Add fractions"));
    assert!(generation.prompt.contains("S2: Subtract fractions"));
    assert!(generation.prompt.contains("exactly 1 instructional units"));
    assert!(!generation.prompt.contains(SAMPLE_FRAMING));

    let sent = seen.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][1].role, MessageRole::User);
    assert_eq!(sent[0][1].content, generation.prompt);

    let units = generation.outcome.into_result().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].unit_title, "U1");
    assert!(validate_units(&units, &standards).is_empty());
}

#[tokio::test]
async fn test_sample_sequence_flows_into_request() {
    let temp = TempDir::new().unwrap();
    let standards_path = write_file(temp.path(), "standards.csv", STANDARDS_CSV);
    let sample_path = write_file(temp.path(), "sample.csv", SAMPLE_CSV);

    let standards = StandardsTable::load(&standards_path).unwrap();
    let assignments = load_sample_assignments(&sample_path).unwrap();
    let sample_units = map_sample(&standards, &assignments);
    assert_eq!(sample_units.len(), 2);
    assert_eq!(sample_units[0].unit_title, "Fraction Sense");
    assert_eq!(sample_units[0].standards, vec!["4.NF.2", "4.NF.1"]);

    let (provider, _seen) = ScriptedProvider::new(TWO_UNIT_REPLY);
    let sequencer = Sequencer::new(Box::new(provider), settings());
    let config = GenerationConfig {
        unit_count: Some(2),
        group_by_theme: true,
    };
    let generation = sequencer
        .generate(&standards, Some(sample_units.as_slice()), &config)
        .await
        .unwrap();

    assert!(generation.prompt.contains(SAMPLE_FRAMING));
    assert!(generation
        .prompt
        .contains("Unit: Fraction Sense\nStandards: 4.NF.2, 4.NF.1"));
    assert!(generation.prompt.contains("Unit: Measurement"));

    let units = match generation.outcome {
        ParseOutcome::Parsed(units) => units,
        ParseOutcome::Failed(failure) => panic!("unexpected parse failure: {}", failure.reason),
    };
    assert_eq!(units.len(), 2);
    assert_eq!(units[1].duration_weeks, 2.5);

    // 4.MD.1 was not placed in any unit.
    let issues = validate_units(&units, &standards);
    assert_eq!(
        issues,
        vec![UnitIssue::UnassignedStandard {
            id: "4.MD.1".to_string()
        }]
    );

    let export_path = temp.path().join("units.csv");
    export_units_csv(&units, &export_path).unwrap();
    let exported = std::fs::read_to_string(&export_path).unwrap();
    assert!(exported.contains("Fraction Foundations,\"4.NF.1, 4.NF.2\",Equivalence and comparison.,3"));
}

#[tokio::test]
async fn test_truncated_reply_surfaces_raw_text() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);
    let standards = StandardsTable::load(&path).unwrap();

    let truncated = "[{\"unit_title\": \"Fractions\", \"standards\": [\"S1\"";
    let (provider, _seen) = ScriptedProvider::new(truncated);
    let sequencer = Sequencer::new(Box::new(provider), settings());
    let generation = sequencer
        .generate(&standards, None, &GenerationConfig::default())
        .await
        .unwrap();

    let failure = generation.outcome.into_result().unwrap_err();
    assert_eq!(failure.raw, truncated);
}

#[tokio::test]
async fn test_remote_errors_propagate() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);
    let standards = StandardsTable::load(&path).unwrap();

    let sequencer = Sequencer::new(Box::new(RejectingProvider), settings());
    let err = sequencer
        .generate(&standards, None, &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SequenceError::ProviderAuthFailed(_)));
}

#[test]
fn test_json_standards_file_matches_csv() {
    let temp = TempDir::new().unwrap();
    let csv_path = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);
    let json_path = write_file(
        temp.path(),
        "standards.json",
        r#"[{"id": "S1", "description": "Add fractions"}, {"id": "S2", "description": "Subtract fractions"}]"#,
    );
    let from_csv = StandardsTable::load(&csv_path).unwrap();
    let from_json = StandardsTable::load(&json_path).unwrap();
    assert_eq!(from_csv, from_json);
}

#[test]
fn test_missing_column_is_reported_by_kind() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "sample.csv", "id,unit\nS1,Fractions\n");
    let err = load_sample_assignments(&path).unwrap_err();
    assert!(err.to_string().starts_with("Sample map must have 'id' and 'unit_title' columns"));
}
