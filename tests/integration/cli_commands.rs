//! CLI route tests through RunContext::execute.

use super::test_utils::{
    with_env, with_xdg_env, write_file, ScriptedProvider, FRACTIONS_CSV, SAMPLE_CSV,
    STANDARDS_CSV, TWO_UNIT_REPLY,
};
use clap::Parser;
use scopeseq::cli::{Cli, GenerateOutput, GenerationArgs, InputArgs, RunContext};
use scopeseq::error::SequenceError;
use scopeseq::provider::ProviderConfig;
use scopeseq::sequencer::{RequestSettings, Sequencer};
use std::path::Path;
use tempfile::TempDir;

const TEST_KEY_ENV: &str = "SCOPESEQ_IT_API_KEY";

/// Workspace whose config points the key lookup at a test-only variable.
fn workspace(temp: &TempDir) -> std::path::PathBuf {
    let ws = temp.path().join("ws");
    write_file(
        &ws,
        "config/config.toml",
        &format!("[provider]\napi_key_env = \"{}\"\n", TEST_KEY_ENV),
    );
    ws
}

fn run(workspace: &Path, args: &[&str]) -> Result<String, SequenceError> {
    let mut argv = vec!["scopeseq", "--workspace", workspace.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())?;
    context.execute(&cli.command)
}

#[test]
fn test_prompt_command_prints_request_offline() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);

    let out = with_xdg_env(&temp, || {
        run(
            &ws,
            &[
                "prompt",
                "--standards",
                standards.to_str().unwrap(),
                "--units",
                "1",
                "--no-theme",
            ],
        )
    })
    .unwrap();

    assert!(out.starts_with("You are a curriculum designer."));
    assert!(out.contains("S1: Add fractions\nS2: Subtract fractions"));
    assert!(out.contains("Create exactly 1 instructional units."));
    assert!(!out.contains("Group standards by similar"));
}

#[test]
fn test_prompt_uses_configured_defaults() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);

    let out = with_xdg_env(&temp, || {
        run(&ws, &["prompt", "--standards", standards.to_str().unwrap()])
    })
    .unwrap();

    assert!(out.contains("Create exactly 6 instructional units."));
    assert!(out.contains("Group standards by similar instructional topics or learning themes."));
}

#[test]
fn test_preview_with_sample() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", STANDARDS_CSV);
    let sample = write_file(temp.path(), "sample.csv", SAMPLE_CSV);

    let out = with_xdg_env(&temp, || {
        run(
            &ws,
            &[
                "preview",
                "--standards",
                standards.to_str().unwrap(),
                "--sample",
                sample.to_str().unwrap(),
                "--format",
                "json",
            ],
        )
    })
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["standards"].as_array().unwrap().len(), 4);
    assert_eq!(value["sample_units"][0]["unit_title"], "Fraction Sense");
    assert_eq!(
        value["sample_units"][0]["descriptions"][0],
        "Compare two fractions"
    );
}

#[test]
fn test_preview_rejects_missing_columns() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", "id,text\nS1,Add fractions\n");

    let err = with_xdg_env(&temp, || {
        run(&ws, &["preview", "--standards", standards.to_str().unwrap()])
    })
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Standards file must have 'id' and 'description' columns (missing: description)"
    );
}

#[test]
fn test_prompt_skips_a_sample_map_with_missing_columns() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);
    let sample = write_file(temp.path(), "sample.csv", "id,unit\nS1,Fractions\n");

    let out = with_xdg_env(&temp, || {
        run(
            &ws,
            &[
                "prompt",
                "--standards",
                standards.to_str().unwrap(),
                "--sample",
                sample.to_str().unwrap(),
            ],
        )
    })
    .unwrap();

    assert!(out.starts_with("You are a curriculum designer. Group the following standards"));
    assert!(!out.contains("Sample:"));
    assert!(out.contains("S1: Add fractions\nS2: Subtract fractions"));
}

#[test]
fn test_preview_reports_a_skipped_sample_map() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", STANDARDS_CSV);
    let sample = write_file(temp.path(), "sample.csv", "id,unit\n4.NF.1,Fractions\n");

    let out = with_xdg_env(&temp, || {
        run(
            &ws,
            &[
                "preview",
                "--standards",
                standards.to_str().unwrap(),
                "--sample",
                sample.to_str().unwrap(),
                "--format",
                "json",
            ],
        )
    })
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["standards"].as_array().unwrap().len(), 4);
    assert!(value["sample_units"].as_array().unwrap().is_empty());
    let notice = value["notices"][0].as_str().unwrap();
    assert!(notice.ends_with(
        "ignored: Sample map must have 'id' and 'unit_title' columns (missing: unit_title)"
    ));
}

#[test]
fn test_generate_without_key_fails_before_reading_files() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);

    let err = with_xdg_env(&temp, || {
        std::env::remove_var(TEST_KEY_ENV);
        run(&ws, &["generate", "--standards", "does-not-exist.csv"])
    })
    .unwrap_err();

    match err {
        SequenceError::MissingCredential { env_var, searched } => {
            assert_eq!(env_var, TEST_KEY_ENV);
            assert_eq!(searched[0], ws.join(".scopeseq").join("secrets.toml"));
        }
        other => panic!("expected missing credential, got: {}", other),
    }
}

#[test]
fn test_status_reports_key_source_without_the_key() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    write_file(
        &ws,
        ".scopeseq/secrets.toml",
        &format!("{} = \"sk-ant-secret\"\n", TEST_KEY_ENV),
    );

    let out = with_env(&temp, &[], || {
        std::env::remove_var(TEST_KEY_ENV);
        run(&ws, &["status", "--format", "json"])
    })
    .unwrap();

    assert!(!out.contains("sk-ant-secret"));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(value["credential_source"]
        .as_str()
        .unwrap()
        .starts_with("secrets file"));
    assert_eq!(value["api_key_env"], TEST_KEY_ENV);
}

#[test]
fn test_run_generation_renders_and_exports() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", STANDARDS_CSV);
    let export = temp.path().join("out").join("units.csv");
    std::fs::create_dir_all(export.parent().unwrap()).unwrap();

    let (provider, _seen) = ScriptedProvider::new(TWO_UNIT_REPLY);
    let sequencer = Sequencer::new(
        Box::new(provider),
        RequestSettings::from_config(&ProviderConfig::default()),
    );
    let input = InputArgs {
        standards: standards.clone(),
        sample: None,
    };
    let output = GenerateOutput {
        format: "text".to_string(),
        export: Some(export.clone()),
        validate: true,
    };

    let out = with_xdg_env(&temp, || {
        let context = RunContext::new(ws.clone(), None).unwrap();
        context.run_generation(&sequencer, &input, &GenerationArgs::default(), &output)
    })
    .unwrap();

    assert!(out.starts_with("Unit 1: Fraction Foundations\n  Duration: 3 weeks"));
    assert!(out.contains("Unit 2: Fraction Operations\n  Duration: 2.5 weeks"));
    assert!(out.contains("Warnings (1):\n  - Standard '4.MD.1' is not assigned to any unit"));
    assert!(out.ends_with(&format!("Exported 2 units to {}", export.display())));
    assert!(std::fs::read_to_string(&export)
        .unwrap()
        .starts_with("unit_title,standards,description,duration_weeks\n"));
}

#[test]
fn test_run_generation_keeps_units_when_export_fails() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", STANDARDS_CSV);
    let export = temp.path().join("missing-dir").join("units.csv");

    let (provider, _seen) = ScriptedProvider::new(TWO_UNIT_REPLY);
    let sequencer = Sequencer::new(
        Box::new(provider),
        RequestSettings::from_config(&ProviderConfig::default()),
    );
    let input = InputArgs {
        standards,
        sample: None,
    };
    let output = GenerateOutput {
        format: "text".to_string(),
        export: Some(export.clone()),
        validate: false,
    };

    let out = with_xdg_env(&temp, || {
        let context = RunContext::new(ws.clone(), None).unwrap();
        context.run_generation(&sequencer, &input, &GenerationArgs::default(), &output)
    })
    .unwrap();

    assert!(out.starts_with("Unit 1: Fraction Foundations"));
    assert!(out.contains(&format!(
        "Notices (1):\n  - Export failed: Failed to create {}",
        export.display()
    )));
    assert!(!out.contains("Exported"));
    assert!(!export.exists());
}

#[test]
fn test_run_generation_parse_failure_is_an_error_with_raw_text() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", FRACTIONS_CSV);

    let (provider, _seen) = ScriptedProvider::new("I cannot do that.");
    let sequencer = Sequencer::new(
        Box::new(provider),
        RequestSettings::from_config(&ProviderConfig::default()),
    );
    let input = InputArgs {
        standards,
        sample: None,
    };
    let output = GenerateOutput {
        format: "json".to_string(),
        export: None,
        validate: true,
    };

    let err = with_xdg_env(&temp, || {
        let context = RunContext::new(ws.clone(), None).unwrap();
        context.run_generation(&sequencer, &input, &GenerationArgs::default(), &output)
    })
    .unwrap_err();

    match err {
        SequenceError::UnparsedResponse { raw, .. } => assert_eq!(raw, "I cannot do that."),
        other => panic!("expected parse failure, got: {}", other),
    }
}

#[test]
fn test_run_generation_json_report() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let standards = write_file(temp.path(), "standards.csv", STANDARDS_CSV);

    let (provider, _seen) = ScriptedProvider::new(TWO_UNIT_REPLY);
    let sequencer = Sequencer::new(
        Box::new(provider),
        RequestSettings::from_config(&ProviderConfig::default()),
    );
    let input = InputArgs {
        standards,
        sample: None,
    };
    let output = GenerateOutput {
        format: "json".to_string(),
        export: None,
        validate: false,
    };

    let out = with_xdg_env(&temp, || {
        let context = RunContext::new(ws.clone(), None).unwrap();
        context.run_generation(&sequencer, &input, &GenerationArgs::default(), &output)
    })
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["model"], "scripted-model");
    assert_eq!(value["units"].as_array().unwrap().len(), 2);
    assert_eq!(value["usage"]["total_tokens"], 150);
    assert!(value["issues"].as_array().unwrap().is_empty());
}
