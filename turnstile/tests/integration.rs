//! Integration tests for the turn CLI.

use clap::Parser;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use turnstile::cli::{Cli, run_cli};

fn setup_workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("turnstile-test").join(name);

    // Clean up previous test run
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).expect("failed to write json");
}

fn template_file() -> Value {
    json!([
        {
            "dialogue_id": "1_00000",
            "services": ["restaurants_1"],
            "turns": [
                {
                    "speaker": "USER",
                    "utterance": "i want a cheap restaurant in the south",
                    "frames": [
                        {
                            "service": "restaurants_1",
                            "slots": [],
                            "state": {
                                "active_intent": "NONE",
                                "requested_slots": [],
                                "slot_values": {}
                            }
                        }
                    ]
                }
            ]
        }
    ])
}

fn predictions_file(predicted_str: &str) -> Value {
    json!({
        "1_00000": {
            "0": {
                "utterance": "i want a cheap restaurant in the south",
                "restaurants_1": { "predicted_str": predicted_str }
            }
        }
    })
}

fn references_file() -> Value {
    json!({
        "1_00000": [
            {
                "frames": {
                    "restaurants_1": {
                        "slot_mapping": {
                            "0": "price_range",
                            "1": "area",
                            "2": "restaurant_name"
                        },
                        "cat_values_mapping": {
                            "price_range": { "cheap": "cheap" },
                            "area": { "south": "2" }
                        },
                        "intent_mapping": { "i1": "find_restaurant" }
                    }
                }
            }
        ]
    })
}

fn write_inputs(dir: &Path, predicted_str: &str) -> (PathBuf, PathBuf, PathBuf) {
    let templates = dir.join("templates");
    fs::create_dir_all(&templates).expect("failed to create template dir");
    write_json(&templates.join("dialogues_001.json"), &template_file());

    let predictions = dir.join("predictions.json");
    write_json(&predictions, &predictions_file(predicted_str));

    let references = dir.join("references.json");
    write_json(&references, &references_file());

    (predictions, references, templates)
}

#[test]
fn parse_populates_template_dialogues() {
    let dir = setup_workspace("populate");
    let (predictions, references, templates) = write_inputs(
        &dir,
        "[states] 0:cheap 1:2 [intents] i1 [req_slots] 2 <EOS>",
    );
    let output = dir.join("decoded");

    let cli = Cli::parse_from([
        "turn",
        "parse",
        "-p",
        predictions.to_str().unwrap(),
        "-r",
        references.to_str().unwrap(),
        "-t",
        templates.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-m",
        "t5-base",
    ]);

    run_cli(cli).expect("failed to decode");

    let decoded: Value = serde_json::from_str(
        &fs::read_to_string(output.join("dialogues_001.json")).expect("output file missing"),
    )
    .expect("output is not valid json");

    let state = &decoded[0]["turns"][0]["frames"][0]["state"];
    assert_eq!(state["active_intent"], "find_restaurant");
    assert_eq!(state["requested_slots"], json!(["restaurant_name"]));
    assert_eq!(
        state["slot_values"],
        json!({ "area": ["south"], "price_range": ["cheap"] })
    );

    // Keys the decoder does not model survive the round trip.
    assert_eq!(decoded[0]["turns"][0]["frames"][0]["slots"], json!([]));

    // A separate output directory leaves the template untouched.
    let template: Value = serde_json::from_str(
        &fs::read_to_string(templates.join("dialogues_001.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        template[0]["turns"][0]["frames"][0]["state"]["active_intent"],
        "NONE"
    );
}

#[test]
fn parse_decodes_in_place_by_default() {
    let dir = setup_workspace("in-place");
    let (predictions, references, templates) = write_inputs(
        &dir,
        "[states] 2:cheap restaurant [intents] [req_slots] <EOS>",
    );

    let cli = Cli::parse_from([
        "turn",
        "parse",
        "-p",
        predictions.to_str().unwrap(),
        "-r",
        references.to_str().unwrap(),
        "-t",
        templates.to_str().unwrap(),
        "-m",
        "t5-base",
    ]);

    run_cli(cli).expect("failed to decode");

    let decoded: Value = serde_json::from_str(
        &fs::read_to_string(templates.join("dialogues_001.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        decoded[0]["turns"][0]["frames"][0]["state"]["slot_values"],
        json!({ "restaurant_name": ["cheap restaurant"] })
    );
}

#[test]
fn parse_aborts_on_a_broken_prediction() {
    let dir = setup_workspace("broken");
    let (predictions, references, templates) =
        write_inputs(&dir, "[states] 0:cheap [intents] [req_slots]");
    let output = dir.join("decoded");

    let cli = Cli::parse_from([
        "turn",
        "parse",
        "-p",
        predictions.to_str().unwrap(),
        "-r",
        references.to_str().unwrap(),
        "-t",
        templates.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-m",
        "t5-base",
    ]);

    let error = run_cli(cli).expect_err("a prediction without <EOS> must abort");
    let chain = format!("{error:?}");
    assert!(chain.contains("end marker"), "unexpected error: {chain}");

    // Nothing half-decoded is left behind.
    assert!(!output.join("dialogues_001.json").exists());
}

#[test]
fn parse_fails_on_a_dialogue_missing_from_predictions() {
    let dir = setup_workspace("missing-dialogue");
    let (_, references, templates) =
        write_inputs(&dir, "[states] [intents] [req_slots] <EOS>");

    let empty_predictions = dir.join("empty.json");
    write_json(&empty_predictions, &json!({}));

    let cli = Cli::parse_from([
        "turn",
        "parse",
        "-p",
        empty_predictions.to_str().unwrap(),
        "-r",
        references.to_str().unwrap(),
        "-t",
        templates.to_str().unwrap(),
        "-m",
        "t5-base",
    ]);

    let error = run_cli(cli).expect_err("a dialogue without predictions must abort");
    assert!(
        format!("{error:?}").contains("not found in predictions"),
        "unexpected error: {error:?}"
    );
}

#[test]
fn parse_rejects_an_empty_template_dir() {
    let dir = setup_workspace("no-templates");
    let (predictions, references, _) =
        write_inputs(&dir, "[states] [intents] [req_slots] <EOS>");

    let empty = dir.join("empty-templates");
    fs::create_dir_all(&empty).unwrap();

    let cli = Cli::parse_from([
        "turn",
        "parse",
        "-p",
        predictions.to_str().unwrap(),
        "-r",
        references.to_str().unwrap(),
        "-t",
        empty.to_str().unwrap(),
        "-m",
        "t5-base",
    ]);

    let error = run_cli(cli).expect_err("an empty template dir must abort");
    assert!(
        format!("{error:?}").contains("no dialogues_"),
        "unexpected error: {error:?}"
    );
}
