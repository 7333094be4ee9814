//! Parse subcommand - decode predictions and populate template dialogue
//! files.

use color_eyre::Section;
use eyre::{Context, OptionExt, Result, eyre};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use turnstile_dst::assemble::StateAssembler;
use turnstile_dst::template::{DialoguePredictions, DialogueReferences, TemplateDialogue};
use turnstile_dst::types::Schema;

/// CLI arguments for decoding predicted states.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to the predictions JSON produced by the generation step
    #[arg(short, long)]
    pub predictions: PathBuf,

    /// Path to the preprocessed references JSON with per-turn index mappings
    #[arg(short, long)]
    pub references: PathBuf,

    /// Directory containing blank dialogues_*.json template files
    #[arg(short, long)]
    pub templates: PathBuf,

    /// Output directory (default: populate the template files in place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Model identifier, used to pick the payload framing (e.g. t5-base)
    #[arg(short, long)]
    pub model: String,
}

/// Resolved configuration for decoding.
#[derive(Debug)]
pub struct Config {
    pub predictions: PathBuf,
    pub references: PathBuf,
    pub templates: PathBuf,
    pub output: PathBuf,
    pub assembler: StateAssembler,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        let assembler = StateAssembler::for_model(&args.model)
            .wrap_err_with(|| format!("cannot decode output of model {}", args.model))?;
        let output = args.output.unwrap_or_else(|| args.templates.clone());

        Ok(Self {
            predictions: args.predictions,
            references: args.references,
            templates: args.templates,
            output,
            assembler,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let predictions: BTreeMap<String, DialoguePredictions> =
        load_json(&config.predictions).wrap_err("failed to load predictions")?;
    let references: BTreeMap<String, DialogueReferences> =
        load_json(&config.references).wrap_err("failed to load references")?;

    // The services decoding is allowed to touch are exactly those the
    // references were preprocessed for.
    let schema = Schema::from_service_names(
        references.values().flat_map(DialogueReferences::services),
    );

    tracing::info!(
        predictions = ?config.predictions.display(),
        references = ?config.references.display(),
        dialogues = predictions.len(),
        services = schema.len(),
        "loaded decode inputs"
    );

    let template_files = find_template_files(&config.templates)?;
    if template_files.is_empty() {
        return Err(eyre!(
            "no dialogues_*.json files in {:?}",
            config.templates.display()
        ))
        .suggestion("check that --templates points at a directory of blank SGD dialogue files");
    }

    fs::create_dir_all(&config.output)
        .wrap_err_with(|| format!("failed to create output dir: {:?}", config.output.display()))?;

    let s = Instant::now();

    for file in &template_files {
        decode_file(&config, file, &predictions, &references, &schema)?;
    }

    let d = s.elapsed();
    tracing::info!(
        files = template_files.len(),
        duration = %format_secs(d.as_secs_f32()),
        "decoding completed"
    );

    Ok(())
}

/// Decode every dialogue of one template file and write the populated copy.
fn decode_file(
    config: &Config,
    file: &Path,
    predictions: &BTreeMap<String, DialoguePredictions>,
    references: &BTreeMap<String, DialogueReferences>,
    schema: &Schema,
) -> Result<()> {
    tracing::info!(file = ?file.display(), "parsing template file");

    let mut dialogues: Vec<TemplateDialogue> =
        load_json(file).wrap_err_with(|| format!("failed to load templates: {:?}", file.display()))?;

    for dialogue in &mut dialogues {
        let dialogue_id = dialogue.dialogue_id.clone();

        let dialogue_predictions = predictions
            .get(&dialogue_id)
            .ok_or_else(|| eyre!("dialogue {dialogue_id} not found in predictions"))
            .suggestion("check that the predictions file covers the split being decoded")?;
        let dialogue_references = references
            .get(&dialogue_id)
            .ok_or_else(|| eyre!("dialogue {dialogue_id} not found in references"))?;

        let diagnostics = config
            .assembler
            .populate_dialogue(dialogue, dialogue_predictions, dialogue_references, schema)
            .wrap_err_with(|| format!("failed to decode dialogue {dialogue_id}"))?;

        for finding in &diagnostics {
            tracing::warn!(
                dialogue = %dialogue_id,
                turn = finding.turn,
                service = %finding.service,
                "{}",
                finding.diagnostic
            );
        }
    }

    let file_name = file
        .file_name()
        .ok_or_eyre("template path has no file name")?;
    let out_path = config.output.join(file_name);

    let out = fs::File::create(&out_path)
        .wrap_err_with(|| format!("failed to create output file: {:?}", out_path.display()))?;
    write_dialogues(out, &dialogues)
        .wrap_err_with(|| format!("failed to write dialogues: {:?}", out_path.display()))?;

    tracing::info!(
        file = ?out_path.display(),
        dialogues = dialogues.len(),
        "wrote populated dialogues"
    );

    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path)
        .wrap_err_with(|| format!("failed to open: {:?}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("failed to parse: {:?}", path.display()))
}

/// Write the populated dialogues as pretty-printed JSON.
fn write_dialogues(out: impl Write, dialogues: &[TemplateDialogue]) -> Result<()> {
    let mut writer = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut writer, dialogues)?;
    // BufWriter's drop discards flush errors.
    writer.flush()?;
    Ok(())
}

/// Collect dialogues_*.json files in the template directory, sorted by name.
fn find_template_files(dir: &Path) -> Result<Vec<PathBuf>> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^dialogues_[0-9]+\.json$").expect("file pattern is valid"));

    let entries = fs::read_dir(dir)
        .wrap_err_with(|| format!("failed to read template dir: {:?}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(name) = name.to_str()
            && pattern.is_match(name)
        {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Format seconds as a string with two decimal places.
fn format_secs(secs: f32) -> String {
    format!("{:.2}s", secs)
}
