mod character;
mod cli;
mod config;
mod dnd;
mod errors;
mod gdocs;
mod generation;
mod history;
mod importer;
mod llm_client;
mod taxonomy;
mod template;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::character::input::InputFormat;
use crate::character::model::{CanonicalRecord, RecordMetadata};
use crate::character::{load_character_file, validate_record};
use crate::cli::{BatchArgs, Cli, Command, ConvertArgs, CreateArgs, DndArgs, HistoryArgs, HistoryCommand};
use crate::config::{history_path, Config};
use crate::gdocs::GoogleDocsClient;
use crate::generation::pipeline::DndOverrides;
use crate::generation::{run_batch, GenerationOutcome, PipelineContext};
use crate::llm_client::GeminiClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Create(args) => {
            let config = Config::from_env()?;
            init_logging(&config.rust_log);
            run_create(&config, args).await
        }
        Command::Batch(args) => {
            let config = Config::from_env()?;
            init_logging(&config.rust_log);
            run_batch_command(&config, args).await
        }
        Command::Convert(args) => {
            init_logging("info");
            run_convert(args)
        }
        Command::History(args) => {
            init_logging("info");
            run_history(args)
        }
    }
}

/// Initializes structured logging. `RUST_LOG` wins over the passed default.
fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), default_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Starting chargen v{}", env!("CARGO_PKG_VERSION"));
}

async fn run_create(config: &Config, args: CreateArgs) -> Result<()> {
    let record = CanonicalRecord {
        name: args.name.clone(),
        ethnicity: args.ethnicity.clone(),
        sex_gender: format!("{}|{}", args.sex, args.gender),
        age: args.age_range.clone(),
        occupation: args.occupation.clone(),
        sections: vec![],
        extra: vec![],
        metadata: RecordMetadata {
            new_doc_title: args.new_doc_title.clone(),
            json_output: args.json_output.then_some(true),
        },
    };

    println!("Creating character: {}", args.name);
    println!(
        "  Sex: {}, Gender: {}, Age: {}, Occupation: {}",
        args.sex, args.gender, args.age_range, args.occupation
    );

    let outcomes =
        run_pipeline(config, &[record], &args.template_doc_id, overrides_from(&args.dnd)).await?;
    report_outcomes(config, &outcomes);
    Ok(())
}

async fn run_batch_command(config: &Config, args: BatchArgs) -> Result<()> {
    // All records are validated before the first remote call; a bad record
    // aborts the batch while it is still free.
    let records: Vec<CanonicalRecord> = if let Some(csv_path) = &args.csv {
        let raw = importer::convert_csv(csv_path).map_err(errors::AppError::from)?;
        let mut records = Vec::with_capacity(raw.len());
        for (idx, character) in raw.iter().enumerate() {
            let record = validate_record(&serde_json::Value::Object(character.clone()))
                .map_err(|e| anyhow::anyhow!("record {} validation failed: {e}", idx + 1))?;
            records.push(record);
        }
        records
    } else if let Some(json_path) = &args.json {
        load_character_file(json_path, InputFormat::Json).map_err(errors::AppError::from)?
    } else if let Some(jsonl_path) = &args.jsonl {
        load_character_file(jsonl_path, InputFormat::Jsonl).map_err(errors::AppError::from)?
    } else {
        unreachable!("clap enforces exactly one batch source");
    };

    println!("Generating {} character(s)...", records.len());

    let outcomes =
        run_pipeline(config, &records, &args.template_doc_id, overrides_from(&args.dnd)).await?;
    report_outcomes(config, &outcomes);
    Ok(())
}

async fn run_pipeline(
    config: &Config,
    records: &[CanonicalRecord],
    template_doc_id: &str,
    overrides: DndOverrides,
) -> Result<Vec<GenerationOutcome>> {
    let generator = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    info!("Generator client initialized (model: {})", generator.model());
    let docs = GoogleDocsClient::new(config.google_access_token.clone());
    let ctx = PipelineContext {
        generator: &generator,
        templates: &docs,
        sink: &docs,
        summary_csv: &config.characters_csv,
        archive_jsonl: &config.characters_jsonl,
        json_dir: Path::new("."),
    };

    let outcomes = run_batch(&ctx, records, template_doc_id, &overrides).await?;
    Ok(outcomes)
}

fn overrides_from(dnd: &DndArgs) -> DndOverrides {
    DndOverrides {
        species: dnd.species.clone(),
        class_name: dnd.class_name.clone(),
        subclass: dnd.subclass.clone(),
        level: dnd.level,
    }
}

fn report_outcomes(config: &Config, outcomes: &[GenerationOutcome]) {
    for outcome in outcomes {
        println!("\nCharacter created: {}", outcome.name);
        println!("  Document URL: {}", outcome.doc_url);
        if outcome.enhancement.is_some() {
            println!("  D&D enhancements applied");
        }
        if let Some(json_file) = &outcome.json_file {
            println!("  JSON file: {}", json_file.display());
        }
    }
    println!("\nTracked in: {}", config.characters_csv.display());
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    if args.validate {
        let (matched, unmatched) =
            importer::validate_columns(&args.csv_file).map_err(errors::AppError::from)?;
        println!("Matched columns: {}", matched.len());
        for column in &matched {
            println!("  - {column}");
        }
        if unmatched.is_empty() {
            println!("\nAll columns match the template.");
        } else {
            println!("\nUnmatched columns: {} (will be skipped)", unmatched.len());
            for column in &unmatched {
                println!("  - {column}");
            }
        }
        return Ok(());
    }

    if args.preview {
        let characters = importer::convert_csv(&args.csv_file).map_err(errors::AppError::from)?;
        println!("Converted {} character(s):\n", characters.len());
        for (idx, character) in characters.iter().take(3).enumerate() {
            println!("--- Character {} ---", idx + 1);
            println!("{}", serde_json::to_string_pretty(character)?);
        }
        if characters.len() > 3 {
            println!("... and {} more character(s)", characters.len() - 3);
        }
        return Ok(());
    }

    if let Some(json_path) = &args.json {
        importer::csv_to_json_file(&args.csv_file, json_path).map_err(errors::AppError::from)?;
        println!("Converted and saved to: {}", json_path.display());
    } else if let Some(jsonl_path) = &args.jsonl {
        importer::csv_to_jsonl_file(&args.csv_file, jsonl_path).map_err(errors::AppError::from)?;
        println!("Converted and saved to: {}", jsonl_path.display());
    }
    Ok(())
}

fn run_history(args: HistoryArgs) -> Result<()> {
    let archive = history_path("CHARACTERS_JSONL", "characters.jsonl");

    match args.command {
        HistoryCommand::List { limit } => {
            let characters =
                history::list_characters(&archive, limit).map_err(errors::AppError::from)?;
            if characters.is_empty() {
                println!("No characters in archive: {}", archive.display());
                return Ok(());
            }
            for character in characters {
                let dnd = character
                    .dnd
                    .map(|d| {
                        format!(
                            "  [{} {} (level {})]",
                            d.species, d.class_name, d.level
                        )
                    })
                    .unwrap_or_default();
                println!(
                    "{}  {}  {}{dnd}",
                    character.created_at.format("%Y-%m-%d %H:%M"),
                    character.name,
                    character.doc_url
                );
            }
        }
        HistoryCommand::Show { name } => {
            match history::get_character_by_name(&archive, &name)
                .map_err(errors::AppError::from)?
            {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("Character not found: {name}"),
            }
        }
        HistoryCommand::Export { output } => {
            let count =
                history::export_characters(&archive, &output).map_err(errors::AppError::from)?;
            println!("Exported {count} character(s) to {}", output.display());
        }
    }
    Ok(())
}
