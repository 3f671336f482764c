//! Generation pipeline — orchestrates one batch of validated characters.
//!
//! Flow per character: build prompt → generate → (JSON mode: validate and
//! merge output, fall back to raw text) → create document → insert →
//! optional mechanical enhancement with full-document replace → append
//! history records.
//!
//! Characters are processed strictly sequentially, in input order. Every
//! record is validated before the batch starts, and the template is fetched
//! once and reused read-only; the first collaborator failure aborts the
//! remainder of the batch.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::character::model::{CanonicalRecord, DndProfile};
use crate::dnd::catalogs::{is_valid_class, is_valid_species, is_valid_subclass};
use crate::dnd::enhancement::enhance;
use crate::errors::AppError;
use crate::gdocs::{DocumentSink, TemplateSource};
use crate::generation::output::{character_json_filename, save_character_json, validate_json_output};
use crate::generation::prompts::{
    build_character_prompt, build_json_character_prompt, BASE_MAX_OUTPUT_TOKENS, BASE_TEMPERATURE,
};
use crate::history::{
    append_archive_record, append_summary_record, ArchiveMetadata, ArchiveRecord, GeneratedOutput,
    SummaryRecord,
};
use crate::llm_client::TextGenerator;
use crate::template::{flatten_json_for_text, merge_json_into_structure, parse_template_structure};

/// Collaborators and output locations shared by a whole batch.
pub struct PipelineContext<'a> {
    pub generator: &'a dyn TextGenerator,
    pub templates: &'a dyn TemplateSource,
    pub sink: &'a dyn DocumentSink,
    pub summary_csv: &'a Path,
    pub archive_jsonl: &'a Path,
    /// Directory for optional per-character JSON files.
    pub json_dir: &'a Path,
}

/// CLI-level D&D overrides, applied identically to every record in a batch.
#[derive(Debug, Clone, Default)]
pub struct DndOverrides {
    pub species: Option<String>,
    pub class_name: Option<String>,
    pub subclass: Option<String>,
    pub level: Option<u32>,
}

impl DndOverrides {
    /// Resolves the overrides into a profile when species, class, and level
    /// are all supplied. Values missing from the catalogs are warned about
    /// and dropped — a bad override never aborts the batch.
    pub fn resolve(&self) -> Option<DndProfile> {
        let species = self.species.as_deref().filter(|s| {
            let valid = is_valid_species(s);
            if !valid {
                warn!("Unknown species {s:?}, ignoring D&D override");
            }
            valid
        })?;
        let class_name = self.class_name.as_deref().filter(|c| {
            let valid = is_valid_class(c);
            if !valid {
                warn!("Unknown class {c:?}, ignoring D&D override");
            }
            valid
        })?;
        let level = self.level?;

        let subclass = self.subclass.as_deref().filter(|sub| {
            let valid = is_valid_subclass(class_name, sub);
            if !valid {
                warn!("Unknown subclass {sub:?} for class {class_name:?}, ignoring");
            }
            valid
        });

        Some(DndProfile {
            species: species.to_string(),
            class_name: class_name.to_string(),
            subclass: subclass.map(String::from),
            level,
        })
    }
}

/// Result of one character's trip through the pipeline.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub name: String,
    pub doc_url: String,
    pub enhancement: Option<String>,
    /// Written in JSON mode when the generator's output parsed cleanly.
    pub json_file: Option<PathBuf>,
}

/// Runs the pipeline for a batch of already-validated records.
pub async fn run_batch(
    ctx: &PipelineContext<'_>,
    records: &[CanonicalRecord],
    template_doc_id: &str,
    overrides: &DndOverrides,
) -> Result<Vec<GenerationOutcome>, AppError> {
    let dnd = overrides.resolve();

    info!("Loading template {template_doc_id}");
    let template_text = ctx.templates.fetch(template_doc_id).await?;

    let mut outcomes = Vec::with_capacity(records.len());
    for record in records {
        let outcome = generate_character(ctx, &template_text, record, dnd.as_ref()).await?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Generates one character end to end and appends its history records.
pub async fn generate_character(
    ctx: &PipelineContext<'_>,
    template_text: &str,
    record: &CanonicalRecord,
    dnd: Option<&DndProfile>,
) -> Result<GenerationOutcome, AppError> {
    let inputs = record.inputs();
    let json_mode = record.metadata.json_output.unwrap_or(false);

    info!("Generating character: {}", inputs.name);

    // Step 1: base generation
    let prompt = if json_mode {
        build_json_character_prompt(template_text, record)
    } else {
        build_character_prompt(template_text, record)
    };
    let base_text = ctx
        .generator
        .generate(&prompt, BASE_TEMPERATURE, BASE_MAX_OUTPUT_TOKENS)
        .await?;

    // Step 2: in JSON mode, extract the structured object; a malformed
    // response falls back to the raw text rather than failing the run.
    let (doc_text, structured) = if json_mode {
        match validate_json_output(&base_text) {
            Ok(parsed) => {
                let skeleton = parse_template_structure(template_text).to_value();
                let merged = merge_json_into_structure(&skeleton, &parsed);
                (flatten_json_for_text(&merged), Some(merged))
            }
            Err(e) => {
                warn!("Falling back to raw generator output: {e}");
                (base_text.clone(), None)
            }
        }
    } else {
        (base_text.clone(), None)
    };

    // Step 3: create the document and insert the profile
    let title = record
        .metadata
        .new_doc_title
        .clone()
        .unwrap_or_else(|| format!("Character - {} - {}", inputs.name, Utc::now().date_naive()));
    let doc_id = ctx.sink.create(&title).await?;
    ctx.sink.insert(&doc_id, &doc_text).await?;

    // Step 4: optional mechanical enhancement replaces the document body
    let enhancement = match dnd {
        Some(profile) => {
            let enhanced = enhance(ctx.generator, &doc_text, profile).await?;
            ctx.sink.replace_all(&doc_id, &enhanced).await?;
            Some(enhanced)
        }
        None => None,
    };

    let doc_url = ctx.sink.url_for(&doc_id);

    // Step 5: optional per-character JSON file
    let json_file = match &structured {
        Some(data) => {
            let path = ctx
                .json_dir
                .join(character_json_filename(&inputs.name, Utc::now()));
            save_character_json(&path, data)
                .map_err(|source| crate::history::HistoryError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            Some(path)
        }
        None => None,
    };

    // Step 6: history records
    let record_id = Uuid::new_v4();
    let created_at = Utc::now();
    append_summary_record(
        ctx.summary_csv,
        &SummaryRecord {
            inputs: inputs.clone(),
            dnd: dnd.cloned(),
            doc_url: doc_url.clone(),
            created_at,
        },
    )?;
    append_archive_record(
        ctx.archive_jsonl,
        &ArchiveRecord {
            metadata: ArchiveMetadata {
                record_id,
                created_at,
                name: inputs.name.clone(),
                inputs: (&inputs).into(),
                doc_url: doc_url.clone(),
                dnd: dnd.cloned(),
            },
            ai_output: GeneratedOutput {
                base_character: base_text.clone(),
                dnd_enhancement: enhancement.clone(),
            },
        },
    )?;

    info!("Character created: {} -> {doc_url}", inputs.name);

    Ok(GenerationOutcome {
        name: inputs.name,
        doc_url,
        enhancement,
        json_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::model::RecordMetadata;
    use crate::gdocs::DocsError;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _temperature: f32,
            _max_output_tokens: u32,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    struct FixedTemplates(&'static str);

    #[async_trait]
    impl TemplateSource for FixedTemplates {
        async fn fetch(&self, _template_id: &str) -> Result<String, DocsError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        created: Mutex<Vec<String>>,
        inserted: Mutex<Vec<(String, String)>>,
        replaced: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl DocumentSink for RecordingSink {
        async fn create(&self, title: &str) -> Result<String, DocsError> {
            let mut created = self.created.lock().unwrap();
            created.push(title.to_string());
            Ok(format!("doc-{}", created.len()))
        }

        async fn insert(&self, doc_id: &str, text: &str) -> Result<(), DocsError> {
            self.inserted
                .lock()
                .unwrap()
                .push((doc_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn replace_all(&self, doc_id: &str, text: &str) -> Result<(), DocsError> {
            self.replaced
                .lock()
                .unwrap()
                .push((doc_id.to_string(), text.to_string()));
            Ok(())
        }

        fn url_for(&self, doc_id: &str) -> String {
            format!("https://docs.google.com/document/d/{doc_id}/edit")
        }
    }

    const TEMPLATE: &str = "### Demographics\n**Name:** {{NAME}}\n";

    fn record(name: &str, json_output: bool) -> CanonicalRecord {
        CanonicalRecord {
            name: name.to_string(),
            ethnicity: "Human".to_string(),
            sex_gender: "male|he/him".to_string(),
            age: "adult".to_string(),
            occupation: "blacksmith".to_string(),
            sections: vec![],
            extra: vec![],
            metadata: RecordMetadata {
                new_doc_title: None,
                json_output: json_output.then_some(true),
            },
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        sink: RecordingSink,
        templates: FixedTemplates,
        summary_csv: PathBuf,
        archive_jsonl: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let summary_csv = dir.path().join("characters.csv");
            let archive_jsonl = dir.path().join("characters.jsonl");
            Self {
                dir,
                sink: RecordingSink::default(),
                templates: FixedTemplates(TEMPLATE),
                summary_csv,
                archive_jsonl,
            }
        }

        fn ctx<'a>(&'a self, generator: &'a ScriptedGenerator) -> PipelineContext<'a> {
            PipelineContext {
                generator,
                templates: &self.templates,
                sink: &self.sink,
                summary_csv: &self.summary_csv,
                archive_jsonl: &self.archive_jsonl,
                json_dir: self.dir.path(),
            }
        }
    }

    #[tokio::test]
    async fn test_text_mode_inserts_generated_profile() {
        let harness = Harness::new();
        let generator = ScriptedGenerator::new(vec![Ok("a full profile".to_string())]);
        let ctx = harness.ctx(&generator);

        let outcomes = run_batch(&ctx, &[record("Bram", false)], "tpl", &DndOverrides::default())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, "Bram");
        assert!(outcomes[0].json_file.is_none());
        assert_eq!(
            outcomes[0].doc_url,
            "https://docs.google.com/document/d/doc-1/edit"
        );
        let inserted = harness.sink.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].1, "a full profile");
        assert!(harness.sink.replaced.lock().unwrap().is_empty());

        // Both history files got one record each.
        let csv = std::fs::read_to_string(harness.dir.path().join("characters.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
        let jsonl = std::fs::read_to_string(harness.dir.path().join("characters.jsonl")).unwrap();
        assert_eq!(jsonl.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_json_mode_flattens_structured_output() {
        let harness = Harness::new();
        let generator = ScriptedGenerator::new(vec![Ok(
            "Here you go:\n{\"Demographics\": {\"Name\": \"Zara\"}}\nEnjoy!".to_string(),
        )]);
        let ctx = harness.ctx(&generator);

        let outcome = generate_character(&ctx, TEMPLATE, &record("Zara", true), None)
            .await
            .unwrap();

        let inserted = harness.sink.inserted.lock().unwrap();
        assert!(inserted[0].1.contains("Demographics\n============"));
        assert!(inserted[0].1.contains("Name: Zara"));

        // Per-character JSON file written alongside.
        let json_file = outcome.json_file.unwrap();
        assert!(json_file.exists());
        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(&json_file).unwrap()).unwrap();
        assert_eq!(saved["Demographics"]["Name"], "Zara");
    }

    #[tokio::test]
    async fn test_json_mode_falls_back_to_raw_text() {
        let harness = Harness::new();
        let generator = ScriptedGenerator::new(vec![Ok("no json here at all".to_string())]);
        let ctx = harness.ctx(&generator);

        let outcome = generate_character(&ctx, TEMPLATE, &record("Zara", true), None)
            .await
            .unwrap();

        assert!(outcome.json_file.is_none());
        let inserted = harness.sink.inserted.lock().unwrap();
        assert_eq!(inserted[0].1, "no json here at all");
    }

    #[tokio::test]
    async fn test_enhancement_replaces_document_body() {
        let harness = Harness::new();
        let generator = ScriptedGenerator::new(vec![
            Ok("base profile".to_string()),
            Ok("enhanced profile".to_string()),
        ]);
        let ctx = harness.ctx(&generator);
        let overrides = DndOverrides {
            species: Some("Human".to_string()),
            class_name: Some("Fighter".to_string()),
            subclass: Some("Champion".to_string()),
            level: Some(5),
        };

        let outcomes = run_batch(&ctx, &[record("Bram", false)], "tpl", &overrides)
            .await
            .unwrap();

        assert_eq!(outcomes[0].enhancement.as_deref(), Some("enhanced profile"));
        let replaced = harness.sink.replaced.lock().unwrap();
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].1, "enhanced profile");

        // The archive carries both outputs and the dnd block.
        let jsonl = std::fs::read_to_string(harness.dir.path().join("characters.jsonl")).unwrap();
        let archived: Value = serde_json::from_str(jsonl.lines().next().unwrap()).unwrap();
        assert_eq!(archived["ai_output"]["base_character"], "base profile");
        assert_eq!(archived["ai_output"]["dnd_enhancement"], "enhanced profile");
        assert_eq!(archived["metadata"]["dnd"]["class"], "Fighter");
    }

    #[test]
    fn test_invalid_override_values_dropped_not_fatal() {
        let overrides = DndOverrides {
            species: Some("Vampire".to_string()),
            class_name: Some("Fighter".to_string()),
            level: Some(3),
            subclass: None,
        };
        assert!(overrides.resolve().is_none());

        let overrides = DndOverrides {
            species: Some("Human".to_string()),
            class_name: Some("Fighter".to_string()),
            subclass: Some("Evocation".to_string()),
            level: Some(3),
        };
        let profile = overrides.resolve().unwrap();
        // Wrong-class subclass is nulled; species/class/level survive.
        assert_eq!(profile.subclass, None);
        assert_eq!(profile.class_name, "Fighter");
    }

    #[test]
    fn test_overrides_require_all_three_core_values() {
        let overrides = DndOverrides {
            species: Some("Human".to_string()),
            class_name: Some("Fighter".to_string()),
            subclass: None,
            level: None,
        };
        assert!(overrides.resolve().is_none());
    }

    #[tokio::test]
    async fn test_generator_failure_aborts_remaining_batch() {
        let harness = Harness::new();
        let generator = ScriptedGenerator::new(vec![
            Ok("first profile".to_string()),
            Err(LlmError::EmptyContent),
        ]);
        let ctx = harness.ctx(&generator);

        let result = run_batch(
            &ctx,
            &[record("Bram", false), record("Zara", false), record("Nix", false)],
            "tpl",
            &DndOverrides::default(),
        )
        .await;

        assert!(result.is_err());
        // The first character completed before the abort; the second failed
        // before its document was created and the third was never attempted.
        assert_eq!(harness.sink.created.lock().unwrap().len(), 1);
        assert_eq!(generator.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_new_doc_title_metadata_overrides_default() {
        let harness = Harness::new();
        let generator = ScriptedGenerator::new(vec![Ok("profile".to_string())]);
        let ctx = harness.ctx(&generator);
        let mut r = record("Bram", false);
        r.metadata.new_doc_title = Some("The Smith of Dunhollow".to_string());

        generate_character(&ctx, TEMPLATE, &r, None).await.unwrap();

        let created = harness.sink.created.lock().unwrap();
        assert_eq!(created[0], "The Smith of Dunhollow");
    }

    #[tokio::test]
    async fn test_default_doc_title_carries_name() {
        let harness = Harness::new();
        let generator = ScriptedGenerator::new(vec![Ok("profile".to_string())]);
        let ctx = harness.ctx(&generator);

        generate_character(&ctx, TEMPLATE, &record("Bram", false), None)
            .await
            .unwrap();

        let created = harness.sink.created.lock().unwrap();
        assert!(created[0].starts_with("Character - Bram - "));
    }
}
