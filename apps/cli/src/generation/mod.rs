// Character generation: prompt building, generator-output validation, and
// the per-batch pipeline. All model calls go through llm_client — no direct
// HTTP from here.

pub mod output;
pub mod pipeline;
pub mod prompts;

pub use output::{validate_json_output, OutputError};
pub use pipeline::{run_batch, GenerationOutcome, PipelineContext};
