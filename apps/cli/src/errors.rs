#![allow(dead_code)]

use thiserror::Error;

use crate::character::input::{InputError, ValidationError};
use crate::dnd::EnhanceError;
use crate::gdocs::DocsError;
use crate::generation::OutputError;
use crate::history::HistoryError;
use crate::importer::ImportError;
use crate::llm_client::LlmError;

/// Application-level error type.
///
/// Input and validation problems are fatal to the affected record or file;
/// collaborator failures propagate unhandled — the core never retries them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Generation error: {0}")]
    Llm(#[from] LlmError),

    #[error("Generator output error: {0}")]
    Output(#[from] OutputError),

    #[error("Document service error: {0}")]
    Docs(#[from] DocsError),

    #[error("Enhancement error: {0}")]
    Enhance(#[from] EnhanceError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
