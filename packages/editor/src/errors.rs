//! Error types for the editor

use pagesmith_compiler::CompileError;
use pagesmith_document::MutationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("The page builder is disabled")]
    BuilderDisabled,

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Generation error: {0}")]
    Compile(#[from] CompileError),

    #[error("Cannot {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}
