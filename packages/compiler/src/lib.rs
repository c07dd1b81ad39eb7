//! # Pagesmith Compiler
//!
//! Turns a block document into source text.
//!
//! - **Preview** mode dumps every block with its visible field values, for
//!   "view source" style inspection.
//! - **Persisted** mode emits directly executable PHP: one markup renderer
//!   call per block, wrapped in the slot's element, with the block tree
//!   embedded as a single-line comment so it can be loaded again.
//!
//! ```text
//! <?php
//! /* PAGESMITH_BLOCKS: {"blocks":[...]} */
//! ?>
//! <header class="ps-slot ps-slot-header">
//!   <div class="ps-block ps-container" ...>
//!   ...
//! </header>
//! ```
//!
//! Generated markup is never parsed back; the snapshot comment is the only
//! thing read on load.

mod compiler;
mod context;
pub mod escape;
mod menu;
mod renderers;
mod snapshot;

pub use compiler::{generate, generate_with, render_instance, CompileError};
pub use context::{GenerateOptions, OutputMode};
pub use menu::{auto_entries, page_label, MenuEntry};
pub use renderers::{MarkupRenderer, RenderInput, RendererRegistry};
pub use snapshot::{load_document, CommentCodec, Snapshot, SnapshotCodec, SnapshotError, SNAPSHOT_MARKER};

#[cfg(test)]
mod tests;
