//! # Pagesmith Editor
//!
//! Client-side editing engine: the session state machine that turns UI
//! events into document mutations, the property form for the focused
//! block, and the debounced auto-saver.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI events: drag, drop, select, field edits  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EditSession                                 │
//! │  - validates and applies mutations          │
//! │  - rebuilds the property form               │
//! │  - returns effects for the UI               │
//! └─────────────────────────────────────────────┘
//!                     ↓ ScheduleSave
//! ┌─────────────────────────────────────────────┐
//! │ AutoSaver: latest-value register + task     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ SaveBackend (slot store, remote endpoint)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pagesmith_document::Document;
//! use pagesmith_editor::{DragSource, DropTarget, EditSession, EditorContext, SessionEvent};
//!
//! let ctx = EditorContext::builtin("home");
//! let mut session = EditSession::new(ctx, Document::new("home")).unwrap();
//!
//! session
//!     .handle(SessionEvent::DragStart {
//!         source: DragSource::Palette { type_id: "button".to_string() },
//!     })
//!     .unwrap();
//! session
//!     .handle(SessionEvent::Drop { target: DropTarget::Canvas { hover: None } })
//!     .unwrap();
//!
//! assert_eq!(session.document().blocks.len(), 1);
//! ```

mod autosave;
mod context;
mod errors;
mod form;
mod session;

pub use autosave::{AutoSaver, SaveBackend, SaveReceipt, SaveRequest, SaveStatus};
pub use context::{EditorContext, FeatureFlags};
pub use errors::EditorError;
pub use form::{FieldInput, FormField, FormValue, PropertyForm};
pub use session::{
    DragSource, DropTarget, EditSession, Hover, SessionEffect, SessionEvent, SessionState,
};
