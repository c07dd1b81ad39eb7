//! # Editor Session
//!
//! One editor's sequential stream of UI events against the live document
//! of a single slot.
//!
//! ```text
//! Idle ──drag-start──▶ Dragging ──drop──▶ Dropped ──select──▶ Editing ⟲ field-change
//!   ▲                    │                                      │
//!   │                    └─ drag-end / drop outside: back to    │
//!   │                       the state before the drag           │
//!   └──────────────────── delete focused ◀──────────────────────┘
//! ```
//!
//! Saving runs beside this machine rather than inside it. Edits emit
//! [`SessionEffect::ScheduleSave`]; the auto-saver reports progress back
//! through [`SessionEvent::SaveStatus`].
//!
//! A rejected event leaves the document untouched. A rejected drop still
//! ends the drag.

use crate::autosave::{SaveRequest, SaveStatus};
use crate::context::EditorContext;
use crate::errors::EditorError;
use crate::form::{FieldInput, PropertyForm};
use pagesmith_compiler::{generate, render_instance, OutputMode, Snapshot};
use pagesmith_document::{
    BlockTemplate, Category, Document, InstanceId, Mutation, MutationError, MutationOutcome,
};
use serde::{Deserialize, Serialize};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "camelCase")]
pub enum DragSource {
    /// A new block from the palette
    #[serde(rename_all = "camelCase")]
    Palette { type_id: String },
    /// An existing block on the canvas
    #[serde(rename_all = "camelCase")]
    Canvas { instance_id: InstanceId },
}

/// The top-level block under the pointer, with its vertical extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hover {
    pub instance_id: InstanceId,
    pub top: f64,
    pub height: f64,
    pub pointer_y: f64,
}

impl Hover {
    /// Above the vertical midpoint inserts before, otherwise after
    pub fn inserts_before(&self) -> bool {
        self.pointer_y < self.top + self.height / 2.0
    }
}

/// Where a drag ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "zone", rename_all = "camelCase")]
pub enum DropTarget {
    /// The top-level canvas; without a hovered block the drop appends
    Canvas { hover: Option<Hover> },
    /// A container's child zone
    #[serde(rename_all = "camelCase")]
    Children { container_id: InstanceId },
    /// Anywhere that accepts nothing
    Outside,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Dragging {
        source: DragSource,
        /// Focus to return to if the drag is abandoned
        resume: Option<InstanceId>,
    },
    Dropped {
        instance_id: InstanceId,
    },
    Editing {
        instance_id: InstanceId,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Dragging { .. } => "dragging",
            SessionState::Dropped { .. } => "dropped",
            SessionState::Editing { .. } => "editing",
        }
    }

    /// The instance whose property form is shown, if any
    pub fn focused(&self) -> Option<InstanceId> {
        match self {
            SessionState::Editing { instance_id } => Some(*instance_id),
            _ => None,
        }
    }

    fn resume(focus: Option<InstanceId>) -> Self {
        match focus {
            Some(instance_id) => SessionState::Editing { instance_id },
            None => SessionState::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    DragStart { source: DragSource },
    DragEnd,
    Drop { target: DropTarget },
    #[serde(rename_all = "camelCase")]
    Select { instance_id: InstanceId },
    FieldChange { field: String, input: FieldInput },
    #[serde(rename_all = "camelCase")]
    Delete { instance_id: InstanceId },
    SetElementStyle { name: String, value: Option<String> },
    #[serde(skip)]
    SaveStatus(SaveStatus),
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::DragStart { .. } => "start a drag",
            SessionEvent::DragEnd => "end a drag",
            SessionEvent::Drop { .. } => "drop",
            SessionEvent::Select { .. } => "select",
            SessionEvent::FieldChange { .. } => "change a field",
            SessionEvent::Delete { .. } => "delete",
            SessionEvent::SetElementStyle { .. } => "set an element style",
            SessionEvent::SaveStatus(_) => "report save status",
        }
    }
}

/// Work the UI must carry out after an event
#[derive(Debug, Clone)]
pub enum SessionEffect {
    /// Re-render the whole canvas
    RenderCanvas,
    /// Re-render just one instance
    RenderInstance(InstanceId),
    ShowForm(PropertyForm),
    ClearForm,
    /// The document has no blocks left
    ShowPlaceholder,
    ScheduleSave(SaveRequest),
    ShowSaveStatus(SaveStatus),
}

pub struct EditSession<'r> {
    ctx: EditorContext<'r>,
    document: Document,
    state: SessionState,
    save_status: SaveStatus,
}

impl<'r> EditSession<'r> {
    /// Start editing `document`. Refused when the builder is switched off.
    pub fn new(ctx: EditorContext<'r>, document: Document) -> Result<Self, EditorError> {
        if !ctx.features.builder_enabled {
            return Err(EditorError::BuilderDisabled);
        }

        Ok(Self {
            ctx,
            document,
            state: SessionState::Idle,
            save_status: SaveStatus::Idle,
        })
    }

    pub fn context(&self) -> &EditorContext<'r> {
        &self.ctx
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    /// Palette entries grouped by category
    pub fn palette(&self) -> Vec<(Category, Vec<&'r BlockTemplate>)> {
        self.ctx.registry.categories()
    }

    /// Current property form, rebuilt from stored values
    pub fn form(&self) -> Option<PropertyForm> {
        let instance_id = self.state.focused()?;
        self.build_form(instance_id).ok()
    }

    /// Live markup for one instance
    pub fn preview_instance(&self, instance_id: InstanceId) -> Result<Option<String>, EditorError> {
        let options = self.ctx.generate_options(OutputMode::Persisted);
        Ok(render_instance(&self.document, instance_id, self.ctx.registry, &options)?)
    }

    /// Structural dump of the whole document
    pub fn view_source(&self) -> Result<String, EditorError> {
        let options = self.ctx.generate_options(OutputMode::Preview);
        Ok(generate(&self.document, self.ctx.registry, &options)?)
    }

    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionEffect>, EditorError> {
        let event_name = event.name();
        let result = match event {
            SessionEvent::DragStart { source } => self.on_drag_start(source),
            SessionEvent::DragEnd => self.on_drag_end(),
            SessionEvent::Drop { target } => self.on_drop(target),
            SessionEvent::Select { instance_id } => self.on_select(instance_id),
            SessionEvent::FieldChange { field, input } => self.on_field_change(&field, input),
            SessionEvent::Delete { instance_id } => self.on_delete(instance_id),
            SessionEvent::SetElementStyle { name, value } => self.on_element_style(name, value),
            SessionEvent::SaveStatus(status) => Ok(self.on_save_status(status)),
        };

        if let Err(e) = &result {
            tracing::debug!(
                slot = %self.ctx.slot,
                state = self.state.name(),
                event = event_name,
                error = %e,
                "event rejected"
            );
        }

        result
    }

    fn invalid(&self, event: &'static str) -> EditorError {
        EditorError::InvalidTransition {
            state: self.state.name(),
            event,
        }
    }

    fn on_drag_start(&mut self, source: DragSource) -> Result<Vec<SessionEffect>, EditorError> {
        let resume = match &self.state {
            SessionState::Idle | SessionState::Dropped { .. } => None,
            SessionState::Editing { instance_id } => Some(*instance_id),
            SessionState::Dragging { .. } => return Err(self.invalid("start a drag")),
        };

        match &source {
            DragSource::Palette { type_id } => {
                self.ctx.registry.resolve(type_id).map_err(MutationError::from)?;
            }
            DragSource::Canvas { instance_id } => {
                if self.document.find(*instance_id).is_none() {
                    return Err(MutationError::UnknownInstance(*instance_id).into());
                }
            }
        }

        self.state = SessionState::Dragging { source, resume };
        Ok(Vec::new())
    }

    fn on_drag_end(&mut self) -> Result<Vec<SessionEffect>, EditorError> {
        let SessionState::Dragging { resume, .. } = self.state else {
            return Err(self.invalid("end a drag"));
        };

        self.state = SessionState::resume(resume);
        Ok(Vec::new())
    }

    fn on_drop(&mut self, target: DropTarget) -> Result<Vec<SessionEffect>, EditorError> {
        let SessionState::Dragging { source, resume } = self.state.clone() else {
            return Err(self.invalid("drop"));
        };

        // Whatever happens below, the drag is over
        self.state = SessionState::resume(resume);

        let placed = match (source, target) {
            (_, DropTarget::Outside) => None,
            (DragSource::Palette { type_id }, DropTarget::Canvas { hover }) => {
                let before = self.insertion_point(hover);
                Some(self.insert_top_level(&type_id, before)?)
            }
            (DragSource::Palette { type_id }, DropTarget::Children { container_id }) => {
                Some(self.document.add_block(self.ctx.registry, &type_id, Some(container_id))?)
            }
            (DragSource::Canvas { instance_id }, DropTarget::Canvas { hover }) => {
                if self.document.top_level_index(instance_id).is_none() {
                    // Children leave their container only by delete and re-add
                    None
                } else {
                    let before = self.insertion_point(hover);
                    self.document.move_block(self.ctx.registry, instance_id, before)?;
                    Some(instance_id)
                }
            }
            (DragSource::Canvas { .. }, DropTarget::Children { .. }) => None,
        };

        let Some(instance_id) = placed else {
            return Ok(Vec::new());
        };

        self.state = SessionState::Dropped { instance_id };
        Ok(vec![SessionEffect::RenderCanvas, self.schedule_save()])
    }

    /// `before` argument for a top-level insert at the hovered position
    fn insertion_point(&self, hover: Option<Hover>) -> Option<InstanceId> {
        let hover = hover?;
        let index = self.document.top_level_index(hover.instance_id)?;
        if hover.inserts_before() {
            Some(hover.instance_id)
        } else {
            self.document.blocks.get(index + 1).map(|b| b.id)
        }
    }

    /// Append, then move into place. `before` is always a top-level block,
    /// so the move cannot fail once the add succeeded.
    fn insert_top_level(
        &mut self,
        type_id: &str,
        before: Option<InstanceId>,
    ) -> Result<InstanceId, EditorError> {
        let instance_id = self.document.add_block(self.ctx.registry, type_id, None)?;
        if before.is_some() {
            self.document.move_block(self.ctx.registry, instance_id, before)?;
        }
        Ok(instance_id)
    }

    fn on_select(&mut self, instance_id: InstanceId) -> Result<Vec<SessionEffect>, EditorError> {
        if matches!(self.state, SessionState::Dragging { .. }) {
            return Err(self.invalid("select"));
        }

        let form = self.build_form(instance_id)?;
        self.state = SessionState::Editing { instance_id };
        Ok(vec![SessionEffect::ShowForm(form)])
    }

    fn build_form(&self, instance_id: InstanceId) -> Result<PropertyForm, EditorError> {
        let block = self
            .document
            .find(instance_id)
            .ok_or(MutationError::UnknownInstance(instance_id))?;
        let template = self
            .ctx
            .registry
            .resolve(block.type_id())
            .map_err(MutationError::from)?;
        Ok(PropertyForm::build(instance_id, template, block.data()))
    }

    fn on_field_change(
        &mut self,
        field_name: &str,
        input: FieldInput,
    ) -> Result<Vec<SessionEffect>, EditorError> {
        let SessionState::Editing { instance_id } = self.state else {
            return Err(self.invalid("change a field"));
        };

        let block = self
            .document
            .find(instance_id)
            .ok_or(MutationError::UnknownInstance(instance_id))?;
        let template = self
            .ctx
            .registry
            .resolve(block.type_id())
            .map_err(MutationError::from)?;
        let field = template
            .field(field_name)
            .ok_or_else(|| MutationError::UnknownField {
                type_id: template.type_id.clone(),
                field: field_name.to_string(),
            })?;
        let value = input.into_value(field)?;

        let result = self
            .document
            .update_field(self.ctx.registry, instance_id, field_name, value)?;

        let mut effects = vec![SessionEffect::RenderInstance(instance_id)];
        if let MutationOutcome::Updated { controlling: true } = result.outcome {
            effects.push(SessionEffect::ShowForm(self.build_form(instance_id)?));
        }
        effects.push(self.schedule_save());
        Ok(effects)
    }

    fn on_delete(&mut self, instance_id: InstanceId) -> Result<Vec<SessionEffect>, EditorError> {
        if matches!(self.state, SessionState::Dragging { .. }) {
            return Err(self.invalid("delete"));
        }

        let result = self.document.remove_block(self.ctx.registry, instance_id)?;
        let MutationOutcome::Removed {
            removed,
            document_empty,
        } = result.outcome
        else {
            return Ok(Vec::new());
        };

        let mut effects = vec![SessionEffect::RenderCanvas];

        let lost_focus = match self.state {
            SessionState::Editing { instance_id } | SessionState::Dropped { instance_id } => {
                removed.contains(&instance_id)
            }
            _ => false,
        };
        if lost_focus {
            self.state = SessionState::Idle;
            effects.push(SessionEffect::ClearForm);
        }

        if document_empty {
            effects.push(SessionEffect::ShowPlaceholder);
        }

        effects.push(self.schedule_save());
        Ok(effects)
    }

    fn on_element_style(
        &mut self,
        name: String,
        value: Option<String>,
    ) -> Result<Vec<SessionEffect>, EditorError> {
        self.document
            .apply(self.ctx.registry, &Mutation::SetElementStyle { name, value })?;
        Ok(vec![SessionEffect::RenderCanvas, self.schedule_save()])
    }

    fn on_save_status(&mut self, status: SaveStatus) -> Vec<SessionEffect> {
        self.save_status = status.clone();
        vec![SessionEffect::ShowSaveStatus(status)]
    }

    fn schedule_save(&self) -> SessionEffect {
        SessionEffect::ScheduleSave(SaveRequest {
            slot: self.ctx.slot.to_string(),
            version: self.document.version,
            snapshot: Snapshot::from_document(&self.document),
        })
    }
}
