//! Add/edit dialog controller
//!
//! One [`EntityDialog`] backs either the "add item" or the "edit item" button.
//! It owns the visibility state, the transient draft while the dialog is open
//! and the handle of the request currently in flight.
//!
//! ```text
//! Closed --open--> Editing --submit (valid)--> Submitting --ok--> Closed
//!                  Editing --submit (invalid)--> Editing
//!                  Editing --cancel--> Closed
//!                                          Submitting --err--> Editing
//!                                          Submitting --cancel--> Closed (request superseded)
//! ```

use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::collection::CollectionSetter;
use crate::error::SubmissionError;
use crate::form::FormState;
use crate::models::{Entity, Field};
use crate::schema::{FieldErrors, Schema, SchemaMode, ValidatedDraft};
use crate::submission;

/// Which button the dialog belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit(Entity),
}

impl DialogMode {
    pub fn schema_mode(&self) -> SchemaMode {
        match self {
            DialogMode::Create => SchemaMode::Create,
            DialogMode::Edit(_) => SchemaMode::Update,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DialogMode::Create => "Add Item",
            DialogMode::Edit(_) => "Edit Item",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Editing,
    Submitting,
}

/// Identifies one submission. Responses carrying a stale handle are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle(Uuid);

impl RequestHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated draft waiting to be sent
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub handle: RequestHandle,
    pub draft: ValidatedDraft,
}

/// Result of pressing submit
#[derive(Debug)]
pub enum SubmitStep {
    /// Validation failed; the errors are also kept on the form
    Invalid(FieldErrors),
    /// Draft is valid and the dialog is now submitting
    Pending(PendingSubmission),
    /// Dialog is closed or already submitting
    Ignored,
}

/// Result of delivering a response to the dialog
#[derive(Debug)]
pub enum Completion {
    /// Collection updated and dialog closed
    Applied(Entity),
    /// Dialog is back in editing with the draft retained
    Failed(SubmissionError),
    /// The request was abandoned before its response arrived
    Superseded,
}

#[derive(Debug)]
pub struct EntityDialog {
    mode: DialogMode,
    state: DialogState,
    form: Option<FormState>,
    pending: Option<RequestHandle>,
}

impl EntityDialog {
    pub fn new(mode: DialogMode) -> Self {
        Self {
            mode,
            state: DialogState::Closed,
            form: None,
            pending: None,
        }
    }

    pub fn create() -> Self {
        Self::new(DialogMode::Create)
    }

    pub fn edit(entity: Entity) -> Self {
        Self::new(DialogMode::Edit(entity))
    }

    pub fn mode(&self) -> &DialogMode {
        &self.mode
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != DialogState::Closed
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    /// Open the dialog with a fresh draft seeded from the mode
    pub fn open(&mut self) {
        if self.is_open() {
            return;
        }

        let schema = Schema::for_mode(self.mode.schema_mode());
        self.form = Some(match &self.mode {
            DialogMode::Create => FormState::empty(schema),
            DialogMode::Edit(entity) => FormState::seeded(schema, entity),
        });
        self.state = DialogState::Editing;
        info!("Opened {} dialog", self.mode.title());
    }

    /// Close the dialog and drop the draft. A request still in flight is
    /// superseded and its response will be ignored.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            info!("Dialog closed while request {} was pending", handle);
        }
        self.close();
    }

    /// Apply raw input to a field. Only possible while editing, and never
    /// for the identifier.
    pub fn update(&mut self, field: Field, input: &str) -> bool {
        match (self.state, self.form.as_mut()) {
            (DialogState::Editing, Some(form)) => form.update(field, input),
            _ => false,
        }
    }

    /// Validate the draft and, if it passes, move to submitting
    pub fn submit(&mut self) -> SubmitStep {
        let form = match (self.state, self.form.as_mut()) {
            (DialogState::Editing, Some(form)) => form,
            _ => return SubmitStep::Ignored,
        };

        match form.validate() {
            Ok(draft) => {
                // The service assigned the identifier; the draft always targets it
                let draft = match (draft, &self.mode) {
                    (ValidatedDraft::Update(entity), DialogMode::Edit(current)) => {
                        ValidatedDraft::Update(Entity::new(current.id.clone(), entity.fields))
                    }
                    (draft, _) => draft,
                };
                let handle = RequestHandle::new();
                self.pending = Some(handle);
                self.state = DialogState::Submitting;
                debug!("Submitting request {}", handle);
                SubmitStep::Pending(PendingSubmission { handle, draft })
            }
            Err(errors) => {
                debug!("Validation failed for {} field(s)", errors.len());
                SubmitStep::Invalid(errors)
            }
        }
    }

    /// Deliver the service's answer for `handle`
    pub fn finish<C>(
        &mut self,
        handle: RequestHandle,
        result: Result<Entity, SubmissionError>,
        collection: &mut C,
    ) -> Completion
    where
        C: CollectionSetter + ?Sized,
    {
        if self.pending != Some(handle) {
            debug!("Ignoring response for superseded request {}", handle);
            return Completion::Superseded;
        }
        self.pending = None;

        match result {
            Ok(entity) => {
                collection.set_collection(submission::reconcile(
                    self.mode.schema_mode(),
                    entity.clone(),
                ));
                if let DialogMode::Edit(current) = &mut self.mode {
                    *current = entity.clone();
                }
                info!("Saved item {} ({})", entity.id, entity.fields.name);
                self.close();
                Completion::Applied(entity)
            }
            Err(err) => {
                warn!("Error saving item: {}", err);
                self.state = DialogState::Editing;
                Completion::Failed(err)
            }
        }
    }

    fn close(&mut self) {
        self.state = DialogState::Closed;
        self.form = None;
    }
}
