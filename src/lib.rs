//! Validated add/edit dialogs for a collectible catalog
//!
//! The headless editor lives in [`schema`], [`form`], [`dialog`] and
//! [`submission`]. [`tui`] hosts it in a terminal list view.

pub mod collection;
pub mod config;
pub mod dialog;
pub mod error;
pub mod form;
pub mod models;
pub mod schema;
pub mod submission;
pub mod tui;

pub use collection::{Catalog, CollectionSetter, CollectionUpdate};
pub use dialog::{Completion, DialogMode, DialogState, EntityDialog, RequestHandle, SubmitStep};
pub use error::SubmissionError;
pub use models::{Entity, EntityFields, EntityId, Field};
pub use schema::{FieldErrors, RawRecord, Schema, SchemaMode, ValidatedDraft};
pub use submission::{CatalogService, HttpCatalogService, SubmitOutcome};
