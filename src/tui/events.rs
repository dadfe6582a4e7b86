//! Events delivered to the TUI loop from background tasks

use crate::dialog::RequestHandle;
use crate::error::SubmissionError;
use crate::models::Entity;

#[derive(Debug)]
pub enum AppEvent {
    /// A dialog's request came back
    SubmissionFinished {
        handle: RequestHandle,
        result: Result<Entity, SubmissionError>,
    },
    /// The catalog listing came back. `generation` counts the local saves
    /// applied before the request went out.
    CatalogLoaded {
        generation: u64,
        result: Result<Vec<Entity>, SubmissionError>,
    },
}
