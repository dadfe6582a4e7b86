//! Reusable UI components for the catalog TUI

pub mod entity_dialog;
pub mod form_field;
pub mod status_display;

pub use entity_dialog::DialogView;
pub use form_field::FormField;
pub use status_display::StatusDisplay;
