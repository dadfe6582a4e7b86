//! Core traits for the catalog TUI

/// What the host should do after a key press inside a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// Key handled locally, nothing for the host to do
    None,
    /// User asked to submit the form
    Submit,
    /// User dismissed the dialog
    Cancel,
}

/// Trait for form handling
pub trait FormHandler {
    /// Get current field index
    fn get_current_field(&self) -> usize;

    /// Set current field
    fn set_current_field(&mut self, field: usize);

    /// Get total number of fields
    fn get_field_count(&self) -> usize;

    /// Move to next field
    fn next_field(&mut self) {
        let current = self.get_current_field();
        let total = self.get_field_count();
        if total > 0 {
            self.set_current_field((current + 1) % total);
        }
    }

    /// Move to previous field
    fn previous_field(&mut self) {
        let current = self.get_current_field();
        let total = self.get_field_count();
        if total > 0 {
            self.set_current_field(if current == 0 { total - 1 } else { current - 1 });
        }
    }

    /// Handle character input for current field
    fn handle_char_input(&mut self, c: char);

    /// Handle backspace for current field
    fn handle_backspace(&mut self);

    /// Handle delete for current field
    fn handle_delete(&mut self);
}
