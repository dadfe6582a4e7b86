//! Modal overlay rendering an [`EntityDialog`]

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::dialog::{DialogMode, DialogState, EntityDialog};
use crate::models::Field;
use crate::tui::{
    components::FormField,
    traits::{DialogAction, FormHandler},
    ui::{centered_rect, Styles},
};

/// Input boxes for an open dialog. Every edit is forwarded to the dialog's
/// form state, which stays the source of truth for values and errors.
pub struct DialogView {
    pub dialog: EntityDialog,
    fields: Vec<FormField>,
    current_field: usize,
}

impl DialogView {
    /// Open `dialog` and build one input per editable field
    pub fn open(mut dialog: EntityDialog) -> Self {
        dialog.open();

        let fields = Field::EDITABLE
            .iter()
            .map(|field| {
                let value = dialog
                    .form()
                    .map(|form| form.display_value(*field))
                    .unwrap_or_default();
                FormField::new(*field)
                    .with_placeholder(placeholder(*field))
                    .with_value(&value)
            })
            .collect();

        let mut view = Self {
            dialog,
            fields,
            current_field: 0,
        };
        view.update_focus();
        view
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    fn update_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.set_focus(i == self.current_field);
        }
    }

    fn current_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.current_field)
    }

    /// Push the focused input's text into the form state
    fn sync_current(&mut self) {
        if let Some(input) = self.fields.get(self.current_field) {
            let (field, text) = (input.field, input.value.clone());
            self.dialog.update(field, &text);
        }
        self.refresh_errors();
    }

    /// Copy the form's error map onto the inputs
    pub fn refresh_errors(&mut self) {
        let Some(form) = self.dialog.form() else {
            return;
        };
        for input in &mut self.fields {
            input.validation_error = form.error(input.field).map(str::to_string);
        }
    }

    /// Handle a key while the dialog has focus
    pub fn handle_key(&mut self, key: KeyEvent) -> DialogAction {
        if key.code == KeyCode::Esc {
            return DialogAction::Cancel;
        }

        // Inputs are frozen while the request is in flight
        if self.dialog.state() != DialogState::Editing {
            return DialogAction::None;
        }

        match key.code {
            KeyCode::Enter => return DialogAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.previous_field(),
            KeyCode::Char(c) => self.handle_char_input(c),
            KeyCode::Backspace => self.handle_backspace(),
            KeyCode::Delete => self.handle_delete(),
            KeyCode::Left => {
                if let Some(input) = self.current_mut() {
                    input.move_cursor_left();
                }
            }
            KeyCode::Right => {
                if let Some(input) = self.current_mut() {
                    input.move_cursor_right();
                }
            }
            KeyCode::Home => {
                if let Some(input) = self.current_mut() {
                    input.move_cursor_to_start();
                }
            }
            KeyCode::End => {
                if let Some(input) = self.current_mut() {
                    input.move_cursor_to_end();
                }
            }
            _ => {}
        }
        DialogAction::None
    }

    /// Draw the dialog as a centered overlay
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(70, 80, area);
        f.render_widget(Clear, popup);

        let mode = self.dialog.mode();
        let title = match (mode, self.dialog.state()) {
            (_, DialogState::Submitting) => format!("{} - Saving...", mode.title()),
            (DialogMode::Edit(entity), _) => format!("{} [{}]", mode.title(), entity.id),
            (DialogMode::Create, _) => mode.title().to_string(),
        };

        let block = Block::default()
            .title(title)
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let mut constraints: Vec<Constraint> = self.fields.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, input) in self.fields.iter().enumerate() {
            input.render(f, chunks[i]);
        }

        let help = Paragraph::new("Enter: Submit | Esc: Cancel | Tab/↓: Next field | Shift+Tab/↑: Previous field")
            .style(Styles::inactive());
        f.render_widget(help, chunks[chunks.len() - 1]);
    }
}

impl FormHandler for DialogView {
    fn get_current_field(&self) -> usize {
        self.current_field
    }

    fn set_current_field(&mut self, field: usize) {
        if field < self.fields.len() {
            self.current_field = field;
            self.update_focus();
        }
    }

    fn get_field_count(&self) -> usize {
        self.fields.len()
    }

    fn handle_char_input(&mut self, c: char) {
        if let Some(input) = self.current_mut() {
            input.insert_char(c);
        }
        self.sync_current();
    }

    fn handle_backspace(&mut self) {
        if let Some(input) = self.current_mut() {
            input.delete_char();
        }
        self.sync_current();
    }

    fn handle_delete(&mut self) {
        if let Some(input) = self.current_mut() {
            input.delete_char_forward();
        }
        self.sync_current();
    }
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::Name => "e.g., Batman",
        Field::ImageUrl => "https://...",
        Field::Source => "e.g., DC Comics",
        Field::YearReleased => "e.g., 2020",
        Field::SequenceNumber => "e.g., 1",
        Field::Id => "",
    }
}
