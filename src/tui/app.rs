//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    widgets::ListState,
    Frame, Terminal,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::collection::{Catalog, CollectionSetter, CollectionUpdate};
use crate::config::Config;
use crate::dialog::{Completion, EntityDialog, PendingSubmission, SubmitStep};
use crate::models::{Entity, EntityId};
use crate::submission::{self, CatalogService};
use crate::tui::{
    components::{DialogView, StatusDisplay},
    events::AppEvent,
    traits::DialogAction,
    ui::render_entity_table,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Main TUI application state
pub struct App {
    /// Application configuration
    pub config: Config,
    service: Arc<dyn CatalogService>,

    /// The parent collection shown in the list
    pub catalog: Catalog,
    pub list_state: ListState,
    /// Dialog currently on screen, if any
    pub dialog: Option<DialogView>,
    /// Saves applied to `catalog` so far; older listings are stale
    generation: u64,

    pub status: StatusDisplay,
    pub should_quit: bool,

    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create a new TUI application
    pub fn new(config: Config, service: Arc<dyn CatalogService>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            service,
            catalog: Catalog::default(),
            list_state: ListState::default(),
            dialog: None,
            generation: 0,
            status: StatusDisplay::new().with_auto_clear(STATUS_TIMEOUT),
            should_quit: false,
            events_tx,
            events_rx,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Catalog TUI started against {}", self.config.api.base_url);
        self.reload();

        loop {
            terminal.draw(|f| self.draw(f))?;

            while let Ok(app_event) = self.events_rx.try_recv() {
                self.handle_app_event(app_event);
            }

            if self.status.should_auto_clear() {
                self.status.clear();
            }

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Wait for the next background event
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    /// Fetch the catalog in the background
    pub fn reload(&mut self) {
        self.status.set_loading("Loading catalog...".to_string());
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = service.list().await;
            let _ = tx.send(AppEvent::CatalogLoaded { generation, result });
        });
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('a') => self.open_dialog(EntityDialog::create()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(entity) = self.selected_entity().cloned() {
                    self.open_dialog(EntityDialog::edit(entity));
                } else {
                    self.status.set_info("Nothing selected to edit".to_string());
                }
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Down | KeyCode::Char('j') => self.next_item(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_item(),
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(view) = self.dialog.as_mut() else {
            return;
        };

        match view.handle_key(key) {
            DialogAction::None => {}
            DialogAction::Cancel => {
                view.dialog.cancel();
                self.dialog = None;
                self.status.set_info("Cancelled".to_string());
            }
            DialogAction::Submit => match view.dialog.submit() {
                SubmitStep::Pending(pending) => {
                    self.status.set_loading("Saving item...".to_string());
                    self.spawn_submission(pending);
                }
                SubmitStep::Invalid(errors) => {
                    view.refresh_errors();
                    self.status
                        .set_error(format!("Please fix {} field(s)", errors.len()));
                }
                SubmitStep::Ignored => {}
            },
        }
    }

    fn open_dialog(&mut self, dialog: EntityDialog) {
        self.status.clear();
        self.dialog = Some(DialogView::open(dialog));
    }

    /// Send the request on a background task and report back through the
    /// event channel
    fn spawn_submission(&self, pending: PendingSubmission) {
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = submission::send(service.as_ref(), &pending.draft).await;
            let _ = tx.send(AppEvent::SubmissionFinished {
                handle: pending.handle,
                result,
            });
        });
    }

    /// Apply a background event to the application state
    pub fn handle_app_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::SubmissionFinished { handle, result } => {
                let Some(view) = self.dialog.as_mut() else {
                    debug!("Dropping response for closed dialog (request {})", handle);
                    return;
                };

                match view.dialog.finish(handle, result, &mut self.catalog) {
                    Completion::Applied(entity) => {
                        self.dialog = None;
                        self.generation += 1;
                        self.select_id(&entity.id);
                        self.status
                            .set_success(format!("Saved {}", entity.fields.name));
                    }
                    Completion::Failed(err) => {
                        view.refresh_errors();
                        let message = if err.is_server_error() {
                            format!("Server rejected item: {}", err)
                        } else {
                            format!("Could not reach server: {}", err)
                        };
                        self.status.set_error(message);
                    }
                    Completion::Superseded => {}
                }
            }
            AppEvent::CatalogLoaded { generation, .. } if generation != self.generation => {
                debug!("Discarding catalog listing requested before a save, reloading");
                self.reload();
            }
            AppEvent::CatalogLoaded { result: Ok(items), .. } => {
                let count = items.len();
                self.catalog.set_collection(CollectionUpdate::Replace(items));
                self.clamp_selection();
                self.status.set_success(format!("Loaded {} items", count));
            }
            AppEvent::CatalogLoaded { result: Err(err), .. } => {
                warn!("Error loading catalog: {}", err);
                self.status.set_error(format!("Error loading catalog: {}", err));
            }
        }
    }

    pub fn selected_entity(&self) -> Option<&Entity> {
        self.list_state.selected().and_then(|i| self.catalog.get(i))
    }

    fn next_item(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.catalog.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous_item(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.catalog.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn select_id(&mut self, id: &EntityId) {
        let index = self.catalog.items().iter().position(|entity| &entity.id == id);
        self.list_state.select(index);
    }

    fn clamp_selection(&mut self) {
        let selected = match (self.catalog.len(), self.list_state.selected()) {
            (0, _) => None,
            (len, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.list_state.select(selected);
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        // Main layout: status bar at bottom, content area above
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        let title = format!("Catalog ({} items)", self.catalog.len());
        render_entity_table(f, chunks[0], self.catalog.items(), &mut self.list_state, &title);

        let hint = if self.dialog.is_some() {
            "Enter: Submit | Esc: Cancel"
        } else {
            "A: Add | E/Enter: Edit | R: Reload | ↑/↓: Select | Q: Quit"
        };
        self.status.render(f, chunks[1], hint);

        if let Some(view) = &self.dialog {
            view.render(f, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::DialogState;
    use crate::error::SubmissionError;
    use crate::models::EntityFields;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use std::sync::Mutex;

    /// Serves a fixed catalog and echoes writes, optionally failing them
    struct FakeService {
        items: Vec<Entity>,
        fail_writes: bool,
        writes: Mutex<usize>,
    }

    impl FakeService {
        fn new(items: Vec<Entity>) -> Self {
            Self {
                items,
                fail_writes: false,
                writes: Mutex::new(0),
            }
        }

        fn failing(items: Vec<Entity>) -> Self {
            Self {
                fail_writes: true,
                ..Self::new(items)
            }
        }

        fn write<T>(&self, value: T) -> Result<T, SubmissionError> {
            *self.writes.lock().unwrap() += 1;
            if self.fail_writes {
                Err(SubmissionError::Api {
                    status_code: 500,
                    message: "database unavailable".to_string(),
                })
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl CatalogService for FakeService {
        async fn create(&self, fields: &EntityFields) -> Result<Entity, SubmissionError> {
            self.write(Entity::new(EntityId::new("new-1"), fields.clone()))
        }

        async fn update(&self, entity: &Entity) -> Result<Entity, SubmissionError> {
            self.write(entity.clone())
        }

        async fn list(&self) -> Result<Vec<Entity>, SubmissionError> {
            Ok(self.items.clone())
        }
    }

    fn entity(id: &str, name: &str) -> Entity {
        Entity::new(
            EntityId::new(id),
            EntityFields {
                name: name.to_string(),
                image_url: format!("https://x.com/{}.png", id),
                sequence_number: 1,
                year_released: "2020".to_string(),
                source: "DC".to_string(),
            },
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    async fn loaded_app(service: FakeService) -> App {
        let mut app = App::new(Config::default(), Arc::new(service));
        app.reload();
        let loaded = app.next_event().await.unwrap();
        app.handle_app_event(loaded);
        app
    }

    fn fill_add_dialog(app: &mut App) {
        for text in ["Batman", "https://x.com/b.png", "DC", "2020", "5"] {
            type_text(app, text);
            app.handle_key_event(key(KeyCode::Tab));
        }
    }

    #[tokio::test]
    async fn test_reload_populates_catalog() {
        let app = loaded_app(FakeService::new(vec![entity("1", "A"), entity("2", "B")])).await;
        assert_eq!(app.catalog.len(), 2);
        assert_eq!(app.selected_entity().unwrap().id.as_str(), "1");
    }

    #[tokio::test]
    async fn test_add_flow_appends_and_closes() {
        let mut app = loaded_app(FakeService::new(vec![entity("1", "A")])).await;

        app.handle_key_event(key(KeyCode::Char('a')));
        assert!(app.dialog.is_some());
        fill_add_dialog(&mut app);
        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(app.dialog.as_ref().unwrap().dialog.state(), DialogState::Submitting);

        let finished = app.next_event().await.unwrap();
        app.handle_app_event(finished);

        assert!(app.dialog.is_none());
        assert_eq!(app.catalog.len(), 2);
        assert_eq!(app.catalog.items().last().unwrap().id.as_str(), "new-1");
        assert_eq!(app.selected_entity().unwrap().id.as_str(), "new-1");
    }

    #[tokio::test]
    async fn test_edit_flow_replaces_selected() {
        let mut app = loaded_app(FakeService::new(vec![entity("1", "A"), entity("2", "C")])).await;

        app.handle_key_event(key(KeyCode::Char('e')));
        app.handle_key_event(key(KeyCode::Backspace));
        type_text(&mut app, "B");
        app.handle_key_event(key(KeyCode::Enter));

        let finished = app.next_event().await.unwrap();
        app.handle_app_event(finished);

        let names: Vec<&str> = app.catalog.items().iter().map(|e| e.fields.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
        assert!(app.dialog.is_none());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_dialog_open() {
        let mut app = loaded_app(FakeService::failing(vec![entity("1", "A")])).await;
        let before = app.catalog.clone();

        app.handle_key_event(key(KeyCode::Char('a')));
        fill_add_dialog(&mut app);
        app.handle_key_event(key(KeyCode::Enter));
        let finished = app.next_event().await.unwrap();
        app.handle_app_event(finished);

        assert_eq!(app.catalog, before);
        let view = app.dialog.as_ref().unwrap();
        assert_eq!(view.dialog.state(), DialogState::Editing);
        assert_eq!(view.fields()[0].value, "Batman");
    }

    #[tokio::test]
    async fn test_stale_listing_does_not_drop_new_item() {
        let mut app = loaded_app(FakeService::new(vec![entity("1", "A")])).await;
        let requested_at = app.generation;

        app.handle_key_event(key(KeyCode::Char('a')));
        fill_add_dialog(&mut app);
        app.handle_key_event(key(KeyCode::Enter));
        let finished = app.next_event().await.unwrap();
        app.handle_app_event(finished);
        assert_eq!(app.catalog.len(), 2);

        // Listing taken before the save landed
        app.handle_app_event(AppEvent::CatalogLoaded {
            generation: requested_at,
            result: Ok(vec![entity("1", "A")]),
        });
        assert_eq!(app.catalog.len(), 2);
        assert_eq!(app.catalog.items().last().unwrap().id.as_str(), "new-1");

        // A fresh listing was requested in its place
        match app.next_event().await.unwrap() {
            AppEvent::CatalogLoaded { generation, .. } => assert_eq!(generation, app.generation),
            other => panic!("expected catalog listing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_submit_never_sends() {
        let mut app = loaded_app(FakeService::new(Vec::new())).await;

        app.handle_key_event(key(KeyCode::Char('a')));
        app.handle_key_event(key(KeyCode::Enter));

        let view = app.dialog.as_ref().unwrap();
        assert_eq!(view.dialog.state(), DialogState::Editing);
        assert!(view.fields().iter().all(|f| f.validation_error.is_some()));
        assert!(app.events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_response_after_cancel_is_dropped() {
        let mut app = loaded_app(FakeService::new(vec![entity("1", "A")])).await;

        app.handle_key_event(key(KeyCode::Char('a')));
        fill_add_dialog(&mut app);
        app.handle_key_event(key(KeyCode::Enter));
        app.handle_key_event(key(KeyCode::Esc));
        assert!(app.dialog.is_none());

        // A new dialog must not pick up the old response either
        app.handle_key_event(key(KeyCode::Char('a')));

        let finished = app.next_event().await.unwrap();
        app.handle_app_event(finished);

        assert_eq!(app.catalog.len(), 1);
        assert_eq!(app.dialog.as_ref().unwrap().dialog.state(), DialogState::Editing);
    }

    #[tokio::test]
    async fn test_typing_q_in_dialog_does_not_quit() {
        let mut app = loaded_app(FakeService::new(Vec::new())).await;
        app.handle_key_event(key(KeyCode::Char('a')));
        type_text(&mut app, "q");
        assert!(!app.should_quit);

        app.handle_key_event(key(KeyCode::Esc));
        app.handle_key_event(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_draw_renders_list_and_dialog() {
        let mut app = loaded_app(FakeService::new(vec![entity("1", "Robin")])).await;
        app.handle_key_event(key(KeyCode::Char('a')));

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Catalog (1 items)"));
        assert!(screen.contains("Add Item"));
        assert!(screen.contains("Character Name"));
    }
}
