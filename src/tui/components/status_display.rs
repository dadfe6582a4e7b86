//! Status display component for showing messages

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::ui::Styles;

/// Types of status messages
#[derive(Debug, Clone, PartialEq)]
pub enum StatusType {
    Info,
    Success,
    Error,
    Loading,
}

/// Status message with type and content
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub status_type: StatusType,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl StatusMessage {
    pub fn new(message: String, status_type: StatusType) -> Self {
        Self {
            message,
            status_type,
            timestamp: chrono::Local::now(),
        }
    }
}

/// Status bar at the bottom of the screen
#[derive(Default)]
pub struct StatusDisplay {
    pub current_message: Option<StatusMessage>,
    pub auto_clear_timeout: Option<std::time::Duration>,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_clear(mut self, timeout: std::time::Duration) -> Self {
        self.auto_clear_timeout = Some(timeout);
        self
    }

    /// Set current status message
    pub fn set_message(&mut self, message: StatusMessage) {
        self.current_message = Some(message);
    }

    pub fn set_info(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Info));
    }

    pub fn set_success(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Success));
    }

    pub fn set_error(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Error));
    }

    pub fn set_loading(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Loading));
    }

    /// Clear current message; the key hint shows again
    pub fn clear(&mut self) {
        self.current_message = None;
    }

    /// Loading and error messages stay until replaced
    pub fn should_auto_clear(&self) -> bool {
        if let (Some(timeout), Some(message)) = (self.auto_clear_timeout, &self.current_message) {
            if matches!(message.status_type, StatusType::Info | StatusType::Success) {
                let elapsed = chrono::Local::now().signed_duration_since(message.timestamp);
                return elapsed.to_std().unwrap_or_default() > timeout;
            }
        }
        false
    }

    /// Render the status display
    pub fn render(&self, f: &mut Frame, area: Rect, hint: &str) {
        let (content, style) = match &self.current_message {
            Some(message) => {
                let style = match message.status_type {
                    StatusType::Info => Styles::info(),
                    StatusType::Success => Styles::success(),
                    StatusType::Error => Styles::error(),
                    StatusType::Loading => Styles::warning(),
                };
                (format_message(message), style)
            }
            None => (hint.to_string(), Styles::inactive()),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());

        let paragraph = Paragraph::new(content)
            .style(style)
            .block(block);

        f.render_widget(paragraph, area);
    }
}

fn format_message(message: &StatusMessage) -> String {
    let prefix = match message.status_type {
        StatusType::Info => "ℹ",
        StatusType::Success => "✓",
        StatusType::Error => "✗",
        StatusType::Loading => "⟳",
    };

    format!(
        "{} [{}] {}",
        prefix,
        message.timestamp.format("%H:%M:%S"),
        message.message
    )
}
