//! Catalog Terminal User Interface
//!
//! Hosts the add/edit dialogs over a list of catalog items. The list plays the
//! parent view: it owns the collection and hands the dialogs its update channel.

pub mod app;
pub mod components;
pub mod events;
pub mod traits;
pub mod ui;

pub use app::App;
pub use events::AppEvent;
