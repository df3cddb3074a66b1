//! Terminal dashboard.
//!
//! Draws the shared snapshot as a grid of fixed panels and redraws it on
//! its own timer, independent of the collector.

mod app;
mod event;
mod input;
mod layout;
mod render;
mod style;
mod terminal;

pub use app::{App, LoopState, Step};
pub use event::{Event, EventHandler};
pub use input::{KeyAction, handle_key};
pub use layout::{PanelId, PanelLayout};
pub use render::{PanelTexts, panel_texts, render};
pub use terminal::{TerminalError, TerminalGuard};
