//! Main TUI application.

use ratatui::backend::Backend;
use tracing::{info, warn};

use crate::model::SharedSnapshot;
use crate::shutdown::Shutdown;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::layout::PanelLayout;
use super::render::panel_texts;
use super::terminal::{TerminalError, TerminalGuard};

/// Presentation loop state. `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Outcome of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Redraw,
    Ignored,
    Quit,
}

/// Main TUI application.
pub struct App {
    snapshot: SharedSnapshot,
    layout: PanelLayout,
    shutdown: Shutdown,
    state: LoopState,
}

impl App {
    /// Creates an app drawing `snapshot`. Quitting triggers `shutdown`.
    pub fn new(snapshot: SharedSnapshot, shutdown: Shutdown) -> Self {
        Self {
            snapshot,
            layout: PanelLayout::standard(),
            shutdown,
            state: LoopState::Running,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Applies one event to the state machine.
    pub fn step(&mut self, event: &Event) -> Step {
        if self.state == LoopState::Terminated {
            return Step::Ignored;
        }
        match event {
            Event::Tick | Event::Resize(..) => Step::Redraw,
            Event::Key(key) => match handle_key(*key) {
                KeyAction::Quit => {
                    self.terminate();
                    Step::Quit
                }
                KeyAction::None => Step::Ignored,
            },
            Event::Interrupt => {
                self.terminate();
                Step::Quit
            }
        }
    }

    fn terminate(&mut self) {
        self.state = LoopState::Terminated;
        self.shutdown.trigger();
        info!("Quit requested, stopping");
    }

    /// Draws the current snapshot.
    pub fn redraw<B: Backend>(&self, guard: &mut TerminalGuard<B>) -> Result<(), TerminalError> {
        let texts = panel_texts(&self.snapshot.read());
        guard.draw(&self.layout, &texts)
    }

    /// Runs the TUI until quit, then restores the terminal.
    ///
    /// Shutdown is triggered on every exit path, including draw errors.
    pub fn run<B: Backend>(
        mut self,
        guard: &mut TerminalGuard<B>,
        events: &EventHandler,
    ) -> Result<(), TerminalError> {
        let result = self.event_loop(guard, events);
        if self.state == LoopState::Running {
            self.terminate();
        }
        let closed = guard.close();
        result.and(closed)
    }

    fn event_loop<B: Backend>(
        &mut self,
        guard: &mut TerminalGuard<B>,
        events: &EventHandler,
    ) -> Result<(), TerminalError> {
        self.redraw(guard)?;

        while self.state == LoopState::Running {
            let event = match events.next() {
                Ok(event) => event,
                Err(_) => {
                    warn!("event stream closed");
                    break;
                }
            };
            if self.step(&event) == Step::Redraw {
                self.redraw(guard)?;
            }
        }
        Ok(())
    }
}
