//! Terminal setup and teardown.

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use thiserror::Error;
use tracing::error;

use super::layout::PanelLayout;
use super::render::{PanelTexts, render};

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("failed to initialize terminal: {0}")]
    Init(#[source] io::Error),
    #[error("failed to draw: {0}")]
    Draw(#[source] io::Error),
    #[error("failed to restore terminal: {0}")]
    Restore(#[source] io::Error),
}

/// Owns the drawing surface and restores the terminal exactly once.
///
/// `close` may be called any number of times; `Drop` calls it too, so the
/// terminal is restored on every exit path.
pub struct TerminalGuard<B: Backend> {
    terminal: Terminal<B>,
    owns_tty: bool,
    active: bool,
}

impl TerminalGuard<CrosstermBackend<Stdout>> {
    /// Switches stdout to raw mode and the alternate screen.
    pub fn init() -> Result<Self, TerminalError> {
        enable_raw_mode().map_err(TerminalError::Init)?;

        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(TerminalError::Init(e));
        }

        match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => Ok(Self {
                terminal,
                owns_tty: true,
                active: true,
            }),
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(TerminalError::Init(e))
            }
        }
    }
}

impl<B: Backend> TerminalGuard<B> {
    /// Wraps a backend that needs no tty setup, such as `TestBackend`.
    pub fn headless(backend: B) -> Result<Self, TerminalError> {
        let terminal = Terminal::new(backend).map_err(TerminalError::Init)?;
        Ok(Self {
            terminal,
            owns_tty: false,
            active: true,
        })
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Redraws every panel. Does nothing once closed.
    pub fn draw(&mut self, layout: &PanelLayout, texts: &PanelTexts) -> Result<(), TerminalError> {
        if !self.active {
            return Ok(());
        }
        self.terminal
            .draw(|frame| render(frame, layout, texts))
            .map(|_| ())
            .map_err(TerminalError::Draw)
    }

    /// Restores the terminal. Every restore step runs even if an earlier
    /// one fails; the first error is returned.
    pub fn close(&mut self) -> Result<(), TerminalError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut result = Ok(());
        if self.owns_tty {
            result = result.and(disable_raw_mode());
            result = result.and(execute!(io::stdout(), LeaveAlternateScreen));
        }
        result
            .and(self.terminal.show_cursor())
            .map_err(TerminalError::Restore)
    }
}

impl<B: Backend> Drop for TerminalGuard<B> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(error = %e, "terminal restore failed");
        }
    }
}
