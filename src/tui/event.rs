//! Event handling for TUI.
//!
//! A ticker thread emits refresh ticks on a fixed interval and an input
//! thread forwards terminal events. Both feed one channel so the main loop
//! blocks on whichever arrives first.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tracing::warn;

use crate::shutdown::Shutdown;

/// How long the input thread waits for a terminal event before
/// re-checking shutdown.
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Application events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Timer tick for redraw.
    Tick,
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
    /// SIGINT/SIGTERM delivered to the process.
    Interrupt,
}

/// Merges refresh ticks and terminal input into one stream.
pub struct EventHandler {
    rx: Receiver<Event>,
    tx: Sender<Event>,
}

impl EventHandler {
    /// Starts the ticker and input threads. Both stop once `shutdown` is
    /// triggered.
    pub fn new(refresh: Duration, shutdown: Shutdown) -> io::Result<Self> {
        let handler = Self::detached();

        let tick_tx = handler.sender();
        let tick_shutdown = shutdown.clone();
        thread::Builder::new()
            .name("ticker".to_string())
            .spawn(move || {
                while tick_shutdown.sleep(refresh) {
                    if tick_tx.send(Event::Tick).is_err() {
                        break;
                    }
                }
            })?;

        let input_tx = handler.sender();
        thread::Builder::new()
            .name("input".to_string())
            .spawn(move || {
                while !shutdown.is_triggered() {
                    match event::poll(INPUT_POLL) {
                        Ok(true) => {}
                        Ok(false) => continue,
                        Err(e) => {
                            warn!(error = %e, "terminal poll failed");
                            break;
                        }
                    }
                    let event = match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => {
                            warn!(error = %e, "terminal read failed");
                            break;
                        }
                    };
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
            })?;

        Ok(handler)
    }

    /// A handler with no background threads; events come only from
    /// [`EventHandler::sender`].
    pub fn detached() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    /// Another producer for this stream, e.g. for a signal handler.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Receives the next event, blocking until one is available.
    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }
}
