//! Text rendering of the status display to any `io::Write`.

use std::io::Write;

use whiskers_core::{Feedback, Notification};

use crate::screen::ScreenState;

/// Feedback sink that redraws the screen as text whenever it changes.
///
/// Write errors are logged and dropped; feedback never fails the caller.
#[derive(Debug)]
pub struct ConsoleFeedback<W: Write> {
    out: W,
    state: ScreenState,
}

impl<W: Write> ConsoleFeedback<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: ScreenState::new(),
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self) -> std::io::Result<()> {
        let lines = self.state.screen().lines();
        writeln!(self.out, "[{}]", lines.join(" | "))?;
        self.out.flush()
    }
}

impl ConsoleFeedback<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> Feedback for ConsoleFeedback<W> {
    fn notify(&mut self, n: &Notification) {
        if self.state.apply(n)
            && let Err(e) = self.draw()
        {
            tracing::debug!(error = %e, "display write failed");
        }
    }
}
