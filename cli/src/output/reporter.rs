//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;

use crate::application::ports::ProgressReporter;
use crate::domain::Session;
use crate::output::human::HumanRenderer;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY each `step()` runs a spinner that the next `success()` or
/// `warn()` finishes in place. Elsewhere every event prints one line.
/// `failure()` and `detail()` go to stderr and are never suppressed.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.borrow_mut().take()
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self.take_spinner() {
            progress::abandon(&pb);
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.clear_spinner();
        if self.ctx.show_progress() {
            *self.spinner.borrow_mut() = Some(progress::spinner(message));
        } else {
            self.ctx.step(message);
        }
    }

    fn success(&self, message: &str) {
        match self.take_spinner() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self.take_spinner() {
            Some(pb) => progress::finish_warn(&pb, message),
            None => self.ctx.warn(message),
        }
    }

    fn failure(&self, message: &str) {
        self.clear_spinner();
        HumanRenderer::new(self.ctx).render_error_banner(message);
    }

    fn detail(&self, title: &str, body: &str) {
        self.clear_spinner();
        HumanRenderer::new(self.ctx).render_detail(title, body);
    }

    fn established(&self, session: &Session) {
        self.clear_spinner();
        HumanRenderer::new(self.ctx).render_connection_instructions(session);
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}
