//! Break presentation.
//!
//! The engine hands every break to an [`OverlayPresenter`] together with a
//! [`SkipTrigger`], and keeps the returned [`OverlayHandle`] to dismiss the
//! overlay when the break ends. Timing stays with the engine: a presenter
//! never ends a break by itself, it can only fire the skip trigger in
//! response to the user.
//!
//! Two presenters ship with lumin:
//!
//! - **[`TerminalOverlay`]**: prints the break in the terminal; pressing Enter skips it
//! - **[`LogOverlay`]**: headless, for the background daemon; never skips

use crate::libs::breaks::BreakCategory;
use crate::libs::engine::{EngineCommand, EngineSender};
use crate::libs::formatter::format_seconds;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_info, msg_print};
use parking_lot::Mutex;
use std::io::BufRead;
use std::sync::Arc;

pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    pub session: SessionId,
    pub category: BreakCategory,
    pub title: String,
    pub icon: String,
    /// Seconds.
    pub duration: u64,
}

/// One-shot skip callback bound to a single break session.
///
/// Firing consumes the trigger, so a presenter can skip a break at most once.
/// A trigger fired after its session ended is ignored by the engine.
#[derive(Debug)]
pub struct SkipTrigger {
    session: SessionId,
    sender: EngineSender,
}

impl SkipTrigger {
    pub fn new(session: SessionId, sender: EngineSender) -> Self {
        Self { session, sender }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn fire(self) {
        // The engine may already be gone during shutdown
        let _ = self.sender.send(EngineCommand::Skip(self.session));
    }
}

pub trait OverlayHandle: Send {
    /// Removes the overlay. Must tolerate being called more than once.
    fn dismiss(&mut self);
}

pub trait OverlayPresenter: Send {
    fn present(&mut self, request: &OverlayRequest, on_skip: SkipTrigger) -> Box<dyn OverlayHandle>;
}

fn icon_glyph(icon: &str) -> &str {
    match icon {
        "eye" => "👀",
        "drop" => "💧",
        "star" => "⭐",
        other => other,
    }
}

type SkipSlot = Arc<Mutex<Option<SkipTrigger>>>;

/// Presents breaks on the controlling terminal.
///
/// A reader thread waits on stdin; an empty line (Enter) fires the skip
/// trigger of the break currently shown, if any.
pub struct TerminalOverlay {
    slot: SkipSlot,
}

impl TerminalOverlay {
    pub fn new() -> Self {
        let slot: SkipSlot = Arc::new(Mutex::new(None));
        let reader_slot = Arc::clone(&slot);

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if line.is_err() {
                    break;
                }
                if let Some(trigger) = reader_slot.lock().take() {
                    trigger.fire();
                }
            }
        });

        Self { slot }
    }
}

impl Default for TerminalOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayPresenter for TerminalOverlay {
    fn present(&mut self, request: &OverlayRequest, on_skip: SkipTrigger) -> Box<dyn OverlayHandle> {
        msg_print!(
            Message::BreakBanner(
                icon_glyph(&request.icon).to_string(),
                request.title.clone(),
                format_seconds(request.duration)
            ),
            true
        );
        *self.slot.lock() = Some(on_skip);

        Box::new(TerminalOverlayHandle {
            slot: Arc::clone(&self.slot),
            session: request.session,
            dismissed: false,
        })
    }
}

struct TerminalOverlayHandle {
    slot: SkipSlot,
    session: SessionId,
    dismissed: bool,
}

impl OverlayHandle for TerminalOverlayHandle {
    fn dismiss(&mut self) {
        if self.dismissed {
            return;
        }
        self.dismissed = true;

        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|trigger| trigger.session() == self.session) {
            *slot = None;
        }
        drop(slot);
        msg_print!(Message::BreakOverlayClosed);
    }
}

/// Headless presenter used by the background daemon.
#[derive(Debug, Default)]
pub struct LogOverlay;

impl OverlayPresenter for LogOverlay {
    fn present(&mut self, request: &OverlayRequest, _on_skip: SkipTrigger) -> Box<dyn OverlayHandle> {
        msg_info!(Message::BreakBanner(
            icon_glyph(&request.icon).to_string(),
            request.title.clone(),
            format_seconds(request.duration)
        ));
        Box::new(LogOverlayHandle {
            session: request.session,
            dismissed: false,
        })
    }
}

struct LogOverlayHandle {
    session: SessionId,
    dismissed: bool,
}

impl OverlayHandle for LogOverlayHandle {
    fn dismiss(&mut self) {
        if !self.dismissed {
            self.dismissed = true;
            msg_debug!(format!("overlay for session {} dismissed", self.session));
        }
    }
}
