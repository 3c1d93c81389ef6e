//! Render pacing.
//!
//! The calendar shows a short loading state before each render. Scheduling a
//! render cancels the pending one, so a stale render can never land after a
//! newer one.

use log::debug;
use std::time::{Duration, Instant};

pub const DEFAULT_RENDER_DELAY: Duration = Duration::from_millis(300);

/// Identifies one scheduled render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket(u64);

#[derive(Debug, Clone, Copy)]
struct PendingRender {
    ticket: RenderTicket,
    due_at: Instant,
}

/// Single-slot render timer.
#[derive(Debug)]
pub struct RenderScheduler {
    delay: Duration,
    next_ticket: u64,
    pending: Option<PendingRender>,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DELAY)
    }
}

impl RenderScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules a render `delay` after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: Instant) -> RenderTicket {
        if let Some(previous) = self.pending.take() {
            debug!(
                "event=render_schedule module=calendar status=replaced ticket={}",
                previous.ticket.0
            );
        }
        self.next_ticket += 1;
        let ticket = RenderTicket(self.next_ticket);
        self.pending = Some(PendingRender {
            ticket,
            due_at: now + self.delay,
        });
        ticket
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `ticket` is still the render that will fire.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.pending.is_some_and(|pending| pending.ticket == ticket)
    }

    /// Returns the pending ticket once it is due, clearing the slot.
    pub fn poll(&mut self, now: Instant) -> Option<RenderTicket> {
        match self.pending {
            Some(pending) if now >= pending.due_at => {
                self.pending = None;
                Some(pending.ticket)
            }
            _ => None,
        }
    }
}
