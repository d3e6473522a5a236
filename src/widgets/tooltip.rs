//! Tooltip hover timing

use std::time::{Duration, Instant};

/// Delay between the pointer leaving and the tooltip disappearing
pub const HIDE_DELAY: Duration = Duration::from_millis(150);

/// Tooltip visibility driven by pointer events.
///
/// Time is passed in by the caller so the state stays deterministic.
/// `folio.js` implements the same transitions with `HIDE_DELAY` inlined.
#[derive(Debug, Clone, Default)]
pub struct TooltipState {
    visible: bool,
    hide_at: Option<Instant>,
}

impl TooltipState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer entered the trigger or the tooltip itself
    pub fn pointer_enter(&mut self) {
        self.hide_at = None;
        self.visible = true;
    }

    /// Pointer left; hiding is scheduled, not immediate
    pub fn pointer_leave(&mut self, now: Instant) {
        self.hide_at = Some(now + HIDE_DELAY);
    }

    /// Advance the clock, applying a due hide. Returns whether visibility changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.hide_at = None;
                let changed = self.visible;
                self.visible = false;
                changed
            }
            _ => false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hide_pending(&self) -> bool {
        self.hide_at.is_some()
    }
}
