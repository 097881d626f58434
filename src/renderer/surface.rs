//! Host boundary - the grid a menu draws into and the events it receives.
//!
//! The engine owns no pixels and no input device. A host provides:
//! - a [`GridSurface`] with synchronous `set_cell` / `clear_cell`
//! - optionally an [`EventSource`] that feeds [`RawEvent`]s for one menu
//!   into a single sink, until the returned [`Subscription`] is cancelled

use std::fmt;

use crate::error::{HostError, Result};
use crate::pipeline::{DispatchOutcome, MenuId, RawEvent};
use crate::types::{CellContent, GridSize, Position};

/// A host-owned, fixed-size grid of cells.
///
/// Calls arrive in a deterministic order, one render pass at a time.
/// Writing content equal to what a cell already shows must be harmless,
/// although the engine does not issue such calls.
pub trait GridSurface {
    /// Called once when the menu opens, before any cell is written.
    fn open(&mut self, size: GridSize, title: &str) -> std::result::Result<(), HostError> {
        let _ = (size, title);
        Ok(())
    }

    fn set_cell(&mut self, position: Position, content: &CellContent) -> std::result::Result<(), HostError>;

    fn clear_cell(&mut self, position: Position) -> std::result::Result<(), HostError>;

    /// Called once when the menu closes, after its cells were cleared.
    fn close(&mut self) -> std::result::Result<(), HostError> {
        Ok(())
    }
}

impl<S: GridSurface + ?Sized> GridSurface for Box<S> {
    fn open(&mut self, size: GridSize, title: &str) -> std::result::Result<(), HostError> {
        (**self).open(size, title)
    }

    fn set_cell(&mut self, position: Position, content: &CellContent) -> std::result::Result<(), HostError> {
        (**self).set_cell(position, content)
    }

    fn clear_cell(&mut self, position: Position) -> std::result::Result<(), HostError> {
        (**self).clear_cell(position)
    }

    fn close(&mut self) -> std::result::Result<(), HostError> {
        (**self).close()
    }
}

// =============================================================================
// Events
// =============================================================================

/// Callback a menu registers with an event source.
pub type EventSink = Box<dyn FnMut(RawEvent) -> Result<DispatchOutcome>>;

/// Host subsystem delivering raw interaction events.
pub trait EventSource {
    /// Register the one sink for `menu`. Delivery stops when the
    /// subscription is cancelled or dropped.
    fn subscribe(&mut self, menu: MenuId, sink: EventSink) -> Subscription;
}

/// Cancellation token of an event subscription.
///
/// Dropping it cancels too.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F: FnOnce() + 'static>(cancel: F) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_subscription_cancels_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = Subscription::new(move || c.set(c.get() + 1));
        assert!(sub.is_active());
        sub.cancel();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_subscription_drop_cancels() {
        let count = Rc::new(Cell::new(0));
        {
            let c = count.clone();
            let _sub = Subscription::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 1, "drop must cancel");
        assert!(!Subscription::detached().is_active());
    }
}
