//! In-memory host - a grid surface and an event source with no device.
//!
//! Both are cheap clonable handles: give one clone to the menu and keep
//! another to inspect calls or push events. Used by tests, and by hosts
//! that render the grid themselves from a snapshot.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use super::diff::{GridFrame, GridMutation};
use super::surface::{EventSink, EventSource, GridSurface, Subscription};
use crate::error::{HostError, Result};
use crate::pipeline::{DispatchOutcome, MenuId, RawEvent};
use crate::types::{CellContent, GridSize, Position};

// =============================================================================
// MemoryGrid
// =============================================================================

#[derive(Debug)]
struct GridState {
    frame: GridFrame,
    calls: Vec<GridMutation>,
    rejected: HashSet<Position>,
    title: Option<String>,
    closed: bool,
}

/// Grid surface backed by a [`GridFrame`], recording every call.
#[derive(Debug, Clone)]
pub struct MemoryGrid {
    state: Rc<RefCell<GridState>>,
}

impl MemoryGrid {
    pub fn new(size: GridSize) -> Self {
        Self {
            state: Rc::new(RefCell::new(GridState {
                frame: GridFrame::new(size),
                calls: Vec::new(),
                rejected: HashSet::new(),
                title: None,
                closed: false,
            })),
        }
    }

    /// Snapshot of the cells.
    pub fn frame(&self) -> GridFrame {
        self.state.borrow().frame.clone()
    }

    pub fn get(&self, position: Position) -> Option<CellContent> {
        self.state.borrow().frame.get(position).cloned()
    }

    /// Every successful call so far.
    pub fn calls(&self) -> Vec<GridMutation> {
        self.state.borrow().calls.clone()
    }

    /// Return and forget the recorded calls.
    pub fn take_calls(&self) -> Vec<GridMutation> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    pub fn set_calls(&self) -> usize {
        self.state.borrow().calls.iter().filter(|c| c.is_set()).count()
    }

    pub fn clear_calls(&self) -> usize {
        self.state.borrow().calls.iter().filter(|c| !c.is_set()).count()
    }

    /// Reject every later call touching `position`.
    pub fn reject_at(&self, position: Position) {
        self.state.borrow_mut().rejected.insert(position);
    }

    pub fn accept_all(&self) {
        self.state.borrow_mut().rejected.clear();
    }

    /// Title passed to `open`, if the grid was opened.
    pub fn title(&self) -> Option<String> {
        self.state.borrow().title.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    fn record(&self, mutation: GridMutation) -> std::result::Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let position = mutation.position();
        if state.rejected.contains(&position) {
            return Err(HostError::Rejected {
                position,
                reason: "rejected by test host".into(),
            });
        }
        if state.frame.size().index_of(position).is_none() {
            return Err(HostError::Rejected {
                position,
                reason: "no such slot".into(),
            });
        }
        state.frame.apply(&mutation);
        state.calls.push(mutation);
        Ok(())
    }
}

impl GridSurface for MemoryGrid {
    fn open(&mut self, _size: GridSize, title: &str) -> std::result::Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.title = Some(title.to_string());
        state.closed = false;
        Ok(())
    }

    fn set_cell(&mut self, position: Position, content: &CellContent) -> std::result::Result<(), HostError> {
        self.record(GridMutation::Set {
            position,
            content: content.clone(),
        })
    }

    fn clear_cell(&mut self, position: Position) -> std::result::Result<(), HostError> {
        self.record(GridMutation::Clear { position })
    }

    fn close(&mut self) -> std::result::Result<(), HostError> {
        self.state.borrow_mut().closed = true;
        Ok(())
    }
}

// =============================================================================
// ManualEventSource
// =============================================================================

type SharedSink = Rc<RefCell<EventSink>>;

/// Event source driven by hand: call [`deliver`](Self::deliver).
#[derive(Clone, Default)]
pub struct ManualEventSource {
    sinks: Rc<RefCell<BTreeMap<MenuId, SharedSink>>>,
}

impl ManualEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self, menu: MenuId) -> bool {
        self.sinks.borrow().contains_key(&menu)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.borrow().len()
    }

    /// Hand `event` to `menu`'s sink.
    ///
    /// `None` if nothing is subscribed for `menu`, or if its sink is
    /// already running (an event delivered from inside a handler).
    pub fn deliver(&self, menu: MenuId, event: RawEvent) -> Option<Result<DispatchOutcome>> {
        let sink = self.sinks.borrow().get(&menu).cloned()?;
        let Ok(mut sink) = sink.try_borrow_mut() else {
            log::warn!("event for {menu} dropped: delivered from inside its own handler");
            return None;
        };
        let sink = &mut *sink;
        Some(sink(event))
    }
}

impl EventSource for ManualEventSource {
    fn subscribe(&mut self, menu: MenuId, sink: EventSink) -> Subscription {
        self.sinks
            .borrow_mut()
            .insert(menu, Rc::new(RefCell::new(sink)));

        let sinks = Rc::downgrade(&self.sinks);
        Subscription::new(move || {
            if let Some(sinks) = sinks.upgrade() {
                sinks.borrow_mut().remove(&menu);
            }
        })
    }
}
