//! Event Router - raw host events to the handler that owns the cell.
//!
//! A [`HitMap`] built by each committed pass answers "which leaf occupies
//! this cell". Dispatch then:
//!
//! 1. Resolves the target: slot indices become positions, positions outside
//!    the grid become `Outside`, and a drag over exactly one cell becomes a
//!    click on it (even distribution = left, otherwise right).
//! 2. Looks the position up. No leaf there: the event is dropped (decorative
//!    host content is legitimate, this is not an error).
//! 3. Calls the leaf's handler if it accepts the action kind; otherwise
//!    bubbles through the owning instances (parent lookup table) to the
//!    first `on_event` handler that accepts it. First handler found stops
//!    propagation.
//!
//! # Example
//!
//! ```ignore
//! menu.dispatch(RawEvent::slot(13, ActionKind::Left))?;
//! menu.dispatch(RawEvent::cell((4, 1), ActionKind::ShiftRight))?;
//! ```

use smallvec::SmallVec;

use super::menu::MenuHandle;
use super::reconcile::RenderReport;
use crate::engine::{InstanceId, Registry};
use crate::error::Result;
use crate::primitives::Handler;
use crate::types::{ActionKind, GridSize, Position};

// =============================================================================
// TYPES
// =============================================================================

/// Where a raw event points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTarget {
    /// A cell by coordinate.
    Cell(Position),
    /// A cell by flat slot index (row-major).
    Slot(usize),
    /// Outside the menu grid.
    Outside,
    /// A drag distributing items over several cells.
    Drag { cells: Vec<Position>, even: bool },
}

/// An interaction reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub target: EventTarget,
    pub action: ActionKind,
}

impl RawEvent {
    pub fn cell(position: impl Into<Position>, action: ActionKind) -> Self {
        Self {
            target: EventTarget::Cell(position.into()),
            action,
        }
    }

    pub fn slot(index: usize, action: ActionKind) -> Self {
        Self {
            target: EventTarget::Slot(index),
            action,
        }
    }

    pub fn outside(action: ActionKind) -> Self {
        Self {
            target: EventTarget::Outside,
            action,
        }
    }

    /// A drag over `cells`. `even` is true when items were split evenly.
    pub fn drag(cells: Vec<Position>, even: bool) -> Self {
        Self {
            target: EventTarget::Drag { cells, even },
            action: ActionKind::Drop,
        }
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// A handler or menu callback ran.
    pub handled: bool,
    /// Report of the pass the dispatch flushed, if any.
    pub report: Option<RenderReport>,
}

/// Event target after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Cell(Position),
    Outside,
    Drag(Vec<Position>),
}

/// Normalize an event against the grid size.
pub(crate) fn resolve(event: &RawEvent, size: GridSize) -> (Route, ActionKind) {
    let cell = |position: Position| {
        if size.contains(position) {
            Route::Cell(position)
        } else {
            Route::Outside
        }
    };

    match &event.target {
        EventTarget::Cell(position) => (cell(*position), event.action),
        EventTarget::Slot(index) if *index < size.cell_count() => {
            (Route::Cell(Position::from_index(*index, size.width)), event.action)
        }
        EventTarget::Slot(_) | EventTarget::Outside => (Route::Outside, event.action),
        EventTarget::Drag { cells, even } if cells.len() == 1 => {
            let action = if *even { ActionKind::Left } else { ActionKind::Right };
            (cell(cells[0]), action)
        }
        EventTarget::Drag { cells, .. } => (Route::Drag(cells.clone()), event.action),
    }
}

// =============================================================================
// EVENT CONTEXT
// =============================================================================

/// What a handler sees.
pub struct EventContext<'a> {
    event: &'a RawEvent,
    position: Option<Position>,
    action: ActionKind,
    owner: Option<InstanceId>,
    handle: &'a MenuHandle,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(
        event: &'a RawEvent,
        position: Option<Position>,
        action: ActionKind,
        owner: Option<InstanceId>,
        handle: &'a MenuHandle,
    ) -> Self {
        Self {
            event,
            position,
            action,
            owner,
            handle,
        }
    }

    /// The event as the host reported it.
    pub fn event(&self) -> &RawEvent {
        self.event
    }

    /// Target cell, if the event hit the grid.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Action kind after drag translation.
    pub fn action(&self) -> ActionKind {
        self.action
    }

    /// Instance owning the handled leaf, or the bubbling instance.
    pub fn owner(&self) -> Option<InstanceId> {
        self.owner
    }

    /// Cells of a multi-cell drag.
    pub fn drag_cells(&self) -> &[Position] {
        match &self.event.target {
            EventTarget::Drag { cells, .. } => cells,
            _ => &[],
        }
    }

    pub fn handle(&self) -> &MenuHandle {
        self.handle
    }

    /// Close the menu once this handler returns.
    pub fn close(&self) -> Result<()> {
        self.handle.close()
    }
}

// =============================================================================
// HIT MAP - O(1) cell to leaf lookup
// =============================================================================

/// What occupies one cell after the last committed pass.
#[derive(Debug, Clone)]
pub struct HitTarget {
    /// Instance that rendered the leaf.
    pub owner: Option<InstanceId>,
    pub handler: Option<Handler>,
}

/// Cell to leaf lookup for one menu grid.
#[derive(Debug, Clone)]
pub struct HitMap {
    size: GridSize,
    cells: Vec<Option<HitTarget>>,
}

impl HitMap {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cell_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Clear all cells.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Occupy a cell. Out-of-bounds positions are ignored.
    pub fn set(&mut self, position: Position, target: HitTarget) {
        if let Some(i) = self.size.index_of(position) {
            self.cells[i] = Some(target);
        }
    }

    pub fn get(&self, position: Position) -> Option<&HitTarget> {
        self.size.index_of(position).and_then(|i| self.cells[i].as_ref())
    }

    /// Handlers an event at `position` may reach, in bubbling order:
    /// the leaf's own handler, then each owning instance's `on_event`
    /// handler from the innermost outwards.
    pub(crate) fn candidates(
        &self,
        position: Position,
        registry: &Registry,
    ) -> Option<SmallVec<[(Option<InstanceId>, Handler); 4]>> {
        let hit = self.get(position)?;
        let mut chain = SmallVec::new();
        if let Some(handler) = &hit.handler {
            chain.push((hit.owner, handler.clone()));
        }
        if let Some(owner) = hit.owner {
            for id in registry.chain(owner) {
                if let Some(handler) = registry.get(id).and_then(|i| i.handler.as_ref()) {
                    chain.push((Some(id), handler.clone()));
                }
            }
        }
        Some(chain)
    }
}

// =============================================================================
// TESTS
// =============================================================================
