//! Render Scheduler - One render pass at a time, requests coalesced.
//!
//! State machine per menu:
//!
//! ```text
//!          request_render()            begin_pass()
//!   Idle ------------------> Requested -------------> Rendering
//!    ^                                                   |
//!    |              finish_pass(), no write during pass  |
//!    +---------------------------------------------------+
//!                   finish_pass(), rerun flagged -> Requested
//! ```
//!
//! - A request while `Requested` is a no-op (coalesced).
//! - A request while `Rendering` flags a rerun: exactly one more pass runs
//!   after the current one, so no write is lost.
//! - `begin_pass` while `Rendering` fails with [`MenuError::ReentrantRender`];
//!   two passes for one menu can never overlap.
//! - After `close`, every request is ignored.
//!
//! Everything is `Cell`-based so state writes can request renders while the
//! menu itself is borrowed by an in-flight pass.

use std::cell::Cell;

use crate::error::{MenuError, Result};

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RenderRequested,
    Rendering,
}

/// Render scheduler for one menu.
#[derive(Debug)]
pub struct Scheduler {
    phase: Cell<Phase>,
    rerun: Cell<bool>,
    open: Cell<bool>,
    passes: Cell<u64>,
    coalesced: Cell<u64>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            phase: Cell::new(Phase::Idle),
            rerun: Cell::new(false),
            open: Cell::new(true),
            passes: Cell::new(0),
            coalesced: Cell::new(0),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// True while a request waits for the next pass.
    pub fn is_pending(&self) -> bool {
        self.phase.get() == Phase::RenderRequested
    }

    /// True while a pass is running.
    pub fn is_rendering(&self) -> bool {
        self.phase.get() == Phase::Rendering
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Number of passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes.get()
    }

    /// Number of requests absorbed by an already pending or running pass.
    pub fn coalesced(&self) -> u64 {
        self.coalesced.get()
    }

    /// Ask for a render pass.
    ///
    /// Returns true if this call scheduled a new pass.
    pub fn request_render(&self) -> bool {
        if !self.open.get() {
            log::trace!("render request ignored: menu closed");
            return false;
        }
        match self.phase.get() {
            Phase::Idle => {
                self.phase.set(Phase::RenderRequested);
                true
            }
            Phase::RenderRequested => {
                self.coalesced.set(self.coalesced.get() + 1);
                log::trace!("render request coalesced into pending pass");
                false
            }
            Phase::Rendering => {
                self.coalesced.set(self.coalesced.get() + 1);
                self.rerun.set(true);
                log::trace!("render requested during pass; queued one more");
                false
            }
        }
    }

    /// Enter `Rendering`. Returns the 1-based pass number.
    pub fn begin_pass(&self) -> Result<u64> {
        if self.phase.get() == Phase::Rendering {
            return Err(MenuError::ReentrantRender);
        }
        if !self.open.get() {
            return Err(MenuError::Closed);
        }
        self.phase.set(Phase::Rendering);
        self.rerun.set(false);
        let pass = self.passes.get() + 1;
        self.passes.set(pass);
        Ok(pass)
    }

    /// Leave `Rendering`, successful or not.
    ///
    /// Returns true if a write during the pass queued another one.
    pub fn finish_pass(&self) -> bool {
        let again = self.rerun.replace(false) && self.open.get();
        self.phase.set(if again {
            Phase::RenderRequested
        } else {
            Phase::Idle
        });
        again
    }

    /// Drop any pending request.
    pub fn cancel(&self) {
        self.rerun.set(false);
        if self.phase.get() == Phase::RenderRequested {
            self.phase.set(Phase::Idle);
        }
    }

    /// Stop accepting requests for good.
    pub fn close(&self) {
        self.open.set(false);
        self.cancel();
    }
}

// =============================================================================
// Tests
// =============================================================================
