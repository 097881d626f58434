//! Render pipeline
//!
//! Connects component render output to the host grid and host events back
//! to handlers.
//!
//! # Pipeline Architecture
//!
//! ```text
//! event → router → handler → State::set → scheduler → reconcile → diff → host
//! ```
//!
//! ## Data Flow
//!
//! 1. **router** - resolves a raw event to the leaf occupying the cell and
//!    runs its handler (bubbling to ancestors that declared `on_event`)
//! 2. **scheduler** - state writes coalesce into one pending root render
//! 3. **reconcile** - renders the tree, pairs children by identity, stages
//!    mounts and unmounts
//! 4. **diff** - compares the desired frame with the host mirror and emits
//!    the minimal `set_cell` / `clear_cell` calls
//!
//! ## Key Design Principles
//!
//! - **Two-phase passes**: nothing is committed until the host accepted
//!   every mutation; a failed pass leaves the previous tree in place
//! - **Explicit context**: render functions get their instance through
//!   `RenderContext`, never through ambient globals
//! - **Single thread**: a menu and its handles are `!Send`

mod menu;
mod reconcile;
mod router;

pub use menu::{Menu, MenuHandle, MenuId, MenuStats};
pub use reconcile::RenderReport;
pub use router::{DispatchOutcome, EventContext, EventTarget, HitMap, HitTarget, RawEvent};
