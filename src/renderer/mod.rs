//! Renderer - The host boundary and the grid diff.
//!
//! - [`GridSurface`] / [`EventSource`] - what a host implements
//! - [`DiffRenderer`] - mirror of the host grid, minimal mutations
//! - [`MemoryGrid`] / [`ManualEventSource`] - in-memory host
//! - `TerminalGrid` - crossterm host (feature `terminal`)

mod diff;
mod memory;
mod surface;
#[cfg(feature = "terminal")]
pub mod terminal;

pub use diff::{DiffRenderer, GridFrame, GridMutation};
pub use memory::{ManualEventSource, MemoryGrid};
pub use surface::{EventSink, EventSource, GridSurface, Subscription};
#[cfg(feature = "terminal")]
pub use terminal::{ScreenMapper, TerminalGrid, TerminalInput};
