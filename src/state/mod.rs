//! State Module - Per-instance state and render scheduling
//!
//! This module contains the two runtime pieces that make menus reactive:
//!
//! - **Cell** - `State<T>` handles owned by one component instance, plus the
//!   hook storage that keeps them stable across renders
//! - **Scheduler** - the per-menu `Idle -> RenderRequested -> Rendering`
//!   state machine that coalesces render requests

mod cell;
mod scheduler;

pub use cell::*;
pub use scheduler::*;
