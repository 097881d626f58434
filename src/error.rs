//! Error types.
//!
//! Two layers:
//! - [`HostError`] - what a host surface reports when it rejects a mutation.
//! - [`MenuError`] - everything the engine surfaces at its API boundary
//!   (`Menu::open`, `Menu::dispatch`, `Menu::flush`, `Menu::close`, state writes).
//!
//! Stale writes (a state cell whose instance was already unmounted) and
//! events on unmapped cells are deliberately NOT errors.

use thiserror::Error;

use crate::engine::Key;
use crate::types::{GridSize, Position};

/// Result alias used across the crate.
pub type Result<T, E = MenuError> = std::result::Result<T, E>;

// =============================================================================
// Host boundary
// =============================================================================

/// A grid mutation rejected by the host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host refused to write a cell (e.g. invalid slot, locked inventory).
    #[error("host rejected cell {position:?}: {reason}")]
    Rejected { position: Position, reason: String },

    /// The host's output channel failed.
    #[error("host i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Engine errors
// =============================================================================

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum MenuError {
    /// Two siblings declared the same explicit key.
    #[error("duplicate key {key} among children of `{parent}`")]
    DuplicateKey { key: Key, parent: String },

    /// A state cell was written before its owning instance was ever mounted
    /// (its render pass failed or has not committed yet).
    #[error("state cell written before its component was mounted")]
    NotMounted,

    /// A render pass was requested from inside a render pass.
    #[error("render pass requested while a render pass is already running")]
    ReentrantRender,

    /// A render function declared its state cells in a different order or
    /// with a different type than in the previous pass.
    #[error("state hook {hook} changed type between renders (expected {expected})")]
    HookMismatch { hook: String, expected: &'static str },

    /// A state cell was written while its value was borrowed, e.g. from
    /// inside [`State::with`](crate::State::with).
    #[error("state cell written while its value is being read")]
    StateBorrowed,

    /// A leaf was placed outside the grid.
    #[error("leaf at {position:?} lies outside the {}x{} grid", size.width, size.height)]
    OutOfBounds { position: Position, size: GridSize },

    /// Render passes kept requesting further passes.
    #[error("gave up after {passes} consecutive render passes; a render or mount callback writes state every pass")]
    RenderLoop { passes: u32 },

    /// The host rejected a mutation; the pass stopped after `applied` mutations.
    #[error("render pass failed after {applied} applied mutations: {source}")]
    Host {
        applied: usize,
        #[source]
        source: HostError,
    },

    /// The operation needs an open menu.
    #[error("menu is closed")]
    Closed,
}

// =============================================================================
// Mask parsing
// =============================================================================

/// A mask description that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("mask has no rows")]
    Empty,

    #[error("mask row {row} has {found} columns, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("mask row {row} column {column}: expected '0' or '1', found {found:?}")]
    InvalidChar { row: usize, column: usize, found: char },
}

impl MenuError {
    /// True for errors that indicate misuse of the declarative contract
    /// (fail fast, never retried).
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey { .. }
                | Self::NotMounted
                | Self::ReentrantRender
                | Self::HookMismatch { .. }
                | Self::StateBorrowed
                | Self::OutOfBounds { .. }
                | Self::RenderLoop { .. }
        )
    }
}
