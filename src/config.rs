//! Menu configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::GridSize;

/// Settings fixed when a menu opens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MenuConfig {
    /// Grid dimensions. Immutable for the menu's lifetime.
    pub size: GridSize,
    /// Title handed to the host when the surface opens.
    pub title: String,
    /// Passes one flush may run before giving up with `RenderLoop`.
    pub max_passes_per_flush: u32,
    /// Run pending passes at the end of every dispatch.
    pub auto_flush: bool,
    /// Clear every occupied cell on close.
    pub clear_on_close: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            size: GridSize::chest(3),
            title: String::new(),
            max_passes_per_flush: 16,
            auto_flush: true,
            clear_on_close: true,
        }
    }
}

impl MenuConfig {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_max_passes(mut self, passes: u32) -> Self {
        self.max_passes_per_flush = passes.max(1);
        self
    }

    pub fn with_auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }

    pub fn with_clear_on_close(mut self, enabled: bool) -> Self {
        self.clear_on_close = enabled;
        self
    }
}
