//! Menu Primitives - Component building blocks.
//!
//! This module provides what render functions are written with:
//! - [`Node`], [`Leaf`], [`Composite`] - the tree a render function returns
//! - [`Component`] and [`Props`] - reusable definitions and their inputs
//! - [`RenderContext`] - state cells and lifecycle declarations
//! - [`pane`], [`StaticPane`], [`flow_with`], [`paginated`] - built-in positioning composites
//! - [`layered`] - drawing order of overlapping panes by [`Priority`]
//!
//! # Architecture
//!
//! Components are plain values: a type tag and a render function. They
//! hold no state. State lives in the instance the reconciler mounts for
//! each position in the tree, and reaches the render function through the
//! context:
//!
//! ```ignore
//! let counter = Component::new("counter", |ctx| {
//!     let clicks = ctx.use_state(|| 0u8)?;
//!     let shown = clicks.get().max(1);
//!     Ok(vec![Leaf::new((4, 1), CellContent::new("emerald").amount(shown))
//!         .on_click(move |_| clicks.update(|n| *n = n.saturating_add(1)))
//!         .into()])
//! });
//! ```

mod context;
mod panes;
mod types;

pub use context::RenderContext;
pub(crate) use context::Effects;
pub use panes::*;
pub use types::*;
