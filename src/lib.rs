//! # spark-menu
//!
//! Reactive grid menus for Rust.
//!
//! Menus are declared as a tree of components. Each component renders from
//! its props and its own state cells; writing a state cell re-renders the
//! tree and the engine issues only the cell changes the host needs.
//!
//! ## Architecture
//!
//! ```text
//! host event → router → handler → State::set → scheduler
//!                                                  ↓
//!            host grid ← diff ← reconcile ← render root
//! ```
//!
//! Everything is single-threaded and explicit: a render function gets its
//! instance, props and hook storage through a [`RenderContext`]; there is
//! no global "current component".
//!
//! ## Modules
//!
//! - [`types`] - Positions, grid sizes, cell content, action kinds
//! - [`engine`] - Keys, identity pairing, instance registry
//! - [`state`] - State cells and the render scheduler
//! - [`primitives`] - Components, nodes, render context, built-in panes
//! - [`pipeline`] - Reconciler, event router, the menu lifecycle
//! - [`renderer`] - Host boundary, grid diff, in-memory and terminal hosts
//!
//! ## Example
//!
//! ```ignore
//! use spark_menu::prelude::*;
//!
//! let shop = Component::new("shop", |ctx| {
//!     let bought = ctx.use_state(|| 0u8)?;
//!     let count = bought.get();
//!     Ok(vec![
//!         Leaf::new((4, 1), CellContent::new("diamond").amount(count.max(1)))
//!             .on_click(move |_| bought.set(count + 1))
//!             .into(),
//!     ])
//! });
//!
//! let host = MemoryGrid::new(GridSize::chest(3));
//! let menu = Menu::open(shop.node(), MenuConfig::default().with_title("Shop"), host)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::MenuConfig;

pub use error::{HostError, MaskError, MenuError, Result};

pub use engine::{InstanceId, Key, NodeKind};

pub use state::{MountStatus, Phase, State};

pub use primitives::{
    flow, flow_cells, flow_masked, flow_with, layered, page_count, pane, paginated, transform_cell,
    Alignment, Component, Composite, Flip, FlowOptions, Handler, Leaf, Mask, Node, Orientation,
    PageControls, Priority, PropValue, Props, RenderContext, Rotation, StaticPane,
};

pub use pipeline::{
    DispatchOutcome, EventContext, EventTarget, Menu, MenuHandle, MenuId, MenuStats, RawEvent,
    RenderReport,
};

pub use renderer::{
    DiffRenderer, EventSource, GridFrame, GridMutation, GridSurface, ManualEventSource,
    MemoryGrid, Subscription,
};

/// Everything a menu definition usually needs.
pub mod prelude {
    pub use crate::config::MenuConfig;
    pub use crate::error::{MenuError, Result};
    pub use crate::pipeline::{DispatchOutcome, EventContext, Menu, MenuHandle, RawEvent};
    pub use crate::primitives::{
        flow, flow_masked, flow_with, layered, pane, paginated, Alignment, Component, Flip, FlowOptions, Leaf,
        Mask, Node, Orientation, PageControls, Priority, Props, RenderContext, Rotation, StaticPane,
    };
    pub use crate::renderer::{GridSurface, ManualEventSource, MemoryGrid};
    pub use crate::state::State;
    pub use crate::types::{ActionKind, ActionMask, CellContent, GridSize, ItemFlags, Position, Rect};
}
