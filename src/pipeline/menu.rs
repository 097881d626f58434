//! Menu - one open, live UI session bound to a fixed-size grid.
//!
//! A [`Menu`] owns the component tree, the render scheduler and the host
//! surface. Everything runs on the caller's thread:
//!
//! - [`Menu::dispatch`] routes one host event to its handler, then drains
//!   the scheduler (when `auto_flush` is on)
//! - [`Menu::flush`] runs pending render passes until the tree is stable
//! - [`Menu::close`] cancels pending work, unmounts every instance and
//!   clears the host grid
//!
//! Handlers and callbacks never get `&Menu`. They get a [`MenuHandle`], a
//! weak reference that can request renders, dispatch, or close. Requests
//! made while the menu is busy (inside a dispatch or a pass) are deferred
//! until the outermost call returns.
//!
//! # Example
//!
//! ```ignore
//! use spark_menu::prelude::*;
//!
//! let counter = Component::new("counter", |ctx| {
//!     let count = ctx.use_state(|| 1u8)?;
//!     let shown = count.get();
//!     Ok(vec![Leaf::new((4, 1), CellContent::new("gold_nugget").amount(shown))
//!         .on_click(move |_| count.set(shown + 1))
//!         .into()])
//! });
//!
//! let host = MemoryGrid::new(GridSize::chest(3));
//! let menu = Menu::open(counter.node(), MenuConfig::default(), host.clone())?;
//! menu.dispatch(RawEvent::slot(13, ActionKind::Left))?;
//! assert_eq!(host.get(Position::new(4, 1)).map(|c| c.amount), Some(2));
//! menu.close()?;
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::reconcile::{Reconciler, RenderReport};
use super::router::{resolve, DispatchOutcome, EventContext, HitMap, RawEvent, Route};
use crate::config::MenuConfig;
use crate::engine::{ChildRecord, Registry};
use crate::error::{MenuError, Result};
use crate::primitives::{EventCallback, Node};
use crate::renderer::{DiffRenderer, EventSource, GridSurface, Subscription};
use crate::state::Scheduler;

// =============================================================================
// Menu id
// =============================================================================

static NEXT_MENU_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an opened menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MenuId(u64);

impl MenuId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_MENU_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

// =============================================================================
// Stats
// =============================================================================

/// Counters of one menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuStats {
    /// Render passes started, committed or not.
    pub passes: u64,
    /// Render requests absorbed by an already pending pass.
    pub coalesced: u64,
    /// Live component instances.
    pub instances: usize,
    /// Cells the host currently shows.
    pub occupied: usize,
    /// Report of the last committed pass.
    pub last: Option<RenderReport>,
}

// =============================================================================
// Shared state
// =============================================================================

type CloseCallback = Box<dyn FnOnce() -> Result<()>>;

#[derive(Default)]
struct MenuCallbacks {
    global_click: Option<EventCallback>,
    outside_click: Option<EventCallback>,
    drag: Option<EventCallback>,
    close: Option<CloseCallback>,
}

/// What a pass borrows mutably.
struct MenuInner {
    root: Node,
    root_children: Vec<ChildRecord>,
    registry: Registry,
    renderer: DiffRenderer,
    hits: HitMap,
    surface: Box<dyn GridSurface>,
}

struct MenuShared {
    id: MenuId,
    config: MenuConfig,
    scheduler: Rc<Scheduler>,
    handle: MenuHandle,
    /// Depth of dispatches and flushes on the stack.
    busy: Cell<u32>,
    close_requested: Cell<bool>,
    closed: Cell<bool>,
    last_report: Cell<Option<RenderReport>>,
    inner: RefCell<MenuInner>,
    callbacks: RefCell<MenuCallbacks>,
    subscription: RefCell<Option<Subscription>>,
}

/// Marks the menu busy for the guard's lifetime.
struct Busy<'a>(&'a Cell<u32>);

impl<'a> Busy<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl MenuShared {
    fn is_idle(&self) -> bool {
        self.busy.get() == 0 && !self.scheduler.is_rendering()
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn flush(&self) -> Result<Option<RenderReport>> {
        if self.closed.get() {
            return Ok(None);
        }
        if self.scheduler.is_rendering() {
            return Err(MenuError::ReentrantRender);
        }
        if self.busy.get() > 0 {
            // The outermost dispatch or flush drains the scheduler.
            return Ok(None);
        }

        let result = {
            let _busy = Busy::enter(&self.busy);
            self.drain()
        };

        if self.close_requested.get() {
            self.close()?;
        }
        result
    }

    fn drain(&self) -> Result<Option<RenderReport>> {
        let limit = self.config.max_passes_per_flush.max(1);
        let mut passes = 0;
        let mut last = None;

        while self.scheduler.is_pending() && !self.closed.get() {
            if passes == limit {
                self.scheduler.cancel();
                log::warn!("{}: render did not settle after {passes} passes", self.id);
                return Err(MenuError::RenderLoop { passes });
            }
            passes += 1;
            last = Some(self.run_pass()?);
        }
        Ok(last)
    }

    /// One pass: render, diff, apply, commit, then run lifecycle callbacks.
    fn run_pass(&self) -> Result<RenderReport> {
        let pass = self.scheduler.begin_pass()?;
        log::debug!("{}: render pass {pass} started", self.id);

        let scheduler = Rc::downgrade(&self.scheduler);
        let outcome = match self.inner.try_borrow_mut() {
            Ok(mut inner) => {
                let inner = &mut *inner;
                let rendered = Reconciler::new(&mut inner.registry, self.config.size, &scheduler, &self.handle)
                    .render(&inner.root, &inner.root_children);
                match rendered {
                    Ok(tree) => {
                        let mutations = inner.renderer.plan(&tree.frame, &tree.order);
                        match inner.renderer.apply(&mutations, &mut inner.surface) {
                            Ok(applied) => {
                                let committed = tree.lifecycle.commit(&mut inner.registry);
                                inner.root_children = tree.root;
                                inner.hits = tree.hits;
                                Ok((applied, committed))
                            }
                            Err(err) => {
                                tree.lifecycle.discard(&mut inner.registry);
                                Err(err)
                            }
                        }
                    }
                    Err(err) => Err(err),
                }
            }
            Err(_) => Err(MenuError::ReentrantRender),
        };
        self.scheduler.finish_pass();

        let (mutations, committed) = outcome.inspect_err(|err| {
            log::debug!("{}: render pass {pass} failed: {err}", self.id);
        })?;

        let report = RenderReport {
            pass,
            mutations,
            mounted: committed.mounted,
            updated: committed.updated,
            unmounted: committed.unmounted,
        };
        self.last_report.set(Some(report));
        log::debug!(
            "{}: render pass {pass} committed: {mutations} mutations, {} mounted, {} updated, {} unmounted",
            self.id,
            report.mounted,
            report.updated,
            report.unmounted
        );

        for callback in committed.unmount_callbacks {
            callback();
        }
        let mut first_error = None;
        for callback in committed.mount_callbacks {
            if let Err(err) = callback() {
                log::warn!("{}: mount callback failed: {err}", self.id);
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    fn dispatch(&self, event: RawEvent) -> Result<DispatchOutcome> {
        if self.closed.get() {
            return Err(MenuError::Closed);
        }

        let routed = {
            let _busy = Busy::enter(&self.busy);
            self.route(&event)
        };

        if self.close_requested.get() && self.is_idle() {
            self.close()?;
            return routed.map(|handled| DispatchOutcome { handled, report: None });
        }

        let handled = routed?;
        let report = if self.config.auto_flush && self.busy.get() == 0 {
            self.flush()?
        } else {
            None
        };
        Ok(DispatchOutcome { handled, report })
    }

    fn route(&self, event: &RawEvent) -> Result<bool> {
        let (route, action) = resolve(event, self.config.size);
        let (global, outside, drag) = {
            let callbacks = self.callbacks.borrow();
            (
                callbacks.global_click.clone(),
                callbacks.outside_click.clone(),
                callbacks.drag.clone(),
            )
        };
        let position = match route {
            Route::Cell(position) => Some(position),
            Route::Outside | Route::Drag(_) => None,
        };

        let mut handled = false;
        if let Some(global) = global {
            global(&mut EventContext::new(event, position, action, None, &self.handle))?;
            handled = true;
        }

        let callback = match route {
            Route::Outside => outside,
            Route::Drag(_) => drag,
            Route::Cell(position) => {
                let candidates = {
                    let inner = self.inner.try_borrow().map_err(|_| MenuError::ReentrantRender)?;
                    inner.hits.candidates(position, &inner.registry)
                };
                let Some(candidates) = candidates else {
                    log::trace!("{}: no leaf at {position:?}, event dropped", self.id);
                    return Ok(handled);
                };
                let Some((owner, handler)) = candidates.into_iter().find(|(_, h)| h.accepts(action)) else {
                    log::trace!("{}: no handler for {action:?} at {position:?}", self.id);
                    return Ok(handled);
                };
                (handler.callback)(&mut EventContext::new(event, position.into(), action, owner, &self.handle))?;
                return Ok(true);
            }
        };

        match callback {
            Some(callback) => {
                callback(&mut EventContext::new(event, None, action, None, &self.handle))?;
                Ok(true)
            }
            None => {
                log::trace!("{}: unhandled {action:?} outside the grid", self.id);
                Ok(handled)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    fn close(&self) -> Result<()> {
        if self.closed.get() {
            return Ok(());
        }
        if !self.is_idle() {
            self.close_requested.set(true);
            return Ok(());
        }

        self.closed.set(true);
        self.close_requested.set(false);
        self.scheduler.close();
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.cancel();
        }
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());

        let mut result = match callbacks.close {
            Some(on_close) => on_close(),
            None => Ok(()),
        };

        let released = {
            let mut guard = self.inner.try_borrow_mut().map_err(|_| MenuError::ReentrantRender)?;
            let inner = &mut *guard;
            let released = inner.registry.release_all();
            inner.root_children.clear();
            inner.hits.clear();

            if self.config.clear_on_close {
                if let Err(err) = inner.renderer.clear_all(&mut inner.surface) {
                    log::warn!("{}: clearing the grid on close failed: {err}", self.id);
                    result = result.and(Err(err));
                }
            }
            if let Err(source) = inner.surface.close() {
                log::warn!("{}: host failed to close: {source}", self.id);
                result = result.and(Err(MenuError::Host { applied: 0, source }));
            }
            released
        };

        for callback in released.callbacks {
            callback();
        }
        log::debug!("{}: closed, {} instances unmounted", self.id, released.count);
        result
    }
}

// =============================================================================
// Menu Handle
// =============================================================================

/// Weak handle to a menu, for handlers and callbacks.
///
/// Every operation on a handle whose menu is gone behaves like the menu
/// being closed.
#[derive(Clone, Default)]
pub struct MenuHandle {
    shared: Weak<MenuShared>,
}

impl MenuHandle {
    /// A handle bound to no menu.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<MenuId> {
        self.shared.upgrade().map(|shared| shared.id)
    }

    pub fn is_open(&self) -> bool {
        self.shared.upgrade().is_some_and(|shared| !shared.closed.get())
    }

    /// Ask for a render pass without writing state.
    pub fn request_render(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.scheduler.request_render())
    }

    /// Close the menu. Inside a dispatch or a pass, the teardown runs once
    /// the outermost call returns.
    pub fn close(&self) -> Result<()> {
        match self.shared.upgrade() {
            Some(shared) => shared.close(),
            None => Ok(()),
        }
    }

    /// Run pending passes. Deferred (returns `Ok(None)`) inside a dispatch.
    pub fn flush(&self) -> Result<Option<RenderReport>> {
        match self.shared.upgrade() {
            Some(shared) => shared.flush(),
            None => Ok(None),
        }
    }

    pub fn dispatch(&self, event: RawEvent) -> Result<DispatchOutcome> {
        match self.shared.upgrade() {
            Some(shared) => shared.dispatch(event),
            None => Err(MenuError::Closed),
        }
    }
}

impl fmt::Debug for MenuHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuHandle")
            .field("id", &self.id())
            .field("open", &self.is_open())
            .finish()
    }
}

// =============================================================================
// Menu
// =============================================================================

/// An open menu. Dropping it closes the menu.
pub struct Menu {
    shared: Rc<MenuShared>,
}

impl Menu {
    /// Open a menu rendering `root` into `surface`, and run the first pass.
    ///
    /// If the first pass fails the menu is torn down and the error returned.
    pub fn open<S>(root: impl Into<Node>, config: MenuConfig, surface: S) -> Result<Self>
    where
        S: GridSurface + 'static,
    {
        let mut surface: Box<dyn GridSurface> = Box::new(surface);
        surface
            .open(config.size, &config.title)
            .map_err(|source| MenuError::Host { applied: 0, source })?;

        let id = MenuId::next();
        let size = config.size;
        let shared = Rc::new_cyclic(|weak| MenuShared {
            id,
            scheduler: Rc::new(Scheduler::new()),
            handle: MenuHandle { shared: weak.clone() },
            busy: Cell::new(0),
            close_requested: Cell::new(false),
            closed: Cell::new(false),
            last_report: Cell::new(None),
            inner: RefCell::new(MenuInner {
                root: root.into(),
                root_children: Vec::new(),
                registry: Registry::new(),
                renderer: DiffRenderer::new(size),
                hits: HitMap::new(size),
                surface,
            }),
            callbacks: RefCell::new(MenuCallbacks::default()),
            subscription: RefCell::new(None),
            config,
        });
        log::debug!("{id}: opened {}x{} grid", size.width, size.height);

        let menu = Self { shared };
        menu.shared.scheduler.request_render();
        if let Err(err) = menu.flush() {
            if let Err(close_err) = menu.close() {
                log::warn!("{id}: teardown after failed first pass: {close_err}");
            }
            return Err(err);
        }
        Ok(menu)
    }

    pub fn id(&self) -> MenuId {
        self.shared.id
    }

    pub fn config(&self) -> &MenuConfig {
        &self.shared.config
    }

    pub fn is_open(&self) -> bool {
        !self.shared.closed.get()
    }

    pub fn handle(&self) -> MenuHandle {
        self.shared.handle.clone()
    }

    /// Register this menu's sink with `source`.
    ///
    /// Replaces any earlier subscription. Cancelled on close.
    pub fn subscribe<E: EventSource + ?Sized>(&self, source: &mut E) -> Result<()> {
        if self.shared.closed.get() {
            return Err(MenuError::Closed);
        }
        let handle = self.handle();
        let subscription = source.subscribe(self.id(), Box::new(move |event| handle.dispatch(event)));
        if let Some(previous) = self.shared.subscription.borrow_mut().replace(subscription) {
            previous.cancel();
        }
        Ok(())
    }

    /// Route one host event. See [`MenuHandle::dispatch`].
    pub fn dispatch(&self, event: RawEvent) -> Result<DispatchOutcome> {
        self.shared.dispatch(event)
    }

    /// Run pending passes until nothing is pending.
    ///
    /// Returns the report of the last pass, `None` if nothing was pending.
    pub fn flush(&self) -> Result<Option<RenderReport>> {
        self.shared.flush()
    }

    /// Tear the menu down. Idempotent.
    pub fn close(&self) -> Result<()> {
        self.shared.close()
    }

    pub fn stats(&self) -> MenuStats {
        let (instances, occupied) = self
            .shared
            .inner
            .try_borrow()
            .map(|inner| (inner.registry.len(), inner.renderer.previous().occupied_count()))
            .unwrap_or_default();
        MenuStats {
            passes: self.shared.scheduler.passes(),
            coalesced: self.shared.scheduler.coalesced(),
            instances,
            occupied,
            last: self.shared.last_report.get(),
        }
    }

    // -------------------------------------------------------------------------
    // Menu-level callbacks
    // -------------------------------------------------------------------------

    /// Runs for every event, before any leaf handler.
    pub fn on_global_click<F>(&self, callback: F)
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + 'static,
    {
        self.shared.callbacks.borrow_mut().global_click = Some(Rc::new(callback));
    }

    /// Runs for events outside the grid.
    pub fn on_outside_click<F>(&self, callback: F)
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + 'static,
    {
        self.shared.callbacks.borrow_mut().outside_click = Some(Rc::new(callback));
    }

    /// Runs for drags over more than one cell.
    pub fn on_drag<F>(&self, callback: F)
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + 'static,
    {
        self.shared.callbacks.borrow_mut().drag = Some(Rc::new(callback));
    }

    /// Runs once on close, before instances are unmounted.
    pub fn on_close<F>(&self, callback: F)
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        self.shared.callbacks.borrow_mut().close = Some(Box::new(callback));
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.shared.id)
            .field("open", &self.is_open())
            .field("phase", &self.shared.scheduler.phase())
            .finish()
    }
}

impl Drop for Menu {
    fn drop(&mut self) {
        if let Err(err) = self.shared.close() {
            log::warn!("{}: close on drop failed: {err}", self.shared.id);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
