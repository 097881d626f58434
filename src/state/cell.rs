//! State Cells - Observable values owned by one component instance.
//!
//! A [`State<T>`] is created from inside a render function through
//! `RenderContext::use_state`. The same declaration (by order, or by key)
//! returns a handle to the same value on every later render of that
//! instance.
//!
//! # Write policy
//!
//! What a write does depends on the owner's [`MountStatus`]:
//!
//! | owner      | write                                          |
//! |------------|------------------------------------------------|
//! | `Pending`  | `Err(MenuError::NotMounted)`                   |
//! | `Mounted`  | store the value, request a root render         |
//! | `Released` | no-op (stale handler after unmount or close)   |
//!
//! Writes before the next pass coalesce into that pass.
//!
//! # Example
//!
//! ```ignore
//! let count = ctx.use_state(|| 0u32)?;
//! Leaf::new((4, 1), CellContent::new("gold_nugget").amount(count.get() as u8))
//!     .on_click(move |_| count.update(|n| *n += 1))
//! ```

use std::any::{type_name, Any};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::scheduler::Scheduler;
use crate::engine::Key;
use crate::error::{MenuError, Result};

// =============================================================================
// Lifecycle
// =============================================================================

/// Mount status shared by an instance and every state cell it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountStatus {
    /// Created by a pass that has not committed.
    Pending,
    Mounted,
    /// Unmounted; the instance is gone.
    Released,
}

#[derive(Debug)]
pub struct Lifecycle {
    status: Cell<MountStatus>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            status: Cell::new(MountStatus::Pending),
        }
    }

    pub fn status(&self) -> MountStatus {
        self.status.get()
    }
}

// =============================================================================
// Hook storage
// =============================================================================

/// State cells of one instance.
pub struct Hooks {
    lifecycle: Rc<Lifecycle>,
    ordered: RefCell<Vec<Rc<dyn Any>>>,
    keyed: RefCell<HashMap<Key, Rc<dyn Any>>>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("status", &self.lifecycle.status())
            .field("ordered", &self.ordered.borrow().len())
            .field("keyed", &self.keyed.borrow().len())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self {
            lifecycle: Rc::new(Lifecycle::new()),
            ordered: RefCell::new(Vec::new()),
            keyed: RefCell::new(HashMap::new()),
        }
    }

    pub fn status(&self) -> MountStatus {
        self.lifecycle.status()
    }

    pub fn is_released(&self) -> bool {
        self.status() == MountStatus::Released
    }

    /// Number of order-declared cells.
    pub fn len(&self) -> usize {
        self.ordered.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.borrow().is_empty() && self.keyed.borrow().is_empty()
    }

    pub(crate) fn mark_mounted(&self) {
        if self.lifecycle.status() == MountStatus::Pending {
            self.lifecycle.status.set(MountStatus::Mounted);
        }
    }

    pub(crate) fn release(&self) {
        self.lifecycle.status.set(MountStatus::Released);
    }

    /// Cell number `index` in declaration order, created by `init` on first use.
    pub(crate) fn ordered<T: 'static>(
        &self,
        index: usize,
        scheduler: &Weak<Scheduler>,
        init: impl FnOnce() -> T,
    ) -> Result<State<T>> {
        let mut ordered = self.ordered.borrow_mut();
        let value = match ordered.get(index) {
            Some(existing) => downcast(existing, || format!("#{index}"))?,
            None => {
                let value = Rc::new(RefCell::new(init()));
                ordered.push(value.clone());
                value
            }
        };
        Ok(self.handle(value, scheduler))
    }

    /// Cell registered under `key`, created by `init` on first use.
    pub(crate) fn keyed<T: 'static>(
        &self,
        key: Key,
        scheduler: &Weak<Scheduler>,
        init: impl FnOnce() -> T,
    ) -> Result<State<T>> {
        let mut keyed = self.keyed.borrow_mut();
        let value = match keyed.get(&key) {
            Some(existing) => downcast(existing, || key.to_string())?,
            None => {
                let value = Rc::new(RefCell::new(init()));
                keyed.insert(key, value.clone());
                value
            }
        };
        Ok(self.handle(value, scheduler))
    }

    fn handle<T>(&self, value: Rc<RefCell<T>>, scheduler: &Weak<Scheduler>) -> State<T> {
        State {
            value,
            owner: self.lifecycle.clone(),
            scheduler: scheduler.clone(),
        }
    }
}

fn downcast<T: 'static>(
    slot: &Rc<dyn Any>,
    describe: impl FnOnce() -> String,
) -> Result<Rc<RefCell<T>>> {
    slot.clone()
        .downcast::<RefCell<T>>()
        .map_err(|_| MenuError::HookMismatch {
            hook: describe(),
            expected: type_name::<T>(),
        })
}

// =============================================================================
// State handle
// =============================================================================

/// Handle to one state cell.
///
/// Cheap to clone; clones share the value. Handlers may keep a handle
/// after its component is gone, writes through it are then ignored.
pub struct State<T> {
    value: Rc<RefCell<T>>,
    owner: Rc<Lifecycle>,
    scheduler: Weak<Scheduler>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            owner: self.owner.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &self.value.borrow())
            .field("owner", &self.owner.status())
            .finish()
    }
}

impl<T> State<T> {
    /// Current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Read the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Status of the owning instance.
    pub fn owner_status(&self) -> MountStatus {
        self.owner.status()
    }

    /// Replace the value.
    pub fn set(&self, value: T) -> Result<()> {
        self.write(move |slot| *slot = value)
    }

    /// Modify the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<()> {
        self.write(f)
    }

    fn write(&self, f: impl FnOnce(&mut T)) -> Result<()> {
        match self.owner.status() {
            MountStatus::Pending => Err(MenuError::NotMounted),
            MountStatus::Released => {
                log::trace!("dropped write to a state cell of an unmounted component");
                Ok(())
            }
            MountStatus::Mounted => {
                let mut value = self.value.try_borrow_mut().map_err(|_| MenuError::StateBorrowed)?;
                f(&mut *value);
                drop(value);
                if let Some(scheduler) = self.scheduler.upgrade() {
                    scheduler.request_render();
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;

    #[test]
    fn test_ordered_cells_are_stable() {
        let scheduler = Rc::new(Scheduler::new());
        let weak = Rc::downgrade(&scheduler);
        let hooks = Hooks::new();

        let first = hooks.ordered(0, &weak, || 1i32).unwrap();
        hooks.mark_mounted();
        first.set(5).unwrap();

        let again = hooks.ordered(0, &weak, || 1i32).unwrap();
        assert_eq!(again.get(), 5, "init must not run twice");
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn test_hook_type_mismatch() {
        let weak = Weak::new();
        let hooks = Hooks::new();
        hooks.ordered(0, &weak, || 1i32).unwrap();

        let err = hooks.ordered(0, &weak, || "text").unwrap_err();
        match err {
            MenuError::HookMismatch { hook, expected } => {
                assert_eq!(hook, "#0");
                assert!(expected.contains("str"));
            }
            other => panic!("expected HookMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_keyed_cells() {
        let weak = Weak::new();
        let hooks = Hooks::new();
        let a = hooks.keyed(Key::from("a"), &weak, || 1u8).unwrap();
        let b = hooks.keyed(Key::from("b"), &weak, || 2u8).unwrap();
        hooks.mark_mounted();
        a.set(10).unwrap();

        assert_eq!(hooks.keyed(Key::from("a"), &weak, || 0u8).unwrap().get(), 10);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn test_write_before_mount_is_error() {
        let hooks = Hooks::new();
        let cell = hooks.ordered(0, &Weak::new(), || 0).unwrap();
        assert!(matches!(cell.set(1), Err(MenuError::NotMounted)));
        assert_eq!(cell.get(), 0);
    }

    #[test]
    fn test_write_requests_render() {
        let scheduler = Rc::new(Scheduler::new());
        let hooks = Hooks::new();
        let cell = hooks.ordered(0, &Rc::downgrade(&scheduler), || 0).unwrap();
        hooks.mark_mounted();

        cell.set(1).unwrap();
        cell.set(2).unwrap();
        cell.update(|v| *v += 1).unwrap();

        assert_eq!(scheduler.phase(), Phase::RenderRequested);
        assert_eq!(scheduler.coalesced(), 2, "three writes, one pending pass");
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn test_write_while_reading_is_error() {
        let scheduler = Rc::new(Scheduler::new());
        let hooks = Hooks::new();
        let cell = hooks.ordered(0, &Rc::downgrade(&scheduler), || 1).unwrap();
        hooks.mark_mounted();

        let result = cell.with(|_| cell.set(2));
        assert!(matches!(result, Err(MenuError::StateBorrowed)));
        assert_eq!(cell.get(), 1, "value unchanged");
        assert_eq!(scheduler.phase(), Phase::Idle, "failed write must not schedule");

        cell.set(3).unwrap();
        assert_eq!(cell.get(), 3, "writes work again once the read ends");
    }

    #[test]
    fn test_write_after_release_is_noop() {
        let scheduler = Rc::new(Scheduler::new());
        let hooks = Hooks::new();
        let cell = hooks.ordered(0, &Rc::downgrade(&scheduler), || 7).unwrap();
        hooks.mark_mounted();
        hooks.release();

        assert!(cell.set(9).is_ok(), "stale writes are not errors");
        assert_eq!(cell.get(), 7, "stale write must not change the value");
        assert_eq!(scheduler.phase(), Phase::Idle, "stale write must not schedule");
        assert_eq!(cell.owner_status(), MountStatus::Released);
    }
}
