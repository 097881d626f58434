//! Instance Registry - Arena of mounted component instances.
//!
//! Manages the lifecycle of component instances:
//! - Slot-map allocation with generational ids (stale ids never alias)
//! - Parent lookup table for upward walks (event bubbling)
//! - Unmount callbacks collected children-first on release

use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap};

use super::key::{Key, NodeKind};
use crate::primitives::Handler;
use crate::state::Hooks;

slotmap::new_key_type! {
    /// Identifier of a component instance inside one menu.
    pub struct InstanceId;
}

/// Callback run when an instance is unmounted.
pub type UnmountCallback = Box<dyn FnOnce()>;

// =============================================================================
// Records
// =============================================================================

/// One entry of an instance's rendered child list.
///
/// Leaves have no instance; they only take part in identity pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRecord {
    pub key: Option<Key>,
    pub kind: NodeKind,
    pub tag: &'static str,
    pub instance: Option<InstanceId>,
}

/// A live component instance.
pub struct Instance {
    /// Type tag of the component definition.
    pub tag: &'static str,
    /// Explicit key, if the node declared one.
    pub key: Option<Key>,
    /// State cells, in declaration order plus keyed ones.
    pub hooks: Rc<Hooks>,
    /// Children produced by the last committed render.
    pub children: Vec<ChildRecord>,
    /// Handler registered with `RenderContext::on_event`, for bubbling.
    pub handler: Option<Handler>,
    /// Callbacks registered with `RenderContext::on_unmount`.
    pub on_unmount: Vec<UnmountCallback>,
}

impl Instance {
    /// A fresh, not yet mounted instance.
    pub fn new(tag: &'static str, key: Option<Key>) -> Self {
        Self {
            tag,
            key,
            hooks: Rc::new(Hooks::new()),
            children: Vec::new(),
            handler: None,
            on_unmount: Vec::new(),
        }
    }
}

/// What releasing a subtree produced.
#[derive(Default)]
pub struct Released {
    /// Unmount callbacks, children before parents. Run them after dropping
    /// any borrow of the menu.
    pub callbacks: Vec<UnmountCallback>,
    /// Number of instances released.
    pub count: usize,
}

impl Released {
    pub fn merge(&mut self, other: Released) {
        self.callbacks.extend(other.callbacks);
        self.count += other.count;
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Arena of live instances for one menu.
#[derive(Default)]
pub struct Registry {
    instances: SlotMap<InstanceId, Instance>,
    parents: SecondaryMap<InstanceId, InstanceId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an instance under `parent`.
    pub fn insert(&mut self, instance: Instance, parent: Option<InstanceId>) -> InstanceId {
        let id = self.instances.insert(instance);
        if let Some(parent) = parent {
            self.parents.insert(id, parent);
        }
        id
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Parent of `id`, or `None` for the root.
    pub fn parent_of(&self, id: InstanceId) -> Option<InstanceId> {
        self.parents.get(id).copied()
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn chain(&self, id: InstanceId) -> impl Iterator<Item = InstanceId> + '_ {
        std::iter::successors(Some(id).filter(|id| self.contains(*id)), move |id| {
            self.parent_of(*id)
        })
    }

    /// Unmount `id` and its whole subtree.
    ///
    /// Children are released first (recursive!), then the instance itself.
    /// Every released instance has its state cells marked released, so any
    /// later write through a leftover handle is a no-op.
    pub fn release(&mut self, id: InstanceId) -> Released {
        let Some(instance) = self.instances.remove(id) else {
            return Released::default();
        };
        self.parents.remove(id);

        let mut released = Released::default();

        // FIRST: release children, so their callbacks run before ours
        for child in instance.children.iter().filter_map(|c| c.instance) {
            released.merge(self.release(child));
        }

        instance.hooks.release();
        released.callbacks.extend(instance.on_unmount);
        released.count += 1;

        log::trace!("released instance `{}`", instance.tag);
        released
    }

    /// Drop an instance that was never mounted, without running callbacks.
    pub fn discard(&mut self, id: InstanceId) {
        self.parents.remove(id);
        self.instances.remove(id);
    }

    /// Release every instance, roots first in allocation order.
    pub fn release_all(&mut self) -> Released {
        let roots: Vec<InstanceId> = self
            .instances
            .keys()
            .filter(|id| !self.parents.contains_key(*id))
            .collect();

        let mut released = Released::default();
        for root in roots {
            released.merge(self.release(root));
        }
        released
    }
}

// =============================================================================
// Tests
// =============================================================================
