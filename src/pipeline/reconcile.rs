//! Reconciler - render the tree, pair children, stage the result.
//!
//! One pass walks the tree from the root:
//!
//! 1. Pair each new child list with the instance's committed children
//!    (keys first, then same index for unkeyed children of the same tag)
//! 2. Reuse matched instances, allocate fresh ones as `Pending`
//! 3. Call each composite's render function with its own context
//! 4. Collect leaves into a [`GridFrame`] plus a [`HitMap`], dropping
//!    leaves outside the clip area of an enclosing composite
//!
//! Nothing observable happens until [`PendingLifecycle::commit`]: matched
//! instances keep their old children, unmounted ones stay alive. A pass
//! that fails half-way is thrown away with [`PendingLifecycle::discard`]
//! and the previous tree is still the committed one.

use std::collections::HashSet;
use std::rc::Weak;

use super::menu::MenuHandle;
use super::router::{HitMap, HitTarget};
use crate::engine::{pair_children, ChildRecord, Identity, Instance, InstanceId, Registry, UnmountCallback};
use crate::error::{MenuError, Result};
use crate::primitives::{Composite, Effects, Handler, Leaf, MountCallback, Node, RenderContext};
use crate::renderer::GridFrame;
use crate::state::Scheduler;
use crate::types::{CellContent, GridSize, Position, Rect};

/// Parent name reported for the root's sibling list.
pub(crate) const ROOT_PARENT: &str = "menu";

// =============================================================================
// Report
// =============================================================================

/// Summary of one committed render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// 1-based pass number within the menu.
    pub pass: u64,
    /// Host calls issued.
    pub mutations: usize,
    /// Instances mounted.
    pub mounted: usize,
    /// Instances re-rendered in place.
    pub updated: usize,
    /// Instances unmounted.
    pub unmounted: usize,
}

// =============================================================================
// Render output
// =============================================================================

struct PlacedLeaf {
    position: Position,
    content: CellContent,
    handler: Option<Handler>,
    owner: Option<InstanceId>,
}

struct Staged {
    id: InstanceId,
    children: Vec<ChildRecord>,
    effects: Effects,
}

/// Instance changes of a rendered pass, not yet applied.
pub(crate) struct PendingLifecycle {
    staged: Vec<Staged>,
    fresh: Vec<InstanceId>,
    unmount: Vec<InstanceId>,
    updated: usize,
}

/// Everything a pass produced.
pub(crate) struct RenderedTree {
    /// Child records of the root list.
    pub root: Vec<ChildRecord>,
    pub frame: GridFrame,
    /// Leaf positions in document order.
    pub order: Vec<Position>,
    pub hits: HitMap,
    pub lifecycle: PendingLifecycle,
}

/// What committing a pass released and mounted.
pub(crate) struct Committed {
    /// Mount callbacks of fresh instances, children before parents.
    pub mount_callbacks: Vec<MountCallback>,
    /// Unmount callbacks of released instances, children before parents.
    pub unmount_callbacks: Vec<UnmountCallback>,
    pub mounted: usize,
    pub updated: usize,
    pub unmounted: usize,
}

impl PendingLifecycle {
    /// Make the pass the committed tree.
    ///
    /// Callbacks are returned, not run: the caller runs them once it holds
    /// no borrow of the menu.
    pub fn commit(self, registry: &mut Registry) -> Committed {
        let fresh: HashSet<InstanceId> = self.fresh.iter().copied().collect();
        let mut mount_callbacks = Vec::new();

        for staged in self.staged {
            let Some(instance) = registry.get_mut(staged.id) else {
                continue;
            };
            instance.children = staged.children;
            instance.handler = staged.effects.handler;
            instance.on_unmount = staged.effects.unmount;
            if fresh.contains(&staged.id) {
                mount_callbacks.extend(staged.effects.mount);
            }
        }

        let mut released = crate::engine::Released::default();
        for id in self.unmount {
            released.merge(registry.release(id));
        }

        for id in &self.fresh {
            if let Some(instance) = registry.get(*id) {
                instance.hooks.mark_mounted();
            }
        }

        Committed {
            mount_callbacks,
            unmount_callbacks: released.callbacks,
            mounted: self.fresh.len(),
            updated: self.updated,
            unmounted: released.count,
        }
    }

    /// Throw the pass away. Fresh instances vanish without callbacks.
    pub fn discard(self, registry: &mut Registry) {
        for id in self.fresh {
            registry.discard(id);
        }
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// One render pass over one menu's tree.
pub(crate) struct Reconciler<'a> {
    registry: &'a mut Registry,
    size: GridSize,
    scheduler: &'a Weak<Scheduler>,
    handle: &'a MenuHandle,
    leaves: Vec<PlacedLeaf>,
    staged: Vec<Staged>,
    fresh: Vec<InstanceId>,
    unmount: Vec<InstanceId>,
    updated: usize,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        registry: &'a mut Registry,
        size: GridSize,
        scheduler: &'a Weak<Scheduler>,
        handle: &'a MenuHandle,
    ) -> Self {
        Self {
            registry,
            size,
            scheduler,
            handle,
            leaves: Vec::new(),
            staged: Vec::new(),
            fresh: Vec::new(),
            unmount: Vec::new(),
            updated: 0,
        }
    }

    /// Render `root` against the committed root list `old_root`.
    ///
    /// On error every instance allocated by this pass is discarded.
    pub fn render(mut self, root: &Node, old_root: &[ChildRecord]) -> Result<RenderedTree> {
        let result = self.reconcile_list(
            ROOT_PARENT,
            None,
            old_root,
            std::slice::from_ref(root),
            Position::default(),
            None,
        );
        match result {
            Ok(records) => Ok(self.finish(records)),
            Err(err) => {
                for id in self.fresh.drain(..) {
                    self.registry.discard(id);
                }
                Err(err)
            }
        }
    }

    fn reconcile_list(
        &mut self,
        parent_tag: &str,
        parent: Option<InstanceId>,
        old: &[ChildRecord],
        new: &[Node],
        origin: Position,
        clip: Option<Rect>,
    ) -> Result<Vec<ChildRecord>> {
        let old_ids: Vec<Identity<'_>> = old
            .iter()
            .enumerate()
            .map(|(index, record)| Identity {
                index,
                key: record.key.as_ref(),
                kind: record.kind,
                tag: record.tag,
            })
            .collect();
        let new_ids: Vec<Identity<'_>> = new
            .iter()
            .enumerate()
            .map(|(index, node)| Identity {
                index,
                key: node.key(),
                kind: node.kind(),
                tag: node.tag(),
            })
            .collect();

        let pairing = pair_children(parent_tag, &old_ids, &new_ids)?;
        self.unmount
            .extend(pairing.unmount.iter().filter_map(|&o| old[o].instance));

        let mut records = Vec::with_capacity(new.len());
        for (node, partner) in new.iter().zip(&pairing.new_to_old) {
            let instance = match node {
                Node::Leaf(leaf) => {
                    // A leaf never takes over an instance.
                    self.unmount.extend(partner.and_then(|o| old[o].instance));
                    self.place_leaf(leaf, origin, clip, parent)?;
                    None
                }
                Node::Composite(composite) => {
                    let reused = partner.and_then(|o| old[o].instance);
                    let id = match reused {
                        Some(id) => {
                            self.updated += 1;
                            id
                        }
                        None => {
                            let instance = Instance::new(composite.component.name(), composite.key.clone());
                            let id = self.registry.insert(instance, parent);
                            self.fresh.push(id);
                            id
                        }
                    };
                    let origin = origin.offset(composite.offset);
                    let clip = match (clip, composite.clip) {
                        (Some(outer), Some(own)) => Some(outer.intersection(&own.offset(origin))),
                        (outer, own) => outer.or(own.map(|own| own.offset(origin))),
                    };
                    self.render_instance(id, composite, origin, clip)?;
                    Some(id)
                }
            };
            records.push(ChildRecord {
                key: node.key().cloned(),
                kind: node.kind(),
                tag: node.tag(),
                instance,
            });
        }
        Ok(records)
    }

    fn render_instance(
        &mut self,
        id: InstanceId,
        composite: &Composite,
        origin: Position,
        clip: Option<Rect>,
    ) -> Result<()> {
        let Some(instance) = self.registry.get(id) else {
            return Ok(());
        };
        let hooks = instance.hooks.clone();
        let old_children = instance.children.clone();

        let mut ctx = RenderContext::new(
            &composite.props,
            &composite.children,
            &hooks,
            self.scheduler,
            self.handle,
        );
        let nodes = composite.component.render(&mut ctx)?;
        let effects = ctx.into_effects();

        let children =
            self.reconcile_list(composite.component.name(), Some(id), &old_children, &nodes, origin, clip)?;
        self.staged.push(Staged { id, children, effects });
        Ok(())
    }

    fn place_leaf(
        &mut self,
        leaf: &Leaf,
        origin: Position,
        clip: Option<Rect>,
        owner: Option<InstanceId>,
    ) -> Result<()> {
        let position = origin.offset(leaf.at);
        if clip.is_some_and(|area| !area.contains(position)) {
            log::trace!("leaf at {position:?} clipped by its pane");
            return Ok(());
        }
        if !self.size.contains(position) {
            return Err(MenuError::OutOfBounds {
                position,
                size: self.size,
            });
        }
        self.leaves.push(PlacedLeaf {
            position,
            content: leaf.content.clone(),
            handler: leaf.handler.clone(),
            owner,
        });
        Ok(())
    }

    fn finish(self, root: Vec<ChildRecord>) -> RenderedTree {
        let mut frame = GridFrame::new(self.size);
        let mut hits = HitMap::new(self.size);
        let mut order = Vec::with_capacity(self.leaves.len());

        for leaf in self.leaves {
            if frame.set(leaf.position, leaf.content).is_some() {
                log::warn!("two leaves rendered at {:?}; the later one wins", leaf.position);
            }
            hits.set(
                leaf.position,
                HitTarget {
                    owner: leaf.owner,
                    handler: leaf.handler,
                },
            );
            order.push(leaf.position);
        }

        RenderedTree {
            root,
            frame,
            order,
            hits,
            lifecycle: PendingLifecycle {
                staged: self.staged,
                fresh: self.fresh,
                unmount: self.unmount,
                updated: self.updated,
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::engine::{NodeKind, LEAF_TAG};
    use crate::primitives::{Component, Props};
    use crate::types::ActionKind;

    fn stone(at: (u16, u16)) -> Node {
        Leaf::new(at, CellContent::new("stone")).into()
    }

    fn pass(registry: &mut Registry, root: &Node, old: &[ChildRecord]) -> Result<(RenderedTree, Committed)> {
        let scheduler = Weak::new();
        let handle = MenuHandle::detached();
        let mut tree = Reconciler::new(registry, GridSize::new(9, 3), &scheduler, &handle).render(root, old)?;
        let lifecycle = std::mem::replace(
            &mut tree.lifecycle,
            PendingLifecycle { staged: Vec::new(), fresh: Vec::new(), unmount: Vec::new(), updated: 0 },
        );
        let committed = lifecycle.commit(registry);
        Ok((tree, committed))
    }

    #[test]
    fn test_first_pass_mounts_everything() {
        let row = Component::new("row", |_| Ok(vec![stone((0, 0)), stone((1, 0))]));
        let root: Node = Component::new("root", move |_| Ok(vec![row.node().at((2, 1)).into(), stone((0, 0))]))
            .node()
            .into();

        let mut registry = Registry::new();
        let (tree, committed) = pass(&mut registry, &root, &[]).unwrap();

        assert_eq!(committed.mounted, 2);
        assert_eq!(committed.updated, 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(tree.frame.occupied_count(), 3);
        assert!(tree.frame.get(Position::new(3, 1)).is_some(), "row offset applies to its leaves");
        assert_eq!(
            tree.order,
            vec![Position::new(2, 1), Position::new(3, 1), Position::new(0, 0)],
            "document order"
        );
    }

    #[test]
    fn test_second_pass_reuses_instances() {
        let root: Node = Component::new("root", |ctx| {
            let count = ctx.use_state(|| 1u8)?;
            Ok(vec![Leaf::new((0, 0), CellContent::new("stone").amount(count.get())).into()])
        })
        .node()
        .into();

        let mut registry = Registry::new();
        let (first, _) = pass(&mut registry, &root, &[]).unwrap();
        let (second, committed) = pass(&mut registry, &root, &first.root).unwrap();

        assert_eq!(first.root, second.root, "same instance on both passes");
        assert_eq!(committed.mounted, 0);
        assert_eq!(committed.updated, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_replaced_tag_unmounts_old_instance() {
        let a = Component::new("a", |_| Ok(Vec::new()));
        let b = Component::new("b", |_| Ok(Vec::new()));

        let mut registry = Registry::new();
        let (first, _) = pass(&mut registry, &a.node().into(), &[]).unwrap();
        let old = first.root[0].instance.unwrap();

        let (second, committed) = pass(&mut registry, &b.node().into(), &first.root).unwrap();
        assert_eq!(committed.unmounted, 1);
        assert_eq!(committed.mounted, 1);
        assert!(!registry.contains(old));
        assert_ne!(second.root[0].instance, Some(old));
    }

    #[test]
    fn test_component_named_leaf_unmounts_when_replaced_by_leaf() {
        let unmounted = Rc::new(Cell::new(false));
        let flag = unmounted.clone();
        let imposter = Component::new(LEAF_TAG, move |ctx| {
            let flag = flag.clone();
            ctx.on_unmount(move || flag.set(true));
            Ok(Vec::new())
        });
        let show_leaf = Rc::new(Cell::new(false));
        let toggle = show_leaf.clone();
        let root: Node = Component::new("root", move |_| {
            Ok(vec![if toggle.get() {
                stone((1, 0))
            } else {
                imposter.node().into()
            }])
        })
        .node()
        .into();

        let mut registry = Registry::new();
        let (first, _) = pass(&mut registry, &root, &[]).unwrap();
        let root_id = first.root[0].instance.unwrap();
        assert_eq!(registry.len(), 2);

        show_leaf.set(true);
        let (_, committed) = pass(&mut registry, &root, &first.root).unwrap();
        assert_eq!(registry.get(root_id).unwrap().children[0].kind, NodeKind::Leaf);
        assert_eq!(committed.unmounted, 1);
        assert_eq!(registry.len(), 1, "only the root instance remains");
        for callback in committed.unmount_callbacks {
            callback();
        }
        assert!(unmounted.get());
    }

    #[test]
    fn test_out_of_bounds_discards_fresh_instances() {
        let inner = Component::new("inner", |_| Ok(vec![stone((9, 0))]));
        let root: Node = Component::new("root", move |_| Ok(vec![inner.node().into()]))
            .node()
            .into();

        let mut registry = Registry::new();
        match pass(&mut registry, &root, &[]) {
            Err(MenuError::OutOfBounds { position, .. }) => assert_eq!(position, Position::new(9, 0)),
            other => panic!("expected OutOfBounds, got {:?}", other.map(|_| ())),
        }
        assert!(registry.is_empty(), "nothing from a failed pass survives");
    }

    #[test]
    fn test_clip_drops_leaves_outside_nested_areas() {
        let inner = Component::new("inner", |_| Ok(vec![stone((0, 0)), stone((1, 0)), stone((2, 0))]));
        let outer = Component::new("outer", move |_| {
            Ok(vec![inner.node().at((1, 0)).clip(Rect::new(0, 0, 3, 1)).into(), stone((5, 0))])
        });
        // Outer covers x 2..=4; inner starts at x 3 and covers x 3..=5
        let root: Node = outer.node().at((2, 1)).clip(Rect::new(0, 0, 3, 1)).into();

        let mut registry = Registry::new();
        let (tree, _) = pass(&mut registry, &root, &[]).unwrap();
        assert_eq!(
            tree.order,
            vec![Position::new(3, 1), Position::new(4, 1)],
            "only cells inside both areas render"
        );
    }

    #[test]
    fn test_clip_applies_before_grid_bounds() {
        let root: Node = Component::new("root", |_| Ok(vec![stone((0, 0)), stone((30, 0))]))
            .node()
            .clip(Rect::new(0, 0, 2, 1))
            .into();

        let mut registry = Registry::new();
        let (tree, _) = pass(&mut registry, &root, &[]).unwrap();
        assert_eq!(tree.order, vec![Position::new(0, 0)], "clipped leaf is not out of bounds");
    }

    #[test]
    fn test_collision_last_leaf_wins() {
        let root: Node = Component::new("root", |_| {
            Ok(vec![
                Leaf::new((0, 0), CellContent::new("first")).into(),
                Leaf::new((0, 0), CellContent::new("second")).on_click(|_| Ok(())).into(),
            ])
        })
        .node()
        .into();

        let mut registry = Registry::new();
        let (tree, _) = pass(&mut registry, &root, &[]).unwrap();
        assert_eq!(tree.frame.get(Position::new(0, 0)).map(|c| c.material.as_str()), Some("second"));
        let hit = tree.hits.get(Position::new(0, 0)).unwrap();
        assert!(hit.handler.as_ref().is_some_and(|h| h.accepts(ActionKind::Left)));
    }

    #[test]
    fn test_duplicate_keys_fail_the_pass() {
        let root: Node = Component::new("root", |_| {
            Ok(vec![
                Leaf::new((0, 0), CellContent::new("a")).key("a").into(),
                Leaf::new((1, 0), CellContent::new("b")).key("a").into(),
            ])
        })
        .node()
        .into();

        let mut registry = Registry::new();
        assert!(matches!(pass(&mut registry, &root, &[]), Err(MenuError::DuplicateKey { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_props_reach_render() {
        let root: Node = Component::new("root", |ctx| {
            let amount = ctx.props().int("amount").unwrap_or(1) as u8;
            Ok(vec![Leaf::new((0, 0), CellContent::new("stone").amount(amount)).into()])
        })
        .with(Props::new().with("amount", 7))
        .into();

        let mut registry = Registry::new();
        let (tree, _) = pass(&mut registry, &root, &[]).unwrap();
        assert_eq!(tree.frame.get(Position::new(0, 0)).map(|c| c.amount), Some(7));
    }
}
