//! Property-based invariant tests for keyed reconciliation.
//!
//! For arbitrary sequences of keyed list states:
//!
//! 1. After every pass the host grid equals the desired grid
//! 2. A repeated pass with no state change emits zero mutations
//! 3. Each key keeps its own instance (state initialized from the key
//!    would show up wrong in the grid otherwise)
//! 4. The registry holds exactly one instance per rendered component

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use spark_menu::prelude::*;
use spark_menu::GridFrame;

// ── Strategies ──────────────────────────────────────────────────────────

const KEYS: u8 = 12;

/// A list of distinct keys in arbitrary order.
fn list_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::sample::subsequence((0..KEYS).collect::<Vec<_>>(), 0..=KEYS as usize).prop_shuffle()
}

fn content(key: u8) -> CellContent {
    CellContent::new(format!("item{key}")).amount(key + 1)
}

fn desired(keys: &[u8], size: GridSize) -> GridFrame {
    let mut frame = GridFrame::new(size);
    for (slot, key) in keys.iter().enumerate() {
        frame.set(Position::from_index(slot, size.width), content(*key));
    }
    frame
}

/// Root listing one keyed `item` per key; returns the root and a cell
/// holding the list state once the first pass ran.
fn keyed_list() -> (Component, Rc<RefCell<Option<State<Vec<u8>>>>>) {
    let item = Component::new("item", |ctx| {
        let key = ctx.props().int("key").unwrap_or(0) as u8;
        let slot = ctx.props().int("slot").unwrap_or(0) as usize;
        // Initialized once per instance: a reused instance keeps its key
        let own = ctx.use_state(|| key)?;
        Ok(vec![Leaf::new(Position::from_index(slot, 9), content(own.get())).into()])
    });

    let list_state = Rc::new(RefCell::new(None));
    let captured = list_state.clone();
    let root = Component::new("list", move |ctx| {
        let list = ctx.use_state(Vec::<u8>::new)?;
        *captured.borrow_mut() = Some(list.clone());
        Ok(list
            .get()
            .iter()
            .enumerate()
            .map(|(slot, key)| {
                item.with(Props::new().with("key", i64::from(*key)).with("slot", slot as i64))
                    .key(i64::from(*key))
                    .into()
            })
            .collect())
    });
    (root, list_state)
}

// ═══════════════════════════════════════════════════════════════════════
// 1-4. Grid mirror, idempotence, identity, instance count
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn grid_matches_desired_after_every_pass(states in prop::collection::vec(list_strategy(), 1..8)) {
        let size = GridSize::chest(2);
        let host = MemoryGrid::new(size);
        let (root, list) = keyed_list();
        let menu = Menu::open(root.node(), MenuConfig::new(size), host.clone()).unwrap();
        let list = list.borrow().clone().unwrap();

        for keys in states {
            list.set(keys.clone()).unwrap();
            menu.flush().unwrap();

            prop_assert_eq!(host.frame(), desired(&keys, size));
            prop_assert_eq!(menu.stats().instances, keys.len() + 1);

            prop_assert!(menu.handle().request_render());
            let again = menu.flush().unwrap().unwrap();
            prop_assert_eq!(again.mutations, 0);
            prop_assert_eq!(again.mounted, 0);
            prop_assert_eq!(again.unmounted, 0);
        }
    }

    #[test]
    fn mutations_touch_only_changed_cells(before in list_strategy(), after in list_strategy()) {
        let size = GridSize::chest(2);
        let host = MemoryGrid::new(size);
        let (root, list) = keyed_list();
        let menu = Menu::open(root.node(), MenuConfig::new(size), host.clone()).unwrap();
        let list = list.borrow().clone().unwrap();

        list.set(before.clone()).unwrap();
        menu.flush().unwrap();
        host.take_calls();

        list.set(after.clone()).unwrap();
        menu.flush().unwrap();

        let old = desired(&before, size);
        let new = desired(&after, size);
        let changed = size
            .positions()
            .filter(|p| old.get(*p) != new.get(*p))
            .count();
        prop_assert_eq!(host.calls().len(), changed);
    }
}
