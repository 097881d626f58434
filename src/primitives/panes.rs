//! Panes - Built-in composites that position their items.
//!
//! - [`pane`] - renders its children shifted by an offset
//! - [`StaticPane`] - a bounded area of freely placed items, with flips,
//!   rotation and a filler for empty cells
//! - [`flow`] / [`flow_masked`] / [`flow_with`] - fills a rect cell by cell,
//!   optionally skipping cells a [`Mask`] disables, with gaps, repetition,
//!   centering, flips and rotation
//! - [`paginated`] - a flow with a page state cell and prev/next controls
//! - [`layered`] - orders overlapping panes by [`Priority`]
//!
//! Bounded panes clip: whatever their items render outside the pane's
//! area is dropped.
//!
//! # Example
//!
//! ```ignore
//! let shop = paginated(
//!     Rect::new(0, 0, 9, 2),
//!     wares.iter().map(|w| Leaf::new((0, 0), w.icon()).into()).collect(),
//!     Some(PageControls::new(
//!         Leaf::new((0, 2), CellContent::new("arrow").named("Back")),
//!         Leaf::new((8, 2), CellContent::new("arrow").named("Next")),
//!     )),
//! );
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use super::types::{Component, Composite, Handler, Leaf, Node};
use crate::error::MaskError;
use crate::types::{CellContent, Position, Rect};

/// Type tag of [`pane`] nodes.
pub const PANE: &str = "pane";
/// Type tag of [`flow`] nodes.
pub const FLOW: &str = "flow";
/// Type tag of [`paginated`] nodes.
pub const PAGINATED: &str = "paginated";

// =============================================================================
// Mask
// =============================================================================

/// Enabled/disabled cells of an area, parsed from rows of `'0'`/`'1'`.
///
/// ```ignore
/// let ring = Mask::new(&["111", "101", "111"])?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u16,
    height: u16,
    cells: Vec<bool>,
}

impl Mask {
    pub fn new<S: AsRef<str>>(rows: &[S]) -> Result<Self, MaskError> {
        let first = rows.first().ok_or(MaskError::Empty)?;
        let expected = first.as_ref().chars().count();

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != expected {
                return Err(MaskError::Ragged { row, expected, found });
            }
            for (column, c) in line.chars().enumerate() {
                match c {
                    '1' => cells.push(true),
                    '0' => cells.push(false),
                    found => return Err(MaskError::InvalidChar { row, column, found }),
                }
            }
        }

        Ok(Self {
            width: u16::try_from(expected).unwrap_or(u16::MAX),
            height: u16::try_from(rows.len()).unwrap_or(u16::MAX),
            cells,
        })
    }

    /// Mask with every cell enabled.
    pub fn full(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![true; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Cells outside the mask count as enabled.
    pub fn is_enabled(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn enabled_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

impl FromStr for Mask {
    type Err = MaskError;

    /// Rows separated by whitespace: `"111 101 111"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.split_whitespace().collect();
        Self::new(&rows)
    }
}

// =============================================================================
// Geometry
// =============================================================================

bitflags::bitflags! {
    /// Mirror axes of a pane.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flip: u8 {
        /// Mirror left and right.
        const HORIZONTAL = 1 << 0;
        /// Mirror top and bottom.
        const VERTICAL = 1 << 1;
    }
}

/// Clockwise turn of a pane's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Upright,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    /// Rotation by a multiple of 90 degrees. Negative angles turn
    /// counter-clockwise.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(match degrees.rem_euclid(360) {
            0 => Rotation::Upright,
            90 => Rotation::Clockwise90,
            180 => Rotation::Clockwise180,
            _ => Rotation::Clockwise270,
        })
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Upright => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }
}

/// Where the pane cell (`x`, `y`) of a `width` x `height` pane ends up
/// after flipping, then rotating.
///
/// `None` when it lands outside the pane. Only cells already outside, or
/// quarter turns of a non-square pane, do that.
pub fn transform_cell(x: u16, y: u16, width: u16, height: u16, flip: Flip, rotation: Rotation) -> Option<Position> {
    let (w, h) = (i32::from(width), i32::from(height));
    let (mut x, mut y) = (i32::from(x), i32::from(y));
    if flip.contains(Flip::HORIZONTAL) {
        x = w - x - 1;
    }
    if flip.contains(Flip::VERTICAL) {
        y = h - y - 1;
    }
    let (x, y) = match rotation {
        Rotation::Upright => (x, y),
        Rotation::Clockwise90 => (h - 1 - y, x),
        Rotation::Clockwise180 => (w - 1 - x, h - 1 - y),
        Rotation::Clockwise270 => (y, w - 1 - x),
    };
    if !(0..w).contains(&x) || !(0..h).contains(&y) {
        return None;
    }
    Some(Position::new(u16::try_from(x).ok()?, u16::try_from(y).ok()?))
}

// =============================================================================
// Flow layout
// =============================================================================

/// Fill direction of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Left to right, then down.
    #[default]
    Horizontal,
    /// Top to bottom, then right.
    Vertical,
}

/// Placement of a flow line the items do not fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Begin,
    /// Split the free cells evenly before and after the items.
    Center,
}

/// How a [`flow_with`] pane lays out its items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowOptions {
    pub orientation: Orientation,
    /// Empty cells between consecutive items.
    pub gap: u16,
    /// Start over with the first item until every cell is used.
    pub repeat: bool,
    pub alignment: Alignment,
    pub flip: Flip,
    pub rotation: Rotation,
    /// Cells to skip, laid over the area from its top-left corner.
    pub mask: Option<Mask>,
}

impl FlowOptions {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    pub fn rotate(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// Positions a flow over `area` fills, in fill order.
pub fn flow_slots(area: Rect, orientation: Orientation, mask: Option<&Mask>) -> Vec<Position> {
    let (outer, inner) = match orientation {
        Orientation::Horizontal => (area.height, area.width),
        Orientation::Vertical => (area.width, area.height),
    };

    let mut slots = Vec::with_capacity(area.area());
    for a in 0..outer {
        for b in 0..inner {
            let (dx, dy) = match orientation {
                Orientation::Horizontal => (b, a),
                Orientation::Vertical => (a, b),
            };
            if mask.is_none_or(|m| m.is_enabled(dx, dy)) {
                slots.push(area.origin().offset(Position::new(dx, dy)));
            }
        }
    }
    slots
}

/// Cells a flow of `count` items fills, as `(item index, position)` in
/// fill order. With `repeat` an item index shows up more than once.
pub fn flow_cells(area: Rect, options: &FlowOptions, count: usize) -> Vec<(usize, Position)> {
    let mut cells = Vec::new();
    if count == 0 {
        return cells;
    }
    let (lines, line_len) = match options.orientation {
        Orientation::Horizontal => (area.height, area.width),
        Orientation::Vertical => (area.width, area.height),
    };
    let gap = usize::from(options.gap);
    let mut next = 0usize;
    let mut gap_left = 0usize;

    for line in 0..lines {
        if !options.repeat && next >= count {
            break;
        }
        let enabled: Vec<(u16, u16)> = (0..line_len)
            .map(|along| match options.orientation {
                Orientation::Horizontal => (along, line),
                Orientation::Vertical => (line, along),
            })
            .filter(|&(x, y)| options.mask.as_ref().is_none_or(|m| m.is_enabled(x, y)))
            .collect();

        // Cells of this line taken by the remaining items and their gaps
        let used = if options.repeat {
            enabled.len()
        } else {
            let remaining = (count - next - 1).saturating_mul(gap + 1).saturating_add(gap_left + 1);
            enabled.len().min(remaining)
        };
        let start = match options.alignment {
            Alignment::Begin => 0,
            Alignment::Center => (enabled.len() - used) / 2,
        };

        for &(x, y) in &enabled[start..start + used] {
            if gap_left > 0 {
                gap_left -= 1;
                continue;
            }
            let item = next;
            next += 1;
            if options.repeat && next >= count {
                next = 0;
            }
            gap_left = gap;
            if let Some(at) = transform_cell(x, y, area.width, area.height, options.flip, options.rotation) {
                cells.push((item, area.origin().offset(at)));
            }
        }
    }

    if !options.repeat && next < count {
        log::trace!("flow area full, {} items not shown", count - next);
    }
    cells
}

fn place(items: impl IntoIterator<Item = Node>, slots: &[Position]) -> Vec<Node> {
    let mut placed = Vec::with_capacity(slots.len());
    let mut dropped = 0usize;
    for (i, item) in items.into_iter().enumerate() {
        match slots.get(i) {
            Some(&at) => placed.push(item.placed(at)),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::trace!("page area full, {dropped} items not shown");
    }
    placed
}

fn passthrough(tag: &'static str) -> Component {
    Component::new(tag, |ctx| Ok(ctx.children().to_vec()))
}

// =============================================================================
// Panes
// =============================================================================

/// Render `children` shifted by `offset`, without bounds.
///
/// Use [`StaticPane`] for a pane that clips to its area.
pub fn pane(offset: impl Into<Position>, children: Vec<Node>) -> Composite {
    passthrough(PANE).node().at(offset).children(children)
}

/// A bounded pane of freely positioned items.
///
/// Item positions are relative to the pane. Flips and rotation move each
/// item's anchor; a nested component's own layout is not mirrored, but
/// whatever it renders outside the pane is dropped.
///
/// ```ignore
/// let border = StaticPane::new(Rect::new(0, 0, 9, 3))
///     .item(Leaf::new((4, 1), CellContent::new("compass")))
///     .fill_with(CellContent::new("black_stained_glass_pane"), None);
/// ```
#[derive(Debug, Clone)]
pub struct StaticPane {
    area: Rect,
    items: Vec<Node>,
    flip: Flip,
    rotation: Rotation,
    fill: Option<Leaf>,
}

impl StaticPane {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            items: Vec::new(),
            flip: Flip::empty(),
            rotation: Rotation::Upright,
            fill: None,
        }
    }

    pub fn item(mut self, item: impl Into<Node>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = Node>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    pub fn rotate(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Show `content` in every cell no leaf item occupies. Components
    /// placed in the pane draw over the filler.
    pub fn fill_with(mut self, content: CellContent, handler: Option<Handler>) -> Self {
        let mut filler = Leaf::new(Position::default(), content);
        filler.handler = handler;
        self.fill = Some(filler);
        self
    }

    pub fn build(self) -> Composite {
        let (width, height) = (self.area.width, self.area.height);
        let mut occupied = HashSet::new();
        let mut items = Vec::with_capacity(self.items.len());
        for item in self.items {
            let anchor = item.anchor();
            match transform_cell(anchor.x, anchor.y, width, height, self.flip, self.rotation) {
                Some(at) => {
                    if matches!(item, Node::Leaf(_)) {
                        occupied.insert(at);
                    }
                    items.push(item.placed(at));
                }
                None => log::trace!("pane item at {anchor:?} lies outside the pane"),
            }
        }

        let mut children: Vec<Node> = Vec::new();
        if let Some(filler) = self.fill {
            for y in 0..height {
                for x in 0..width {
                    let at = Position::new(x, y);
                    if !occupied.contains(&at) {
                        children.push(Leaf { at, ..filler.clone() }.into());
                    }
                }
            }
        }
        children.extend(items);

        passthrough(PANE)
            .node()
            .at(self.area.origin())
            .clip(Rect::new(0, 0, width, height))
            .children(children)
    }
}

impl From<StaticPane> for Composite {
    fn from(pane: StaticPane) -> Self {
        pane.build()
    }
}

impl From<StaticPane> for Node {
    fn from(pane: StaticPane) -> Self {
        Node::Composite(pane.build())
    }
}

/// Place `items` one per cell across `area`.
///
/// Items that do not fit are not rendered.
pub fn flow(area: Rect, orientation: Orientation, items: Vec<Node>) -> Composite {
    flow_with(area, &FlowOptions::new(orientation), items)
}

/// Like [`flow`], skipping cells disabled in `mask`.
///
/// The mask is laid over `area` from its top-left corner.
pub fn flow_masked(area: Rect, orientation: Orientation, mask: &Mask, items: Vec<Node>) -> Composite {
    flow_with(area, &FlowOptions::new(orientation).mask(mask.clone()), items)
}

/// Place `items` across `area` as `options` describe.
///
/// Repeated items after their first appearance lose their explicit key,
/// so the copies pair by position.
pub fn flow_with(area: Rect, options: &FlowOptions, items: Vec<Node>) -> Composite {
    let mut shown = vec![false; items.len()];
    let children = flow_cells(area, options, items.len())
        .into_iter()
        .filter_map(|(index, at)| {
            let node = items.get(index)?.clone().placed(at);
            let seen = shown.get_mut(index)?;
            Some(if std::mem::replace(seen, true) { node.unkeyed() } else { node })
        })
        .collect::<Vec<_>>();
    passthrough(FLOW).node().clip(area).children(children)
}

// =============================================================================
// Priority
// =============================================================================

/// Drawing order of overlapping panes. Higher priorities draw later and
/// win the cells they share with lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
    Monitor,
}

/// Order sibling panes by priority, lowest first. Equal priorities keep
/// their order.
///
/// Siblings pair by position, so key panes whose priority changes while
/// the menu is open.
pub fn layered(panes: impl IntoIterator<Item = (Priority, Node)>) -> Vec<Node> {
    let mut panes: Vec<(Priority, Node)> = panes.into_iter().collect();
    panes.sort_by_key(|(priority, _)| *priority);
    panes.into_iter().map(|(_, node)| node).collect()
}

/// Previous/next leaves of a [`paginated`] pane.
///
/// Their positions are relative to the pane, like item positions. Any
/// handler they carry is replaced by the page switch.
#[derive(Debug, Clone)]
pub struct PageControls {
    pub previous: Leaf,
    pub next: Leaf,
}

impl PageControls {
    pub fn new(previous: Leaf, next: Leaf) -> Self {
        Self { previous, next }
    }
}

/// Number of pages needed for `items` at `per_page` (at least one).
pub fn page_count(items: usize, per_page: usize) -> usize {
    items.div_ceil(per_page.max(1)).max(1)
}

/// Show `items` a page at a time inside `area`.
///
/// The current page lives in a state cell of the pane. Controls only
/// appear when there is a page to move to. Items pair by position within
/// the page, so give stateful items keys if they must keep state when
/// the page changes.
pub fn paginated(area: Rect, items: Vec<Node>, controls: Option<PageControls>) -> Composite {
    let component = Component::new(PAGINATED, move |ctx| {
        let page = ctx.use_state(|| 0usize)?;
        let slots = flow_slots(area, Orientation::Horizontal, None);
        let items = ctx.children();
        let pages = page_count(items.len(), slots.len());
        let current = page.get().min(pages - 1);

        let shown = items.iter().skip(current * slots.len()).cloned();
        let mut nodes = place(shown.take(slots.len()), &slots);

        if let Some(controls) = &controls {
            if current > 0 {
                let page = page.clone();
                nodes.push(
                    controls
                        .previous
                        .clone()
                        .on_click(move |_| page.set(current - 1))
                        .into(),
                );
            }
            if current + 1 < pages {
                let page = page.clone();
                nodes.push(
                    controls
                        .next
                        .clone()
                        .on_click(move |_| page.set(current + 1))
                        .into(),
                );
            }
        }
        Ok(nodes)
    });
    component.node().children(items)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Key;
    use crate::types::ActionMask;

    fn item(name: &str) -> Node {
        Leaf::new((0, 0), CellContent::new(name)).into()
    }

    fn leaf_positions(nodes: &[Node]) -> Vec<Position> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Leaf(l) => Some(l.at),
                Node::Composite(_) => None,
            })
            .collect()
    }

    fn materials(nodes: &[Node]) -> Vec<&str> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Leaf(l) => Some(l.content.material.as_str()),
                Node::Composite(_) => None,
            })
            .collect()
    }

    fn row(options: FlowOptions, width: u16, names: &[&str]) -> Composite {
        flow_with(
            Rect::new(0, 0, width, 1),
            &options,
            names.iter().map(|n| item(n)).collect(),
        )
    }

    #[test]
    fn test_mask_parse() {
        let mask = Mask::new(&["101", "010"]).unwrap();
        assert_eq!((mask.width(), mask.height()), (3, 2));
        assert!(mask.is_enabled(0, 0));
        assert!(!mask.is_enabled(1, 0));
        assert!(mask.is_enabled(1, 1));
        assert!(mask.is_enabled(5, 5), "outside the mask is enabled");
        assert_eq!(mask.enabled_count(), 3);
    }

    #[test]
    fn test_mask_errors() {
        let empty: [&str; 0] = [];
        assert_eq!(Mask::new(&empty), Err(MaskError::Empty));
        assert_eq!(
            Mask::new(&["11", "1"]),
            Err(MaskError::Ragged { row: 1, expected: 2, found: 1 })
        );
        assert_eq!(
            Mask::new(&["1x"]),
            Err(MaskError::InvalidChar { row: 0, column: 1, found: 'x' })
        );
    }

    #[test]
    fn test_mask_from_str() {
        let mask: Mask = "11 01".parse().unwrap();
        assert_eq!(mask.enabled_count(), 3);
        assert_eq!(mask, Mask::new(&["11", "01"]).unwrap());
    }

    #[test]
    fn test_flow_slots_orientation() {
        let area = Rect::new(1, 1, 2, 2);
        assert_eq!(
            flow_slots(area, Orientation::Horizontal, None),
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(1, 2),
                Position::new(2, 2)
            ]
        );
        assert_eq!(
            flow_slots(area, Orientation::Vertical, None),
            vec![
                Position::new(1, 1),
                Position::new(1, 2),
                Position::new(2, 1),
                Position::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_flow_masked_skips_disabled() {
        let mask = Mask::new(&["101"]).unwrap();
        let node = flow_masked(
            Rect::new(0, 0, 3, 1),
            Orientation::Horizontal,
            &mask,
            vec![item("a"), item("b"), item("c")],
        );
        assert_eq!(node.component.name(), FLOW);
        assert_eq!(
            leaf_positions(&node.children),
            vec![Position::new(0, 0), Position::new(2, 0)],
            "third item does not fit once the middle cell is masked"
        );
    }

    #[test]
    fn test_pane_offset() {
        let node = pane((3, 1), vec![item("a")]);
        assert_eq!(node.offset, Position::new(3, 1));
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 4), 1);
        assert_eq!(page_count(4, 4), 1);
        assert_eq!(page_count(5, 4), 2);
        assert_eq!(page_count(3, 0), 3, "zero capacity treated as one per page");
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Upright));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Clockwise90));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Clockwise270));
        assert_eq!(Rotation::from_degrees(540), Some(Rotation::Clockwise180));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::Clockwise270.degrees(), 270);
    }

    #[test]
    fn test_transform_cell() {
        let none = Flip::empty();
        assert_eq!(transform_cell(1, 0, 3, 2, none, Rotation::Upright), Some(Position::new(1, 0)));
        assert_eq!(transform_cell(0, 0, 3, 2, Flip::HORIZONTAL, Rotation::Upright), Some(Position::new(2, 0)));
        assert_eq!(transform_cell(0, 0, 3, 2, Flip::VERTICAL, Rotation::Upright), Some(Position::new(0, 1)));
        assert_eq!(transform_cell(0, 0, 3, 3, none, Rotation::Clockwise90), Some(Position::new(2, 0)));
        assert_eq!(transform_cell(2, 0, 3, 3, none, Rotation::Clockwise90), Some(Position::new(2, 2)));
        assert_eq!(transform_cell(0, 0, 3, 3, none, Rotation::Clockwise270), Some(Position::new(0, 2)));
        assert_eq!(transform_cell(0, 0, 3, 2, none, Rotation::Clockwise180), Some(Position::new(2, 1)));
        assert_eq!(transform_cell(3, 0, 3, 2, none, Rotation::Upright), None);
        assert_eq!(
            transform_cell(2, 0, 3, 1, none, Rotation::Clockwise90),
            None,
            "quarter turn of a wide area leaves it"
        );
    }

    #[test]
    fn test_flow_gap() {
        let node = row(FlowOptions::default().gap(1), 5, &["a", "b", "c"]);
        assert_eq!(
            leaf_positions(&node.children),
            vec![Position::new(0, 0), Position::new(2, 0), Position::new(4, 0)]
        );
    }

    #[test]
    fn test_flow_gap_carries_to_next_line() {
        let node = flow_with(
            Rect::new(0, 0, 2, 2),
            &FlowOptions::default().gap(1),
            vec![item("a"), item("b")],
        );
        assert_eq!(
            leaf_positions(&node.children),
            vec![Position::new(0, 0), Position::new(0, 1)],
            "the gap after the first item uses the rest of its line"
        );
    }

    #[test]
    fn test_flow_repeat_unkeys_copies() {
        let items = vec![
            Leaf::new((0, 0), CellContent::new("a")).key("a").into(),
            Leaf::new((0, 0), CellContent::new("b")).key("b").into(),
        ];
        let node = flow_with(Rect::new(0, 0, 5, 1), &FlowOptions::default().repeat(true), items);
        assert_eq!(materials(&node.children), vec!["a", "b", "a", "b", "a"]);
        assert_eq!(node.children[0].key(), Some(&Key::from("a")));
        assert_eq!(node.children[1].key(), Some(&Key::from("b")));
        assert!(node.children[2..].iter().all(|n| n.key().is_none()));
    }

    #[test]
    fn test_flow_center() {
        let node = row(FlowOptions::default().align(Alignment::Center), 5, &["a", "b"]);
        assert_eq!(
            leaf_positions(&node.children),
            vec![Position::new(1, 0), Position::new(2, 0)]
        );
    }

    #[test]
    fn test_flow_flip() {
        let node = row(FlowOptions::default().flip(Flip::HORIZONTAL), 3, &["a", "b"]);
        assert_eq!(
            leaf_positions(&node.children),
            vec![Position::new(2, 0), Position::new(1, 0)]
        );
    }

    #[test]
    fn test_flow_rotation() {
        let node = flow_with(
            Rect::new(1, 1, 2, 2),
            &FlowOptions::default().rotate(Rotation::Clockwise180),
            vec![item("a"), item("b"), item("c")],
        );
        assert_eq!(
            leaf_positions(&node.children),
            vec![Position::new(2, 2), Position::new(1, 2), Position::new(2, 1)]
        );
        assert_eq!(node.clip, Some(Rect::new(1, 1, 2, 2)));
    }

    #[test]
    fn test_static_pane_clips_and_drops_outside_items() {
        let node = StaticPane::new(Rect::new(2, 1, 3, 2))
            .item(Leaf::new((0, 0), CellContent::new("a")))
            .item(Leaf::new((5, 0), CellContent::new("b")))
            .build();
        assert_eq!(node.component.name(), PANE);
        assert_eq!(node.offset, Position::new(2, 1));
        assert_eq!(node.clip, Some(Rect::new(0, 0, 3, 2)));
        assert_eq!(materials(&node.children), vec!["a"]);
    }

    #[test]
    fn test_static_pane_flip_moves_items() {
        let node = StaticPane::new(Rect::new(0, 0, 3, 2))
            .item(Leaf::new((0, 0), CellContent::new("a")))
            .flip(Flip::HORIZONTAL | Flip::VERTICAL)
            .build();
        assert_eq!(leaf_positions(&node.children), vec![Position::new(2, 1)]);
    }

    #[test]
    fn test_static_pane_fill_with() {
        let handler = Handler::new(ActionMask::ANY_CLICK, |_| Ok(()));
        let node = StaticPane::new(Rect::new(0, 0, 2, 2))
            .item(Leaf::new((1, 1), CellContent::new("a")))
            .fill_with(CellContent::new("glass"), Some(handler))
            .build();
        assert_eq!(materials(&node.children), vec!["glass", "glass", "glass", "a"]);
        assert_eq!(
            leaf_positions(&node.children),
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1)
            ]
        );
        let mut fillers = node.children.iter().take(3);
        assert!(fillers.all(|n| matches!(n, Node::Leaf(l) if l.handler.is_some())));
    }

    #[test]
    fn test_layered_orders_by_priority() {
        let nodes = layered([
            (Priority::High, item("a")),
            (Priority::Low, item("b")),
            (Priority::Normal, item("c")),
            (Priority::Low, item("d")),
            (Priority::Monitor, item("e")),
        ]);
        assert_eq!(materials(&nodes), vec!["b", "d", "c", "a", "e"]);
    }
}
