//! Core types for spark-menu.
//!
//! These types define the foundation that everything builds on.
//! They flow through the reconciler and define what a host surface understands.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Position - One addressable grid cell
// =============================================================================

/// A cell coordinate inside a menu grid (0-indexed, `x` = column, `y` = row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

impl Position {
    /// Create a new position.
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Convert a flat slot index into a position for a grid `width` cells wide.
    ///
    /// Hosts that address inventory slots by index use this.
    pub const fn from_index(index: usize, width: u16) -> Self {
        let width = if width == 0 { 1 } else { width as usize };
        Self {
            x: (index % width) as u16,
            y: (index / width) as u16,
        }
    }

    /// Flat slot index of this position for a grid `width` cells wide.
    #[inline]
    pub const fn to_index(self, width: u16) -> usize {
        self.y as usize * width as usize + self.x as usize
    }

    /// Translate by an offset.
    #[inline]
    pub const fn offset(self, by: Position) -> Self {
        Self {
            x: self.x.saturating_add(by.x),
            y: self.y.saturating_add(by.y),
        }
    }
}

impl From<(u16, u16)> for Position {
    fn from((x, y): (u16, u16)) -> Self {
        Self::new(x, y)
    }
}

// =============================================================================
// GridSize
// =============================================================================

/// Dimensions of a menu grid. Fixed for the lifetime of a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Create a new grid size.
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// A chest-style grid: 9 columns, `rows` rows.
    pub const fn chest(rows: u16) -> Self {
        Self::new(9, rows)
    }

    /// Total number of cells.
    #[inline]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if a position lies inside the grid.
    #[inline]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Flat index of `pos`, or `None` if it lies outside.
    #[inline]
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.to_index(self.width))
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width;
        (0..self.cell_count()).map(move |i| Position::from_index(i, width))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::chest(3)
    }
}

// =============================================================================
// Rect - An area inside the grid
// =============================================================================

/// A rectangular area of cells.
///
/// Used by the built-in panes to bound where they place their items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Rect covering a whole grid.
    pub const fn of(size: GridSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Number of cells covered.
    #[inline]
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.x < self.x.saturating_add(self.width)
            && pos.y >= self.y
            && pos.y < self.y.saturating_add(self.height)
    }

    /// The same rect moved by `by`.
    #[inline]
    pub const fn offset(self, by: Position) -> Self {
        Self::new(
            self.x.saturating_add(by.x),
            self.y.saturating_add(by.y),
            self.width,
            self.height,
        )
    }

    /// Cells covered by both rects. Disjoint rects give an empty rect.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.x.saturating_add(self.width).min(other.x.saturating_add(other.width));
        let bottom = self.y.saturating_add(self.height).min(other.y.saturating_add(other.height));
        Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

// =============================================================================
// Item flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Presentation flags of a cell item.
    ///
    /// Combine with bitwise OR: `ItemFlags::GLINT | ItemFlags::HIDE_TOOLTIP`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct ItemFlags: u8 {
        const NONE = 0;
        const GLINT = 1 << 0;
        const HIDE_TOOLTIP = 1 << 1;
        const HIDE_ATTRIBUTES = 1 << 2;
        const UNBREAKABLE = 1 << 3;
    }
}

// =============================================================================
// CellContent - The atomic unit the host draws
// =============================================================================

/// What a single grid cell shows.
///
/// This is what the host surface deals with. Nothing more complex.
/// The reconciler computes these, the host turns them into item stacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellContent {
    /// Host material identifier (e.g. `"minecraft:diamond"`).
    pub material: String,
    /// Stack size, 1..=99.
    pub amount: u8,
    /// Display name shown on hover.
    pub name: Option<String>,
    /// Tooltip lines.
    pub lore: Vec<String>,
    /// Presentation flags.
    pub flags: ItemFlags,
}

impl CellContent {
    /// Content with just a material and an amount of one.
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            name: None,
            lore: Vec::new(),
            flags: ItemFlags::NONE,
        }
    }

    /// Set the stack size (clamped to 1..=99).
    pub fn amount(mut self, amount: u8) -> Self {
        self.amount = amount.clamp(1, 99);
        self
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a tooltip line.
    pub fn lore(mut self, line: impl Into<String>) -> Self {
        self.lore.push(line.into());
        self
    }

    /// Add presentation flags.
    pub fn flags(mut self, flags: ItemFlags) -> Self {
        self.flags |= flags;
        self
    }
}

// =============================================================================
// Actions
// =============================================================================

/// The kind of interaction a host reports for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionKind {
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    Middle,
    DoubleClick,
    Drop,
    ControlDrop,
    /// Hotbar number key (0-8).
    NumberKey(u8),
    SwapOffhand,
}

impl ActionKind {
    /// The mask bit matching this action.
    pub const fn mask(self) -> ActionMask {
        match self {
            Self::Left => ActionMask::LEFT,
            Self::Right => ActionMask::RIGHT,
            Self::ShiftLeft => ActionMask::SHIFT_LEFT,
            Self::ShiftRight => ActionMask::SHIFT_RIGHT,
            Self::Middle => ActionMask::MIDDLE,
            Self::DoubleClick => ActionMask::DOUBLE_CLICK,
            Self::Drop => ActionMask::DROP,
            Self::ControlDrop => ActionMask::CONTROL_DROP,
            Self::NumberKey(_) => ActionMask::NUMBER_KEY,
            Self::SwapOffhand => ActionMask::SWAP_OFFHAND,
        }
    }

    /// True for the shift-modified clicks.
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::ShiftLeft | Self::ShiftRight)
    }
}

bitflags::bitflags! {
    /// Set of action kinds a handler accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionMask: u16 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const SHIFT_LEFT = 1 << 2;
        const SHIFT_RIGHT = 1 << 3;
        const MIDDLE = 1 << 4;
        const DOUBLE_CLICK = 1 << 5;
        const DROP = 1 << 6;
        const CONTROL_DROP = 1 << 7;
        const NUMBER_KEY = 1 << 8;
        const SWAP_OFFHAND = 1 << 9;

        /// Plain and shift clicks with either button.
        const ANY_CLICK = Self::LEFT.bits()
            | Self::RIGHT.bits()
            | Self::SHIFT_LEFT.bits()
            | Self::SHIFT_RIGHT.bits()
            | Self::MIDDLE.bits()
            | Self::DOUBLE_CLICK.bits();
    }
}

impl ActionMask {
    /// Check whether `kind` is accepted.
    #[inline]
    pub fn accepts(self, kind: ActionKind) -> bool {
        self.intersects(kind.mask())
    }
}

impl From<ActionKind> for ActionMask {
    fn from(kind: ActionKind) -> Self {
        kind.mask()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_index_conversion() {
        let pos = Position::from_index(12, 9);
        assert_eq!(pos, Position::new(3, 1));
        assert_eq!(pos.to_index(9), 12);
    }

    #[test]
    fn test_position_from_index_zero_width() {
        // Degenerate width must not divide by zero
        assert_eq!(Position::from_index(4, 0), Position::new(0, 4));
    }

    #[test]
    fn test_grid_contains() {
        let size = GridSize::chest(3);
        assert!(size.contains(Position::new(8, 2)));
        assert!(!size.contains(Position::new(9, 0)));
        assert!(!size.contains(Position::new(0, 3)));
        assert_eq!(size.index_of(Position::new(8, 2)), Some(26));
        assert_eq!(size.index_of(Position::new(9, 2)), None);
    }

    #[test]
    fn test_grid_positions_row_major() {
        let size = GridSize::new(2, 2);
        let all: Vec<_> = size.positions().collect();
        assert_eq!(
            all,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(1, 1, 3, 2);
        assert!(rect.contains(Position::new(1, 1)));
        assert!(rect.contains(Position::new(3, 2)));
        assert!(!rect.contains(Position::new(4, 1)));
        assert!(!rect.contains(Position::new(0, 1)));
        assert_eq!(rect.area(), 6);
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0, 0, 4, 3);
        let b = Rect::new(2, 1, 5, 5);
        assert_eq!(a.intersection(&b), Rect::new(2, 1, 2, 2));
        assert_eq!(a.intersection(&Rect::new(6, 0, 2, 2)).area(), 0, "disjoint");
        assert_eq!(Rect::new(1, 1, 2, 2).offset(Position::new(3, 0)), Rect::new(4, 1, 2, 2));
    }

    #[test]
    fn test_content_builder() {
        let content = CellContent::new("stone")
            .amount(200)
            .named("Stone")
            .lore("line")
            .flags(ItemFlags::GLINT);
        assert_eq!(content.amount, 99, "amount should clamp to 99");
        assert_eq!(content.name.as_deref(), Some("Stone"));
        assert_eq!(content.lore, vec!["line".to_string()]);
        assert!(content.flags.contains(ItemFlags::GLINT));
    }

    #[test]
    fn test_action_mask_accepts() {
        assert!(ActionMask::ANY_CLICK.accepts(ActionKind::ShiftRight));
        assert!(!ActionMask::ANY_CLICK.accepts(ActionKind::Drop));
        assert!(ActionMask::NUMBER_KEY.accepts(ActionKind::NumberKey(3)));
        assert!(ActionKind::ShiftLeft.is_shift());
        assert!(!ActionKind::Left.is_shift());
    }
}
