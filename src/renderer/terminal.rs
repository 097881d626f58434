//! Terminal host - draws a menu grid with crossterm and reads clicks back.
//!
//! Each grid cell is a 3-column glyph (initial + stack size) followed by
//! one column of spacing, under a one-line title:
//!
//! ```text
//! Counter
//! E 5  ·   ·
//!  ·  A    ·
//! ```
//!
//! # API
//!
//! - `TerminalGrid` - a [`GridSurface`] over any `io::Write`
//! - `ScreenMapper::convert_mouse_event` - crossterm mouse event to `RawEvent`
//! - `convert_action` - button + modifiers to `ActionKind`
//! - `poll_input` - non-blocking read of the next relevant input
//! - `enter_terminal` / `leave_terminal` - raw mode, alt screen, mouse capture
//!
//! # Example
//!
//! ```ignore
//! enter_terminal()?;
//! let mapper = ScreenMapper::new((0, 0), config.size);
//! let menu = Menu::open(root, config, TerminalGrid::stdout())?;
//! loop {
//!     match poll_input(&mapper, Duration::from_millis(50))? {
//!         Some(TerminalInput::Event(event)) => { menu.dispatch(event)?; }
//!         Some(TerminalInput::Quit) => break,
//!         None => {}
//!     }
//! }
//! leave_terminal()?;
//! ```

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers, MouseButton as CrosstermMouseButton,
    MouseEvent as CrosstermMouseEvent, MouseEventKind,
};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::surface::GridSurface;
use crate::error::HostError;
use crate::pipeline::{EventTarget, RawEvent};
use crate::types::{ActionKind, CellContent, GridSize, ItemFlags, Position};

/// Screen columns taken by one grid cell.
pub const CELL_WIDTH: u16 = 4;

const EMPTY_GLYPH: &str = " · ";

// =============================================================================
// Geometry
// =============================================================================

/// Maps screen coordinates to grid positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenMapper {
    origin: (u16, u16),
    size: GridSize,
}

impl ScreenMapper {
    /// Geometry of a grid of `size` whose title sits at `origin`.
    pub fn new(origin: (u16, u16), size: GridSize) -> Self {
        Self { origin, size }
    }

    /// Top-left screen cell of grid cell `position`, clamped to the
    /// terminal coordinate range.
    pub fn screen_of(&self, position: Position) -> (u16, u16) {
        (
            self.origin.0.saturating_add(position.x.saturating_mul(CELL_WIDTH)),
            self.origin.1.saturating_add(1).saturating_add(position.y),
        )
    }

    /// Grid position under screen cell (`column`, `row`).
    pub fn position_at(&self, column: u16, row: u16) -> Option<Position> {
        let dx = column.checked_sub(self.origin.0)?;
        let dy = row.checked_sub(self.origin.1.checked_add(1)?)?;
        let position = Position::new(dx / CELL_WIDTH, dy);
        self.size.contains(position).then_some(position)
    }

    /// Convert a crossterm mouse event. Only button presses become events.
    pub fn convert_mouse_event(&self, event: CrosstermMouseEvent) -> Option<RawEvent> {
        let MouseEventKind::Down(button) = event.kind else {
            return None;
        };
        let action = convert_action(button, event.modifiers);
        let target = match self.position_at(event.column, event.row) {
            Some(position) => EventTarget::Cell(position),
            None => EventTarget::Outside,
        };
        Some(RawEvent { target, action })
    }
}

/// Convert a button press plus modifiers to an action kind.
pub fn convert_action(button: CrosstermMouseButton, modifiers: KeyModifiers) -> ActionKind {
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    match button {
        CrosstermMouseButton::Left if shift => ActionKind::ShiftLeft,
        CrosstermMouseButton::Left => ActionKind::Left,
        CrosstermMouseButton::Right if shift => ActionKind::ShiftRight,
        CrosstermMouseButton::Right => ActionKind::Right,
        CrosstermMouseButton::Middle => ActionKind::Middle,
    }
}

/// Three-column glyph for a cell.
pub fn glyph(content: &CellContent) -> String {
    let label = content.name.as_deref().unwrap_or(&content.material);
    let initial = label
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?');
    if content.amount > 1 {
        format!("{initial}{:>2}", content.amount)
    } else {
        format!("{initial}  ")
    }
}

// =============================================================================
// TerminalGrid
// =============================================================================

/// Grid surface drawing into a terminal.
pub struct TerminalGrid<W: Write = Stdout> {
    out: W,
    mapper: ScreenMapper,
}

impl TerminalGrid<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalGrid<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            mapper: ScreenMapper::new((0, 0), GridSize::default()),
        }
    }

    /// Draw the title at (`column`, `row`) and the grid below it.
    pub fn with_origin(mut self, column: u16, row: u16) -> Self {
        self.mapper.origin = (column, row);
        self
    }

    /// Current geometry. The size is only known once the grid was opened.
    pub fn mapper(&self) -> ScreenMapper {
        self.mapper
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, position: Position, text: &str, bold: bool) -> io::Result<()> {
        let (column, row) = self.mapper.screen_of(position);
        queue!(self.out, MoveTo(column, row))?;
        if bold {
            queue!(self.out, SetAttribute(Attribute::Bold), Print(text), SetAttribute(Attribute::Reset))?;
        } else {
            queue!(self.out, Print(text))?;
        }
        self.out.flush()
    }
}

impl<W: Write> GridSurface for TerminalGrid<W> {
    fn open(&mut self, size: GridSize, title: &str) -> Result<(), HostError> {
        self.mapper.size = size;
        let (column, row) = self.mapper.origin;
        queue!(self.out, Clear(ClearType::All), MoveTo(column, row), Print(title))?;
        for position in size.positions() {
            let (column, row) = self.mapper.screen_of(position);
            queue!(self.out, MoveTo(column, row), Print(EMPTY_GLYPH))?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn set_cell(&mut self, position: Position, content: &CellContent) -> Result<(), HostError> {
        if !self.mapper.size.contains(position) {
            return Err(HostError::Rejected {
                position,
                reason: "outside the drawn grid".into(),
            });
        }
        let bold = content.flags.contains(ItemFlags::GLINT);
        self.draw(position, &glyph(content), bold)?;
        Ok(())
    }

    fn clear_cell(&mut self, position: Position) -> Result<(), HostError> {
        self.draw(position, EMPTY_GLYPH, false)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), HostError> {
        let below = self.mapper.origin.1 + 1 + self.mapper.size.height;
        queue!(self.out, MoveTo(0, below))?;
        self.out.flush()?;
        Ok(())
    }
}

// =============================================================================
// Input
// =============================================================================

/// Input relevant to a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalInput {
    Event(RawEvent),
    /// Esc, `q`, or Ctrl+C.
    Quit,
}

fn convert_key_event(event: KeyEvent) -> Option<TerminalInput> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(TerminalInput::Quit),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TerminalInput::Quit)
        }
        _ => None,
    }
}

/// Poll for input with timeout.
///
/// Returns `Ok(None)` when nothing relevant arrived in time.
pub fn poll_input(mapper: &ScreenMapper, timeout: Duration) -> io::Result<Option<TerminalInput>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(match event::read()? {
        CrosstermEvent::Mouse(mouse) => mapper.convert_mouse_event(mouse).map(TerminalInput::Event),
        CrosstermEvent::Key(key) => convert_key_event(key),
        _ => None,
    })
}

/// Raw mode, alternate screen, hidden cursor, mouse capture.
pub fn enter_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)
}

/// Undo [`enter_terminal`].
pub fn leave_terminal() -> io::Result<()> {
    execute!(io::stdout(), DisableMouseCapture, Show, LeaveAlternateScreen)?;
    disable_raw_mode()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> TerminalGrid<Vec<u8>> {
        let mut grid = TerminalGrid::new(Vec::new()).with_origin(2, 1);
        grid.open(GridSize::new(3, 2), "Shop").unwrap();
        grid
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16, modifiers: KeyModifiers) -> CrosstermMouseEvent {
        CrosstermMouseEvent {
            kind,
            column,
            row,
            modifiers,
        }
    }

    #[test]
    fn test_wide_grid_mapping_saturates() {
        let mapper = ScreenMapper::new((10, u16::MAX), GridSize::new(20_000, 1));
        assert_eq!(mapper.screen_of(Position::new(19_999, 0)), (u16::MAX, u16::MAX));
        assert_eq!(mapper.screen_of(Position::new(2, 0)), (18, u16::MAX));
        assert_eq!(mapper.position_at(18, u16::MAX), None, "title row is off screen");
    }

    #[test]
    fn test_position_mapping() {
        let mapper = opened().mapper();
        assert_eq!(mapper.screen_of(Position::new(1, 1)), (6, 3));
        assert_eq!(mapper.position_at(6, 3), Some(Position::new(1, 1)));
        assert_eq!(mapper.position_at(9, 3), Some(Position::new(1, 1)), "whole cell width maps");
        assert_eq!(mapper.position_at(1, 3), None, "left of the grid");
        assert_eq!(mapper.position_at(2, 1), None, "title row");
        assert_eq!(mapper.position_at(14, 2), None, "right of the grid");
    }

    #[test]
    fn test_convert_mouse_down_inside() {
        let mapper = opened().mapper();
        let event = mapper
            .convert_mouse_event(mouse(
                MouseEventKind::Down(CrosstermMouseButton::Left),
                2,
                2,
                KeyModifiers::empty(),
            ))
            .unwrap();
        assert_eq!(event.target, EventTarget::Cell(Position::new(0, 0)));
        assert_eq!(event.action, ActionKind::Left);
    }

    #[test]
    fn test_convert_mouse_down_outside() {
        let mapper = opened().mapper();
        let event = mapper
            .convert_mouse_event(mouse(
                MouseEventKind::Down(CrosstermMouseButton::Right),
                40,
                20,
                KeyModifiers::empty(),
            ))
            .unwrap();
        assert_eq!(event.target, EventTarget::Outside);
        assert_eq!(event.action, ActionKind::Right);
    }

    #[test]
    fn test_convert_ignores_non_press() {
        let mapper = opened().mapper();
        for kind in [
            MouseEventKind::Up(CrosstermMouseButton::Left),
            MouseEventKind::Moved,
            MouseEventKind::ScrollDown,
            MouseEventKind::Drag(CrosstermMouseButton::Left),
        ] {
            assert!(mapper.convert_mouse_event(mouse(kind, 2, 2, KeyModifiers::empty())).is_none());
        }
    }

    #[test]
    fn test_convert_action_modifiers() {
        assert_eq!(convert_action(CrosstermMouseButton::Left, KeyModifiers::SHIFT), ActionKind::ShiftLeft);
        assert_eq!(
            convert_action(CrosstermMouseButton::Right, KeyModifiers::SHIFT | KeyModifiers::CONTROL),
            ActionKind::ShiftRight
        );
        assert_eq!(convert_action(CrosstermMouseButton::Right, KeyModifiers::CONTROL), ActionKind::Right);
        assert_eq!(convert_action(CrosstermMouseButton::Middle, KeyModifiers::SHIFT), ActionKind::Middle);
    }

    #[test]
    fn test_glyph() {
        assert_eq!(glyph(&CellContent::new("emerald").amount(5)), "E 5");
        assert_eq!(glyph(&CellContent::new("stone").named("gold")), "G  ");
        assert_eq!(glyph(&CellContent::new("---")), "?  ");
        assert_eq!(glyph(&CellContent::new("x").amount(64)), "X64");
    }

    #[test]
    fn test_set_cell_writes_glyph() {
        let mut grid = opened();
        grid.set_cell(Position::new(0, 0), &CellContent::new("diamond").amount(3)).unwrap();
        let out = String::from_utf8(grid.into_inner()).unwrap();
        assert!(out.contains("Shop"), "title drawn on open");
        assert!(out.contains("D 3"), "glyph drawn on set");
    }

    #[test]
    fn test_set_cell_outside_rejected() {
        let mut grid = opened();
        let err = grid.set_cell(Position::new(3, 0), &CellContent::new("stone")).unwrap_err();
        assert!(matches!(err, HostError::Rejected { .. }));
    }

    #[test]
    fn test_quit_keys() {
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::empty());
        assert_eq!(convert_key_event(esc), Some(TerminalInput::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(convert_key_event(ctrl_c), Some(TerminalInput::Quit));
        let a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty());
        assert_eq!(convert_key_event(a), None);
    }
}
