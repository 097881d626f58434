//! Differential grid renderer.
//!
//! The DiffRenderer keeps a mirror of what the host currently shows and
//! turns a desired frame into the fewest host calls that reach it.
//!
//! # Algorithm
//!
//! 1. For each position in document order (first appearance wins the slot
//!    in the sequence): if the desired content differs from the mirror,
//!    emit `Set`
//! 2. For each position in row-major order: if the mirror shows something
//!    and the desired frame is empty there, emit `Clear`
//! 3. Apply mutations one by one, updating the mirror after each success.
//!    The first host failure stops the pass; the mirror still matches the
//!    host afterwards, so the next pass repairs the difference.

use crate::error::{HostError, MenuError, Result};
use crate::types::{CellContent, GridSize, Position};

use super::surface::GridSurface;

// =============================================================================
// Mutations
// =============================================================================

/// One host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridMutation {
    Set { position: Position, content: CellContent },
    Clear { position: Position },
}

impl GridMutation {
    pub fn position(&self) -> Position {
        match self {
            Self::Set { position, .. } | Self::Clear { position } => *position,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set { .. })
    }

    /// Issue this mutation against `surface`.
    pub fn apply<S: GridSurface + ?Sized>(&self, surface: &mut S) -> std::result::Result<(), HostError> {
        match self {
            Self::Set { position, content } => surface.set_cell(*position, content),
            Self::Clear { position } => surface.clear_cell(*position),
        }
    }
}

// =============================================================================
// Frame
// =============================================================================

/// Full contents of a grid: at most one item per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFrame {
    size: GridSize,
    cells: Vec<Option<CellContent>>,
}

impl GridFrame {
    /// Empty frame.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cell_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn get(&self, position: Position) -> Option<&CellContent> {
        self.size
            .index_of(position)
            .and_then(|i| self.cells[i].as_ref())
    }

    /// Put `content` at `position`, returning what was there.
    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, position: Position, content: CellContent) -> Option<CellContent> {
        let i = self.size.index_of(position)?;
        self.cells[i].replace(content)
    }

    pub fn clear(&mut self, position: Position) -> Option<CellContent> {
        let i = self.size.index_of(position)?;
        self.cells[i].take()
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, &CellContent)> + '_ {
        let width = self.size.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.as_ref().map(|c| (Position::from_index(i, width), c)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Record a mutation as applied.
    pub fn apply(&mut self, mutation: &GridMutation) {
        match mutation {
            GridMutation::Set { position, content } => {
                self.set(*position, content.clone());
            }
            GridMutation::Clear { position } => {
                self.clear(*position);
            }
        }
    }
}

/// Fast content equality check.
#[inline]
fn cells_equal(a: Option<&CellContent>, b: Option<&CellContent>) -> bool {
    a == b
}

// =============================================================================
// DiffRenderer
// =============================================================================

/// Differential renderer for one menu.
///
/// Keeps the mirror of the host grid. Only cells that differ from it are
/// written.
#[derive(Debug, Clone)]
pub struct DiffRenderer {
    previous: GridFrame,
}

impl DiffRenderer {
    /// A renderer whose host grid starts empty.
    pub fn new(size: GridSize) -> Self {
        Self {
            previous: GridFrame::new(size),
        }
    }

    /// What the host shows right now, as far as applied calls go.
    pub fn previous(&self) -> &GridFrame {
        &self.previous
    }

    /// Mutations taking the host from the mirror to `next`.
    ///
    /// `order` lists positions in document order; `Set` calls follow it.
    pub fn plan(&self, next: &GridFrame, order: &[Position]) -> Vec<GridMutation> {
        let size = self.previous.size();
        let mut visited = vec![false; size.cell_count()];
        let mut mutations = Vec::new();

        for &position in order {
            let Some(i) = size.index_of(position) else { continue };
            if std::mem::replace(&mut visited[i], true) {
                continue;
            }
            if let Some(content) = next.get(position) {
                if !cells_equal(self.previous.get(position), Some(content)) {
                    mutations.push(GridMutation::Set {
                        position,
                        content: content.clone(),
                    });
                }
            }
        }

        for (position, _) in self.previous.occupied() {
            if next.get(position).is_none() {
                mutations.push(GridMutation::Clear { position });
            }
        }

        mutations
    }

    /// Apply `mutations` in order.
    ///
    /// Returns how many were applied. On host failure the error carries the
    /// applied count and the remaining mutations are not attempted.
    pub fn apply<S: GridSurface + ?Sized>(
        &mut self,
        mutations: &[GridMutation],
        surface: &mut S,
    ) -> Result<usize> {
        for (applied, mutation) in mutations.iter().enumerate() {
            if let Err(source) = mutation.apply(surface) {
                log::warn!(
                    "host rejected {} at {:?} after {applied} mutations",
                    if mutation.is_set() { "set" } else { "clear" },
                    mutation.position()
                );
                return Err(MenuError::Host { applied, source });
            }
            self.previous.apply(mutation);
        }
        Ok(mutations.len())
    }

    /// Clear every occupied cell on the host.
    pub fn clear_all<S: GridSurface + ?Sized>(&mut self, surface: &mut S) -> Result<usize> {
        let empty = GridFrame::new(self.previous.size());
        let mutations = self.plan(&empty, &[]);
        self.apply(&mutations, surface)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MemoryGrid;

    fn stone() -> CellContent {
        CellContent::new("stone")
    }

    #[test]
    fn test_frame_set_and_clear() {
        let mut frame = GridFrame::new(GridSize::new(3, 1));
        assert!(frame.is_empty());
        assert_eq!(frame.set(Position::new(1, 0), stone()), None);
        assert_eq!(frame.get(Position::new(1, 0)), Some(&stone()));
        assert_eq!(frame.set(Position::new(5, 0), stone()), None, "out of bounds ignored");
        assert_eq!(frame.occupied_count(), 1);
        assert_eq!(frame.clear(Position::new(1, 0)), Some(stone()));
        assert!(frame.is_empty());
    }

    #[test]
    fn test_plan_sets_in_document_order_then_clears() {
        let size = GridSize::new(3, 1);
        let mut renderer = DiffRenderer::new(size);
        let mut host = MemoryGrid::new(size);

        let mut first = GridFrame::new(size);
        first.set(Position::new(0, 0), stone());
        first.set(Position::new(1, 0), stone());
        let order = [Position::new(1, 0), Position::new(0, 0)];
        let plan = renderer.plan(&first, &order);
        assert_eq!(plan.iter().map(GridMutation::position).collect::<Vec<_>>(), order.to_vec());
        renderer.apply(&plan, &mut host).unwrap();

        let mut second = GridFrame::new(size);
        second.set(Position::new(2, 0), stone());
        let plan = renderer.plan(&second, &[Position::new(2, 0)]);
        assert_eq!(
            plan,
            vec![
                GridMutation::Set { position: Position::new(2, 0), content: stone() },
                GridMutation::Clear { position: Position::new(0, 0) },
                GridMutation::Clear { position: Position::new(1, 0) },
            ]
        );
    }

    #[test]
    fn test_unchanged_frame_plans_nothing() {
        let size = GridSize::new(2, 2);
        let mut renderer = DiffRenderer::new(size);
        let mut host = MemoryGrid::new(size);
        let mut frame = GridFrame::new(size);
        frame.set(Position::new(1, 1), stone());
        let order = [Position::new(1, 1)];

        let plan = renderer.plan(&frame, &order);
        renderer.apply(&plan, &mut host).unwrap();
        assert!(renderer.plan(&frame, &order).is_empty());
    }

    #[test]
    fn test_host_failure_stops_and_keeps_mirror_honest() {
        let size = GridSize::new(3, 1);
        let mut renderer = DiffRenderer::new(size);
        let mut host = MemoryGrid::new(size);
        host.reject_at(Position::new(1, 0));

        let mut frame = GridFrame::new(size);
        for x in 0..3 {
            frame.set(Position::new(x, 0), stone());
        }
        let order: Vec<_> = (0..3).map(|x| Position::new(x, 0)).collect();
        let plan = renderer.plan(&frame, &order);

        match renderer.apply(&plan, &mut host) {
            Err(MenuError::Host { applied, .. }) => assert_eq!(applied, 1),
            other => panic!("expected host error, got {other:?}"),
        }
        assert_eq!(renderer.previous().occupied_count(), 1, "only the applied call is mirrored");
        assert_eq!(renderer.previous(), &host.frame());
    }

    #[test]
    fn test_clear_all() {
        let size = GridSize::new(2, 1);
        let mut renderer = DiffRenderer::new(size);
        let mut host = MemoryGrid::new(size);
        let mut frame = GridFrame::new(size);
        frame.set(Position::new(0, 0), stone());
        let plan = renderer.plan(&frame, &[Position::new(0, 0)]);
        renderer.apply(&plan, &mut host).unwrap();

        assert_eq!(renderer.clear_all(&mut host).unwrap(), 1);
        assert!(host.frame().is_empty());
        assert!(renderer.previous().is_empty());
    }
}
