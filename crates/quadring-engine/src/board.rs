//! The 4×4 grid, ring sets, and line detection.

use std::fmt;

use quadring_protocol::{Position, RingType};

/// Width and height of the board.
pub const BOARD_SIZE: usize = 4;

const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

// ---------------------------------------------------------------------------
// RingSet
// ---------------------------------------------------------------------------

/// The colors present on one cell: a 3-bit set.
///
/// Two cells "match" for line detection only when their sets are equal,
/// so `{Red}` and `{Red, Green}` are different even though both contain
/// red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RingSet(u8);

impl RingSet {
    pub const EMPTY: RingSet = RingSet(0);

    fn bit(ring: RingType) -> u8 {
        match ring {
            RingType::Red => 0b001,
            RingType::Green => 0b010,
            RingType::Blue => 0b100,
        }
    }

    pub fn contains(self, ring: RingType) -> bool {
        self.0 & Self::bit(ring) != 0
    }

    /// Adds `ring`. Returns `false` if it was already present.
    pub fn insert(&mut self, ring: RingType) -> bool {
        let had = self.contains(ring);
        self.0 |= Self::bit(ring);
        !had
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Colors in the set, in [`RingType::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = RingType> {
        RingType::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl FromIterator<RingType> for RingSet {
    fn from_iter<I: IntoIterator<Item = RingType>>(iter: I) -> Self {
        let mut set = RingSet::EMPTY;
        for ring in iter {
            set.insert(ring);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One grid position and the rings on it.
///
/// Cells are created with the board and only change through
/// [`Board::insert_ring`] and [`Board::move_content`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    rings: RingSet,
}

impl Cell {
    fn new(position: Position) -> Self {
        Self {
            position,
            rings: RingSet::EMPTY,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rings(&self) -> RingSet {
        self.rings
    }

    pub fn has_ring(&self, ring: RingType) -> bool {
        self.rings.contains(ring)
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub(crate) fn insert(&mut self, ring: RingType) -> bool {
        self.rings.insert(ring)
    }

    pub(crate) fn set_rings(&mut self, rings: RingSet) {
        self.rings = rings;
    }

    pub(crate) fn clear(&mut self) {
        self.rings = RingSet::EMPTY;
    }
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// Which of the ten lines of the board a [`Line`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Row(u8),
    Column(u8),
    /// `(0,0)` to `(3,3)`.
    MainDiagonal,
    /// `(3,0)` to `(0,3)`.
    AntiDiagonal,
}

/// Four positions in a straight line across the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    pub kind: LineKind,
    pub cells: [Position; BOARD_SIZE],
}

impl Line {
    pub fn row(row: u8) -> Self {
        Self {
            kind: LineKind::Row(row),
            cells: std::array::from_fn(|col| Position::new(row, col as u8)),
        }
    }

    pub fn column(col: u8) -> Self {
        Self {
            kind: LineKind::Column(col),
            cells: std::array::from_fn(|row| Position::new(row as u8, col)),
        }
    }

    pub fn main_diagonal() -> Self {
        Self {
            kind: LineKind::MainDiagonal,
            cells: std::array::from_fn(|i| Position::new(i as u8, i as u8)),
        }
    }

    pub fn anti_diagonal() -> Self {
        let last = (BOARD_SIZE - 1) as u8;
        Self {
            kind: LineKind::AntiDiagonal,
            cells: std::array::from_fn(|i| Position::new(last - i as u8, i as u8)),
        }
    }

    /// All ten lines in scan order: rows, then columns, then the main
    /// and anti diagonals.
    pub fn all() -> impl Iterator<Item = Line> {
        let size = BOARD_SIZE as u8;
        (0..size)
            .map(Line::row)
            .chain((0..size).map(Line::column))
            .chain([Line::main_diagonal(), Line::anti_diagonal()])
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The 4×4 grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|i| {
                Cell::new(Position::new(
                    (i / BOARD_SIZE) as u8,
                    (i % BOARD_SIZE) as u8,
                ))
            }),
        }
    }

    /// Returns `true` if `pos` lies on the grid.
    pub fn contains(pos: Position) -> bool {
        (pos.row as usize) < BOARD_SIZE && (pos.col as usize) < BOARD_SIZE
    }

    fn index(pos: Position) -> Option<usize> {
        Self::contains(pos)
            .then(|| pos.row as usize * BOARD_SIZE + pos.col as usize)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        Self::index(pos).map(|i| &self.cells[i])
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        Self::index(pos).map(move |i| &mut self.cells[i])
    }

    /// All sixteen cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn rows(&self) -> [Line; BOARD_SIZE] {
        std::array::from_fn(|i| Line::row(i as u8))
    }

    pub fn columns(&self) -> [Line; BOARD_SIZE] {
        std::array::from_fn(|i| Line::column(i as u8))
    }

    pub fn diagonals(&self) -> [Line; 2] {
        [Line::main_diagonal(), Line::anti_diagonal()]
    }

    /// Line-of-sight check for sliding the content of `origin` onto
    /// `destination`.
    ///
    /// Legal iff both positions are on the board and distinct, the
    /// destination is empty, the displacement is horizontal, vertical, or
    /// a perfect diagonal, and every cell strictly between the two is
    /// empty. Whether the origin holds anything is [`Board::move_content`]'s
    /// concern.
    pub fn can_move_to(&self, origin: Position, destination: Position) -> bool {
        if origin == destination {
            return false;
        }
        let Some(target) = self.cell(destination) else {
            return false;
        };
        if !Self::contains(origin) || !target.is_empty() {
            return false;
        }

        let dr = destination.row as i8 - origin.row as i8;
        let dc = destination.col as i8 - origin.col as i8;
        if !(dr == 0 || dc == 0 || dr.abs() == dc.abs()) {
            return false;
        }

        let steps = dr.abs().max(dc.abs());
        let (step_r, step_c) = (dr.signum(), dc.signum());
        (1..steps).all(|i| {
            let between = Position::new(
                (origin.row as i8 + i * step_r) as u8,
                (origin.col as i8 + i * step_c) as u8,
            );
            self.cell(between).is_some_and(Cell::is_empty)
        })
    }

    /// Every position the content of `origin` could slide to. Empty when
    /// `origin` is empty or off the board.
    pub fn legal_destinations(&self, origin: Position) -> Vec<Position> {
        match self.cell(origin) {
            Some(cell) if !cell.is_empty() => self
                .cells
                .iter()
                .map(Cell::position)
                .filter(|dest| self.can_move_to(origin, *dest))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Places `ring` on `pos`.
    ///
    /// Fails without touching the board if `pos` is off the grid or the
    /// cell already holds that color. Other colors on the cell don't
    /// matter.
    pub fn insert_ring(&mut self, pos: Position, ring: RingType) -> bool {
        match self.cell_mut(pos) {
            Some(cell) => cell.insert(ring),
            None => false,
        }
    }

    /// Slides the whole ring set from `origin` to `destination` and
    /// clears `origin`. All or nothing.
    pub fn move_content(&mut self, origin: Position, destination: Position) -> bool {
        let rings = match self.cell(origin) {
            Some(cell) if !cell.is_empty() => cell.rings(),
            _ => return false,
        };
        if !self.can_move_to(origin, destination) {
            return false;
        }

        // Both positions were validated by can_move_to.
        if let Some(target) = self.cell_mut(destination) {
            target.set_rings(rings);
        }
        if let Some(source) = self.cell_mut(origin) {
            source.clear();
        }
        true
    }

    /// The first line, in [`Line::all`] order, whose four cells hold the
    /// same non-empty ring set.
    pub fn check_end_condition(&self) -> Option<Line> {
        Line::all().find(|line| {
            let mut sets = line
                .cells
                .iter()
                .map(|pos| self.cell(*pos).map_or(RingSet::EMPTY, Cell::rings));
            let Some(first) = sets.next() else {
                return false;
            };
            !first.is_empty() && sets.all(|s| s == first)
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Text grid, one `[RGB]` slot per cell:
///
/// ```text
///   0     1     2     3
/// 0 [R  ] [   ] [ GB] [   ]
/// ```
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ")?;
        for col in 0..BOARD_SIZE {
            let gap = if col == 0 { " " } else { "     " };
            write!(f, "{gap}{col}")?;
        }
        writeln!(f)?;

        for row in 0..BOARD_SIZE {
            write!(f, "{row}")?;
            for col in 0..BOARD_SIZE {
                let rings = self
                    .cell(Position::new(row as u8, col as u8))
                    .map_or(RingSet::EMPTY, Cell::rings);
                let slot = |ring: RingType, letter: char| {
                    if rings.contains(ring) { letter } else { ' ' }
                };
                write!(
                    f,
                    " [{}{}{}]",
                    slot(RingType::Red, 'R'),
                    slot(RingType::Green, 'G'),
                    slot(RingType::Blue, 'B'),
                )?;
            }
            if row + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
