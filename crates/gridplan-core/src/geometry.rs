//! Grid geometry: positions, grid bounds, footprints, rotation, and belt
//! directions.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Positions and bounds
// ---------------------------------------------------------------------------

/// A cell on the grid, addressed by column and row.
///
/// Ordered row-major so that `BTreeMap` range scans walk rows top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub col: i32,
    pub row: i32,
}

impl GridPosition {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        let dc = (self.col as i64 - other.col as i64).unsigned_abs();
        let dr = (self.row as i64 - other.row as i64).unsigned_abs();
        (dc + dr).min(u32::MAX as u64) as u32
    }

    /// True when `other` shares an edge with this cell.
    pub fn is_adjacent(&self, other: &GridPosition) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The neighbouring cell one step in `dir`, saturating at the `i32` edge.
    pub fn step(&self, dir: Direction) -> GridPosition {
        let (dc, dr) = dir.offset();
        GridPosition::new(self.col.saturating_add(dc), self.row.saturating_add(dr))
    }
}

impl Ord for GridPosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

impl PartialOrd for GridPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Dimensions of the editable grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub cols: u32,
    pub rows: u32,
}

impl GridSize {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// Whether `pos` lies in `[0, cols) x [0, rows)`.
    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as i64) < self.cols as i64
            && (pos.row as i64) < self.rows as i64
    }

    /// Whether a footprint anchored at `origin` fits entirely on the grid.
    pub fn contains_footprint(&self, origin: GridPosition, footprint: Footprint) -> bool {
        origin.col >= 0
            && origin.row >= 0
            && origin.col as i64 + footprint.width as i64 <= self.cols as i64
            && origin.row as i64 + footprint.height as i64 <= self.rows as i64
    }

    /// Clip an inclusive rectangle to the grid. `None` if nothing remains.
    pub fn clip(&self, rect: CellRect) -> Option<CellRect> {
        if self.cols == 0 || self.rows == 0 {
            return None;
        }
        let max_col = self.cols as i64 - 1;
        let max_row = self.rows as i64 - 1;
        let min = GridPosition::new(rect.min.col.max(0), rect.min.row.max(0));
        let max = GridPosition::new(
            (rect.max.col as i64).min(max_col) as i32,
            (rect.max.row as i64).min(max_row) as i32,
        );
        if min.col > max.col || min.row > max.row {
            return None;
        }
        Some(CellRect { min, max })
    }
}

/// An axis-aligned rectangle of cells, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub min: GridPosition,
    pub max: GridPosition,
}

impl CellRect {
    pub fn new(min: GridPosition, max: GridPosition) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.col >= self.min.col
            && pos.col <= self.max.col
            && pos.row >= self.min.row
            && pos.row <= self.max.row
    }

    pub fn width(&self) -> u32 {
        (self.max.col as i64 - self.min.col as i64 + 1).clamp(0, u32::MAX as i64) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max.row as i64 - self.min.row as i64 + 1).clamp(0, u32::MAX as i64) as u32
    }

    /// Iterate cells row-major.
    pub fn cells(self) -> impl Iterator<Item = GridPosition> {
        let CellRect { min, max } = self;
        (min.row..=max.row)
            .flat_map(move |r| (min.col..=max.col).map(move |c| GridPosition::new(c, r)))
    }
}

// ---------------------------------------------------------------------------
// Footprints
// ---------------------------------------------------------------------------

/// Width x height of an entity on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A 1x1 footprint (pipeline cells and elements).
    pub const fn single() -> Self {
        Self::new(1, 1)
    }

    /// Footprint swapped for quarter turns.
    ///
    /// Occupancy does not call this: device rotation is cosmetic and the
    /// unrotated box is what blocks cells.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::None | Rotation::Cw180 => *self,
            Rotation::Cw90 | Rotation::Cw270 => Self::new(self.height, self.width),
        }
    }

    /// Offsets `(dc, dr)` from the anchor, row-major.
    pub fn offsets(self) -> impl Iterator<Item = (i32, i32)> {
        let w = self.width as i32;
        let h = self.height as i32;
        (0..h).flat_map(move |dr| (0..w).map(move |dc| (dc, dr)))
    }

    /// Iterate over all tiles occupied at the given top-left origin. Tiles
    /// past the `i32` coordinate range do not exist and are skipped.
    pub fn tiles(self, origin: GridPosition) -> impl Iterator<Item = GridPosition> {
        self.offsets().filter_map(move |(dc, dr)| {
            Some(GridPosition::new(
                origin.col.checked_add(dc)?,
                origin.row.checked_add(dr)?,
            ))
        })
    }

    /// Whether a footprint anchored at `origin` covers `pos`.
    pub fn covers(&self, origin: GridPosition, pos: GridPosition) -> bool {
        pos.col >= origin.col
            && pos.row >= origin.row
            && (pos.col as i64) < origin.col as i64 + self.width as i64
            && (pos.row as i64) < origin.row as i64 + self.height as i64
    }

    /// The centre cell used for power projection: `origin + (w/2, h/2)`.
    pub fn center(&self, origin: GridPosition) -> GridPosition {
        GridPosition::new(
            origin.col.saturating_add((self.width / 2) as i32),
            origin.row.saturating_add((self.height / 2) as i32),
        )
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Quarter-turn rotation of a device or element. Serialized as degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn all() -> [Rotation; 4] {
        [Rotation::None, Rotation::Cw90, Rotation::Cw180, Rotation::Cw270]
    }

    /// Rotate 90 degrees clockwise, wrapping 270 back to 0.
    pub fn rotate_cw(self) -> Self {
        match self {
            Rotation::None => Rotation::Cw90,
            Rotation::Cw90 => Rotation::Cw180,
            Rotation::Cw180 => Rotation::Cw270,
            Rotation::Cw270 => Rotation::None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

/// A rotation value that is not one of 0, 90, 180, 270.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid rotation {0}, expected 0, 90, 180 or 270")]
pub struct InvalidRotation(pub u16);

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Cw90),
            180 => Ok(Rotation::Cw180),
            270 => Ok(Rotation::Cw270),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        rotation.degrees()
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Flow direction of a pipeline cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left]
    }

    /// Offset `(dc, dr)` for one step in this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Direction of travel from `from` towards `to`.
    ///
    /// Column changes win over row changes; equal positions yield `Up`.
    pub fn between(from: GridPosition, to: GridPosition) -> Direction {
        if to.col > from.col {
            Direction::Right
        } else if to.col < from.col {
            Direction::Left
        } else if to.row > from.row {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}
