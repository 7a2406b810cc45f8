/*
Walkability grids.

`Map` is the contract a pathfinder needs from a dungeon map: dimensions, a
bounds-checked cell lookup and neighbour enumeration. `GridMap` is the plain
in-memory implementation, readable from and printable to a text form with one
line per row ('.' walkable, '#' blocked).
*/

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const WALKABLE: char = '.';
pub const BLOCKED: char = '#';

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub is_walkable: bool,
}

impl Cell {
    pub fn new(x: usize, y: usize, is_walkable: bool) -> Self {
        Self { x, y, is_walkable }
    }
}

pub trait Map {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// The cell at `(x, y)`, or `None` outside the map.
    fn cell(&self, x: usize, y: usize) -> Option<Cell>;

    /// Every cell, row by row.
    fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.width() * self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                if let Some(cell) = self.cell(x, y) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Cells within Chebyshev distance `radius` of `(x, y)`, excluding the
    /// center itself, clipped to the map and listed row by row.
    fn cells_in_radius(&self, x: usize, y: usize, radius: usize) -> Vec<Cell> {
        let x_min = x.saturating_sub(radius);
        let y_min = y.saturating_sub(radius);
        let x_max = x.saturating_add(radius).min(self.width().saturating_sub(1));
        let y_max = y.saturating_add(radius).min(self.height().saturating_sub(1));

        let mut cells = Vec::new();
        for ny in y_min..=y_max {
            for nx in x_min..=x_max {
                if nx == x && ny == y {
                    continue;
                }
                if let Some(cell) = self.cell(nx, ny) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    walkable: Vec<bool>,
}

impl GridMap {
    /// A map where every cell is blocked.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, false)
    }

    pub fn filled(width: usize, height: usize, walkable: bool) -> Self {
        Self {
            width,
            height,
            walkable: vec![walkable; width * height],
        }
    }

    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(|cell| cell.is_walkable)
    }

    pub fn set_walkable(&mut self, x: usize, y: usize, walkable: bool) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::CellOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.walkable[y * self.width + x] = walkable;
        Ok(())
    }
}

impl Map for GridMap {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Cell::new(x, y, self.walkable[y * self.width + x]))
    }
}

impl FromStr for GridMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s.trim_end().lines().map(|line| line.trim_end_matches('\r')).collect();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(Error::EmptyMap);
        }

        let mut walkable = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(Error::RaggedMap {
                    line: y + 1,
                    expected: width,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    WALKABLE => walkable.push(true),
                    BLOCKED => walkable.push(false),
                    found => {
                        return Err(Error::MapParse {
                            line: y + 1,
                            column: x + 1,
                            found,
                        })
                    }
                }
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            walkable,
        })
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.walkable.chunks(self.width.max(1)) {
            for &walkable in row {
                write!(f, "{}", if walkable { WALKABLE } else { BLOCKED })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
