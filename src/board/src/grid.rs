// src/board/src/grid.rs
//! Brick/offset grid topology. Rows are staggered like brick courses, so
//! the six neighbor deltas depend on row parity; this is not a square
//! grid and not quite a hex grid either.

use bincode::{Decode, Encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Brick-grid coordinate. Rows greater than zero are the front of the
/// board (closest to the player); rows at or below zero are the back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn is_front(&self) -> bool {
        self.row > 0
    }
}

/// Neighbor deltas for even rows (shifted half a cell left of odd rows).
pub const EVEN_ROW_NEIGHBORS: [(i32, i32); 6] =
    [(0, -1), (0, 1), (-1, -1), (-1, 0), (1, -1), (1, 0)];

/// Neighbor deltas for odd rows.
pub const ODD_ROW_NEIGHBORS: [(i32, i32); 6] =
    [(0, -1), (0, 1), (-1, 0), (-1, 1), (1, 0), (1, 1)];

/// Parity-keyed delta table; `rem_euclid` keeps negative rows honest.
pub fn neighbor_offsets(row: i32) -> &'static [(i32, i32); 6] {
    if row.rem_euclid(2) == 0 {
        &EVEN_ROW_NEIGHBORS
    } else {
        &ODD_ROW_NEIGHBORS
    }
}

/// The six neighbor coordinates of a position.
pub fn neighbors_of(pos: Position) -> [Position; 6] {
    let offsets = neighbor_offsets(pos.row);
    std::array::from_fn(|i| Position::new(pos.row + offsets[i].0, pos.col + offsets[i].1))
}

/// Board sizing bounds.
pub const MIN_CARDS: usize = 6;
pub const MAX_CARDS: usize = 26;
const ELITE_MULTIPLIER: f32 = 1.25;
/// Floor at which the interpolation tops out.
const FULL_BOARD_FLOOR: u32 = 13;

/// Card count for a floor: linear interpolation between the bounds,
/// scaled up for elite floors, clamped at the maximum.
pub fn card_count(floor: u32, elite: bool) -> usize {
    let t = (floor.saturating_sub(1) as f32 / (FULL_BOARD_FLOOR - 1) as f32).min(1.0);
    let mut n = MIN_CARDS as f32 + t * (MAX_CARDS - MIN_CARDS) as f32;
    if elite {
        n *= ELITE_MULTIPLIER;
    }
    (n.round() as usize).clamp(MIN_CARDS, MAX_CARDS)
}

/// Compact centered cluster: the production shape. Row lengths are
/// balanced to differ by at most one, the longest rows sit in the middle,
/// and roughly half the rows land in front (row > 0).
pub fn compact_shape(n: usize) -> Vec<Position> {
    assert!(n > 0, "cannot shape an empty board");
    let rows = ((n as f32).sqrt().round() as usize).max(1);
    let base = n / rows;
    let extra = n % rows;

    // Hand the leftover cells to the middle-most rows first.
    let mid = (rows as f32 - 1.0) / 2.0;
    let mut order: Vec<usize> = (0..rows).collect();
    order.sort_by(|a, b| {
        let da = (*a as f32 - mid).abs();
        let db = (*b as f32 - mid).abs();
        da.partial_cmp(&db).unwrap().then(a.cmp(b))
    });
    let mut lengths = vec![base; rows];
    for &i in order.iter().take(extra) {
        lengths[i] += 1;
    }

    // Map row index 0 (backmost) onto coordinates so that `rows / 2` rows
    // end up in front of the row-zero line.
    let front_rows = rows / 2;
    let first_coord = -((rows - front_rows) as i32 - 1);

    let mut cells = Vec::with_capacity(n);
    for (i, &len) in lengths.iter().enumerate() {
        let row = first_coord + i as i32;
        let start_col = -(len as i32) / 2;
        for c in 0..len as i32 {
            cells.push(Position::new(row, start_col + c));
        }
    }
    cells
}

/// Random-walk blob: the alternative shape. Grows a connected cluster one
/// neighbor at a time from the origin. Treasure rooms use it; combat
/// floors use the compact generator.
pub fn blob_shape(n: usize, rng: &mut impl Rng) -> Vec<Position> {
    assert!(n > 0, "cannot shape an empty board");
    let mut cells: Vec<Position> = vec![Position::new(1, 0)];
    let mut taken: HashSet<Position> = cells.iter().copied().collect();

    let mut attempts = 0usize;
    while cells.len() < n {
        attempts += 1;
        if attempts > n * 64 {
            // Degenerate rng streams stall the walk; finish by scanning the
            // frontier deterministically.
            let grown = cells
                .iter()
                .flat_map(|&p| neighbors_of(p))
                .find(|p| !taken.contains(p));
            match grown {
                Some(p) => {
                    taken.insert(p);
                    cells.push(p);
                }
                None => break,
            }
            continue;
        }
        let seed = cells[rng.random_range(0..cells.len())];
        let options = neighbors_of(seed);
        let candidate = options[rng.random_range(0..options.len())];
        if taken.insert(candidate) {
            cells.push(candidate);
        }
    }
    cells
}
