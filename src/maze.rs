use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Open,
    Item,
}

/// Square, row-major matrix of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dim: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn filled(dim: usize, cell: Cell) -> Self {
        Self {
            dim,
            cells: vec![cell; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.dim + x]
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.dim + x] = cell;
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != Cell::Wall
    }

    /// Every cell with its coordinates, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (i % self.dim, i / self.dim, cell))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Flood fill over non-wall cells from `(x, y)`, 4-directional.
    pub fn reachable_from(&self, x: usize, y: usize) -> Vec<bool> {
        let mut seen = vec![false; self.dim * self.dim];
        if !self.is_passable(x, y) {
            return seen;
        }
        let mut q = VecDeque::new();
        seen[y * self.dim + x] = true;
        q.push_back((x, y));
        while let Some((cx, cy)) = q.pop_front() {
            for (dx, dy) in [(0isize, -1isize), (0, 1), (-1, 0), (1, 0)] {
                let nx = cx as isize + dx;
                let ny = cy as isize + dy;
                if nx < 0 || ny < 0 || nx >= self.dim as isize || ny >= self.dim as isize {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if seen[ny * self.dim + nx] || !self.is_passable(nx, ny) {
                    continue;
                }
                seen[ny * self.dim + nx] = true;
                q.push_back((nx, ny));
            }
        }
        seen
    }

    /// True when every non-wall cell can be reached from (1,1).
    pub fn is_connected(&self) -> bool {
        let reachable = self.reachable_from(1, 1);
        self.cells()
            .all(|(x, y, cell)| cell == Cell::Wall || reachable[y * self.dim + x])
    }
}

/// Carves a maze of dimension `dim` (odd, at least 5) with a randomized
/// depth-first walk from (1,1). With probability `path_probability` per
/// step an extra passage is knocked through, so the result has loops. Open
/// cells away from the top-left corridor then become items with probability
/// `item_probability`.
pub fn generate(
    dim: usize,
    path_probability: f64,
    item_probability: f64,
    rng: &mut impl Rng,
) -> Grid {
    let mut grid = Grid::filled(dim, Cell::Wall);
    let mut visited = vec![false; dim * dim];
    let mut moves: [(isize, isize); 4] = [(0, 2), (2, 0), (0, -2), (-2, 0)];
    let mut stack = vec![(1usize, 1usize)];
    visited[dim + 1] = true;

    while let Some(&(cx, cy)) = stack.last() {
        grid.set(cx, cy, Cell::Open);
        moves.shuffle(rng);

        let next = moves.iter().find_map(|&(dx, dy)| {
            carve_target(dim, cx, cy, dx, dy).filter(|&(nx, ny)| !visited[ny * dim + nx])
        });
        match next {
            Some((nx, ny)) => {
                carve_between(&mut grid, cx, cy, nx, ny);
                visited[ny * dim + nx] = true;
                stack.push((nx, ny));
            }
            None => {
                stack.pop();
            }
        }

        if rng.gen_bool(path_probability) {
            let extra = moves.iter().find_map(|&(dx, dy)| {
                carve_target(dim, cx, cy, dx, dy)
                    .filter(|&(nx, ny)| grid.get(nx, ny) == Cell::Wall)
            });
            if let Some((nx, ny)) = extra {
                carve_between(&mut grid, cx, cy, nx, ny);
            }
        }
    }

    for y in 2..dim {
        for x in 2..dim {
            if grid.get(x, y) == Cell::Open && rng.gen_bool(item_probability) {
                grid.set(x, y, Cell::Item);
            }
        }
    }

    debug_assert!(grid.is_connected(), "carved maze must be one component");
    log::debug!(
        "generated {dim}x{dim} maze: {} open, {} items",
        grid.count(Cell::Open),
        grid.count(Cell::Item)
    );
    grid
}

/// Two-step neighbour of `(cx, cy)` if it lies inside the carve bounds
/// `1..=dim-2`.
fn carve_target(dim: usize, cx: usize, cy: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
    let nx = cx as isize + dx;
    let ny = cy as isize + dy;
    let hi = dim as isize - 2;
    if nx < 1 || ny < 1 || nx > hi || ny > hi {
        return None;
    }
    Some((nx as usize, ny as usize))
}

fn carve_between(grid: &mut Grid, cx: usize, cy: usize, nx: usize, ny: usize) {
    grid.set((cx + nx) / 2, (cy + ny) / 2, Cell::Open);
    grid.set(nx, ny, Cell::Open);
}

#[cfg(test)]
pub(crate) fn grid_from_ascii(rows: &[&str]) -> Grid {
    let dim = rows.len();
    let mut grid = Grid::filled(dim, Cell::Wall);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), dim, "ascii grid must be square");
        for (x, ch) in row.chars().enumerate() {
            let cell = match ch {
                '#' => Cell::Wall,
                '.' => Cell::Open,
                'o' => Cell::Item,
                other => panic!("unknown cell {other:?}"),
            };
            grid.set(x, y, cell);
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_border_is_wall(grid: &Grid) {
        let last = grid.dim() - 1;
        for i in 0..grid.dim() {
            assert_eq!(grid.get(i, 0), Cell::Wall, "top border at {i}");
            assert_eq!(grid.get(i, last), Cell::Wall, "bottom border at {i}");
            assert_eq!(grid.get(0, i), Cell::Wall, "left border at {i}");
            assert_eq!(grid.get(last, i), Cell::Wall, "right border at {i}");
        }
    }

    #[test]
    fn every_passable_cell_is_reachable_from_start() {
        for seed in 0..64 {
            for dim in [5, 7, 11, 25] {
                let mut rng = StdRng::seed_from_u64(seed);
                let grid = generate(dim, 0.8, 0.6, &mut rng);
                assert!(grid.is_connected(), "seed {seed}, dim {dim}");
            }
        }
    }

    #[test]
    fn border_stays_wall() {
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(25, 0.8, 0.6, &mut rng);
            assert_border_is_wall(&grid);
        }
    }

    #[test]
    fn pure_tree_visits_every_odd_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = generate(15, 0.0, 0.0, &mut rng);
        for y in (1..14).step_by(2) {
            for x in (1..14).step_by(2) {
                assert_eq!(grid.get(x, y), Cell::Open, "({x},{y}) not carved");
            }
        }
        // A spanning tree over 7x7 rooms opens 49 rooms plus 48 corridors.
        assert_eq!(grid.count(Cell::Open), 49 + 48);
        assert_eq!(grid.count(Cell::Item), 0);
    }

    #[test]
    fn extra_paths_add_loops() {
        let mut tree_rng = StdRng::seed_from_u64(3);
        let tree = generate(25, 0.0, 0.0, &mut tree_rng);
        let mut loopy_total = 0;
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            loopy_total += generate(25, 1.0, 0.0, &mut rng).count(Cell::Open);
        }
        assert!(loopy_total > 16 * tree.count(Cell::Open));
    }

    #[test]
    fn items_stay_off_the_start_corridor() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(25, 0.8, 1.0, &mut rng);
            for i in 0..25 {
                assert_ne!(grid.get(1, i), Cell::Item);
                assert_ne!(grid.get(i, 1), Cell::Item);
            }
            assert_eq!(grid.get(1, 1), Cell::Open);
            // With probability 1 every other carved cell holds an item.
            assert!(grid.count(Cell::Item) > 0);
        }
    }

    #[test]
    fn reachable_from_respects_walls() {
        let grid = grid_from_ascii(&[
            "#####", //
            "#.#o#", //
            "#.#.#", //
            "#...#", //
            "#####",
        ]);
        let seen = grid.reachable_from(1, 1);
        assert!(seen[5 + 3], "item at (3,1) reachable around the wall");
        assert!(!seen[5 + 2], "wall never marked");
        assert!(grid.is_connected());

        let split = grid_from_ascii(&[
            "#####", //
            "#.#.#", //
            "###.#", //
            "#...#", //
            "#####",
        ]);
        assert!(!split.is_connected());
    }
}
