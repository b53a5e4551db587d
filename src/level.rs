use rand::Rng;

use crate::components::{Barrier, Collectible, IdAllocator};
use crate::config::Config;
use crate::maze::{Cell, Grid};

const COLLECTIBLE_VARIANTS: u8 = 2;

/// Static entities derived from a grid: one barrier per wall, one
/// collectible per item cell.
#[derive(Debug, Default)]
pub struct Level {
    pub barriers: Vec<Barrier>,
    pub collectibles: Vec<Collectible>,
}

pub fn populate(
    grid: &Grid,
    config: &Config,
    ids: &mut IdAllocator,
    rng: &mut impl Rng,
) -> Level {
    let mut level = Level::default();
    for (x, y, cell) in grid.cells() {
        let position = config.cell_point(x, y);
        match cell {
            Cell::Wall => level.barriers.push(Barrier {
                id: ids.next_id(),
                position,
            }),
            Cell::Item => level.collectibles.push(Collectible {
                id: ids.next_id(),
                position,
                variant: rng.gen_range(0..COLLECTIBLE_VARIANTS),
            }),
            Cell::Open => {}
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Entity, Point};
    use crate::maze::grid_from_ascii;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn walls_become_barriers_and_items_collectibles() {
        let grid = grid_from_ascii(&[
            "#####", //
            "#..o#", //
            "#.#.#", //
            "#o..#", //
            "#####",
        ]);
        let config = Config::default();
        let mut ids = IdAllocator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let level = populate(&grid, &config, &mut ids, &mut rng);

        assert_eq!(level.barriers.len(), grid.count(Cell::Wall));
        assert_eq!(level.collectibles.len(), 2);
        let spots: Vec<Point> = level.collectibles.iter().map(|c| c.position()).collect();
        assert!(spots.contains(&Point::new(96.0, 32.0)));
        assert!(spots.contains(&Point::new(32.0, 96.0)));
        assert!(level.barriers.iter().any(|b| b.position() == Point::new(64.0, 64.0)));
        assert!(level.collectibles.iter().all(|c| c.variant < COLLECTIBLE_VARIANTS));
    }

    #[test]
    fn every_entity_gets_its_own_id() {
        let grid = grid_from_ascii(&[
            "#####", //
            "#.o.#", //
            "#o#o#", //
            "#.o.#", //
            "#####",
        ]);
        let mut ids = IdAllocator::default();
        let mut rng = StdRng::seed_from_u64(9);
        let level = populate(&grid, &Config::default(), &mut ids, &mut rng);
        let mut all: Vec<_> = level
            .barriers
            .iter()
            .map(|b| b.id())
            .chain(level.collectibles.iter().map(|c| c.id()))
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
