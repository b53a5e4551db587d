use crate::components::{Barrier, Movable, Point};

/// Proximity set of wall centers. A point is blocked when it comes closer
/// than one block to any of them; there is no rectangle test.
#[derive(Debug, Clone)]
pub struct Barriers {
    centers: Vec<Point>,
    block_size: f32,
}

impl Barriers {
    pub fn new(barriers: &[Barrier], block_size: f32) -> Self {
        Self {
            centers: barriers.iter().map(|b| b.position).collect(),
            block_size,
        }
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_blocked(&self, p: Point) -> bool {
        assert!(
            !self.centers.is_empty(),
            "collision query before any barrier was placed"
        );
        self.centers
            .iter()
            .any(|&center| center.distance(p) < self.block_size)
    }

    /// Moves `mover` to `proposed` unless a barrier is in the way.
    pub fn attempt_move<M: Movable + ?Sized>(&self, mover: &mut M, proposed: Point) -> bool {
        if self.is_blocked(proposed) {
            return false;
        }
        mover.set_position(proposed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Appearance, Entity, EntityId, IdAllocator};
    use crate::config::Config;
    use crate::level::populate;
    use crate::maze::{generate, grid_from_ascii};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    struct Dot(Point);

    impl Entity for Dot {
        fn id(&self) -> EntityId {
            EntityId(0)
        }
        fn position(&self) -> Point {
            self.0
        }
        fn appearance(&self) -> Appearance {
            Appearance::Barrier
        }
    }

    impl Movable for Dot {
        fn set_position(&mut self, position: Point) {
            self.0 = position;
        }
    }

    fn barriers_for(rows: &[&str]) -> Barriers {
        let config = Config::default();
        let grid = grid_from_ascii(rows);
        let mut rng = StdRng::seed_from_u64(0);
        let level = populate(&grid, &config, &mut IdAllocator::default(), &mut rng);
        Barriers::new(&level.barriers, config.block_size)
    }

    #[test]
    fn adjacent_wall_at_exactly_one_block_does_not_block() {
        let barriers = barriers_for(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        // (1,1) sits exactly one block away from walls (0,1) and (1,0).
        assert!(!barriers.is_blocked(Point::new(32.0, 32.0)));
        assert!(barriers.is_blocked(Point::new(64.0, 64.0)));
        assert!(barriers.is_blocked(Point::new(50.0, 50.0)), "within a block of (2,2)");
    }

    #[test]
    fn blocked_move_leaves_position_alone() {
        let barriers = barriers_for(&["#####", "#.#.#", "#...#", "#...#", "#####"]);
        let mut dot = Dot(Point::new(32.0, 32.0));
        assert!(!barriers.attempt_move(&mut dot, Point::new(64.0, 32.0)));
        assert_eq!(dot.position(), Point::new(32.0, 32.0));
        assert!(barriers.attempt_move(&mut dot, Point::new(32.0, 64.0)));
        assert_eq!(dot.position(), Point::new(32.0, 64.0));
    }

    #[test]
    fn never_accepts_a_point_within_a_block_of_any_wall() {
        let config = Config::default();
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(11, 0.8, 0.6, &mut rng);
            let level = populate(&grid, &config, &mut IdAllocator::default(), &mut rng);
            let barriers = Barriers::new(&level.barriers, config.block_size);
            for _ in 0..500 {
                let proposed = Point::new(rng.gen_range(-40.0..400.0), rng.gen_range(-40.0..400.0));
                let mut dot = Dot(Point::new(32.0, 32.0));
                let accepted = barriers.attempt_move(&mut dot, proposed);
                let nearest = level
                    .barriers
                    .iter()
                    .map(|b| b.position.distance(proposed))
                    .fold(f32::INFINITY, f32::min);
                if accepted {
                    assert!(nearest >= config.block_size, "accepted {proposed:?} at {nearest}");
                    assert_eq!(dot.position(), proposed);
                } else {
                    assert!(nearest < config.block_size);
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "before any barrier")]
    fn querying_without_barriers_is_a_bug() {
        let barriers = Barriers::new(&[], 32.0);
        barriers.is_blocked(Point::new(0.0, 0.0));
    }
}
