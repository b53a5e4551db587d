use rand::seq::SliceRandom;
use rand::Rng;

use crate::collision::Barriers;
use crate::components::{
    Appearance, Direction, Entity, EntityId, GhostTint, IdAllocator, Movable, Point,
};
use crate::config::Config;
use crate::maze::{Cell, Grid};

const PALETTE: [GhostTint; 4] = [
    GhostTint::Blue,
    GhostTint::Pink,
    GhostTint::Red,
    GhostTint::Pink,
];
const SPAWN_MIN: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub id: EntityId,
    pub position: Point,
    pub tint: GhostTint,
}

impl Entity for Ghost {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn appearance(&self) -> Appearance {
        Appearance::Ghost(self.tint)
    }
}

impl Movable for Ghost {
    fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

/// Places `config.ghost_count` ghosts on random open cells away from the
/// player's corner. Cells are drawn with replacement, so two ghosts may
/// share a start.
pub fn spawn_ghosts(
    grid: &Grid,
    config: &Config,
    ids: &mut IdAllocator,
    rng: &mut impl Rng,
) -> Vec<Ghost> {
    let hi = grid.dim().saturating_sub(2);
    let mut candidates: Vec<(usize, usize)> = grid
        .cells()
        .filter(|&(x, y, cell)| {
            cell == Cell::Open && (SPAWN_MIN..=hi).contains(&x) && (SPAWN_MIN..=hi).contains(&y)
        })
        .map(|(x, y, _)| (x, y))
        .collect();
    if candidates.is_empty() {
        candidates = grid
            .cells()
            .filter(|&(x, y, cell)| cell != Cell::Wall && (x, y) != (1, 1))
            .map(|(x, y, _)| (x, y))
            .collect();
    }
    if candidates.is_empty() {
        log::warn!("no room for ghosts in a {0}x{0} maze", grid.dim());
        return Vec::new();
    }

    let mut ghosts = Vec::with_capacity(config.ghost_count);
    for i in 0..config.ghost_count {
        let Some(&(x, y)) = candidates.choose(rng) else {
            break;
        };
        ghosts.push(Ghost {
            id: ids.next_id(),
            position: config.cell_point(x, y),
            tint: PALETTE[i % PALETTE.len()],
        });
    }
    ghosts
}

/// Counts ticks between ghost steps so ghosts move once every `cadence`
/// ticks.
#[derive(Debug, Clone, Default)]
pub struct StepTimer {
    ticks: u32,
}

impl StepTimer {
    pub fn ready(&mut self, cadence: u32) -> bool {
        self.ticks += 1;
        if self.ticks < cadence {
            return false;
        }
        self.ticks = 0;
        true
    }
}

impl Ghost {
    /// Tries the four one-block moves in random order and takes the first
    /// legal one. Returns whether the ghost moved.
    pub fn wander(&mut self, barriers: &Barriers, block_size: f32, rng: &mut impl Rng) -> bool {
        let mut options = Direction::MOVES;
        options.shuffle(rng);
        for dir in options {
            let (dx, dy) = dir.delta();
            let proposed = self.position.offset(dx * block_size, dy * block_size);
            if barriers.attempt_move(self, proposed) {
                return true;
            }
        }
        false
    }
}
