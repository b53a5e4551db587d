use std::time::Duration;

use crate::collision::Barriers;
use crate::components::{Appearance, Collectible, Direction, Entity, EntityId, Movable, Point};

const SPRITE_FRAMES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: EntityId,
    pub position: Point,
    pub current_direction: Direction,
    pub next_direction: Direction,
    pub animation_frame: usize,
    frame_elapsed: Duration,
}

impl Entity for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn appearance(&self) -> Appearance {
        Appearance::Player {
            frame: self.animation_frame,
        }
    }
}

impl Movable for Player {
    fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

pub fn spawn_player(id: EntityId, start: Point) -> Player {
    Player {
        id,
        position: start,
        current_direction: Direction::Stopped,
        next_direction: Direction::Stopped,
        animation_frame: 0,
        frame_elapsed: Duration::ZERO,
    }
}

impl Player {
    /// One tick of movement: a full block in `next_direction` if clear.
    /// A blocked move is dropped and the player stops; `next_direction`
    /// stays so travel resumes once the way opens or the player steers.
    pub fn step(&mut self, barriers: &Barriers, block_size: f32) {
        let direction = self.next_direction;
        if direction == Direction::Stopped {
            self.current_direction = Direction::Stopped;
            return;
        }
        let (dx, dy) = direction.delta();
        let proposed = self.position.offset(dx * block_size, dy * block_size);
        self.current_direction = if barriers.attempt_move(self, proposed) {
            direction
        } else {
            Direction::Stopped
        };
    }

    /// Cycles the sprite every `frame_delay` while moving; a stopped player
    /// shows the first frame.
    pub fn animate(&mut self, dt: Duration, frame_delay: Duration) {
        self.frame_elapsed += dt;
        while self.frame_elapsed >= frame_delay {
            self.frame_elapsed -= frame_delay;
            self.animation_frame = if self.current_direction == Direction::Stopped {
                0
            } else {
                (self.animation_frame + 1) % SPRITE_FRAMES
            };
        }
    }
}

/// Removes every collectible strictly within `radius` of the player and
/// returns them so their visuals can be hidden.
pub fn collect_items(
    player: &Player,
    collectibles: &mut Vec<Collectible>,
    radius: f32,
) -> Vec<Collectible> {
    let mut taken = Vec::new();
    collectibles.retain(|item| {
        if player.position.distance(item.position) < radius {
            taken.push(item.clone());
            false
        } else {
            true
        }
    });
    taken
}
