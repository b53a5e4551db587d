use crate::round::Outcome;

/// Position in continuous pixel space. x grows right, y grows down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Stopped,
}

impl Direction {
    pub const MOVES: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    /// Unit step in pixel space; zero for `Stopped`.
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Stopped => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostTint {
    Blue,
    Pink,
    Red,
}

/// How a surface should draw an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Appearance {
    Barrier,
    Collectible(u8),
    Player { frame: usize },
    Ghost(GhostTint),
    Logo,
    StartPrompt,
    Outcome(Outcome),
    RetryPrompt,
}

impl Appearance {
    /// Stacking order when several entities share a cell; higher wins.
    pub fn layer(self) -> u8 {
        match self {
            Appearance::Barrier | Appearance::Collectible(_) => 0,
            Appearance::Ghost(_) => 1,
            Appearance::Player { .. } => 2,
            Appearance::Logo
            | Appearance::StartPrompt
            | Appearance::Outcome(_)
            | Appearance::RetryPrompt => 3,
        }
    }
}

/// Capabilities shared by everything a round puts on screen.
pub trait Entity {
    fn id(&self) -> EntityId;
    fn position(&self) -> Point;
    fn appearance(&self) -> Appearance;
}

pub trait Movable: Entity {
    fn set_position(&mut self, position: Point);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Barrier {
    pub id: EntityId,
    pub position: Point,
}

impl Entity for Barrier {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn appearance(&self) -> Appearance {
        Appearance::Barrier
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub id: EntityId,
    pub position: Point,
    pub variant: u8,
}

impl Entity for Collectible {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn appearance(&self) -> Appearance {
        Appearance::Collectible(self.variant)
    }
}

/// Hands out fresh entity ids. Never reuses one within a process.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn up_moves_toward_smaller_y() {
        assert_eq!(Direction::Up.delta(), (0.0, -1.0));
        assert_eq!(Direction::Stopped.delta(), (0.0, 0.0));
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = IdAllocator::starting_at(10);
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, EntityId(10));
        assert_ne!(a, b);
    }

    #[test]
    fn player_draws_above_ghosts_and_items() {
        assert!(Appearance::Player { frame: 0 }.layer() > Appearance::Ghost(GhostTint::Red).layer());
        assert!(Appearance::Ghost(GhostTint::Red).layer() > Appearance::Collectible(0).layer());
        assert!(Appearance::RetryPrompt.layer() > Appearance::Player { frame: 1 }.layer());
    }
}
