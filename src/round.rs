use std::io;
use std::time::Duration;

use rand::Rng;

use crate::collision::Barriers;
use crate::components::{
    Appearance, Barrier, Collectible, Direction, Entity, EntityId, IdAllocator, Point,
};
use crate::config::Config;
use crate::ghost::{spawn_ghosts, Ghost, StepTimer};
use crate::input::Signal;
use crate::level::populate;
use crate::maze::{self, Cell, Grid};
use crate::player::{collect_items, spawn_player, Player};
use crate::surface::Surface;

const LOGO: EntityId = EntityId(0);
const START_PROMPT: EntityId = EntityId(1);
const OUTCOME: EntityId = EntityId(2);
const RETRY_PROMPT: EntityId = EntityId(3);
const FIRST_ROUND_ID: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A ghost reached the player.
    Captured,
    /// Every item was collected.
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Intro,
    Active,
    Ended {
        outcome: Outcome,
        settle_remaining: Duration,
    },
}

/// What a single active tick changed.
#[derive(Debug, Default)]
pub struct TickEvents {
    pub collected: Vec<Collectible>,
    pub outcome: Option<Outcome>,
}

/// Everything that lives for one round. Dropped wholesale on restart.
#[derive(Debug)]
pub struct RoundState {
    pub grid: Grid,
    pub walls: Vec<Barrier>,
    pub barriers: Barriers,
    pub collectibles: Vec<Collectible>,
    pub ghosts: Vec<Ghost>,
    pub player: Player,
    pub ghost_timer: StepTimer,
    pub ticks: u64,
}

impl RoundState {
    pub fn generate(config: &Config, ids: &mut IdAllocator, rng: &mut impl Rng) -> Self {
        let grid = maze::generate(
            config.grid_dimension,
            config.path_probability,
            config.item_probability,
            rng,
        );
        Self::from_grid(grid, config, ids, rng)
    }

    pub fn from_grid(
        grid: Grid,
        config: &Config,
        ids: &mut IdAllocator,
        rng: &mut impl Rng,
    ) -> Self {
        let level = populate(&grid, config, ids, rng);
        let barriers = Barriers::new(&level.barriers, config.block_size);
        let player = spawn_player(ids.next_id(), config.cell_point(1, 1));
        let ghosts = spawn_ghosts(&grid, config, ids, rng);
        Self {
            grid,
            walls: level.barriers,
            barriers,
            collectibles: level.collectibles,
            ghosts,
            player,
            ghost_timer: StepTimer::default(),
            ticks: 0,
        }
    }

    /// Advances the world by one tick: ghosts (on their cadence), then the
    /// player, then pickups, then the end check.
    pub fn tick(&mut self, config: &Config, dt: Duration, rng: &mut impl Rng) -> TickEvents {
        if self.ghost_timer.ready(config.ghost_cadence) {
            for ghost in &mut self.ghosts {
                ghost.wander(&self.barriers, config.block_size, rng);
            }
        }
        self.player.step(&self.barriers, config.block_size);
        self.player.animate(dt, config.frame_delay);
        let collected = collect_items(&self.player, &mut self.collectibles, config.capture_radius);
        self.ticks += 1;
        TickEvents {
            collected,
            outcome: self.terminal(config.capture_radius),
        }
    }

    /// Capture is checked before clearing, so a simultaneous capture and
    /// last pickup is a loss.
    pub fn terminal(&self, capture_radius: f32) -> Option<Outcome> {
        let caught = self
            .ghosts
            .iter()
            .any(|g| g.position.distance(self.player.position) < capture_radius);
        if caught {
            Some(Outcome::Captured)
        } else if self.collectibles.is_empty() {
            Some(Outcome::Cleared)
        } else {
            None
        }
    }

    pub fn entities(&self) -> impl Iterator<Item = &dyn Entity> + '_ {
        self.walls
            .iter()
            .map(|w| w as &dyn Entity)
            .chain(self.collectibles.iter().map(|c| c as &dyn Entity))
            .chain(self.ghosts.iter().map(|g| g as &dyn Entity))
            .chain(std::iter::once(&self.player as &dyn Entity))
    }

    fn place_all(&self, surface: &mut dyn Surface) -> io::Result<()> {
        for entity in self.entities() {
            surface.place(entity.id(), entity.position(), entity.appearance())?;
        }
        Ok(())
    }

    fn hide_all(&self, surface: &mut dyn Surface) -> io::Result<()> {
        for entity in self.entities() {
            surface.hide(entity.id())?;
        }
        Ok(())
    }
}

/// Drives rounds through intro, play and end screens, and mirrors every
/// entity change onto a [`Surface`].
pub struct Game {
    config: Config,
    phase: Phase,
    round: Option<RoundState>,
    ids: IdAllocator,
    retry_shown: bool,
}

impl Game {
    pub fn new(config: Config, surface: &mut dyn Surface) -> io::Result<Self> {
        let game = Self {
            config,
            phase: Phase::Intro,
            round: None,
            ids: IdAllocator::starting_at(FIRST_ROUND_ID),
            retry_shown: false,
        };
        surface.place(LOGO, game.overlay_point(-2), Appearance::Logo)?;
        surface.place(START_PROMPT, game.overlay_point(2), Appearance::StartPrompt)?;
        Ok(game)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Ended { outcome, .. } => Some(outcome),
            Phase::Intro | Phase::Active => None,
        }
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    /// Everything currently on screen, with position and look.
    pub fn visible_entities(&self) -> Vec<(EntityId, Point, Appearance)> {
        match self.phase {
            Phase::Intro => vec![
                (LOGO, self.overlay_point(-2), Appearance::Logo),
                (START_PROMPT, self.overlay_point(2), Appearance::StartPrompt),
            ],
            Phase::Active => self
                .round
                .iter()
                .flat_map(|r| r.entities())
                .map(|e| (e.id(), e.position(), e.appearance()))
                .collect(),
            Phase::Ended { outcome, .. } => {
                let mut shown = vec![(OUTCOME, self.overlay_point(0), Appearance::Outcome(outcome))];
                if self.retry_shown {
                    shown.push((RETRY_PROMPT, self.overlay_point(2), Appearance::RetryPrompt));
                }
                shown
            }
        }
    }

    /// Queues a direction for the player. Ignored outside active play.
    pub fn steer(&mut self, direction: Direction) {
        if self.phase != Phase::Active {
            return;
        }
        if let Some(round) = self.round.as_mut() {
            round.player.next_direction = direction;
        }
    }

    pub fn handle_signal(
        &mut self,
        signal: Signal,
        rng: &mut impl Rng,
        surface: &mut dyn Surface,
    ) -> io::Result<()> {
        match (self.phase, signal) {
            (Phase::Intro, Signal::Start) => {
                surface.hide(LOGO)?;
                surface.hide(START_PROMPT)?;
                self.start_round(rng, surface)
            }
            (Phase::Ended { settle_remaining, .. }, Signal::Start | Signal::Restart) => {
                if !settle_remaining.is_zero() {
                    log::debug!("restart ignored, {settle_remaining:?} of settling left");
                    return Ok(());
                }
                surface.hide(OUTCOME)?;
                surface.hide(RETRY_PROMPT)?;
                self.retry_shown = false;
                self.start_round(rng, surface)
            }
            _ => Ok(()),
        }
    }

    /// One loop iteration's worth of game time.
    pub fn tick(
        &mut self,
        dt: Duration,
        rng: &mut impl Rng,
        surface: &mut dyn Surface,
    ) -> io::Result<()> {
        match self.phase {
            Phase::Intro => Ok(()),
            Phase::Active => self.tick_round(dt, rng, surface),
            Phase::Ended {
                outcome,
                settle_remaining,
            } => {
                let settle_remaining = settle_remaining.saturating_sub(dt);
                self.phase = Phase::Ended {
                    outcome,
                    settle_remaining,
                };
                if settle_remaining.is_zero() {
                    self.show_retry(surface)?;
                }
                Ok(())
            }
        }
    }

    fn tick_round(
        &mut self,
        dt: Duration,
        rng: &mut impl Rng,
        surface: &mut dyn Surface,
    ) -> io::Result<()> {
        let Some(round) = self.round.as_mut() else {
            return Ok(());
        };
        let ghosts_before: Vec<Point> = round.ghosts.iter().map(|g| g.position).collect();
        let player_before = (round.player.position, round.player.appearance());

        let events = round.tick(&self.config, dt, rng);

        for (ghost, before) in round.ghosts.iter().zip(ghosts_before) {
            if ghost.position != before {
                surface.place(ghost.id, ghost.position, ghost.appearance())?;
            }
        }
        if (round.player.position, round.player.appearance()) != player_before {
            surface.place(round.player.id, round.player.position, round.player.appearance())?;
        }
        for item in &events.collected {
            surface.hide(item.id)?;
        }

        match events.outcome {
            Some(outcome) => self.end_round(outcome, surface),
            None => Ok(()),
        }
    }

    fn start_round(&mut self, rng: &mut impl Rng, surface: &mut dyn Surface) -> io::Result<()> {
        if let Some(old) = self.round.take() {
            old.hide_all(surface)?;
        }
        let round = RoundState::generate(&self.config, &mut self.ids, rng);
        log::info!(
            "round started: {0}x{0} maze, {1} walls, {2} items, {3} ghosts",
            round.grid.dim(),
            round.barriers.len(),
            round.grid.count(Cell::Item),
            round.ghosts.len()
        );
        round.place_all(surface)?;
        self.round = Some(round);
        self.phase = Phase::Active;
        Ok(())
    }

    fn end_round(&mut self, outcome: Outcome, surface: &mut dyn Surface) -> io::Result<()> {
        if let Some(round) = self.round.take() {
            log::info!("round ended: {outcome:?} after {} ticks", round.ticks);
            round.hide_all(surface)?;
        }
        surface.place(OUTCOME, self.overlay_point(0), Appearance::Outcome(outcome))?;
        self.phase = Phase::Ended {
            outcome,
            settle_remaining: self.config.settle_delay,
        };
        if self.config.settle_delay.is_zero() {
            self.show_retry(surface)?;
        }
        Ok(())
    }

    fn show_retry(&mut self, surface: &mut dyn Surface) -> io::Result<()> {
        if self.retry_shown {
            return Ok(());
        }
        surface.place(RETRY_PROMPT, self.overlay_point(2), Appearance::RetryPrompt)?;
        self.retry_shown = true;
        Ok(())
    }

    /// Board center shifted by `rows` blocks, where overlays are drawn.
    fn overlay_point(&self, rows: i32) -> Point {
        let mid = self.config.grid_dimension / 2;
        self.config
            .cell_point(mid, mid)
            .offset(0.0, rows as f32 * self.config.block_size)
    }
}
