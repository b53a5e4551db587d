use std::collections::HashMap;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::components::{Appearance, EntityId, GhostTint, Point};
use crate::config::Config;
use crate::round::Outcome;

const CELL_W: usize = 2;
const PLAYER_FRAMES: [&str; 2] = ["😃", "😮"];
const ITEM_GLYPHS: [&str; 2] = ["·", "•"];

/// Where the game draws. Calls only record intent; nothing has to appear
/// until `redraw`.
pub trait Surface {
    fn place(&mut self, id: EntityId, position: Point, appearance: Appearance) -> io::Result<()>;
    fn hide(&mut self, id: EntityId) -> io::Result<()>;
    fn redraw(&mut self) -> io::Result<()>;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Glyph {
    Empty,
    Wall,
    Item(u8),
    Player(usize),
    Ghost,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Tile {
    glyph: Glyph,
    color: Color,
    layer: u8,
}

const EMPTY: Tile = Tile {
    glyph: Glyph::Empty,
    color: Color::Reset,
    layer: 0,
};

/// Retained-mode crossterm surface. Keeps every placed entity, composes
/// them into a cell buffer on redraw and only writes cells that changed.
pub struct TerminalSurface<W: Write> {
    out: W,
    config: Config,
    entities: HashMap<EntityId, (Point, Appearance)>,
    last: Vec<Tile>,
    last_hud: String,
    last_overlays: Vec<(usize, String)>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, config: &Config) -> Self {
        let dim = config.grid_dimension;
        Self {
            out,
            config: config.clone(),
            entities: HashMap::new(),
            last: vec![EMPTY; dim * dim],
            last_hud: String::new(),
            last_overlays: Vec::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn draw_cell(&mut self, x: usize, y: usize, tile: Tile) -> io::Result<()> {
        let text = match tile.glyph {
            Glyph::Empty => "  ",
            Glyph::Wall => "██",
            Glyph::Item(v) => ITEM_GLYPHS[usize::from(v) % ITEM_GLYPHS.len()],
            Glyph::Player(frame) => PLAYER_FRAMES[frame % PLAYER_FRAMES.len()],
            Glyph::Ghost => "ᗣ",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        self.out.queue(MoveTo(x_pos, y_pos))?;
        self.out.queue(SetForegroundColor(tile.color))?;
        self.out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                self.out.queue(Print(' '))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn place(&mut self, id: EntityId, position: Point, appearance: Appearance) -> io::Result<()> {
        self.entities.insert(id, (position, appearance));
        Ok(())
    }

    fn hide(&mut self, id: EntityId) -> io::Result<()> {
        self.entities.remove(&id);
        Ok(())
    }

    fn redraw(&mut self) -> io::Result<()> {
        let dim = self.config.grid_dimension;
        let needed_h = (dim + 2) as u16;
        let needed_w = (dim * CELL_W) as u16;

        self.out.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            self.out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            self.out.queue(Print(msg))?;
            self.out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }

        let overlays = overlay_lines(&self.config, &self.entities);
        if overlays != self.last_overlays {
            self.last_overlays = overlays;
            self.needs_full = true;
        }
        if self.needs_full {
            self.out.queue(Clear(ClearType::All))?;
        }

        let hud = format!(
            "Items left: {}  (arrows/hjkl move, space start, q quit)",
            items_left(&self.entities)
        );
        if self.needs_full || hud != self.last_hud {
            self.out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            self.out.queue(SetForegroundColor(Color::White))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
            self.out.queue(Print(&hud))?;
            self.out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let frame = compose(&self.config, &self.entities);
        for y in 0..dim {
            for x in 0..dim {
                let idx = y * dim + x;
                if self.needs_full || frame[idx] != self.last[idx] {
                    self.last[idx] = frame[idx];
                    self.draw_cell(x, y, frame[idx])?;
                }
            }
        }
        self.needs_full = false;

        let board_w = dim * CELL_W;
        for (row, text) in &self.last_overlays {
            let w = UnicodeWidthStr::width(text.as_str()).min(board_w);
            let x = self.origin_x + ((board_w - w) / 2) as u16;
            self.out.queue(MoveTo(x, self.origin_y + *row as u16))?;
            self.out.queue(SetForegroundColor(Color::Yellow))?;
            self.out.queue(Print(text))?;
            self.out.queue(ResetColor)?;
        }

        self.out.flush()?;
        Ok(())
    }
}

fn tile_for(appearance: Appearance) -> Option<Tile> {
    let (glyph, color) = match appearance {
        Appearance::Barrier => (Glyph::Wall, Color::Blue),
        Appearance::Collectible(v) => (Glyph::Item(v), Color::Red),
        Appearance::Player { frame } => (Glyph::Player(frame), Color::Yellow),
        Appearance::Ghost(tint) => (
            Glyph::Ghost,
            match tint {
                GhostTint::Blue => Color::Cyan,
                GhostTint::Pink => Color::Magenta,
                GhostTint::Red => Color::Red,
            },
        ),
        Appearance::Logo
        | Appearance::StartPrompt
        | Appearance::Outcome(_)
        | Appearance::RetryPrompt => return None,
    };
    Some(Tile {
        glyph,
        color,
        layer: appearance.layer(),
    })
}

/// Flattens placed entities into one tile per grid cell. Where entities
/// overlap, the higher layer wins.
fn compose(config: &Config, entities: &HashMap<EntityId, (Point, Appearance)>) -> Vec<Tile> {
    let dim = config.grid_dimension;
    let mut frame = vec![EMPTY; dim * dim];
    for &(position, appearance) in entities.values() {
        let Some(tile) = tile_for(appearance) else {
            continue;
        };
        let Some((x, y)) = config.point_cell(position) else {
            continue;
        };
        if x >= dim || y >= dim {
            continue;
        }
        let slot = &mut frame[y * dim + x];
        if slot.glyph == Glyph::Empty || tile.layer >= slot.layer {
            *slot = tile;
        }
    }
    frame
}

fn overlay_text(appearance: Appearance) -> Option<&'static str> {
    match appearance {
        Appearance::Logo => Some("M A Z E   C H A S E"),
        Appearance::StartPrompt => Some(" press SPACE or click to start "),
        Appearance::Outcome(Outcome::Captured) => Some("  GAME OVER  "),
        Appearance::Outcome(Outcome::Cleared) => Some("  YOU WIN!  "),
        Appearance::RetryPrompt => Some(" SPACE or click to try again, q to quit "),
        Appearance::Barrier
        | Appearance::Collectible(_)
        | Appearance::Player { .. }
        | Appearance::Ghost(_) => None,
    }
}

/// Overlay text lines keyed by board row, top to bottom.
fn overlay_lines(
    config: &Config,
    entities: &HashMap<EntityId, (Point, Appearance)>,
) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = entities
        .values()
        .filter_map(|&(position, appearance)| {
            let text = overlay_text(appearance)?;
            let (_, row) = config.point_cell(position)?;
            Some((row.min(config.grid_dimension - 1), text.to_string()))
        })
        .collect();
    lines.sort();
    lines
}

fn items_left(entities: &HashMap<EntityId, (Point, Appearance)>) -> usize {
    entities
        .values()
        .filter(|(_, a)| matches!(a, Appearance::Collectible(_)))
        .count()
}

/// Keeps what a terminal would show, for exercising the game without one.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub visible: HashMap<EntityId, (Point, Appearance)>,
    pub hidden: Vec<EntityId>,
    pub places: usize,
    pub redraws: usize,
    pub fail_place: bool,
    pub fail_redraw: bool,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn is_visible(&self, id: EntityId) -> bool {
        self.visible.contains_key(&id)
    }

    pub fn position_of(&self, id: EntityId) -> Option<Point> {
        self.visible.get(&id).map(|&(p, _)| p)
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn place(&mut self, id: EntityId, position: Point, appearance: Appearance) -> io::Result<()> {
        if self.fail_place {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "surface closed"));
        }
        self.places += 1;
        self.visible.insert(id, (position, appearance));
        Ok(())
    }

    fn hide(&mut self, id: EntityId) -> io::Result<()> {
        self.hidden.push(id);
        self.visible.remove(&id);
        Ok(())
    }

    fn redraw(&mut self) -> io::Result<()> {
        if self.fail_redraw {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "surface closed"));
        }
        self.redraws += 1;
        Ok(())
    }
}
