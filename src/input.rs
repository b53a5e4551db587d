use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::components::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Start,
    Restart,
    Quit,
    None,
}

/// Non-blocking source of player intent.
pub trait InputSource {
    /// Most recent direction pressed since the last call, if any.
    fn latest_direction(&mut self) -> Option<Direction>;
    fn pending_signal(&mut self) -> Signal;
}

/// Drains crossterm's event queue without waiting. Only the newest
/// direction survives between polls.
#[derive(Debug, Default)]
pub struct TerminalInput {
    direction: Option<Direction>,
    signal: Option<Signal>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn drain(&mut self) {
        loop {
            match event::poll(Duration::from_millis(0)) {
                Ok(true) => {}
                Ok(false) => return,
                Err(err) => {
                    log::warn!("input poll failed, treating as quit: {err}");
                    self.signal = Some(Signal::Quit);
                    return;
                }
            }
            match event::read() {
                Ok(ev) => self.accept(ev),
                Err(err) => {
                    log::warn!("input read failed, treating as quit: {err}");
                    self.signal = Some(Signal::Quit);
                    return;
                }
            }
        }
    }

    fn accept(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if let Some(dir) = direction_for(&key) {
                        self.direction = Some(dir);
                    } else if let Some(signal) = signal_for(&key) {
                        self.raise(signal);
                    }
                }
                KeyEventKind::Release => {}
            },
            Event::Mouse(mouse) => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                    self.raise(Signal::Start);
                }
            }
            _ => {}
        }
    }

    /// Quit outranks anything else buffered in the same poll.
    fn raise(&mut self, signal: Signal) {
        if self.signal != Some(Signal::Quit) {
            self.signal = Some(signal);
        }
    }
}

impl InputSource for TerminalInput {
    fn latest_direction(&mut self) -> Option<Direction> {
        self.drain();
        self.direction.take()
    }

    fn pending_signal(&mut self) -> Signal {
        self.drain();
        self.signal.take().unwrap_or(Signal::None)
    }
}

fn direction_for(key: &KeyEvent) -> Option<Direction> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Direction::Right),
        KeyCode::Up | KeyCode::Char('k') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Direction::Down),
        _ => None,
    }
}

fn signal_for(key: &KeyEvent) -> Option<Signal> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Signal::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Signal::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Signal::Start),
        KeyCode::Char('r') => Some(Signal::Restart),
        _ => None,
    }
}

/// Replays a fixed script, one entry per poll.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedInput {
    pub steps: std::collections::VecDeque<(Signal, Option<Direction>)>,
    pending_direction: Option<Direction>,
}

#[cfg(test)]
impl ScriptedInput {
    pub fn new(steps: impl IntoIterator<Item = (Signal, Option<Direction>)>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            pending_direction: None,
        }
    }
}

#[cfg(test)]
impl InputSource for ScriptedInput {
    fn latest_direction(&mut self) -> Option<Direction> {
        self.pending_direction.take()
    }

    fn pending_signal(&mut self) -> Signal {
        match self.steps.pop_front() {
            Some((signal, direction)) => {
                self.pending_direction = direction;
                signal
            }
            None => Signal::Quit,
        }
    }
}
