use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::components::Point;

const DEFAULT_GRID_DIM: usize = 25;
const DEFAULT_BLOCK_SIZE: f32 = 32.0;
const DEFAULT_GHOSTS: usize = 5;
const DEFAULT_PATH_PROBABILITY: f64 = 0.8;
const DEFAULT_ITEM_PROBABILITY: f64 = 0.6;
const DEFAULT_TICK_MS: u64 = 100;
const DEFAULT_GHOST_CADENCE: u32 = 3;
const DEFAULT_FRAME_DELAY_MS: u64 = 100;
const DEFAULT_CAPTURE_RADIUS: f32 = 22.0;
const DEFAULT_SETTLE_MS: u64 = 1700;
const MIN_GRID_DIM: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    Unparsable { var: &'static str, value: String },
    #[error("{var}: grid dimension must be odd and at least 5, got {value}")]
    GridDimension { var: &'static str, value: usize },
    #[error("{var}: probability must be within [0, 1], got {value}")]
    Probability { var: &'static str, value: f64 },
    #[error("{var}: must be greater than zero")]
    NotPositive { var: &'static str },
}

/// Every tunable of a game session. Loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub grid_dimension: usize,
    pub block_size: f32,
    pub origin: Point,
    pub ghost_count: usize,
    pub path_probability: f64,
    pub item_probability: f64,
    pub tick_interval: Duration,
    pub ghost_cadence: u32,
    pub frame_delay: Duration,
    pub capture_radius: f32,
    pub settle_delay: Duration,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_dimension: DEFAULT_GRID_DIM,
            block_size: DEFAULT_BLOCK_SIZE,
            origin: Point::new(0.0, 0.0),
            ghost_count: DEFAULT_GHOSTS,
            path_probability: DEFAULT_PATH_PROBABILITY,
            item_probability: DEFAULT_ITEM_PROBABILITY,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            ghost_cadence: DEFAULT_GHOST_CADENCE,
            frame_delay: Duration::from_millis(DEFAULT_FRAME_DELAY_MS),
            capture_radius: DEFAULT_CAPTURE_RADIUS,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            seed: None,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset
    /// variables. Anything set but unparsable or out of range is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            grid_dimension: parse_or(&lookup, "MAZE_GRID_DIM", defaults.grid_dimension)?,
            block_size: parse_or(&lookup, "MAZE_BLOCK_SIZE", defaults.block_size)?,
            origin: defaults.origin,
            ghost_count: parse_or(&lookup, "MAZE_GHOSTS", defaults.ghost_count)?,
            path_probability: parse_or(
                &lookup,
                "MAZE_PATH_PROBABILITY",
                defaults.path_probability,
            )?,
            item_probability: parse_or(
                &lookup,
                "MAZE_ITEM_PROBABILITY",
                defaults.item_probability,
            )?,
            tick_interval: Duration::from_millis(parse_or(
                &lookup,
                "MAZE_TICK_MS",
                DEFAULT_TICK_MS,
            )?),
            ghost_cadence: parse_or(&lookup, "MAZE_GHOST_CADENCE", defaults.ghost_cadence)?,
            frame_delay: Duration::from_millis(parse_or(
                &lookup,
                "MAZE_FRAME_DELAY_MS",
                DEFAULT_FRAME_DELAY_MS,
            )?),
            capture_radius: parse_or(&lookup, "MAZE_CAPTURE_RADIUS", defaults.capture_radius)?,
            settle_delay: Duration::from_millis(parse_or(
                &lookup,
                "MAZE_SETTLE_MS",
                DEFAULT_SETTLE_MS,
            )?),
            seed: match lookup("MAZE_SEED") {
                Some(raw) => Some(parse_value("MAZE_SEED", &raw)?),
                None => None,
            },
            log_file: lookup("MAZE_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_dimension < MIN_GRID_DIM || self.grid_dimension % 2 == 0 {
            return Err(ConfigError::GridDimension {
                var: "MAZE_GRID_DIM",
                value: self.grid_dimension,
            });
        }
        check_positive("MAZE_BLOCK_SIZE", self.block_size > 0.0)?;
        check_positive("MAZE_CAPTURE_RADIUS", self.capture_radius > 0.0)?;
        check_positive("MAZE_TICK_MS", !self.tick_interval.is_zero())?;
        check_positive("MAZE_FRAME_DELAY_MS", !self.frame_delay.is_zero())?;
        check_positive("MAZE_GHOST_CADENCE", self.ghost_cadence > 0)?;
        check_probability("MAZE_PATH_PROBABILITY", self.path_probability)?;
        check_probability("MAZE_ITEM_PROBABILITY", self.item_probability)?;
        Ok(())
    }

    /// Pixel-space center of grid cell `(x, y)`.
    pub fn cell_point(&self, x: usize, y: usize) -> Point {
        Point::new(
            self.origin.x + x as f32 * self.block_size,
            self.origin.y + y as f32 * self.block_size,
        )
    }

    /// Inverse of [`Config::cell_point`]. `None` when `p` lies left of or
    /// above the origin.
    pub fn point_cell(&self, p: Point) -> Option<(usize, usize)> {
        let cx = ((p.x - self.origin.x) / self.block_size).round();
        let cy = ((p.y - self.origin.y) / self.block_size).round();
        if cx < 0.0 || cy < 0.0 {
            return None;
        }
        Some((cx as usize, cy as usize))
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(raw) => parse_value(var, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Unparsable {
        var,
        value: raw.to_string(),
    })
}

fn check_positive(var: &'static str, ok: bool) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { var })
    }
}

fn check_probability(var: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { var, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_environment_yields_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.grid_dimension, 25);
        assert_eq!(config.ghost_count, 5);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.ghost_cadence, 3);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("MAZE_GRID_DIM", "11"),
            ("MAZE_GHOSTS", "2"),
            ("MAZE_TICK_MS", " 50 "),
            ("MAZE_SEED", "42"),
            ("MAZE_LOG_FILE", "/tmp/maze.log"),
        ]))
        .unwrap();
        assert_eq!(config.grid_dimension, 11);
        assert_eq!(config.ghost_count, 2);
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/maze.log")));
    }

    #[test]
    fn even_or_tiny_grid_is_rejected() {
        for bad in ["24", "3", "1"] {
            let err = Config::from_lookup(lookup_from(&[("MAZE_GRID_DIM", bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::GridDimension { .. }), "{bad}: {err}");
        }
        assert!(Config::from_lookup(lookup_from(&[("MAZE_GRID_DIM", "5")])).is_ok());
    }

    #[test]
    fn garbage_is_an_error_not_a_fallback() {
        let err = Config::from_lookup(lookup_from(&[("MAZE_BLOCK_SIZE", "big")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Unparsable {
                var: "MAZE_BLOCK_SIZE",
                value: "big".to_string()
            }
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err =
            Config::from_lookup(lookup_from(&[("MAZE_PATH_PROBABILITY", "1.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Probability { .. }));
        let err = Config::from_lookup(lookup_from(&[("MAZE_GHOST_CADENCE", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::NotPositive { var: "MAZE_GHOST_CADENCE" });
        let err = Config::from_lookup(lookup_from(&[("MAZE_TICK_MS", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::NotPositive { var: "MAZE_TICK_MS" });
    }

    #[test]
    fn cell_and_point_conversions_agree() {
        let config = Config::default();
        let p = config.cell_point(3, 7);
        assert_eq!(p, Point::new(96.0, 224.0));
        assert_eq!(config.point_cell(p), Some((3, 7)));
        assert_eq!(config.point_cell(Point::new(-40.0, 0.0)), None);
    }
}
