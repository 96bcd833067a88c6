//! Board configuration
//!
//! Board rules are plain data with defaults from [`crate::types`]. A level
//! file may carry a partial config (missing fields take their defaults) and
//! `from_env` overrides the defaults for headless runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::PieceSpec;
use crate::types::{
    CollectibleFlags, PieceColor, DEFAULT_COLLECTIBLE_CHANCE, DEFAULT_HEIGHT,
    DEFAULT_MAX_COLLECTIBLES, DEFAULT_MIN_MATCH, DEFAULT_PIECE_SCORE, DEFAULT_WIDTH,
};

/// Upper bound on either side of the board
pub const MAX_EXTENT: usize = 256;

/// Fewer colours than this and refill can be forced into matches forever
pub const MIN_PALETTE: usize = 3;

/// Board rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    /// Colours drawn by refill
    pub palette: Vec<PieceColor>,
    /// Score value of refilled pieces and spawned bombs
    pub piece_score: u32,
    /// Chance that a top-row refill spawns a collectible
    pub collectible_spawn_chance: f32,
    pub max_collectibles: usize,
    /// Collectible kinds refill may spawn
    pub collectibles: Vec<PieceSpec>,
    pub min_match_length: usize,
    pub seed: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            palette: PieceColor::DEFAULT_PALETTE.to_vec(),
            piece_score: DEFAULT_PIECE_SCORE,
            collectible_spawn_chance: DEFAULT_COLLECTIBLE_CHANCE,
            max_collectibles: DEFAULT_MAX_COLLECTIBLES,
            collectibles: vec![PieceSpec::collectible(
                CollectibleFlags {
                    cleared_at_bottom: true,
                    cleared_by_bomb: false,
                },
                1000,
            )],
            min_match_length: DEFAULT_MIN_MATCH,
            seed: 1,
        }
    }
}

impl BoardConfig {
    /// Defaults overridden by `CASCADE_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        fn var<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        Self {
            width: var("CASCADE_WIDTH").unwrap_or(defaults.width),
            height: var("CASCADE_HEIGHT").unwrap_or(defaults.height),
            collectible_spawn_chance: var("CASCADE_COLLECTIBLE_CHANCE")
                .unwrap_or(defaults.collectible_spawn_chance),
            max_collectibles: var("CASCADE_MAX_COLLECTIBLES").unwrap_or(defaults.max_collectibles),
            min_match_length: var("CASCADE_MIN_MATCH").unwrap_or(defaults.min_match_length),
            seed: var("CASCADE_SEED").unwrap_or(defaults.seed),
            ..defaults
        }
    }

    /// Reject configurations refill or matching cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.width > MAX_EXTENT || self.height > MAX_EXTENT {
            return Err(ConfigError::InvalidExtent {
                width: self.width,
                height: self.height,
            });
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if let Some(&color) = self
            .palette
            .iter()
            .find(|c| matches!(c, PieceColor::None | PieceColor::Wild))
        {
            return Err(ConfigError::UnmatchablePaletteColor(color));
        }
        let mut distinct = self.palette.clone();
        distinct.sort_by_key(|c| c.as_str());
        distinct.dedup();
        if distinct.len() < MIN_PALETTE {
            return Err(ConfigError::PaletteTooSmall(distinct.len()));
        }
        if !(0.0..=1.0).contains(&self.collectible_spawn_chance) {
            return Err(ConfigError::ChanceOutOfRange(self.collectible_spawn_chance));
        }
        if let Some(index) = self.collectibles.iter().position(|spec| spec.collectible.is_none()) {
            return Err(ConfigError::NotCollectible(index));
        }
        if self.min_match_length < DEFAULT_MIN_MATCH {
            return Err(ConfigError::MinMatchTooShort(self.min_match_length));
        }
        Ok(())
    }
}

/// Configuration errors, surfaced at setup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board extent {width}x{height} is out of range")]
    InvalidExtent { width: usize, height: usize },
    #[error("piece palette is empty")]
    EmptyPalette,
    #[error("palette has {0} distinct colours, at least 3 are needed")]
    PaletteTooSmall(usize),
    #[error("palette colour {0:?} cannot be drawn by refill")]
    UnmatchablePaletteColor(PieceColor),
    #[error("collectible spawn chance {0} is outside 0..=1")]
    ChanceOutOfRange(f32),
    #[error("collectible table entry {0} is not a collectible")]
    NotCollectible(usize),
    #[error("minimum match length {0} is below 3")]
    MinMatchTooShort(usize),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidExtent { .. } => "invalid_extent",
            ConfigError::EmptyPalette => "empty_palette",
            ConfigError::PaletteTooSmall(_) => "palette_too_small",
            ConfigError::UnmatchablePaletteColor(_) => "unmatchable_palette_color",
            ConfigError::ChanceOutOfRange(_) => "chance_out_of_range",
            ConfigError::NotCollectible(_) => "not_collectible",
            ConfigError::MinMatchTooShort(_) => "min_match_too_short",
        }
    }
}
