//! Dispatch configuration with documented constants
//!
//! Every tunable of the engine is collected here. Values are fixed for the
//! whole match: they are read once at startup and never re-tuned.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DispatchError, Result};
use crate::core::types::{Base, Coord};

/// Largest side accepted for the grid
pub const MAX_GRID_SIDE: u32 = 4096;

/// Configuration for the dispatch engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    // === GRID ===
    /// Grid width in cells (column 0 is the base column by default)
    pub width: u32,

    /// Grid height in cells
    pub height: u32,

    /// Base anchor cell
    ///
    /// The whole column of the anchor is headquarters; the anchor itself is
    /// used to rank units when choosing the radar carrier.
    pub base: Coord,

    // === RADAR ===
    /// Manhattan radius revealed by one buried radar
    pub radar_radius: u32,

    /// Maximum number of radars deployed over a match
    pub radar_cap: u32,

    /// Known ore total at which radar duty is suspended
    ///
    /// Once this much ore is visible, every unit is more useful digging than
    /// carrying radars. Re-checked every turn.
    pub ore_threshold: u32,

    /// Overlap between neighbouring radars in the fallback pattern
    ///
    /// The fallback stride is `2 * radar_radius - pattern_margin`. At 0 the
    /// diamonds just touch.
    pub pattern_margin: u32,

    // === TARGETING ===
    /// Score penalty per unit already committed to an ore cell
    ///
    /// At 0 units always pick the nearest ore regardless of crowding.
    pub crowding_weight: u32,

    /// Seed for exploration choices
    pub seed: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 15,
            base: Coord::new(0, 7),

            radar_radius: 4,
            radar_cap: 10,
            ore_threshold: 20,
            pattern_margin: 0,

            crowding_weight: 0,
            seed: 42,
        }
    }
}

impl DispatchConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> Base {
        Base::new(self.base)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.width < 2 || self.height < 1 {
            return Err(DispatchError::InvalidConfig(format!(
                "grid {}x{} is too small",
                self.width, self.height
            )));
        }

        if self.width > MAX_GRID_SIDE || self.height > MAX_GRID_SIDE {
            return Err(DispatchError::InvalidConfig(format!(
                "grid {}x{} exceeds {} cells per side",
                self.width, self.height, MAX_GRID_SIDE
            )));
        }

        let base = self.base;
        if base.x < 0 || base.y < 0 || base.x >= self.width as i32 || base.y >= self.height as i32 {
            return Err(DispatchError::InvalidConfig(format!(
                "base {} lies outside the {}x{} grid",
                base, self.width, self.height
            )));
        }

        if self.radar_radius == 0 {
            return Err(DispatchError::InvalidConfig(
                "radar_radius must be positive".into(),
            ));
        }

        if self.pattern_margin >= 2 * self.radar_radius {
            return Err(DispatchError::InvalidConfig(format!(
                "pattern_margin ({}) should be < 2 * radar_radius ({})",
                self.pattern_margin,
                2 * self.radar_radius
            )));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DispatchConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }
}
