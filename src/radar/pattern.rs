//! Radar deployment patterns
//!
//! A pattern turns grid dimensions and the radar radius into an ordered list
//! of burial sites. Radar coverage is a Manhattan diamond, so sites are laid
//! out on a staggered lattice: sites in a row are `stride` apart and every
//! other row is shifted by half a stride.

use crate::core::types::Coord;

/// Strategy producing the ordered radar deployment targets
pub trait CoveragePattern {
    /// Ordered deployment targets for a grid, never on the base column
    fn targets(&self, width: u32, height: u32, radius: u32, base_column: i32) -> Vec<Coord>;

    fn name(&self) -> &'static str;
}

/// Generic staggered lattice derived from the radar radius
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StridePattern {
    /// Overlap between neighbouring diamonds (0 = touching)
    pub margin: u32,
}

impl StridePattern {
    pub fn new(margin: u32) -> Self {
        Self { margin }
    }

    pub fn stride(&self, radius: u32) -> u32 {
        (2 * radius).saturating_sub(self.margin).max(2)
    }
}

impl CoveragePattern for StridePattern {
    fn targets(&self, width: u32, height: u32, radius: u32, base_column: i32) -> Vec<Coord> {
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let stride = self.stride(radius) as i32;
        let half = (stride / 2).max(1);
        let width = width as i32;
        let height = height as i32;

        // Sites march away from the base, whichever side of the grid it is on.
        let direction = if base_column > width / 2 { -1 } else { 1 };
        let first_row = (half - 1).min(height - 1);
        let reach = if direction > 0 { width - 1 - base_column } else { base_column };

        let mut targets = Vec::new();
        for (row, y) in (first_row..height).step_by(half as usize).enumerate() {
            let phase = (half - 1 + if row % 2 == 0 { half } else { 0 }).min(reach);
            let mut x = base_column + direction * phase;
            while (0..width).contains(&x) {
                if x != base_column {
                    targets.push(Coord::new(x, y));
                }
                x += direction * stride;
            }
        }

        targets.sort_by_key(|c| (c.x.abs_diff(base_column), c.y));
        targets
    }

    fn name(&self) -> &'static str {
        "stride"
    }
}

pub const TUNED_WIDTH: u32 = 30;
pub const TUNED_HEIGHT: u32 = 15;
pub const TUNED_RADIUS: u32 = 4;

/// Hand-ordered sites for the 30x15 league map with base on column 0
///
/// Core lattice first (inner columns before outer ones), then the left
/// column gap and the four corner fillers.
const TUNED_TARGETS: [(i32, i32); 14] = [
    (7, 3),
    (7, 11),
    (11, 7),
    (15, 3),
    (15, 11),
    (19, 7),
    (23, 3),
    (23, 11),
    (27, 7),
    (3, 7),
    (29, 2),
    (29, 12),
    (2, 1),
    (2, 13),
];

/// Verified layout for the league map, stride lattice anywhere else
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TunedPattern {
    pub fallback: StridePattern,
}

impl TunedPattern {
    pub fn new(fallback: StridePattern) -> Self {
        Self { fallback }
    }

    pub fn is_tuned_for(width: u32, height: u32, radius: u32, base_column: i32) -> bool {
        width == TUNED_WIDTH && height == TUNED_HEIGHT && radius == TUNED_RADIUS && base_column == 0
    }
}

impl CoveragePattern for TunedPattern {
    fn targets(&self, width: u32, height: u32, radius: u32, base_column: i32) -> Vec<Coord> {
        if Self::is_tuned_for(width, height, radius, base_column) {
            TUNED_TARGETS.iter().map(|&(x, y)| Coord::new(x, y)).collect()
        } else {
            self.fallback.targets(width, height, radius, base_column)
        }
    }

    fn name(&self) -> &'static str {
        "tuned"
    }
}
