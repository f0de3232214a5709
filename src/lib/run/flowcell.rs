//! Flowcell layout and tile-number decomposition.

use serde::{Deserialize, Serialize};

use crate::constants::TileNamingMethod;
use crate::errors::{InteropError, Result};

/// Physical position encoded by a tile number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePosition {
    /// Surface (1 = top, 2 = bottom)
    pub surface: u32,
    /// Swath within the surface
    pub swath: u32,
    /// Section (camera) for five-digit naming, otherwise 1
    pub section: u32,
    /// Tile number within the swath
    pub number: u32,
}

/// Lane/surface/swath/tile geometry of a flowcell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowcellLayout {
    lane_count: u32,
    surface_count: u32,
    swath_count: u32,
    tile_count: u32,
    sections_per_lane: u32,
    lanes_per_section: u32,
    flowcell_side: u32,
    naming_method: TileNamingMethod,
    tiles: Vec<String>,
    barcode: String,
}

impl Default for FlowcellLayout {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl FlowcellLayout {
    /// Creates a layout with an unknown tile naming method and no tile list.
    #[must_use]
    pub fn new(lane_count: u32, surface_count: u32, swath_count: u32, tile_count: u32) -> Self {
        Self {
            lane_count,
            surface_count,
            swath_count,
            tile_count,
            sections_per_lane: 1,
            lanes_per_section: 1,
            flowcell_side: 0,
            naming_method: TileNamingMethod::Unknown,
            tiles: Vec::new(),
            barcode: String::new(),
        }
    }

    /// Sets the tile naming method.
    #[must_use]
    pub fn with_naming_method(mut self, naming_method: TileNamingMethod) -> Self {
        self.naming_method = naming_method;
        self
    }

    /// Sets the explicit tile list (`"<lane>_<tile>"` entries).
    #[must_use]
    pub fn with_tiles(mut self, tiles: Vec<String>) -> Self {
        self.tiles = tiles;
        self
    }

    /// Sets the section geometry used by five-digit tile names.
    #[must_use]
    pub fn with_sections(mut self, sections_per_lane: u32, lanes_per_section: u32) -> Self {
        self.sections_per_lane = sections_per_lane;
        self.lanes_per_section = lanes_per_section;
        self
    }

    /// Sets the flowcell side.
    #[must_use]
    pub fn with_flowcell_side(mut self, side: u32) -> Self {
        self.flowcell_side = side;
        self
    }

    /// Sets the flowcell barcode.
    #[must_use]
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = barcode.into();
        self
    }

    #[must_use]
    pub fn lane_count(&self) -> u32 {
        self.lane_count
    }

    #[must_use]
    pub fn surface_count(&self) -> u32 {
        self.surface_count
    }

    #[must_use]
    pub fn swath_count(&self) -> u32 {
        self.swath_count
    }

    /// Tiles per swath.
    #[must_use]
    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    #[must_use]
    pub fn sections_per_lane(&self) -> u32 {
        self.sections_per_lane
    }

    #[must_use]
    pub fn lanes_per_section(&self) -> u32 {
        self.lanes_per_section
    }

    #[must_use]
    pub fn flowcell_side(&self) -> u32 {
        self.flowcell_side
    }

    #[must_use]
    pub fn naming_method(&self) -> TileNamingMethod {
        self.naming_method
    }

    pub(crate) fn set_naming_method(&mut self, naming_method: TileNamingMethod) {
        self.naming_method = naming_method;
    }

    /// The explicit tile list, empty when the run description has none.
    #[must_use]
    pub fn tiles(&self) -> &[String] {
        &self.tiles
    }

    #[must_use]
    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    /// Number of tiles in one lane, or `None` when it does not fit a `u32`.
    #[must_use]
    pub fn checked_tiles_per_lane(&self) -> Option<u32> {
        self.checked_total_swaths()?.checked_mul(self.tile_count)
    }

    /// Number of tiles in one lane, saturating at `u32::MAX`.
    #[must_use]
    pub fn tiles_per_lane(&self) -> u32 {
        self.checked_tiles_per_lane().unwrap_or(u32::MAX)
    }

    fn checked_total_swaths(&self) -> Option<u32> {
        self.surface_count.checked_mul(self.swath_count)?.checked_mul(self.sections_per_lane.max(1))
    }

    /// Number of swath columns across both surfaces (and all sections),
    /// saturating at `u32::MAX`.
    #[must_use]
    pub fn total_swaths(&self) -> u32 {
        self.checked_total_swaths().unwrap_or(u32::MAX)
    }

    /// Decomposes a tile number according to the naming method.
    ///
    /// Returns `None` when the naming method is unknown.
    #[must_use]
    pub fn tile_position(&self, tile: u32) -> Option<TilePosition> {
        match self.naming_method {
            TileNamingMethod::FourDigit => Some(TilePosition {
                surface: tile / 1000,
                swath: (tile / 100) % 10,
                section: 1,
                number: tile % 100,
            }),
            TileNamingMethod::FiveDigit => Some(TilePosition {
                surface: tile / 10000,
                swath: (tile / 1000) % 10,
                section: (tile / 100) % 10,
                number: tile % 100,
            }),
            TileNamingMethod::Absolute => {
                let per_surface = self.swath_count.saturating_mul(self.tile_count).max(1);
                let zero_based = tile.saturating_sub(1);
                let surface = zero_based / per_surface + 1;
                let within = zero_based % per_surface;
                let tile_count = self.tile_count.max(1);
                Some(TilePosition {
                    surface,
                    swath: within / tile_count + 1,
                    section: 1,
                    number: within % tile_count + 1,
                })
            }
            TileNamingMethod::Unknown => None,
        }
    }

    /// Surface of a tile, treating unknown naming as a single surface.
    #[must_use]
    pub fn surface_of(&self, tile: u32) -> u32 {
        self.tile_position(tile).map_or(1, |p| p.surface)
    }

    /// Zero-based column of a tile in a lane-by-tile flowcell image.
    ///
    /// Columns run surface-major, then swath, then section, then tile number.
    #[must_use]
    pub fn tile_column(&self, tile: u32) -> Option<usize> {
        let position = self.tile_position(tile)?;
        if position.surface == 0 || position.swath == 0 || position.number == 0 {
            return None;
        }
        let sections = u64::from(self.sections_per_lane.max(1));
        let swath_index = u64::from(position.surface - 1)
            .checked_mul(u64::from(self.swath_count))?
            .checked_add(u64::from(position.swath - 1))?
            .checked_mul(sections)?
            .checked_add(u64::from(position.section.max(1) - 1))?;
        let column = swath_index
            .checked_mul(u64::from(self.tile_count))?
            .checked_add(u64::from(position.number - 1))?;
        usize::try_from(column).ok()
    }

    /// Checks `lane` and, when the naming method is known, the position encoded
    /// by `tile` against the declared counts.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidRunInfo`] naming the first identifier out of range.
    pub fn validate_lane_tile(&self, lane: u32, tile: u32, context: &str) -> Result<()> {
        let out_of_range = |name: &'static str, value: u32, bound: u32| {
            Err(InteropError::InvalidRunInfo { context: context.to_string(), name, value, bound })
        };
        if lane == 0 || lane > self.lane_count {
            return out_of_range("lane", lane, self.lane_count);
        }
        let Some(position) = self.tile_position(tile) else {
            return Ok(());
        };
        if position.surface == 0 || position.surface > self.surface_count {
            return out_of_range("surface", position.surface, self.surface_count);
        }
        if position.swath == 0 || position.swath > self.swath_count {
            return out_of_range("swath", position.swath, self.swath_count);
        }
        if self.naming_method == TileNamingMethod::FiveDigit
            && (position.section == 0 || position.section > self.sections_per_lane)
        {
            return out_of_range("section", position.section, self.sections_per_lane);
        }
        if position.number == 0 || position.number > self.tile_count {
            return out_of_range("tile", position.number, self.tile_count);
        }
        Ok(())
    }

    /// Checks every entry of the explicit tile list against the layout.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidTileNamingMethod`] when a tile list is
    /// present but the naming method is unknown, and
    /// [`InteropError::InvalidTileList`] for the first inconsistent entry.
    pub fn validate_tiles(&self) -> Result<()> {
        if self.tiles.is_empty() {
            return Ok(());
        }
        if self.naming_method == TileNamingMethod::Unknown {
            return Err(InteropError::InvalidTileNamingMethod {
                reason: "a tile list requires a known tile naming convention".to_string(),
            });
        }
        let capacity = u64::from(self.lane_count) * u64::from(self.tiles_per_lane());
        if self.tiles.len() as u64 > capacity {
            return Err(InteropError::InvalidTileList {
                tile: self.tiles.len().to_string(),
                reason: format!("count exceeds the {capacity} tiles the layout declares"),
            });
        }
        for name in &self.tiles {
            let (lane, tile) = parse_tile_name(name)?;
            self.validate_lane_tile(lane, tile, "tile list").map_err(|e| {
                InteropError::InvalidTileList { tile: name.clone(), reason: e.to_string() }
            })?;
        }
        Ok(())
    }
}

/// Splits a `"<lane>_<tile>"` tile name.
///
/// # Errors
/// Returns [`InteropError::InvalidTileList`] when the name is not in that form.
pub fn parse_tile_name(name: &str) -> Result<(u32, u32)> {
    let invalid = || InteropError::InvalidTileList {
        tile: name.to_string(),
        reason: "is not of the form <lane>_<tile>".to_string(),
    };
    let (lane, tile) = name.trim().split_once('_').ok_or_else(invalid)?;
    let lane = lane.parse::<u32>().map_err(|_| invalid())?;
    let tile = tile.parse::<u32>().map_err(|_| invalid())?;
    Ok((lane, tile))
}
