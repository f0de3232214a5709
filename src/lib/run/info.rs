//! The run description (`RunInfo.xml`): flowcell layout, reads and identifiers.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::TileNamingMethod;
use crate::errors::{InteropError, Result};
use crate::run::flowcell::FlowcellLayout;
use crate::run::read_info::ReadInfo;
use crate::run::xml::{XmlElement, parse_document};

/// File name of the run description inside a run folder.
pub const RUN_INFO_FILE_NAME: &str = "RunInfo.xml";

/// Run description: identifiers, flowcell geometry, image channels and reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    name: String,
    date: String,
    version: u32,
    run_number: u32,
    flowcell_id: String,
    instrument_name: String,
    flowcell: FlowcellLayout,
    channels: Vec<String>,
    reads: Vec<ReadInfo>,
}

impl RunInfo {
    /// Creates a run description from a layout, with no reads or channels.
    #[must_use]
    pub fn new(flowcell: FlowcellLayout) -> Self {
        Self { flowcell, ..Self::default() }
    }

    /// Replaces the reads.
    #[must_use]
    pub fn with_reads(mut self, reads: Vec<ReadInfo>) -> Self {
        self.reads = reads;
        self
    }

    /// Replaces the image channel names.
    #[must_use]
    pub fn with_channels(mut self, channels: Vec<String>) -> Self {
        self.channels = channels;
        self
    }

    /// Sets the run identifier.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run identifier (`Run/@Id`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Schema version (`RunInfo/@Version`), 0 when absent.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn run_number(&self) -> u32 {
        self.run_number
    }

    #[must_use]
    pub fn flowcell_id(&self) -> &str {
        &self.flowcell_id
    }

    #[must_use]
    pub fn instrument_name(&self) -> &str {
        &self.instrument_name
    }

    #[must_use]
    pub fn flowcell(&self) -> &FlowcellLayout {
        &self.flowcell
    }

    pub(crate) fn flowcell_mut(&mut self) -> &mut FlowcellLayout {
        &mut self.flowcell
    }

    /// Image channel names, empty when the description lists none.
    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub(crate) fn set_channels(&mut self, channels: Vec<String>) {
        self.channels = channels;
    }

    #[must_use]
    pub fn reads(&self) -> &[ReadInfo] {
        &self.reads
    }

    /// Looks up a read by its 1-based number.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidRead`] when the run has no such read.
    pub fn read(&self, number: u32) -> Result<&ReadInfo> {
        self.reads.iter().find(|r| r.number() == number).ok_or(InteropError::InvalidRead {
            read: number,
            read_count: self.reads.len(),
        })
    }

    /// Read containing `cycle`, if any.
    #[must_use]
    pub fn read_for_cycle(&self, cycle: u32) -> Option<&ReadInfo> {
        self.reads.iter().find(|r| r.cycle_range().contains(cycle))
    }

    /// Sum of cycles over all reads.
    #[must_use]
    pub fn total_cycles(&self) -> u32 {
        self.reads.iter().map(ReadInfo::total_cycles).sum()
    }

    /// Number of non-index reads.
    #[must_use]
    pub fn non_index_read_count(&self) -> usize {
        self.reads.iter().filter(|r| !r.is_index()).count()
    }

    /// Reads and parses `path`.
    ///
    /// # Errors
    /// [`InteropError::FileNotFound`] when the file is absent, otherwise the
    /// errors of [`RunInfo::parse`].
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| InteropError::from_io(path, e))?;
        debug!("Parsing run description {}", path.display());
        Self::parse(&text)
    }

    /// Reads `RunInfo.xml` from a run folder.
    ///
    /// # Errors
    /// See [`RunInfo::read_file`].
    pub fn from_run_folder<P: AsRef<Path>>(run_folder: P) -> Result<Self> {
        Self::read_file(run_folder.as_ref().join(RUN_INFO_FILE_NAME))
    }

    /// Parses a run description from XML text.
    ///
    /// # Errors
    /// - [`InteropError::EmptyFormat`] for blank text
    /// - [`InteropError::XmlParse`] for malformed XML
    /// - [`InteropError::BadXmlFormat`] for a document that is not a run description
    ///   or holds non-numeric values where numbers are expected
    /// - [`InteropError::MissingElement`] when a required element or attribute is absent
    pub fn parse(text: &str) -> Result<Self> {
        let root = parse_document(text)?;
        if root.name != "RunInfo" {
            return Err(InteropError::BadXmlFormat {
                reason: format!("root element is '{}', expected 'RunInfo'", root.name),
            });
        }
        let run = root.child("Run").ok_or_else(|| InteropError::BadXmlFormat {
            reason: "RunInfo has no Run element".to_string(),
        })?;

        let mut info = Self {
            version: optional_number(&root, "Version")?.unwrap_or(0),
            name: run.attribute("Id").unwrap_or_default().to_string(),
            run_number: optional_number(run, "Number")?.unwrap_or(0),
            flowcell_id: run.child_text("Flowcell").unwrap_or_default().to_string(),
            instrument_name: run.child_text("Instrument").unwrap_or_default().to_string(),
            date: run.child_text("Date").unwrap_or_default().to_string(),
            ..Self::default()
        };

        if let Some(reads) = run.child("Reads") {
            info.reads = parse_reads(reads)?;
        }
        if let Some(channels) = run.child("ImageChannels") {
            info.channels = channels
                .children_named("Name")
                .map(|c| c.text.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
        info.flowcell = parse_layout(run.required_child("FlowcellLayout")?)?
            .with_barcode(info.flowcell_id.clone());
        Ok(info)
    }

    /// Checks the description as a whole.
    ///
    /// # Errors
    /// - [`InteropError::InvalidTileNamingMethod`] when the naming convention is unknown
    /// - [`InteropError::InvalidRead`] when read numbers are not `1..=n`
    /// - [`InteropError::BadXmlFormat`] when the run has no cycles
    /// - [`InteropError::InvalidTileList`] when the tile list disagrees with the layout
    pub fn validate(&self) -> Result<()> {
        if self.flowcell.naming_method() == TileNamingMethod::Unknown {
            return Err(InteropError::InvalidTileNamingMethod {
                reason: "the run description does not declare a tile naming convention"
                    .to_string(),
            });
        }
        self.validate_reads()?;
        if self.total_cycles() == 0 {
            return Err(InteropError::BadXmlFormat {
                reason: "the run declares no cycles".to_string(),
            });
        }
        self.validate_tiles()
    }

    /// Checks that reads are numbered `1..=n` in order.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidRead`] for the first out-of-place read.
    pub fn validate_reads(&self) -> Result<()> {
        for (expected, read) in (1..).zip(&self.reads) {
            if read.number() != expected {
                return Err(InteropError::InvalidRead {
                    read: read.number(),
                    read_count: self.reads.len(),
                });
            }
        }
        Ok(())
    }

    /// Checks the explicit tile list against the flowcell layout.
    ///
    /// # Errors
    /// See [`FlowcellLayout::validate_tiles`].
    pub fn validate_tiles(&self) -> Result<()> {
        self.flowcell.validate_tiles()
    }

    /// Checks a lane/tile pair against the layout.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidRunInfo`] naming the offending identifier.
    pub fn validate_lane_tile(&self, lane: u32, tile: u32, context: &str) -> Result<()> {
        self.flowcell.validate_lane_tile(lane, tile, context)
    }

    /// Checks a lane/tile pair and a cycle against the run.
    ///
    /// # Errors
    /// - [`InteropError::InvalidRunInfo`] for the lane or tile
    /// - [`InteropError::InvalidRunInfoCycle`] when `cycle` exceeds the total cycles
    pub fn validate_cycle(&self, lane: u32, tile: u32, cycle: u32, context: &str) -> Result<()> {
        self.validate_lane_tile(lane, tile, context)?;
        let total_cycles = self.total_cycles();
        if cycle > total_cycles {
            return Err(InteropError::InvalidRunInfoCycle {
                context: context.to_string(),
                lane,
                tile,
                cycle,
                total_cycles,
            });
        }
        Ok(())
    }

    /// Checks a lane/tile pair and a read number against the run.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidRunInfo`] for the first offending identifier.
    pub fn validate_read(&self, lane: u32, tile: u32, read: u32, context: &str) -> Result<()> {
        self.validate_lane_tile(lane, tile, context)?;
        let bound = u32::try_from(self.reads.len()).unwrap_or(u32::MAX);
        if read == 0 || read > bound {
            return Err(InteropError::InvalidRunInfo {
                context: context.to_string(),
                name: "read",
                value: read,
                bound,
            });
        }
        Ok(())
    }
}

fn parse_number(element: &XmlElement, name: &str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| InteropError::BadXmlFormat {
        reason: format!("{}/@{name} is not a number: '{value}'", element.name),
    })
}

fn optional_number(element: &XmlElement, name: &str) -> Result<Option<u32>> {
    element.attribute(name).map(|v| parse_number(element, name, v)).transpose()
}

fn required_number(element: &XmlElement, name: &str) -> Result<u32> {
    let value = element.required_attribute(name)?;
    parse_number(element, name, value)
}

fn parse_reads(reads: &XmlElement) -> Result<Vec<ReadInfo>> {
    let mut parsed = Vec::new();
    let mut first_cycle = 1;
    for read in reads.children_named("Read") {
        let number = required_number(read, "Number")?;
        let cycles = required_number(read, "NumCycles")?;
        let is_index = match read.attribute("IsIndexedRead").map(str::trim) {
            None | Some("N" | "n") => false,
            Some("Y" | "y") => true,
            Some(other) => {
                return Err(InteropError::BadXmlFormat {
                    reason: format!("Read/@IsIndexedRead must be Y or N, found '{other}'"),
                });
            }
        };
        parsed.push(ReadInfo::new(number, first_cycle, cycles, is_index));
        first_cycle += cycles;
    }
    Ok(parsed)
}

fn parse_layout(layout: &XmlElement) -> Result<FlowcellLayout> {
    let mut flowcell = FlowcellLayout::new(
        required_number(layout, "LaneCount")?,
        required_number(layout, "SurfaceCount")?,
        required_number(layout, "SwathCount")?,
        required_number(layout, "TileCount")?,
    )
    .with_sections(
        optional_number(layout, "SectionPerLane")?.unwrap_or(1),
        optional_number(layout, "LanePerSection")?.unwrap_or(1),
    );
    if flowcell.checked_tiles_per_lane().is_none() {
        return Err(InteropError::BadXmlFormat {
            reason: format!("FlowcellLayout declares more than {} tiles per lane", u32::MAX),
        });
    }
    if let Some(side) = optional_number(layout, "FlowcellSide")? {
        flowcell = flowcell.with_flowcell_side(side);
    }
    if let Some(tile_set) = layout.child("TileSet") {
        let naming = tile_set.required_attribute("TileNamingConvention")?;
        flowcell = flowcell.with_naming_method(TileNamingMethod::parse(naming));
        if let Some(tiles) = tile_set.child("Tiles") {
            let names = tiles
                .children_named("Tile")
                .map(|t| t.text.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            flowcell = flowcell.with_tiles(names);
        }
    }
    Ok(flowcell)
}
