//! A whole run: its description plus one metric set per group.
//!
//! [`RunMetrics::read_metrics`] loads a run folder in the following steps:
//!
//! 1. Check the parameters (load mask, last cycle, thread count)
//! 2. Parse `RunInfo.xml`, plus `RunParameters.xml` when the former names no
//!    channels, and discard everything loaded before
//! 3. Read the selected `InterOp/*Out.bin` files in parallel, skipping absent ones
//! 4. Decode each file into its set, in [`MetricGroup::ALL`] order; an
//!    incomplete file keeps the records before its damaged tail
//! 5. Drop records beyond the last cycle
//! 6. Finalize: channel names, tile naming, collapsed Q-scores
//! 7. Cross-check every record against the run description
//!
//! The thread count only bounds how many files are read at once; decoding is
//! serial, so results never depend on it.

use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::constants::{MetricGroup, MetricType, TileNamingMethod};
use crate::errors::{InteropError, Result};
use crate::io::{self, MetricFormat, metric_file_path};
use crate::logging::format_duration;
use crate::logic::q_metric::collapse_q_metrics;
use crate::metrics::{
    CorrectedIntensityMetric, ErrorMetric, ExtractionMetric, IndexMetric, MetricRecord, MetricSet,
    QCollapsedMetric, QMetric, TileMetric,
};
use crate::run::{RunInfo, RunParameters};
use crate::validation::{validate_dir_exists, validate_load_mask, validate_positive};

/// Channel names assumed for runs whose description lists none.
const TWO_CHANNEL_NAMES: [&str; 2] = ["Red", "Green"];
const FOUR_CHANNEL_NAMES: [&str; 4] = ["A", "C", "G", "T"];

/// Run description and every loaded metric set.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    run_info: RunInfo,
    run_parameters: RunParameters,
    extraction: MetricSet<ExtractionMetric>,
    corrected_intensity: MetricSet<CorrectedIntensityMetric>,
    error: MetricSet<ErrorMetric>,
    tile: MetricSet<TileMetric>,
    q: MetricSet<QMetric>,
    q_collapsed: MetricSet<QCollapsedMetric>,
    index: MetricSet<IndexMetric>,
}

impl RunMetrics {
    /// Creates an empty run with the given description.
    #[must_use]
    pub fn new(run_info: RunInfo) -> Self {
        Self { run_info, ..Self::default() }
    }

    #[must_use]
    pub fn run_info(&self) -> &RunInfo {
        &self.run_info
    }

    /// Run parameters, empty unless read from a run folder or set.
    #[must_use]
    pub fn run_parameters(&self) -> &RunParameters {
        &self.run_parameters
    }

    pub fn set_run_parameters(&mut self, run_parameters: RunParameters) {
        self.run_parameters = run_parameters;
    }

    pub fn set_run_info(&mut self, run_info: RunInfo) {
        self.run_info = run_info;
    }

    #[must_use]
    pub fn extraction(&self) -> &MetricSet<ExtractionMetric> {
        &self.extraction
    }

    pub fn extraction_mut(&mut self) -> &mut MetricSet<ExtractionMetric> {
        &mut self.extraction
    }

    #[must_use]
    pub fn corrected_intensity(&self) -> &MetricSet<CorrectedIntensityMetric> {
        &self.corrected_intensity
    }

    pub fn corrected_intensity_mut(&mut self) -> &mut MetricSet<CorrectedIntensityMetric> {
        &mut self.corrected_intensity
    }

    #[must_use]
    pub fn error(&self) -> &MetricSet<ErrorMetric> {
        &self.error
    }

    pub fn error_mut(&mut self) -> &mut MetricSet<ErrorMetric> {
        &mut self.error
    }

    #[must_use]
    pub fn tile(&self) -> &MetricSet<TileMetric> {
        &self.tile
    }

    pub fn tile_mut(&mut self) -> &mut MetricSet<TileMetric> {
        &mut self.tile
    }

    #[must_use]
    pub fn q(&self) -> &MetricSet<QMetric> {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut MetricSet<QMetric> {
        &mut self.q
    }

    #[must_use]
    pub fn q_collapsed(&self) -> &MetricSet<QCollapsedMetric> {
        &self.q_collapsed
    }

    pub fn q_collapsed_mut(&mut self) -> &mut MetricSet<QCollapsedMetric> {
        &mut self.q_collapsed
    }

    #[must_use]
    pub fn index(&self) -> &MetricSet<IndexMetric> {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut MetricSet<IndexMetric> {
        &mut self.index
    }

    /// True when no metric set holds a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        MetricGroup::ALL.into_iter().all(|group| self.group_size(group) == 0)
    }

    /// Number of records loaded for `group`.
    #[must_use]
    pub fn group_size(&self, group: MetricGroup) -> usize {
        match group {
            MetricGroup::CorrectedInt => self.corrected_intensity.size(),
            MetricGroup::Error => self.error.size(),
            MetricGroup::Extraction => self.extraction.size(),
            MetricGroup::Index => self.index.size(),
            MetricGroup::Q => self.q.size(),
            MetricGroup::Tile => self.tile.size(),
            MetricGroup::QCollapsed => self.q_collapsed.size(),
        }
    }

    /// Loads a run folder, replacing everything previously held.
    ///
    /// Absent metric files are skipped. A metric file that ends part-way
    /// through a record keeps the records before the cut; both are logged as
    /// warnings rather than failing the load.
    ///
    /// # Arguments
    /// * `run_folder` - Folder holding `RunInfo.xml` and the `InterOp` directory
    /// * `last_cycle` - Records of later cycles are dropped
    /// * `valid_to_load` - One entry per [`MetricGroup`]; non-zero selects the group
    /// * `thread_count` - Upper bound on files read concurrently
    ///
    /// # Errors
    /// - [`InteropError::InvalidParameter`] for a bad mask, cycle or thread count,
    ///   reported before any file is opened
    /// - [`InteropError::FileNotFound`] when the folder or `RunInfo.xml` is absent
    /// - any decode, finalization or cross-validation error
    pub fn read_metrics<P: AsRef<Path>>(
        &mut self,
        run_folder: P,
        last_cycle: u32,
        valid_to_load: &[u8],
        thread_count: usize,
    ) -> Result<()> {
        validate_load_mask(valid_to_load, "valid_to_load")?;
        validate_positive(last_cycle, "last_cycle")?;
        validate_positive(thread_count, "thread_count")?;

        let start = Instant::now();
        let run_folder = run_folder.as_ref();
        validate_dir_exists(run_folder)?;
        let run_info = RunInfo::from_run_folder(run_folder)?;
        let run_parameters = if run_info.channels().is_empty() {
            RunParameters::from_run_folder(run_folder)?.unwrap_or_default()
        } else {
            RunParameters::default()
        };
        *self = Self { run_info, run_parameters, ..Self::default() };

        let selected: Vec<MetricGroup> =
            MetricGroup::ALL.into_iter().filter(|g| valid_to_load[g.index()] != 0).collect();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(thread_count).build().map_err(|e| {
            InteropError::InvalidParameter { parameter: "thread_count".to_string(), reason: e.to_string() }
        })?;
        let files: Vec<(MetricGroup, Result<Option<Vec<u8>>>)> = pool.install(|| {
            selected.par_iter().map(|&group| (group, read_optional(run_folder, group))).collect()
        });

        let mut loaded = 0;
        for (group, bytes) in files {
            let Some(bytes) = bytes? else {
                continue;
            };
            match self.read_metrics_from_buffer(group, &bytes) {
                Ok(()) => {}
                Err(InteropError::IncompleteFile { reason, .. }) => {
                    warn!("Keeping {} {group} records from an incomplete file: {reason}", self.group_size(group));
                }
                Err(e) => return Err(e),
            }
            loaded += 1;
        }
        self.drop_cycles_after(last_cycle);
        self.finalize_after_load()?;
        self.validate()?;

        info!(
            "Loaded {} of {} metric files from {} in {}",
            loaded,
            selected.len(),
            run_folder.display(),
            format_duration(start.elapsed())
        );
        Ok(())
    }

    /// Decodes `bytes` into the set of `group`, replacing its contents.
    ///
    /// # Errors
    /// See [`io::read_from_buffer`].
    pub fn read_metrics_from_buffer(&mut self, group: MetricGroup, bytes: &[u8]) -> Result<()> {
        match group {
            MetricGroup::CorrectedInt => io::read_from_buffer(bytes, &mut self.corrected_intensity),
            MetricGroup::Error => io::read_from_buffer(bytes, &mut self.error),
            MetricGroup::Extraction => io::read_from_buffer(bytes, &mut self.extraction),
            MetricGroup::Index => io::read_from_buffer(bytes, &mut self.index),
            MetricGroup::Q => io::read_from_buffer(bytes, &mut self.q),
            MetricGroup::Tile => io::read_from_buffer(bytes, &mut self.tile),
            MetricGroup::QCollapsed => io::read_from_buffer(bytes, &mut self.q_collapsed),
        }
    }

    /// Encodes the set of `group` into `out`, returning the bytes written.
    ///
    /// # Errors
    /// See [`io::write_to_buffer`].
    pub fn write_metrics_to_buffer(&self, group: MetricGroup, out: &mut [u8]) -> Result<usize> {
        match group {
            MetricGroup::CorrectedInt => io::write_to_buffer(&self.corrected_intensity, out),
            MetricGroup::Error => io::write_to_buffer(&self.error, out),
            MetricGroup::Extraction => io::write_to_buffer(&self.extraction, out),
            MetricGroup::Index => io::write_to_buffer(&self.index, out),
            MetricGroup::Q => io::write_to_buffer(&self.q, out),
            MetricGroup::Tile => io::write_to_buffer(&self.tile, out),
            MetricGroup::QCollapsed => io::write_to_buffer(&self.q_collapsed, out),
        }
    }

    /// Encoded size of the set of `group`.
    ///
    /// # Errors
    /// See [`io::calculate_buffer_size`].
    pub fn calculate_buffer_size(&self, group: MetricGroup) -> Result<usize> {
        match group {
            MetricGroup::CorrectedInt => io::calculate_buffer_size(&self.corrected_intensity),
            MetricGroup::Error => io::calculate_buffer_size(&self.error),
            MetricGroup::Extraction => io::calculate_buffer_size(&self.extraction),
            MetricGroup::Index => io::calculate_buffer_size(&self.index),
            MetricGroup::Q => io::calculate_buffer_size(&self.q),
            MetricGroup::Tile => io::calculate_buffer_size(&self.tile),
            MetricGroup::QCollapsed => io::calculate_buffer_size(&self.q_collapsed),
        }
    }

    /// Writes every non-empty set to `<run_folder>/InterOp`.
    ///
    /// # Errors
    /// See [`io::write_to_file`].
    pub fn write_metrics<P: AsRef<Path>>(&self, run_folder: P) -> Result<()> {
        let run_folder = run_folder.as_ref();
        write_if_loaded(run_folder, &self.corrected_intensity)?;
        write_if_loaded(run_folder, &self.error)?;
        write_if_loaded(run_folder, &self.extraction)?;
        write_if_loaded(run_folder, &self.index)?;
        write_if_loaded(run_folder, &self.q)?;
        write_if_loaded(run_folder, &self.tile)?;
        write_if_loaded(run_folder, &self.q_collapsed)
    }

    /// Derives what loading leaves implicit.
    ///
    /// Channel names come from the run description, or else from the channel
    /// count of the extraction metrics, or else from the instrument named by
    /// the run parameters. An unknown tile naming method is
    /// inferred from the largest tile number. Collapsed Q-scores are computed
    /// from the full histograms when only the latter were loaded.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidChannel`] when no channel names can be
    /// determined.
    pub fn finalize_after_load(&mut self) -> Result<()> {
        if self.run_info.channels().is_empty() {
            let count = match self.extraction_channel_count() {
                0 => self.run_parameters.channel_count().unwrap_or(0),
                count => count,
            };
            let channels = channel_names(count)?;
            debug!("Using channel names {channels:?}");
            self.run_info.set_channels(channels);
        }
        if self.run_info.flowcell().naming_method() == TileNamingMethod::Unknown {
            if let Some(method) = self.infer_naming_method() {
                debug!("Inferred tile naming method {method}");
                self.run_info.flowcell_mut().set_naming_method(method);
            }
        }
        if self.q_collapsed.is_empty() && !self.q.is_empty() {
            self.q_collapsed = collapse_q_metrics(&self.q);
            debug!("Collapsed {} Q-score histograms", self.q_collapsed.size());
        }
        Ok(())
    }

    /// Checks every loaded record against the run description.
    ///
    /// # Errors
    /// - [`InteropError::InvalidRunInfo`] for a lane, tile or read out of range
    /// - [`InteropError::InvalidRunInfoCycle`] for a cycle beyond the run
    pub fn validate(&self) -> Result<()> {
        self.validate_cycles(&self.extraction)?;
        self.validate_cycles(&self.corrected_intensity)?;
        self.validate_cycles(&self.error)?;
        self.validate_cycles(&self.q)?;
        self.validate_cycles(&self.q_collapsed)?;
        let info = &self.run_info;
        for metric in &self.tile {
            info.validate_lane_tile(metric.lane(), metric.tile(), MetricGroup::Tile.name())?;
            for read in metric.read_metrics() {
                info.validate_read(metric.lane(), metric.tile(), read.read, MetricGroup::Tile.name())?;
            }
        }
        for metric in &self.index {
            info.validate_read(metric.lane(), metric.tile(), metric.read(), MetricGroup::Index.name())?;
        }
        Ok(())
    }

    fn validate_cycles<T: MetricRecord>(&self, set: &MetricSet<T>) -> Result<()> {
        for metric in set {
            self.run_info.validate_cycle(metric.lane(), metric.tile(), metric.cycle(), T::GROUP.name())?;
        }
        Ok(())
    }

    fn drop_cycles_after(&mut self, last_cycle: u32) {
        self.extraction.retain(|m| m.cycle() <= last_cycle);
        self.corrected_intensity.retain(|m| m.cycle() <= last_cycle);
        self.error.retain(|m| m.cycle() <= last_cycle);
        self.q.retain(|m| m.cycle() <= last_cycle);
        self.q_collapsed.retain(|m| m.cycle() <= last_cycle);
    }

    fn extraction_channel_count(&self) -> usize {
        match usize::from(self.extraction.header().channel_count) {
            0 => self.extraction.iter().map(ExtractionMetric::channel_count).max().unwrap_or(0),
            count => count,
        }
    }

    fn infer_naming_method(&self) -> Option<TileNamingMethod> {
        let max_tile = [
            self.tile.iter().map(MetricRecord::tile).max(),
            self.extraction.iter().map(MetricRecord::tile).max(),
            self.corrected_intensity.iter().map(MetricRecord::tile).max(),
            self.error.iter().map(MetricRecord::tile).max(),
            self.q.iter().map(MetricRecord::tile).max(),
            self.q_collapsed.iter().map(MetricRecord::tile).max(),
            self.index.iter().map(MetricRecord::tile).max(),
        ]
        .into_iter()
        .flatten()
        .max()?;
        Some(if max_tile > 9999 {
            TileNamingMethod::FiveDigit
        } else if max_tile > 999 {
            TileNamingMethod::FourDigit
        } else {
            TileNamingMethod::Absolute
        })
    }
}

fn read_optional(run_folder: &Path, group: MetricGroup) -> Result<Option<Vec<u8>>> {
    let path = metric_file_path(run_folder, group);
    match io::file::read_bytes(&path) {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(Some(bytes))
        }
        Err(InteropError::FileNotFound { path }) => {
            warn!("Skipping {group} metrics: {} not found", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn write_if_loaded<T: MetricFormat>(run_folder: &Path, set: &MetricSet<T>) -> Result<()> {
    if set.is_empty() {
        return Ok(());
    }
    io::write_to_file(metric_file_path(run_folder, T::GROUP), set)
}

fn channel_names(count: usize) -> Result<Vec<String>> {
    let names: &[&str] = match count {
        2 => &TWO_CHANNEL_NAMES,
        4 => &FOUR_CHANNEL_NAMES,
        0 => {
            return Err(InteropError::InvalidChannel {
                reason: "neither the run description nor the run parameters name the channels, \
                         and no extraction metrics were loaded"
                    .to_string(),
            });
        }
        other => {
            return Err(InteropError::InvalidChannel {
                reason: format!("cannot name {other} channels without a channel list in the run description"),
            });
        }
    };
    Ok(names.iter().map(ToString::to_string).collect())
}

/// Load mask selecting the group a metric type or group name refers to.
///
/// # Errors
/// Returns [`InteropError::InvalidMetricType`] when `name` is neither a
/// metric type nor a metric group.
///
/// # Example
/// ```
/// use interop_lib::run_metrics::list_metrics_to_load;
///
/// assert_eq!(list_metrics_to_load("ErrorRate").unwrap(), vec![0, 1, 0, 0, 0, 0, 0]);
/// assert!(list_metrics_to_load("Unknown").is_err());
/// ```
pub fn list_metrics_to_load(name: &str) -> Result<Vec<u8>> {
    let group = match MetricGroup::parse(name) {
        Some(group) => group,
        None => MetricType::parse(name)?.group(),
    };
    let mut mask = vec![0; MetricGroup::COUNT];
    mask[group.index()] = 1;
    Ok(mask)
}

/// Integer feature code of a metric type.
#[must_use]
pub fn to_feature(metric_type: MetricType) -> u32 {
    metric_type.feature_code()
}
