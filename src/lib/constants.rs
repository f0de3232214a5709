//! The metric type registry and shared enumerations.
//!
//! [`MetricType`] is the single authoritative mapping between metric names,
//! the [`MetricGroup`] (binary file) that holds them and the feature flags
//! describing how they are indexed. Both run loading
//! ([`crate::run_metrics::list_metrics_to_load`]) and plotting
//! ([`crate::logic::plot::plot_flowcell_map`]) resolve names here, so an
//! unknown name is rejected identically everywhere.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{InteropError, Result};

/// A binary metric file kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricGroup {
    /// Corrected intensities and base calls
    CorrectedInt,
    /// Error rates against a control
    Error,
    /// Per-channel intensity and focus
    Extraction,
    /// Demultiplexing counts
    Index,
    /// Q-score histograms
    Q,
    /// Per-tile cluster, phasing and alignment metrics
    Tile,
    /// Q-score histograms collapsed to Q20/Q30/median
    QCollapsed,
}

impl MetricGroup {
    /// Every group, in load-mask order.
    pub const ALL: [MetricGroup; 7] = [
        MetricGroup::CorrectedInt,
        MetricGroup::Error,
        MetricGroup::Extraction,
        MetricGroup::Index,
        MetricGroup::Q,
        MetricGroup::Tile,
        MetricGroup::QCollapsed,
    ];

    /// Number of groups; the length of a load mask.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this group in a load mask.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in messages and accepted by [`MetricGroup::parse`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CorrectedInt => "CorrectedInt",
            Self::Error => "Error",
            Self::Extraction => "Extraction",
            Self::Index => "Index",
            Self::Q => "Q",
            Self::Tile => "Tile",
            Self::QCollapsed => "QCollapsed",
        }
    }

    /// File name prefix under the `InterOp` folder.
    #[must_use]
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::CorrectedInt => "CorrectedIntMetrics",
            Self::Error => "ErrorMetrics",
            Self::Extraction => "ExtractionMetrics",
            Self::Index => "IndexMetrics",
            Self::Q => "QMetrics",
            Self::Tile => "TileMetrics",
            Self::QCollapsed => "QMetrics2030",
        }
    }

    /// File name of this group's binary file, e.g. `TileMetricsOut.bin`.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}Out.bin", self.file_prefix())
    }

    /// Looks up a group by its name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }
}

impl fmt::Display for MetricGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bit flags describing which identifiers a metric type varies by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricFeature(u32);

impl MetricFeature {
    /// Varies per tile only
    pub const TILE: MetricFeature = MetricFeature(0x01);
    /// Varies per cycle
    pub const CYCLE: MetricFeature = MetricFeature(0x02);
    /// Varies per read
    pub const READ: MetricFeature = MetricFeature(0x04);
    /// Varies per called base
    pub const BASE: MetricFeature = MetricFeature(0x08);
    /// Varies per imaging channel
    pub const CHANNEL: MetricFeature = MetricFeature(0x10);

    /// Raw bit value.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is set.
    #[must_use]
    pub fn contains(self, other: MetricFeature) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MetricFeature {
    type Output = MetricFeature;

    fn bitor(self, rhs: Self) -> Self::Output {
        MetricFeature(self.0 | rhs.0)
    }
}

/// A named, plottable metric derived from one [`MetricGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricType {
    Intensity,
    FWHM,
    BasePercent,
    PercentNoCall,
    Q20Percent,
    Q30Percent,
    AccumPercentQ20,
    AccumPercentQ30,
    QScore,
    Clusters,
    ClustersPF,
    ClusterCount,
    ClusterCountPF,
    ErrorRate,
    PercentPhasing,
    PercentPrephasing,
    PercentAligned,
    CorrectedIntensity,
    CalledIntensity,
    SignalToNoise,
}

impl MetricType {
    /// Every metric type in registry order.
    pub const ALL: [MetricType; 20] = [
        MetricType::Intensity,
        MetricType::FWHM,
        MetricType::BasePercent,
        MetricType::PercentNoCall,
        MetricType::Q20Percent,
        MetricType::Q30Percent,
        MetricType::AccumPercentQ20,
        MetricType::AccumPercentQ30,
        MetricType::QScore,
        MetricType::Clusters,
        MetricType::ClustersPF,
        MetricType::ClusterCount,
        MetricType::ClusterCountPF,
        MetricType::ErrorRate,
        MetricType::PercentPhasing,
        MetricType::PercentPrephasing,
        MetricType::PercentAligned,
        MetricType::CorrectedIntensity,
        MetricType::CalledIntensity,
        MetricType::SignalToNoise,
    ];

    /// Identifier name, e.g. `"Intensity"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Intensity => "Intensity",
            Self::FWHM => "FWHM",
            Self::BasePercent => "BasePercent",
            Self::PercentNoCall => "PercentNoCall",
            Self::Q20Percent => "Q20Percent",
            Self::Q30Percent => "Q30Percent",
            Self::AccumPercentQ20 => "AccumPercentQ20",
            Self::AccumPercentQ30 => "AccumPercentQ30",
            Self::QScore => "QScore",
            Self::Clusters => "Clusters",
            Self::ClustersPF => "ClustersPF",
            Self::ClusterCount => "ClusterCount",
            Self::ClusterCountPF => "ClusterCountPF",
            Self::ErrorRate => "ErrorRate",
            Self::PercentPhasing => "PercentPhasing",
            Self::PercentPrephasing => "PercentPrephasing",
            Self::PercentAligned => "PercentAligned",
            Self::CorrectedIntensity => "CorrectedIntensity",
            Self::CalledIntensity => "CalledIntensity",
            Self::SignalToNoise => "SignalToNoise",
        }
    }

    /// Human-readable label used for plot axes and listings.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Intensity => "Intensity",
            Self::FWHM => "FWHM",
            Self::BasePercent => "% Base",
            Self::PercentNoCall => "% NoCall",
            Self::Q20Percent => "% >=Q20",
            Self::Q30Percent => "% >=Q30",
            Self::AccumPercentQ20 => "% >=Q20 (Accumulated)",
            Self::AccumPercentQ30 => "% >=Q30 (Accumulated)",
            Self::QScore => "Median QScore",
            Self::Clusters => "Density",
            Self::ClustersPF => "Density PF",
            Self::ClusterCount => "Cluster Count",
            Self::ClusterCountPF => "Clusters PF",
            Self::ErrorRate => "Error Rate",
            Self::PercentPhasing => "Legacy Phasing Rate",
            Self::PercentPrephasing => "Legacy Prephasing Rate",
            Self::PercentAligned => "% Aligned",
            Self::CorrectedIntensity => "Corrected Int",
            Self::CalledIntensity => "Called Int",
            Self::SignalToNoise => "Signal to Noise",
        }
    }

    /// Metric group whose records this type is computed from.
    #[must_use]
    pub fn group(self) -> MetricGroup {
        match self {
            Self::Intensity | Self::FWHM => MetricGroup::Extraction,
            Self::BasePercent
            | Self::PercentNoCall
            | Self::CorrectedIntensity
            | Self::CalledIntensity
            | Self::SignalToNoise => MetricGroup::CorrectedInt,
            Self::Q20Percent
            | Self::Q30Percent
            | Self::AccumPercentQ20
            | Self::AccumPercentQ30
            | Self::QScore => MetricGroup::Q,
            Self::Clusters
            | Self::ClustersPF
            | Self::ClusterCount
            | Self::ClusterCountPF
            | Self::PercentPhasing
            | Self::PercentPrephasing
            | Self::PercentAligned => MetricGroup::Tile,
            Self::ErrorRate => MetricGroup::Error,
        }
    }

    /// Identifiers this type varies by.
    #[must_use]
    pub fn features(self) -> MetricFeature {
        match self {
            Self::Intensity | Self::FWHM => MetricFeature::CYCLE | MetricFeature::CHANNEL,
            Self::BasePercent | Self::CorrectedIntensity | Self::CalledIntensity => {
                MetricFeature::CYCLE | MetricFeature::BASE
            }
            Self::PercentNoCall
            | Self::SignalToNoise
            | Self::Q20Percent
            | Self::Q30Percent
            | Self::AccumPercentQ20
            | Self::AccumPercentQ30
            | Self::QScore
            | Self::ErrorRate => MetricFeature::CYCLE,
            Self::Clusters | Self::ClustersPF | Self::ClusterCount | Self::ClusterCountPF => {
                MetricFeature::TILE
            }
            Self::PercentPhasing | Self::PercentPrephasing | Self::PercentAligned => {
                MetricFeature::READ
            }
        }
    }

    /// Stable integer code of [`MetricType::features`] exposed to consumers.
    ///
    /// # Example
    /// ```
    /// use interop_lib::constants::MetricType;
    /// assert_eq!(MetricType::Intensity.feature_code(), 18);
    /// ```
    #[must_use]
    pub fn feature_code(self) -> u32 {
        self.features().bits()
    }

    /// Whether values vary by cycle.
    #[must_use]
    pub fn is_cycle_metric(self) -> bool {
        self.features().contains(MetricFeature::CYCLE)
    }

    /// Whether values vary by imaging channel.
    #[must_use]
    pub fn is_channel_metric(self) -> bool {
        self.features().contains(MetricFeature::CHANNEL)
    }

    /// Whether values vary by called base.
    #[must_use]
    pub fn is_base_metric(self) -> bool {
        self.features().contains(MetricFeature::BASE)
    }

    /// Whether values vary by read.
    #[must_use]
    pub fn is_read_metric(self) -> bool {
        self.features().contains(MetricFeature::READ)
    }

    /// Looks up a metric type by identifier name or description.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidMetricType`] for names not in the registry.
    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name || t.description() == name)
            .ok_or_else(|| InteropError::InvalidMetricType { name: name.to_string() })
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricType {
    type Err = InteropError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A called DNA base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DnaBase {
    A,
    C,
    G,
    T,
}

impl DnaBase {
    /// Bases in storage order.
    pub const ALL: [DnaBase; 4] = [DnaBase::A, DnaBase::C, DnaBase::G, DnaBase::T];

    /// Position of this base in per-base arrays.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-letter name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::C => "C",
            Self::G => "G",
            Self::T => "T",
        }
    }
}

impl fmt::Display for DnaBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How tile numbers encode their position on the flowcell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileNamingMethod {
    /// `SSTT`: surface, swath, two-digit tile
    FourDigit,
    /// `SSCTT`: surface, swath, section, two-digit tile
    FiveDigit,
    /// Tiles numbered consecutively from 1
    Absolute,
    #[default]
    Unknown,
}

impl TileNamingMethod {
    /// Parses a `TileNamingConvention` attribute; unrecognized text is `Unknown`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "FourDigit" => Self::FourDigit,
            "FiveDigit" => Self::FiveDigit,
            "Absolute" => Self::Absolute,
            _ => Self::Unknown,
        }
    }

    /// Attribute text for this method.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FourDigit => "FourDigit",
            Self::FiveDigit => "FiveDigit",
            Self::Absolute => "Absolute",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TileNamingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_intensity_feature_code_is_stable() {
        assert_eq!(MetricType::Intensity.feature_code(), 18);
    }

    #[rstest]
    #[case(MetricType::Clusters, 1)]
    #[case(MetricType::ErrorRate, 2)]
    #[case(MetricType::PercentAligned, 4)]
    #[case(MetricType::BasePercent, 10)]
    #[case(MetricType::FWHM, 18)]
    fn test_feature_codes(#[case] metric_type: MetricType, #[case] expected: u32) {
        assert_eq!(metric_type.feature_code(), expected);
    }

    #[test]
    fn test_every_type_round_trips_through_its_name() {
        for metric_type in MetricType::ALL {
            assert_eq!(MetricType::parse(metric_type.name()).unwrap(), metric_type);
            assert_eq!(MetricType::parse(metric_type.description()).unwrap(), metric_type);
        }
    }

    #[test]
    fn test_parse_metric_type_by_name() {
        assert_eq!("Intensity".parse::<MetricType>().unwrap(), MetricType::Intensity);
        assert_eq!(MetricType::Intensity.to_string(), "Intensity");
    }

    #[test]
    fn test_parse_unknown_metric_type() {
        let err = MetricType::parse("NoMetric").unwrap_err();
        assert!(matches!(err, InteropError::InvalidMetricType { ref name } if name == "NoMetric"));
    }

    #[test]
    fn test_group_names_and_files() {
        assert_eq!(MetricGroup::Error.to_string(), "Error");
        assert_eq!(MetricGroup::parse("CorrectedInt"), Some(MetricGroup::CorrectedInt));
        assert_eq!(MetricGroup::parse("Unknown"), None);
        assert_eq!(MetricGroup::QCollapsed.file_name(), "QMetrics2030Out.bin");
        for (i, group) in MetricGroup::ALL.iter().enumerate() {
            assert_eq!(group.index(), i);
        }
    }

    #[test]
    fn test_tile_naming_parse() {
        assert_eq!(TileNamingMethod::parse("FourDigit"), TileNamingMethod::FourDigit);
        assert_eq!(TileNamingMethod::parse("Hexagonal"), TileNamingMethod::Unknown);
    }
}
