//! The optional run parameters file (`RunParameters.xml`).
//!
//! Older platforms leave `ImageChannels` out of `RunInfo.xml`. Their run
//! parameters still name the control software, and the instrument it belongs
//! to fixes how many image channels the run has.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{InteropError, Result};
use crate::run::xml::{XmlElement, parse_document};

/// File name of the run parameters inside a run folder.
pub const RUN_PARAMETERS_FILE_NAME: &str = "RunParameters.xml";

/// Instrument family a run was sequenced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstrumentType {
    #[default]
    Unknown,
    HiSeq,
    HiScan,
    MiSeq,
    NextSeq,
    MiniSeq,
    NovaSeq,
}

impl InstrumentType {
    /// Recognizes the instrument named in free text such as an application
    /// name (`"MiSeq Control Software"`) or a chemistry (`"NextSeq High"`).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let text = text.to_ascii_lowercase();
        // MiniSeq and NovaSeq are matched before the shorter names they resemble.
        [
            ("novaseq", Self::NovaSeq),
            ("miniseq", Self::MiniSeq),
            ("nextseq", Self::NextSeq),
            ("miseq", Self::MiSeq),
            ("hiscan", Self::HiScan),
            ("hiseq", Self::HiSeq),
        ]
        .into_iter()
        .find(|(needle, _)| text.contains(needle))
        .map_or(Self::Unknown, |(_, instrument)| instrument)
    }

    /// Number of image channels the instrument records.
    #[must_use]
    pub fn channel_count(self) -> Option<usize> {
        match self {
            Self::HiSeq | Self::HiScan | Self::MiSeq => Some(4),
            Self::NextSeq | Self::MiniSeq | Self::NovaSeq => Some(2),
            Self::Unknown => None,
        }
    }
}

/// The parts of `RunParameters.xml` used to configure a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    instrument_type: InstrumentType,
    application_name: String,
    chemistry: String,
}

impl RunParameters {
    #[must_use]
    pub fn instrument_type(&self) -> InstrumentType {
        self.instrument_type
    }

    #[must_use]
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    #[must_use]
    pub fn chemistry(&self) -> &str {
        &self.chemistry
    }

    /// Number of image channels implied by the instrument.
    #[must_use]
    pub fn channel_count(&self) -> Option<usize> {
        self.instrument_type.channel_count()
    }

    /// Reads and parses `path`.
    ///
    /// # Errors
    /// [`InteropError::FileNotFound`] when the file is absent, otherwise the
    /// errors of [`RunParameters::parse`].
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| InteropError::from_io(path, e))?;
        debug!("Parsing run parameters {}", path.display());
        Self::parse(&text)
    }

    /// Reads `RunParameters.xml` from a run folder, or `None` when the folder
    /// has none.
    ///
    /// # Errors
    /// See [`RunParameters::parse`].
    pub fn from_run_folder<P: AsRef<Path>>(run_folder: P) -> Result<Option<Self>> {
        match Self::read_file(run_folder.as_ref().join(RUN_PARAMETERS_FILE_NAME)) {
            Ok(parameters) => Ok(Some(parameters)),
            Err(InteropError::FileNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parses run parameters from XML text.
    ///
    /// The application name and chemistry are read from the root or from its
    /// `Setup` element, whichever holds them.
    ///
    /// # Errors
    /// - [`InteropError::EmptyFormat`] for blank text
    /// - [`InteropError::XmlParse`] for malformed XML
    /// - [`InteropError::BadXmlFormat`] when the root is not `RunParameters`
    pub fn parse(text: &str) -> Result<Self> {
        let root = parse_document(text)?;
        if root.name != "RunParameters" {
            return Err(InteropError::BadXmlFormat {
                reason: format!("root element is '{}', expected 'RunParameters'", root.name),
            });
        }
        let application_name = setting(&root, &["ApplicationName", "Application"]);
        let chemistry = setting(&root, &["Chemistry"]);
        let instrument = setting(&root, &["InstrumentType"]);
        let instrument_type = [application_name.as_str(), chemistry.as_str(), instrument.as_str()]
            .into_iter()
            .map(InstrumentType::from_text)
            .find(|t| *t != InstrumentType::Unknown)
            .unwrap_or_default();
        Ok(Self { instrument_type, application_name, chemistry })
    }
}

/// Text of the first of `names` found under the root or its `Setup` element.
fn setting(root: &XmlElement, names: &[&str]) -> String {
    let setup = root.child("Setup");
    names
        .iter()
        .find_map(|name| root.child_text(name).or_else(|| setup.and_then(|s| s.child_text(name))))
        .filter(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("HiSeq Control Software", InstrumentType::HiSeq, Some(4))]
    #[case("MiSeq Control Software", InstrumentType::MiSeq, Some(4))]
    #[case("MiniSeq Control Software", InstrumentType::MiniSeq, Some(2))]
    #[case("NextSeq Control Software", InstrumentType::NextSeq, Some(2))]
    #[case("NovaSeq Control Software", InstrumentType::NovaSeq, Some(2))]
    #[case("Sequencer", InstrumentType::Unknown, None)]
    fn test_instrument_from_application_name(
        #[case] name: &str,
        #[case] expected: InstrumentType,
        #[case] channels: Option<usize>,
    ) {
        let instrument = InstrumentType::from_text(name);
        assert_eq!(instrument, expected);
        assert_eq!(instrument.channel_count(), channels);
    }

    #[test]
    fn test_parse_setup_section() {
        let xml = r#"<?xml version="1.0"?>
<RunParameters>
  <Setup>
    <ApplicationName>HiSeq Control Software</ApplicationName>
    <ApplicationVersion>2.2.58</ApplicationVersion>
  </Setup>
</RunParameters>"#;
        let parameters = RunParameters::parse(xml).unwrap();
        assert_eq!(parameters.instrument_type(), InstrumentType::HiSeq);
        assert_eq!(parameters.application_name(), "HiSeq Control Software");
        assert_eq!(parameters.channel_count(), Some(4));
    }

    #[test]
    fn test_parse_chemistry_fallback() {
        let xml = "<RunParameters><Chemistry>NextSeq High</Chemistry></RunParameters>";
        let parameters = RunParameters::parse(xml).unwrap();
        assert_eq!(parameters.instrument_type(), InstrumentType::NextSeq);
        assert_eq!(parameters.chemistry(), "NextSeq High");
    }

    #[test]
    fn test_wrong_root_is_bad_format() {
        assert!(matches!(RunParameters::parse("<RunInfo/>"), Err(InteropError::BadXmlFormat { .. })));
    }

    #[test]
    fn test_absent_file_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(RunParameters::from_run_folder(dir.path()).unwrap().is_none());
    }
}
