//! Pipeline configuration loaded from YAML.
//!
//! ```yaml
//! range_policy: reject
//! labels:
//!   "How excited are you?": expectation
//! render:
//!   dpi: 150
//! ```

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    fields::CanonicalField, labels::LabelDictionary, normalize::RangePolicy, render::RenderConfig,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub range_policy: RangePolicy,
    /// Extra header labels layered over the default dictionary.
    pub labels: BTreeMap<String, CanonicalField>,
    pub render: RenderConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).context("Parsing config YAML")
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn label_dictionary(&self) -> LabelDictionary {
        let mut dictionary = LabelDictionary::default();
        dictionary.extend(
            self.labels
                .iter()
                .map(|(label, field)| (label.clone(), *field)),
        );
        dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.range_policy, RangePolicy::Flag);
    }

    #[test]
    fn labels_extend_the_default_dictionary() {
        let config: Config = serde_yaml::from_str(
            "range_policy: reject\nlabels:\n  \"How excited are you?\": expectation\n",
        )
        .unwrap();
        assert_eq!(config.range_policy, RangePolicy::Reject);
        let dictionary = config.label_dictionary();
        assert_eq!(
            dictionary.lookup("How excited are you?"),
            Some(CanonicalField::Expectation)
        );
        assert_eq!(
            dictionary.lookup("학생 이름"),
            Some(CanonicalField::StudentName)
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<Config>("colour: blue\n").is_err());
    }

    #[test]
    fn unknown_render_keys_are_rejected() {
        assert!(serde_yaml::from_str::<Config>("render:\n  dip: 150\n").is_err());
        let config: Config = serde_yaml::from_str("render:\n  dpi: 150\n").unwrap();
        assert_eq!(config.render.dpi, 150);
        assert_eq!(config.render.width, 12.0);
    }
}
