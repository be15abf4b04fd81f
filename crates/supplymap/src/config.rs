//! YAML configuration file.
//!
//! ```yaml
//! dataset: data/acme
//! analysis:
//!   depth: 2
//!   view: both
//!   min-weight: 1.5
//!   regions: [EU, APAC]
//! graph:
//!   reference-policy: reject
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_DEPTH;
use crate::error::{Error, Result};
use crate::graph::ReferencePolicy;
use crate::view::{ViewFilter, ViewMode, DEFAULT_MIN_WEIGHT};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "supplymap.yaml";

/// Smallest depth accepted from the command line.
pub const MIN_DEPTH: usize = 1;

/// Largest depth accepted from the command line.
pub const MAX_DEPTH: usize = 5;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset directory
    pub dataset: Option<PathBuf>,
    /// Analysis defaults
    pub analysis: AnalysisConfig,
    /// Graph construction settings
    pub graph: GraphConfig,
}

/// `analysis:` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Traversal depth
    pub depth: usize,
    /// View mode
    pub view: ViewMode,
    /// Minimum arc weight shown
    pub min_weight: f64,
    /// Region allow-list; absent means every region
    pub regions: Option<BTreeSet<String>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            view: ViewMode::default(),
            min_weight: DEFAULT_MIN_WEIGHT,
            regions: None,
        }
    }
}

impl AnalysisConfig {
    /// The view filter described by this section.
    #[must_use]
    pub fn view_filter(&self) -> ViewFilter {
        ViewFilter {
            mode: self.view,
            regions: self.regions.clone(),
            min_weight: self.min_weight,
        }
    }
}

/// `graph:` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GraphConfig {
    /// What to do with edges naming unknown nodes
    pub reference_policy: ReferencePolicy,
}

impl Config {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed YAML, unknown keys or an
    /// out-of-range depth.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or see [`Config::from_yaml`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml(&text).map_err(|e| match e {
            Error::Config(message) => Error::Config(format!("{}: {message}", path.display())),
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path` if given (it must exist), otherwise `supplymap.yaml` in
    /// `dir` if present, otherwise defaults.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = dir.join(CONFIG_FILE_NAME);
        match Self::load(&default_path) {
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))
    }

    fn validate(&self) -> Result<()> {
        let depth = self.analysis.depth;
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
            return Err(Error::Config(format!(
                "analysis.depth must be between {MIN_DEPTH} and {MAX_DEPTH}, got {depth}"
            )));
        }
        if !self.analysis.min_weight.is_finite() {
            return Err(Error::Config("analysis.min-weight must be a finite number".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analysis.depth, 1);
        assert_eq!(config.graph.reference_policy, ReferencePolicy::Skip);
    }

    #[test]
    fn parses_kebab_case_keys() {
        let config = Config::from_yaml(
            "dataset: data/acme\n\
             analysis:\n  depth: 3\n  view: upstream\n  min-weight: 0.5\n  regions: [EU]\n\
             graph:\n  reference-policy: reject\n",
        )
        .unwrap();

        assert_eq!(config.dataset, Some(PathBuf::from("data/acme")));
        let filter = config.analysis.view_filter();
        assert_eq!(filter.mode, ViewMode::Upstream);
        assert_eq!(filter.min_weight, 0.5);
        assert_eq!(filter.regions, Some(BTreeSet::from(["EU".to_string()])));
        assert_eq!(config.graph.reference_policy, ReferencePolicy::Reject);
    }

    #[test]
    fn rejects_out_of_range_depth_and_unknown_keys() {
        assert!(matches!(
            Config::from_yaml("analysis:\n  depth: 9\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_yaml("analysis:\n  deep: 2\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn discover_falls_back_to_defaults_only_for_missing_default_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        let missing = dir.path().join("other.yaml");
        assert!(Config::discover(Some(&missing), dir.path()).is_err());

        fs::write(dir.path().join(CONFIG_FILE_NAME), "analysis:\n  depth: 2\n").unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap().analysis.depth, 2);
    }

    #[test]
    fn yaml_round_trips() {
        let mut config = Config::default();
        config.analysis.view = ViewMode::Both;
        let text = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml(&text).unwrap(), config);
    }
}
