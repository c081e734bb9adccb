use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AIListError, AIListResult};

/// Default coverage length used when decomposing intervals into components.
pub const DEFAULT_MIN_COVERAGE: usize = 20;
/// Default upper bound on the number of components built.
pub const DEFAULT_MAX_COMPONENTS: usize = 10;
/// Lists this short (or shorter) are never decomposed.
pub const DEFAULT_MIN_COMPONENT_LEN: usize = 64;
/// Components at or below this length are scanned linearly instead of searched.
pub const DEFAULT_LINEAR_SCAN_THRESHOLD: usize = 15;
/// Default window used by the window protection score.
pub const DEFAULT_WPS_WINDOW: u32 = 4;

///
/// Tuning knobs for building and querying an [`AIList`](crate::AIList).
///
/// Every field has a default, so a TOML file only needs to name the values it changes:
///
/// ```toml
/// min_coverage = 30
/// max_components = 6
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AIListConfig {
    /// How many following intervals are inspected when deciding whether an
    /// interval covers its neighbours and should move to the next component.
    pub min_coverage: usize,
    /// Maximum number of components; whatever is left at the cap becomes the last one.
    pub max_components: usize,
    /// Stop decomposing once a list is this short. Defaults to `max(64, min_coverage)`.
    pub min_component_len: Option<usize>,
    pub linear_scan_threshold: usize,
    pub wps_window: u32,
}

impl Default for AIListConfig {
    fn default() -> Self {
        Self {
            min_coverage: DEFAULT_MIN_COVERAGE,
            max_components: DEFAULT_MAX_COMPONENTS,
            min_component_len: None,
            linear_scan_threshold: DEFAULT_LINEAR_SCAN_THRESHOLD,
            wps_window: DEFAULT_WPS_WINDOW,
        }
    }
}

impl AIListConfig {
    /// Effective minimum component length.
    pub fn min_component_len(&self) -> usize {
        self.min_component_len
            .unwrap_or_else(|| DEFAULT_MIN_COMPONENT_LEN.max(self.min_coverage))
    }

    ///
    /// Check that the configuration can drive a decomposition.
    ///
    /// # Returns
    /// - `Err(AIListError::InvalidConfig)` when `min_coverage < 2` or `max_components == 0`
    ///
    pub fn validate(&self) -> AIListResult<()> {
        if self.min_coverage < 2 {
            return Err(AIListError::InvalidConfig(format!(
                "min_coverage must be at least 2, got {}",
                self.min_coverage
            )));
        }
        if self.max_components == 0 {
            return Err(AIListError::InvalidConfig(
                "max_components must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<&Path> for AIListConfig {
    type Error = AIListError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: AIListConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use std::path::PathBuf;

    #[rstest]
    fn test_defaults() {
        let config = AIListConfig::default();
        assert_eq!(config.min_coverage, 20);
        assert_eq!(config.max_components, 10);
        assert_eq!(config.min_component_len(), 64);
        assert_eq!(config.wps_window, 4);
        assert_eq!(config.validate().is_ok(), true);
    }

    #[rstest]
    fn test_min_component_len_follows_large_coverage() {
        let config = AIListConfig {
            min_coverage: 100,
            ..Default::default()
        };
        assert_eq!(config.min_component_len(), 100);
    }

    #[rstest]
    fn test_try_from_toml() {
        let path = PathBuf::from("tests/data/ailist.toml");
        let config = AIListConfig::try_from(path.as_path()).unwrap();
        assert_eq!(config.min_coverage, 10);
        assert_eq!(config.max_components, 4);
        assert_eq!(config.min_component_len(), 16);
        assert_eq!(config.linear_scan_threshold, 15);
        assert_eq!(config.wps_window, 120);
    }

    #[rstest]
    fn test_partial_toml_uses_defaults() {
        let config: AIListConfig = toml::from_str("wps_window = 8").unwrap();
        assert_eq!(
            config,
            AIListConfig {
                wps_window: 8,
                ..Default::default()
            }
        );
    }

    #[rstest]
    #[case(AIListConfig { min_coverage: 1, ..Default::default() })]
    #[case(AIListConfig { max_components: 0, ..Default::default() })]
    fn test_validate_rejects(#[case] config: AIListConfig) {
        assert_eq!(
            matches!(config.validate(), Err(AIListError::InvalidConfig(_))),
            true
        );
    }

    #[rstest]
    fn test_try_from_missing_file() {
        let path = PathBuf::from("tests/data/does-not-exist.toml");
        let result = AIListConfig::try_from(path.as_path());
        assert_eq!(matches!(result, Err(AIListError::Io(_))), true);
    }
}
