//! Viewer configuration file
//!
//! ```toml
//! [viewer]
//! statuses_per_page = 124
//! columns = 6
//!
//! [region]
//! total_size = 4096
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chunk_allocator::RegionConfig;
use serde::Deserialize;

pub const DEFAULT_STATUSES_PER_PAGE: usize = 124;
pub const DEFAULT_COLUMNS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerSection {
    pub statuses_per_page: usize,
    pub columns: usize,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            statuses_per_page: DEFAULT_STATUSES_PER_PAGE,
            columns: DEFAULT_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub viewer: ViewerSection,
    pub region: RegionConfig,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(content).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Apply command-line overrides on top of the file values
    pub fn with_overrides(mut self, statuses: Option<usize>, columns: Option<usize>) -> Result<Self> {
        if let Some(statuses) = statuses {
            self.viewer.statuses_per_page = statuses;
        }
        if let Some(columns) = columns {
            self.viewer.columns = columns;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.viewer.statuses_per_page == 0 {
            anyhow::bail!("statuses_per_page must be at least 1");
        }
        if self.viewer.columns == 0 {
            anyhow::bail!("columns must be at least 1");
        }
        self.region.validate()?;
        Ok(())
    }
}
