use anyhow::Context;
use crimecore::calendar::{DateInterval, DayKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Dataset paths and optional analysis-window override for one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub incidents: PathBuf,
    #[serde(default)]
    pub boundaries: Option<PathBuf>,
    /// MM/DD/YYYY; defaults to the fixed analysis window when absent.
    #[serde(default)]
    pub window_start: Option<String>,
    #[serde(default)]
    pub window_end: Option<String>,
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(incidents: PathBuf, boundaries: Option<PathBuf>) -> Self {
        Self {
            incidents,
            boundaries,
            window_start: None,
            window_end: None,
        }
    }

    /// Resolves the analysis window, applying any configured override.
    pub fn window(&self) -> anyhow::Result<DateInterval> {
        let default = DateInterval::analysis_window();
        let start = match &self.window_start {
            Some(text) => DayKey::parse_mdy(text)
                .with_context(|| format!("invalid window_start {text:?}"))?,
            None => default.start(),
        };
        let end = match &self.window_end {
            Some(text) => {
                DayKey::parse_mdy(text).with_context(|| format!("invalid window_end {text:?}"))?
            }
            None => default.end(),
        };
        Ok(DateInterval::new(start, end))
    }
}
